//! GraphQL endpoint

use orgreport_core::dto::graphql::{GraphQlRequest, GraphQlResponse};
use serde::de::DeserializeOwned;

use crate::GitHubClient;
use crate::error::{ClientError, Result};
use crate::transport::ApiRequest;

impl GitHubClient {
    /// Run a GraphQL query and return its `data`
    ///
    /// Any entry in `errors` fails the call, even when partial data came back.
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let body = GraphQlRequest {
            query: query.to_string(),
            variables,
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to encode GraphQL request: {}", e)))?;

        let response = self
            .transport
            .execute(&ApiRequest::post(&self.graphql_url, body))
            .await?;
        let envelope: GraphQlResponse<T> = self.decode(&response)?;

        if !envelope.errors.is_empty() {
            let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
            return Err(ClientError::GraphQl(messages.join("; ")));
        }

        envelope
            .data
            .ok_or_else(|| ClientError::ParseError("GraphQL response carried no data".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::ApiResponse;
    use crate::error::ClientError;
    use crate::testing::{RecordingTransport, client};

    #[derive(Debug, serde::Deserialize)]
    struct Viewer {
        login: String,
    }

    #[derive(Debug, serde::Deserialize)]
    struct ViewerData {
        viewer: Viewer,
    }

    #[tokio::test]
    async fn test_graphql_posts_query_and_variables() {
        let transport =
            RecordingTransport::new(vec![ApiResponse::new(200, r#"{"data": {"viewer": {"login": "octocat"}}}"#)]);
        let client = client(transport.clone());

        let data: ViewerData = client
            .graphql("query { viewer { login } }", json!({"a": 1}))
            .await
            .unwrap();

        assert_eq!(data.viewer.login, "octocat");
        let requests = transport.requests();
        assert_eq!(requests[0].url, "https://api.test/graphql");
        let body = requests[0].body.as_ref().unwrap();
        assert_eq!(body["query"], "query { viewer { login } }");
        assert_eq!(body["variables"]["a"], 1);
    }

    #[tokio::test]
    async fn test_graphql_errors_fail_the_call() {
        let transport = RecordingTransport::new(vec![ApiResponse::new(
            200,
            r#"{"data": {"organization": null}, "errors": [{"type": "NOT_FOUND", "message": "Could not resolve to an Organization with the login of 'nope'."}]}"#,
        )]);

        let err = client(transport)
            .graphql::<serde_json::Value>("query { x }", json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::GraphQl(msg) if msg.contains("login of 'nope'")));
    }

    #[tokio::test]
    async fn test_graphql_malformed_body() {
        let transport = RecordingTransport::new(vec![ApiResponse::new(200, "<html>")]);
        let err = client(transport)
            .graphql::<serde_json::Value>("query { x }", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
    }
}
