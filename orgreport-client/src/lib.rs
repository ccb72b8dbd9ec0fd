//! Orgreport GitHub Client
//!
//! A small, type-safe client for the two GitHub surfaces the report pipeline
//! needs: the GraphQL repository listing and the REST contents endpoint.
//!
//! Every call goes through a [`Transport`]. Production code wraps the
//! network transport in a [`RateLimitedTransport`], which owns retry and
//! throttling, so endpoint methods stay focused on request construction and
//! response mapping.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use orgreport_client::{GitHubClient, RateLimitedTransport, ReqwestTransport};
//!
//! # fn example() -> orgreport_client::Result<()> {
//! let transport = RateLimitedTransport::new(ReqwestTransport::new("ghp_token")?);
//! let client = GitHubClient::with_transport(
//!     GitHubClient::DEFAULT_API_URL,
//!     GitHubClient::DEFAULT_GRAPHQL_URL,
//!     Arc::new(transport),
//! );
//! # Ok(())
//! # }
//! ```

pub mod error;
mod contents;
mod graphql;
pub mod policy;
mod rate_limited;
mod repositories;
pub mod transport;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use policy::{RetryPolicy, Sleeper, TokioSleeper};
pub use rate_limited::RateLimitedTransport;
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

/// Client for the GitHub REST and GraphQL APIs
#[derive(Clone)]
pub struct GitHubClient {
    /// REST base URL (e.g., "https://api.github.com")
    api_url: String,
    /// GraphQL endpoint (e.g., "https://api.github.com/graphql")
    graphql_url: String,
    transport: Arc<dyn Transport>,
}

impl GitHubClient {
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";
    pub const DEFAULT_GRAPHQL_URL: &'static str = "https://api.github.com/graphql";

    /// Create a client sending every request through `transport`
    ///
    /// # Arguments
    /// * `api_url` - REST base URL, trailing slash optional
    /// * `graphql_url` - GraphQL endpoint
    /// * `transport` - usually a [`RateLimitedTransport`]
    pub fn with_transport(
        api_url: impl Into<String>,
        graphql_url: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            graphql_url: graphql_url.into(),
            transport,
        }
    }

    /// Get the REST base URL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Get the GraphQL endpoint
    pub fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Deserialize a successful response body
    fn decode<T: DeserializeOwned>(&self, response: &ApiResponse) -> Result<T> {
        serde_json::from_str(&response.body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("graphql_url", &self.graphql_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Records requests and replays canned responses
    pub struct RecordingTransport {
        responses: Mutex<Vec<ApiResponse>>,
        pub requests: Mutex<Vec<ApiRequest>>,
    }

    impl RecordingTransport {
        pub fn new(mut responses: Vec<ApiResponse>) -> Arc<Self> {
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
            self.requests.lock().unwrap().push(request.clone());
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop()
                .expect("unexpected request");
            transport::check_response(response, chrono::Utc::now())
        }
    }

    pub fn client(transport: Arc<RecordingTransport>) -> GitHubClient {
        GitHubClient::with_transport("https://api.test/", "https://api.test/graphql", transport)
    }
}
