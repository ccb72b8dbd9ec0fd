//! HTTP transport
//!
//! [`Transport`] is the seam every GitHub call goes through. The network
//! implementation only moves bytes; turning a response into success or a
//! typed error happens in [`check_response`], so decorators and tests can
//! share it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode};

use crate::error::{ClientError, Result};

const USER_AGENT: &str = concat!("orgreport/", env!("CARGO_PKG_VERSION"));
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";

const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Delay used when the server gives no hint
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// An outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            body: Some(body),
        }
    }

    pub fn put(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::PUT,
            url: url.into(),
            body: Some(body),
        }
    }
}

/// A fully read response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header, ignoring names or values that are not valid HTTP
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Sends one request and returns the raw response
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        (**self).execute(request).await
    }
}

/// [`Transport`] over reqwest with GitHub token authentication
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    token: String,
}

impl ReqwestTransport {
    /// Creates a transport authenticating with `token`
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(token, client))
    }

    /// Creates a transport from a preconfigured reqwest client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(token: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            token: token.into(),
        }
    }
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        tracing::debug!(method = %request.method, url = %request.url, "Sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(API_VERSION_HEADER, API_VERSION);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

/// Maps a response onto success or a typed error
///
/// - quota exhausted (`403`/`429` with `x-ratelimit-remaining: 0`, or a
///   GraphQL `RATE_LIMITED` error) → [`ClientError::RateLimited`]
/// - secondary rate limit / abuse message → [`ClientError::AbuseDetected`]
/// - `409`, or `422` about the blob SHA → [`ClientError::Conflict`]
/// - any other non-success → [`ClientError::ApiError`]
pub fn check_response(response: ApiResponse, now: DateTime<Utc>) -> Result<ApiResponse> {
    let status = response.status;

    if status.is_success() {
        if is_graphql_rate_limited(&response.body) {
            return Err(ClientError::RateLimited {
                retry_after: rate_limit_delay(&response, now),
            });
        }
        return Ok(response);
    }

    let message = error_message(&response.body);

    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        if response.header(RATE_LIMIT_REMAINING) == Some("0") {
            return Err(ClientError::RateLimited {
                retry_after: rate_limit_delay(&response, now),
            });
        }
        if mentions_secondary_limit(&message) {
            return Err(ClientError::AbuseDetected {
                retry_after: retry_after_header(&response).unwrap_or(DEFAULT_RETRY_AFTER),
            });
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited {
                retry_after: retry_after_header(&response).unwrap_or(DEFAULT_RETRY_AFTER),
            });
        }
    }

    if status == StatusCode::CONFLICT
        || (status == StatusCode::UNPROCESSABLE_ENTITY && mentions_sha(&message))
    {
        return Err(ClientError::Conflict { message });
    }

    Err(ClientError::api_error(status.as_u16(), message))
}

/// `retry-after` seconds, else time until `x-ratelimit-reset`, else 60 s
fn rate_limit_delay(response: &ApiResponse, now: DateTime<Utc>) -> Duration {
    if let Some(delay) = retry_after_header(response) {
        return delay;
    }

    response
        .header(RATE_LIMIT_RESET)
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|reset| Duration::from_secs((reset - now.timestamp()).max(1) as u64))
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

fn retry_after_header(response: &ApiResponse) -> Option<Duration> {
    response
        .header(RETRY_AFTER.as_str())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// `422` on a contents write is only a conflict when it is about the blob SHA
fn mentions_sha(message: &str) -> bool {
    message.to_ascii_lowercase().contains("sha")
}

fn mentions_secondary_limit(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("secondary rate limit") || message.contains("abuse")
}

fn is_graphql_rate_limited(body: &str) -> bool {
    if !body.contains("RATE_LIMITED") {
        return false;
    }

    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("errors").and_then(|e| e.as_array()).cloned())
        .is_some_and(|errors| {
            errors
                .iter()
                .any(|e| e.get("type").and_then(|t| t.as_str()) == Some("RATE_LIMITED"))
        })
}

/// `message` of a GitHub error body, or the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_success_passes_through() {
        let resp = check_response(ApiResponse::new(200, "{}"), now()).unwrap();
        assert_eq!(resp.status, StatusCode::OK);
    }

    #[test]
    fn test_quota_exhausted_uses_reset_header() {
        let resp = ApiResponse::new(403, r#"{"message": "API rate limit exceeded"}"#)
            .with_header("x-ratelimit-remaining", "0")
            .with_header("x-ratelimit-reset", "1700000042");

        let err = check_response(resp, now()).unwrap_err();
        assert!(matches!(
            err,
            ClientError::RateLimited { retry_after } if retry_after == Duration::from_secs(42)
        ));
    }

    #[test]
    fn test_retry_after_header_wins() {
        let resp = ApiResponse::new(429, "")
            .with_header("x-ratelimit-remaining", "0")
            .with_header("x-ratelimit-reset", "1700000042")
            .with_header("retry-after", "7");

        let err = check_response(resp, now()).unwrap_err();
        assert!(matches!(
            err,
            ClientError::RateLimited { retry_after } if retry_after == Duration::from_secs(7)
        ));
    }

    #[test]
    fn test_reset_in_the_past_waits_at_least_a_second() {
        let resp = ApiResponse::new(403, "")
            .with_header("x-ratelimit-remaining", "0")
            .with_header("x-ratelimit-reset", "1699999990");

        let err = check_response(resp, now()).unwrap_err();
        assert!(matches!(
            err,
            ClientError::RateLimited { retry_after } if retry_after == Duration::from_secs(1)
        ));
    }

    #[test]
    fn test_bare_429_is_rate_limited_with_default_delay() {
        let err = check_response(ApiResponse::new(429, ""), now()).unwrap_err();
        assert!(matches!(
            err,
            ClientError::RateLimited { retry_after } if retry_after == DEFAULT_RETRY_AFTER
        ));
    }

    #[test]
    fn test_secondary_rate_limit_is_abuse() {
        let resp = ApiResponse::new(
            403,
            r#"{"message": "You have exceeded a secondary rate limit. Please wait a few minutes before you try again."}"#,
        )
        .with_header("retry-after", "120");

        let err = check_response(resp, now()).unwrap_err();
        assert!(matches!(
            err,
            ClientError::AbuseDetected { retry_after } if retry_after == Duration::from_secs(120)
        ));
    }

    #[test]
    fn test_abuse_detection_message() {
        let resp = ApiResponse::new(403, r#"{"message": "You have triggered an abuse detection mechanism."}"#);
        let err = check_response(resp, now()).unwrap_err();
        assert!(matches!(err, ClientError::AbuseDetected { .. }));
    }

    #[test]
    fn test_plain_forbidden_is_api_error() {
        let resp = ApiResponse::new(403, r#"{"message": "Resource not accessible by integration"}"#);
        let err = check_response(resp, now()).unwrap_err();
        assert!(matches!(
            err,
            ClientError::ApiError { status: 403, ref message } if message == "Resource not accessible by integration"
        ));
    }

    #[test]
    fn test_graphql_rate_limited_body() {
        let resp = ApiResponse::new(
            200,
            r#"{"errors": [{"type": "RATE_LIMITED", "message": "API rate limit exceeded for user."}]}"#,
        )
        .with_header("x-ratelimit-reset", "1700000010");

        let err = check_response(resp, now()).unwrap_err();
        assert!(matches!(
            err,
            ClientError::RateLimited { retry_after } if retry_after == Duration::from_secs(10)
        ));
    }

    #[test]
    fn test_repository_named_rate_limited_is_not_a_signal() {
        let resp = ApiResponse::new(200, r#"{"data": {"name": "RATE_LIMITED"}}"#);
        assert!(check_response(resp, now()).is_ok());
    }

    #[test]
    fn test_unprocessable_is_conflict() {
        let resp = ApiResponse::new(422, r#"{"message": "Invalid request.\n\n\"sha\" wasn't supplied."}"#);
        let err = check_response(resp, now()).unwrap_err();
        assert!(matches!(err, ClientError::Conflict { .. }));
    }

    #[test]
    fn test_conflict_status_is_conflict() {
        let resp = ApiResponse::new(409, r#"{"message": "is at 3a0f but expected 9c1d"}"#);
        let err = check_response(resp, now()).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_validation_failure_is_not_conflict() {
        let resp = ApiResponse::new(
            422,
            r#"{"message": "Invalid request.\n\nFor 'properties/committer', \"\" is not an object."}"#,
        );
        let err = check_response(resp, now()).unwrap_err();
        assert!(!err.is_conflict());
        assert!(matches!(err, ClientError::ApiError { status: 422, .. }));
    }

    #[test]
    fn test_server_error_is_transient() {
        let err = check_response(ApiResponse::new(502, "Bad Gateway"), now()).unwrap_err();
        assert!(err.is_transient());
        assert!(matches!(err, ClientError::ApiError { status: 502, ref message } if message == "Bad Gateway"));
    }

    #[test]
    fn test_transport_debug_hides_token() {
        let transport = ReqwestTransport::with_client("ghp_secret", Client::new());
        assert!(!format!("{transport:?}").contains("ghp_secret"));
    }
}
