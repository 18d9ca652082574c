//! API client for the MSTIDE DB user endpoints.
//!
//! The backend tracks the session with a cookie, so the client keeps a
//! cookie jar and sends it with every request. Only the three user
//! endpoints are modelled here; the compound and fragment views talk to
//! the backend on their own.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::session::User;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// "Who am I" endpoint, reports the session bound to the cookie.
const ME_PATH: &str = "/api/user/me";

/// Password login endpoint, sets the session cookie on success.
const LOGIN_PATH: &str = "/api/user/login";

/// Logout endpoint, revokes the session server side.
const LOGOUT_PATH: &str = "/api/user/logout";

/// Body of `GET /api/user/me`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MeResponse {
    #[serde(rename = "loggedIn")]
    pub logged_in: bool,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub login: Option<String>,
}

impl MeResponse {
    /// The user this response vouches for, if any.
    ///
    /// `loggedIn: true` without both `id` and `login` is malformed and is
    /// rejected rather than guessed at.
    pub fn into_user(self) -> Result<Option<User>, ApiError> {
        if !self.logged_in {
            return Ok(None);
        }
        match (self.id, self.login) {
            (Some(id), Some(login)) => Ok(Some(User { id, login })),
            (id, login) => Err(ApiError::InvalidResponse(format!(
                "loggedIn without user (id present: {}, login present: {})",
                id.is_some(),
                login.is_some()
            ))),
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    login: &'a str,
    password: &'a str,
}

/// HTTP client for the user endpoints.
/// Clone is cheap and clones share the cookie jar and connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Ask the backend which session, if any, the cookie jar carries.
    pub async fn fetch_me(&self) -> Result<MeResponse, ApiError> {
        let url = self.url(ME_PATH);
        debug!(url = %url, "Fetching current session");

        let response = self.client.get(&url).send().await?;
        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse session response: {}", e)))
    }

    /// Submit a password login. The response body carries nothing we use.
    pub async fn login(&self, login: &str, password: &str) -> Result<(), ApiError> {
        let url = self.url(LOGIN_PATH);
        debug!(url = %url, login = login, "Submitting login");

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { login, password })
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.url(LOGOUT_PATH);
        debug!(url = %url, "Submitting logout");

        let response = self.client.post(&url).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FailureKind;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), Duration::from_secs(5)).expect("client should build")
    }

    #[test]
    fn test_me_response_logged_in() {
        let json = r#"{"loggedIn": true, "id": 7, "login": "alice"}"#;
        let resp: MeResponse = serde_json::from_str(json).expect("valid me response");
        let user = resp.into_user().expect("well formed").expect("logged in");
        assert_eq!(user, User { id: 7, login: "alice".to_string() });
    }

    #[test]
    fn test_me_response_logged_out_ignores_extra_fields() {
        let json = r#"{"loggedIn": false, "id": 7}"#;
        let resp: MeResponse = serde_json::from_str(json).expect("valid me response");
        assert_eq!(resp.into_user().expect("well formed"), None);
    }

    #[test]
    fn test_me_response_logged_in_without_login_is_invalid() {
        let json = r#"{"loggedIn": true, "id": 7}"#;
        let resp: MeResponse = serde_json::from_str(json).expect("valid me response");
        let err = resp.into_user().expect_err("missing login");
        assert_eq!(err.kind(), FailureKind::Parse);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(1))
            .expect("client should build");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url(ME_PATH), "http://localhost:8000/api/user/me");
    }

    #[tokio::test]
    async fn test_login_posts_json_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .and(body_json(serde_json::json!({"login": "bob", "password": "hunter2"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .login("bob", "hunter2")
            .await
            .expect("login accepted");
    }

    #[tokio::test]
    async fn test_fetch_me_garbage_body_is_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ME_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_me().await.expect_err("not json");
        assert_eq!(err.kind(), FailureKind::Parse);
    }

    #[tokio::test]
    async fn test_fetch_me_status_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ME_PATH))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_me().await.expect_err("unauthorized");
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(err.kind(), FailureKind::Status);
    }

    #[tokio::test]
    async fn test_login_cookie_is_sent_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(
                ResponseTemplate::new(200).insert_header("set-cookie", "sessionid=abc123; Path=/"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ME_PATH))
            .and(wiremock::matchers::header("cookie", "sessionid=abc123"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"loggedIn": true, "id": 3, "login": "bob"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.login("bob", "pw").await.expect("login accepted");
        let me = client.fetch_me().await.expect("cookie replayed");
        assert!(me.logged_in);
    }
}
