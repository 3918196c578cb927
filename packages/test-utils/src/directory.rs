//! Mock identity directory server for authority-resolution tests
//!
//! Simulates the external identity service the relay consults for
//! per-action authority checks.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock identity directory speaking the relay's resolve protocol
///
/// The relay posts `{"token": "..."}` to `/api/v1/resolve` and receives
/// either `200 {"username", "admin"}` or `404` for unknown identities.
pub struct MockDirectoryServer {
    server: MockServer,
}

impl MockDirectoryServer {
    /// Start a new mock directory server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to configure a `DirectoryClient` with
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Mount a mock resolving `token` to a known identity
    pub async fn mock_identity(&self, token: &str, username: &str, admin: bool) {
        Mock::given(method("POST"))
            .and(path("/api/v1/resolve"))
            .and(body_json(json!({ "token": token })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "username": username,
                "admin": admin,
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock rejecting `token` as unknown
    pub async fn mock_unknown(&self, token: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v1/resolve"))
            .and(body_json(json!({ "token": token })))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": "unknown identity"
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a catch-all server error for every resolve call
    pub async fn mock_server_error(&self) {
        Mock::given(method("POST"))
            .and(path("/api/v1/resolve"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "directory unavailable"
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a catch-all malformed (non-JSON) response
    pub async fn mock_malformed_response(&self) {
        Mock::given(method("POST"))
            .and(path("/api/v1/resolve"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&self.server)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_directory_resolves_identity() {
        let server = MockDirectoryServer::start().await;
        server.mock_identity("tok-1", "alice", true).await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}/api/v1/resolve", server.url()))
            .json(&json!({ "token": "tok-1" }))
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["username"], "alice");
        assert_eq!(body["admin"], true);
    }

    #[tokio::test]
    async fn test_mock_directory_unknown_token_is_404() {
        let server = MockDirectoryServer::start().await;
        server.mock_unknown("bad-token").await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}/api/v1/resolve", server.url()))
            .json(&json!({ "token": "bad-token" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 404);
    }
}
