//! Mock Mopidy server for testing the relay and backend client
//!
//! Provides a [`MockMopidyServer`] that simulates Mopidy's HTTP JSON-RPC
//! endpoint for testing playback control without a real Mopidy instance.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock Mopidy server speaking the JSON-RPC wire format
///
/// Wraps a [`wiremock::MockServer`] with convenience methods for the RPC
/// methods the relay uses. Mocks mounted with `expect_calls` verify their
/// call count when the server is dropped, which is how the test suites
/// prove "zero backend calls" and "exactly one backend call" properties.
pub struct MockMopidyServer {
    server: MockServer,
}

impl MockMopidyServer {
    /// Start a new mock Mopidy server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to configure a `MopidyClient` with
    pub fn url(&self) -> String {
        self.server.uri()
    }

    fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": result,
        }))
    }

    /// Mount a mock for one RPC method with a canned `result`
    pub async fn mock_rpc(&self, rpc_method: &str, result: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/mopidy/rpc"))
            .and(body_partial_json(json!({ "method": rpc_method })))
            .respond_with(Self::rpc_result(result))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for one RPC method that verifies its exact call count
    pub async fn mock_rpc_expect(
        &self,
        rpc_method: &str,
        result: serde_json::Value,
        expected_calls: u64,
    ) {
        Mock::given(method("POST"))
            .and(path("/mopidy/rpc"))
            .and(body_partial_json(json!({ "method": rpc_method })))
            .respond_with(Self::rpc_result(result))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Mount a mock matching a method plus a partial `params` body,
    /// verifying its exact call count
    pub async fn mock_rpc_with_params_expect(
        &self,
        rpc_method: &str,
        params: serde_json::Value,
        result: serde_json::Value,
        expected_calls: u64,
    ) {
        Mock::given(method("POST"))
            .and(path("/mopidy/rpc"))
            .and(body_partial_json(json!({
                "method": rpc_method,
                "params": params,
            })))
            .respond_with(Self::rpc_result(result))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Mount `core.playback.get_current_track` returning the given track
    /// or null ("nothing playing")
    pub async fn mock_current_track(&self, track: Option<MopidyTrackFixture>) {
        let result = match track {
            Some(fixture) => fixture.to_json(),
            None => json!(null),
        };
        self.mock_rpc("core.playback.get_current_track", result).await;
    }

    /// Mount `core.library.get_images` returning one artwork URI per track
    pub async fn mock_track_images(&self, uri: &str, image_uri: &str) {
        self.mock_rpc(
            "core.library.get_images",
            json!({ uri: [{ "uri": image_uri }] }),
        )
        .await;
    }

    /// Mount `core.library.search` returning a single result category with
    /// the given tracks, in order
    pub async fn mock_search_success(&self, tracks: Vec<MopidyTrackFixture>) {
        let tracks_json: Vec<serde_json::Value> =
            tracks.into_iter().map(|t| t.to_json()).collect();
        self.mock_rpc(
            "core.library.search",
            json!([{ "uri": "jukewire:search", "tracks": tracks_json }]),
        )
        .await;
    }

    /// Mount `core.library.search` returning a structurally invalid result
    pub async fn mock_search_malformed(&self) {
        self.mock_rpc("core.library.search", json!({ "not": "a result list" }))
            .await;
    }

    /// Mount a catch-all JSON-RPC error for every call
    pub async fn mock_rpc_error(&self, code: i64, message: &str) {
        Mock::given(method("POST"))
            .and(path("/mopidy/rpc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": code, "message": message },
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a catch-all HTTP 500 for every call
    pub async fn mock_server_error(&self) {
        Mock::given(method("POST"))
            .and(path("/mopidy/rpc"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&self.server)
            .await;
    }

    /// Verify all mounted `expect` counts now instead of at drop
    pub async fn verify(&self) {
        self.server.verify().await;
    }
}

/// Fixture for building Mopidy track JSON
#[derive(Debug, Clone)]
pub struct MopidyTrackFixture {
    pub uri: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
}

impl MopidyTrackFixture {
    /// Create a track fixture with one artist and an album derived from
    /// the title
    pub fn new(uri: &str, name: &str) -> Self {
        Self {
            uri: uri.to_string(),
            name: name.to_string(),
            artists: vec!["Test Artist".to_string()],
            album: Some(format!("{} (Album)", name)),
        }
    }

    /// Override the artist list
    pub fn with_artists(mut self, artists: &[&str]) -> Self {
        self.artists = artists.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Remove the album
    pub fn without_album(mut self) -> Self {
        self.album = None;
        self
    }

    /// Convert to Mopidy track JSON
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "__model__": "Track",
            "uri": self.uri,
            "name": self.name,
            "artists": self.artists.iter()
                .map(|a| json!({ "__model__": "Artist", "name": a }))
                .collect::<Vec<_>>(),
            "album": self.album.as_ref()
                .map(|a| json!({ "__model__": "Album", "name": a })),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_mopidy_server_starts() {
        let server = MockMopidyServer::start().await;
        assert!(!server.url().is_empty());
    }

    #[tokio::test]
    async fn test_mock_current_track_round_trip() {
        let server = MockMopidyServer::start().await;
        server
            .mock_current_track(Some(MopidyTrackFixture::new(
                "local:track:1",
                "Da Funk",
            )))
            .await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}/mopidy/rpc", server.url()))
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "core.playback.get_current_track",
            }))
            .send()
            .await
            .unwrap();

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["result"]["name"], "Da Funk");
    }

    #[test]
    fn test_track_fixture_to_json() {
        let fixture = MopidyTrackFixture::new("spotify:track:1", "Around the World")
            .with_artists(&["Daft Punk"]);
        let json = fixture.to_json();

        assert_eq!(json["uri"], "spotify:track:1");
        assert_eq!(json["artists"][0]["name"], "Daft Punk");
        assert_eq!(json["album"]["name"], "Around the World (Album)");
    }

    #[test]
    fn test_track_fixture_without_album() {
        let fixture = MopidyTrackFixture::new("local:track:2", "Untitled").without_album();
        assert!(fixture.to_json()["album"].is_null());
    }
}
