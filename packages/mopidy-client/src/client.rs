//! Mopidy JSON-RPC client implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, instrument};
use url::Url;

use crate::error::{MopidyError, MopidyResult};
use crate::models::{Image, RpcRequest, RpcResponse, SearchResult, Track};

/// Path of Mopidy's HTTP JSON-RPC endpoint
const RPC_PATH: &str = "/mopidy/rpc";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Mixer volume bounds
const VOLUME_MIN: i64 = 0;
const VOLUME_MAX: i64 = 100;

/// Client for Mopidy's HTTP JSON-RPC control API
///
/// Every method is a single bounded-latency round-trip (or, for [`fade`],
/// two independent round-trips). Nothing is retried; a timeout surfaces as
/// [`MopidyError::Timeout`] and is the caller's signal that the backend is
/// unavailable.
///
/// [`fade`]: MopidyClient::fade
#[derive(Debug, Clone)]
pub struct MopidyClient {
    http_client: Client,
    rpc_url: Url,
    next_id: Arc<AtomicU64>,
}

impl MopidyClient {
    /// Create a client for the Mopidy instance at `base_url`
    /// (e.g. `http://localhost:6680`).
    ///
    /// # Errors
    /// Returns `MopidyError::InvalidBaseUrl` if the URL cannot be parsed.
    pub fn new(base_url: &str) -> MopidyResult<Self> {
        let base: Url = base_url
            .parse()
            .map_err(|_| MopidyError::InvalidBaseUrl(base_url.to_string()))?;
        let rpc_url = base
            .join(RPC_PATH)
            .map_err(|_| MopidyError::InvalidBaseUrl(base_url.to_string()))?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent("Jukewire/1.0")
            .build()?;

        Ok(Self {
            http_client,
            rpc_url,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Execute one JSON-RPC call and return the raw `result` value
    async fn call(&self, method: &str, params: Option<Value>) -> MopidyResult<Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .http_client
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MopidyError::Timeout
                } else {
                    MopidyError::Http(e)
                }
            })?
            .error_for_status()?;

        let body: RpcResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                MopidyError::Timeout
            } else {
                MopidyError::Http(e)
            }
        })?;

        if let Some(error) = body.error {
            return Err(MopidyError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(body.result.unwrap_or(Value::Null))
    }

    /// Call and decode the `result` into a typed value
    async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> MopidyResult<T> {
        let result = self.call(method, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Mopidy core version (`core.get_version`), used as a reachability probe
    pub async fn version(&self) -> MopidyResult<String> {
        self.call_as("core.get_version", None).await
    }

    /// Currently playing track, `None` when nothing is playing
    #[instrument(skip(self))]
    pub async fn current_track(&self) -> MopidyResult<Option<Track>> {
        let result = self.call("core.playback.get_current_track", None).await?;
        if result.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(result)?))
    }

    /// Artwork references for the given track URIs, keyed by URI
    pub async fn track_images(
        &self,
        uris: &[&str],
    ) -> MopidyResult<HashMap<String, Vec<Image>>> {
        self.call_as(
            "core.library.get_images",
            Some(json!({ "uris": uris })),
        )
        .await
    }

    /// Free-text library search across all backends
    ///
    /// Returns one [`SearchResult`] category per backend, each carrying its
    /// own ordered `tracks` list.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> MopidyResult<Vec<SearchResult>> {
        debug!(query = %query, "Searching Mopidy library");
        self.call_as(
            "core.library.search",
            Some(json!({ "query": { "any": [query] } })),
        )
        .await
    }

    /// Append a track to the shared tracklist by URI
    #[instrument(skip(self))]
    pub async fn add_track(&self, uri: &str) -> MopidyResult<()> {
        debug!(uri = %uri, "Enqueueing track");
        self.call("core.tracklist.add", Some(json!({ "uris": [uri] })))
            .await?;
        Ok(())
    }

    /// Resume or start playback
    pub async fn play(&self) -> MopidyResult<()> {
        self.call("core.playback.play", None).await?;
        Ok(())
    }

    /// Pause playback
    pub async fn pause(&self) -> MopidyResult<()> {
        self.call("core.playback.pause", None).await?;
        Ok(())
    }

    /// Skip to the next track
    pub async fn next(&self) -> MopidyResult<()> {
        self.call("core.playback.next", None).await?;
        Ok(())
    }

    /// Return to the previous track
    pub async fn previous(&self) -> MopidyResult<()> {
        self.call("core.playback.previous", None).await?;
        Ok(())
    }

    /// Current mixer volume (0-100), `None` when the mixer reports no volume
    pub async fn get_volume(&self) -> MopidyResult<Option<i64>> {
        self.call_as("core.mixer.get_volume", None).await
    }

    /// Set the mixer volume; returns whether the mixer accepted it
    pub async fn set_volume(&self, volume: i64) -> MopidyResult<bool> {
        self.call_as("core.mixer.set_volume", Some(json!({ "volume": volume })))
            .await
    }

    /// Adjust the mixer volume by a signed delta, clamped to 0-100
    ///
    /// Two independent round-trips (read, then write), not a transaction:
    /// a concurrent volume change between them is last-write-wins. A mixer
    /// that reports no volume makes this a no-op.
    #[instrument(skip(self))]
    pub async fn fade(&self, delta: i32) -> MopidyResult<()> {
        let Some(current) = self.get_volume().await? else {
            debug!("Mixer reports no volume, skipping fade");
            return Ok(());
        };

        let target = (current + i64::from(delta)).clamp(VOLUME_MIN, VOLUME_MAX);
        debug!(current, target, delta, "Fading volume");
        self.set_volume(target).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_invalid_base_url() {
        let result = MopidyClient::new("not a url");
        assert!(matches!(result, Err(MopidyError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_client_builds_rpc_url() {
        let client = MopidyClient::new("http://localhost:6680").unwrap();
        assert_eq!(client.rpc_url.as_str(), "http://localhost:6680/mopidy/rpc");
    }

    #[test]
    fn test_rpc_request_serialization_omits_missing_params() {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: "core.playback.play",
            params: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"method\":\"core.playback.play\""));
        assert!(!json.contains("params"));
    }

    #[test]
    fn test_request_ids_increment() {
        let client = MopidyClient::new("http://localhost:6680").unwrap();
        let first = client.next_id.fetch_add(1, Ordering::Relaxed);
        let second = client.next_id.fetch_add(1, Ordering::Relaxed);
        assert!(second > first);
    }
}
