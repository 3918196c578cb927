//! Mopidy API response models
//!
//! Mopidy model objects carry a `__model__` discriminator and a number of
//! fields this client does not need; serde's default behavior of ignoring
//! unknown fields keeps these types minimal.

use serde::{Deserialize, Serialize};

/// A track as reported by Mopidy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Track URI (backend-specific, e.g. `spotify:track:...`)
    pub uri: String,
    /// Track title
    #[serde(default)]
    pub name: Option<String>,
    /// Performing artists, in backend order
    #[serde(default)]
    pub artists: Vec<Artist>,
    /// Album the track belongs to
    #[serde(default)]
    pub album: Option<Album>,
}

impl Track {
    /// Title with a fallback to the URI for untitled tracks
    pub fn title(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.uri)
    }

    /// Artist names joined with `", "`, empty when the backend reported none
    pub fn joined_artists(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Album name, if any
    pub fn album_name(&self) -> Option<&str> {
        self.album.as_ref().map(|a| a.name.as_str())
    }
}

/// An artist as reported by Mopidy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub uri: Option<String>,
    pub name: String,
}

/// An album as reported by Mopidy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub uri: Option<String>,
    pub name: String,
}

/// Artwork reference from `core.library.get_images`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub uri: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// One result category from `core.library.search`
///
/// Mopidy returns one of these per queried backend; each carries its own
/// `tracks` list, ordered by that backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchResult {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

// Internal JSON-RPC envelope types

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorBody {
    pub code: i64,
    pub message: String,
}
