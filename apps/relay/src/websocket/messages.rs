//! WebSocket message types for the shared-session protocol
//!
//! Messages are JSON text frames with a `{"type", "payload"}` envelope.
//! The inbound vocabulary is deliberately tiny: anyone may `refresh` and
//! `search`, authenticated listeners may `request` a track, and admins may
//! issue transport `admin` actions.

use serde::{Deserialize, Serialize};

use jukewire_mopidy_client::Track;

/// Maximum number of search entries returned to a client
pub const SEARCH_RESULT_LIMIT: usize = 15;

// =============================================================================
// Client -> Server Messages
// =============================================================================

/// Messages sent from client to relay
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Request a fresh now-playing snapshot for this connection
    Refresh,

    /// Free-text library search, results go only to the requester
    Search {
        #[serde(default)]
        query: Option<String>,
    },

    /// Enqueue a track by URI (requires authentication)
    Request { uri: String },

    /// Transport control action (requires admin)
    ///
    /// The action is carried as a string so unknown vocabulary can be
    /// ignored as a no-op instead of failing the frame decode.
    Admin { action: String },
}

// =============================================================================
// Server -> Client Messages
// =============================================================================

/// Messages sent from relay to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Now-playing snapshot, or the explicit empty payload when idle
    #[serde(rename = "track")]
    Track(TrackPayload),

    /// Ordered search results, at most [`SEARCH_RESULT_LIMIT`] entries
    #[serde(rename = "search results")]
    SearchResults(Vec<SearchResultEntry>),
}

/// Normalized now-playing state
///
/// All fields absent means "nothing playing", a valid state clients
/// render as an idle UI, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TrackPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Artist names, comma-joined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artists: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,

    /// Artwork URI, when the backend knows one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art: Option<String>,
}

impl TrackPayload {
    /// The explicit "nothing playing" payload
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when this is the idle payload
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artists.is_none() && self.album.is_none()
    }

    /// Normalize a backend track plus optional artwork reference
    pub fn from_track(track: &Track, art: Option<String>) -> Self {
        Self {
            title: Some(track.title().to_string()),
            artists: Some(track.joined_artists()),
            album: Some(track.album_name().unwrap_or_default().to_string()),
            art,
        }
    }
}

/// One entry of a relayed search result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResultEntry {
    pub uri: String,
    pub title: String,
    /// Artist names, comma-joined
    pub artist: String,
    pub album: String,
}

impl From<&Track> for SearchResultEntry {
    fn from(track: &Track) -> Self {
        Self {
            uri: track.uri.clone(),
            title: track.title().to_string(),
            artist: track.joined_artists(),
            album: track.album_name().unwrap_or_default().to_string(),
        }
    }
}

// =============================================================================
// Transport actions
// =============================================================================

/// The closed set of admin transport actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportAction {
    Play,
    Pause,
    Next,
    Prev,
    VolUp,
    VolDown,
    FadeUp,
    FadeDown,
}

impl TransportAction {
    /// Signed mixer delta for volume actions, `None` for transport ones
    pub fn fade_delta(&self) -> Option<i32> {
        match self {
            Self::VolUp => Some(4),
            Self::VolDown => Some(-4),
            Self::FadeUp => Some(20),
            Self::FadeDown => Some(-20),
            _ => None,
        }
    }
}

impl std::str::FromStr for TransportAction {
    type Err = ();

    // Unknown strings are the caller's no-op case, not a protocol error
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Prev),
            "volup" => Ok(Self::VolUp),
            "voldown" => Ok(Self::VolDown),
            "fadeup" => Ok(Self::FadeUp),
            "fadedown" => Ok(Self::FadeDown),
            _ => Err(()),
        }
    }
}
