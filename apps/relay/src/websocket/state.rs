//! Now-playing state broadcasting
//!
//! Builds the normalized now-playing snapshot from the playback backend
//! and delivers it, either to one connection (refresh) or to every
//! listener (after a state-changing action). Snapshot failures degrade
//! to the explicit empty payload so clients render an idle state rather
//! than hang on a missing frame.

use jukewire_mopidy_client::MopidyClient;
use tracing::{debug, warn};

use super::connection::{ConnectionId, ConnectionRegistry};
use super::messages::{ServerMessage, TrackPayload};

/// Produces and delivers now-playing snapshots
#[derive(Debug, Clone)]
pub struct StateBroadcaster {
    backend: MopidyClient,
    registry: ConnectionRegistry,
}

impl StateBroadcaster {
    pub fn new(backend: MopidyClient, registry: ConnectionRegistry) -> Self {
        Self { backend, registry }
    }

    /// Build the current now-playing payload
    ///
    /// Nothing playing and backend failure both yield the empty payload;
    /// only the log line tells them apart. A missing artwork lookup
    /// never degrades the rest of the snapshot.
    pub async fn snapshot(&self) -> TrackPayload {
        let track = match self.backend.current_track().await {
            Ok(Some(track)) => track,
            Ok(None) => return TrackPayload::empty(),
            Err(e) => {
                warn!(error = %e, "Failed to fetch current track, reporting idle state");
                return TrackPayload::empty();
            }
        };

        let art = match self.backend.track_images(&[&track.uri]).await {
            Ok(images) => images
                .get(&track.uri)
                .and_then(|imgs| imgs.first())
                .map(|img| img.uri.clone()),
            Err(e) => {
                debug!(error = %e, uri = %track.uri, "Artwork lookup failed");
                None
            }
        };

        TrackPayload::from_track(&track, art)
    }

    /// Deliver a fresh snapshot to one connection
    pub async fn send_to(&self, id: ConnectionId) {
        let payload = self.snapshot().await;
        if let Err(e) = self.registry.send(id, ServerMessage::Track(payload)) {
            debug!(connection_id = %id, error = %e, "Snapshot delivery failed");
        }
    }

    /// Deliver a fresh snapshot to every live connection
    pub async fn broadcast_all(&self) {
        let payload = self.snapshot().await;
        let delivered = self.registry.broadcast(ServerMessage::Track(payload));
        debug!(listeners = delivered, "Broadcast now-playing state");
    }
}
