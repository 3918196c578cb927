//! Connection registry for the shared session
//!
//! Tracks every live client connection for the single communal session.
//! The registry is the only shared mutable state in the relay; it is a
//! DashMap of channel senders, so no lock is ever held across a backend
//! network call.

use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::ServerMessage;

/// Identifier of one live connection
pub type ConnectionId = Uuid;

/// Handle for one live client connection
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Channel feeding this connection's socket send task
    sender: mpsc::UnboundedSender<ServerMessage>,

    /// Opaque identity token presented at connect, if any
    ///
    /// Never trusted directly: authority is resolved fresh against the
    /// directory for every privileged action.
    identity_token: Option<String>,

    /// When this connection was admitted (Unix timestamp ms)
    pub connected_at: i64,

    /// Last activity timestamp (atomic for thread-safe updates)
    last_activity: Arc<AtomicI64>,
}

impl ConnectionHandle {
    fn new(sender: mpsc::UnboundedSender<ServerMessage>, identity_token: Option<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            sender,
            identity_token,
            connected_at: now,
            last_activity: Arc::new(AtomicI64::new(now)),
        }
    }

    /// Update last activity timestamp
    pub fn touch(&self) {
        self.last_activity
            .store(chrono::Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Get last activity timestamp
    pub fn last_seen(&self) -> i64 {
        self.last_activity.load(Ordering::Relaxed)
    }

    fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.touch();
        self.sender.send(msg).map_err(|_| SendError::Closed)
    }
}

/// Error type for send operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// No connection registered under that id
    NotRegistered,
    /// The connection's channel is closed (socket gone)
    Closed,
}

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendError::NotRegistered => write!(f, "connection not registered"),
            SendError::Closed => write!(f, "connection closed"),
        }
    }
}

impl std::error::Error for SendError {}

/// Registry of every live connection in the shared session
///
/// Cheap to clone (Arc inside). Registration is the sole admission
/// point; deregistration is idempotent and releases the handle exactly
/// once. Broadcast is best-effort at-most-once: only connections
/// registered when it starts are considered, and a failed send
/// deregisters that connection without affecting the rest.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<ConnectionId, ConnectionHandle>>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a connection, returning its id
    pub fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
        identity_token: Option<String>,
    ) -> ConnectionId {
        let id = Uuid::new_v4();
        self.connections
            .insert(id, ConnectionHandle::new(sender, identity_token));

        tracing::debug!(
            connection_id = %id,
            listeners = self.connections.len(),
            "Connection registered"
        );

        id
    }

    /// Remove a connection and release its handle
    ///
    /// Returns false when the id was already gone, making repeated
    /// cleanup paths safe.
    pub fn deregister(&self, id: ConnectionId) -> bool {
        let removed = self.connections.remove(&id).is_some();
        if removed {
            tracing::debug!(
                connection_id = %id,
                listeners = self.connections.len(),
                "Connection deregistered"
            );
        }
        removed
    }

    /// Whether a connection is currently registered
    pub fn is_registered(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Identity token the connection presented at connect
    pub fn identity_token(&self, id: ConnectionId) -> Option<String> {
        self.connections
            .get(&id)
            .and_then(|handle| handle.identity_token.clone())
    }

    /// Number of live connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Send to one connection; a failed send deregisters it
    pub fn send(&self, id: ConnectionId, msg: ServerMessage) -> Result<(), SendError> {
        let result = match self.connections.get(&id) {
            Some(handle) => handle.send(msg),
            None => Err(SendError::NotRegistered),
        };

        if result == Err(SendError::Closed) {
            self.deregister(id);
        }

        result
    }

    /// Best-effort delivery to every currently registered connection
    ///
    /// Returns the number of successful sends. Dead connections found
    /// along the way are swept out after the iteration so the DashMap
    /// shard locks are never held while removing.
    pub fn broadcast(&self, msg: ServerMessage) -> usize {
        let mut sent = 0;
        let mut dead: Vec<ConnectionId> = Vec::new();

        for entry in self.connections.iter() {
            match entry.value().send(msg.clone()) {
                Ok(()) => sent += 1,
                Err(_) => dead.push(*entry.key()),
            }
        }

        for id in dead {
            tracing::debug!(connection_id = %id, "Sweeping dead connection after broadcast");
            self.deregister(id);
        }

        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::messages::TrackPayload;

    fn track_msg() -> ServerMessage {
        ServerMessage::Track(TrackPayload::empty())
    }

    #[test]
    fn test_register_and_deregister() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = registry.register(tx, None);
        assert!(registry.is_registered(id));
        assert_eq!(registry.connection_count(), 1);

        assert!(registry.deregister(id));
        assert!(!registry.is_registered(id));
        assert_eq!(registry.connection_count(), 0);

        // Deregistration is idempotent
        assert!(!registry.deregister(id));
    }

    #[test]
    fn test_identity_token_round_trip() {
        let registry = ConnectionRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        let anon = registry.register(tx1, None);
        let known = registry.register(tx2, Some("tok-1".into()));

        assert_eq!(registry.identity_token(anon), None);
        assert_eq!(registry.identity_token(known), Some("tok-1".into()));
    }

    #[test]
    fn test_send_to_unknown_connection() {
        let registry = ConnectionRegistry::new();
        let id = Uuid::new_v4();

        assert_eq!(
            registry.send(id, track_msg()),
            Err(SendError::NotRegistered)
        );
    }

    #[test]
    fn test_send_failure_deregisters() {
        let registry = ConnectionRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let id = registry.register(tx, None);

        drop(rx);

        assert_eq!(registry.send(id, track_msg()), Err(SendError::Closed));
        assert!(!registry.is_registered(id));
    }

    #[test]
    fn test_broadcast_reaches_all() {
        let registry = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();

        registry.register(tx1, None);
        registry.register(tx2, Some("tok".into()));

        assert_eq!(registry.broadcast(track_msg()), 2);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_broadcast_survives_dead_connection() {
        let registry = ConnectionRegistry::new();
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();

        let dead = registry.register(tx1, None);
        registry.register(tx2, None);

        // Simulate a client whose socket task is gone
        drop(rx1);

        assert_eq!(registry.broadcast(track_msg()), 1);
        assert!(rx2.try_recv().is_ok());

        // The dead connection was swept and its resources released
        assert!(!registry.is_registered(dead));
        assert_eq!(registry.connection_count(), 1);
    }
}
