//! Inbound message dispatch
//!
//! Routes each decoded client message to the right collaborator and
//! decides whether the connection survives the message. Privileged
//! messages resolve authority against the identity directory at the
//! moment of dispatch; an unauthorized attempt costs the client its
//! connection with no error payload.

use std::str::FromStr;

use jukewire_mopidy_client::MopidyClient;
use tracing::{debug, info, warn};

use crate::services::AuthorityResolver;

use super::connection::{ConnectionId, ConnectionRegistry};
use super::messages::{ClientMessage, TransportAction};
use super::search::SearchRelay;
use super::state::StateBroadcaster;

/// What the socket loop should do with the connection after a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Keep reading from this connection
    Continue,
    /// Terminate the connection immediately
    Disconnect,
}

/// Routes client messages and enforces per-action authority
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    backend: MopidyClient,
    registry: ConnectionRegistry,
    resolver: AuthorityResolver,
    state: StateBroadcaster,
    search: SearchRelay,
}

impl CommandDispatcher {
    pub fn new(
        backend: MopidyClient,
        registry: ConnectionRegistry,
        resolver: AuthorityResolver,
        state: StateBroadcaster,
        search: SearchRelay,
    ) -> Self {
        Self {
            backend,
            registry,
            resolver,
            state,
            search,
        }
    }

    /// Dispatch one decoded message from a connection
    pub async fn dispatch(&self, id: ConnectionId, message: ClientMessage) -> Disposition {
        match message {
            ClientMessage::Refresh => {
                self.state.send_to(id).await;
                Disposition::Continue
            }
            ClientMessage::Search { query } => {
                self.search.search(id, query.as_deref()).await;
                Disposition::Continue
            }
            ClientMessage::Request { uri } => self.handle_request(id, &uri).await,
            ClientMessage::Admin { action } => self.handle_admin(id, &action).await,
        }
    }

    /// Resolve the authority this connection holds right now
    async fn authority_for(&self, id: ConnectionId) -> crate::services::Authority {
        let token = self.registry.identity_token(id);
        self.resolver.authority_for(token.as_deref()).await
    }

    async fn handle_request(&self, id: ConnectionId, uri: &str) -> Disposition {
        if !self.authority_for(id).await.authenticated {
            info!(connection_id = %id, "Unauthenticated track request, disconnecting");
            return Disposition::Disconnect;
        }

        match self.backend.add_track(uri).await {
            Ok(()) => info!(connection_id = %id, uri, "Track queued"),
            Err(e) => warn!(error = %e, uri, "Failed to queue track"),
        }

        Disposition::Continue
    }

    async fn handle_admin(&self, id: ConnectionId, action: &str) -> Disposition {
        if !self.authority_for(id).await.admin {
            info!(connection_id = %id, action, "Unauthorized admin action, disconnecting");
            return Disposition::Disconnect;
        }

        let Ok(action) = TransportAction::from_str(action) else {
            debug!(connection_id = %id, action, "Unknown admin action, ignoring");
            return Disposition::Continue;
        };

        let result = match action {
            TransportAction::Play => self.backend.play().await,
            TransportAction::Pause => self.backend.pause().await,
            TransportAction::Next => self.backend.next().await,
            TransportAction::Prev => self.backend.previous().await,
            TransportAction::VolUp
            | TransportAction::VolDown
            | TransportAction::FadeUp
            | TransportAction::FadeDown => {
                // fade_delta is Some for every volume action
                let delta = action.fade_delta().unwrap_or(0);
                self.backend.fade(delta).await
            }
        };

        // No ack and no state push here: clients refresh when they want
        // the new state, or a future event trigger broadcasts it
        match result {
            Ok(()) => info!(connection_id = %id, ?action, "Admin action applied"),
            Err(e) => warn!(error = %e, ?action, "Admin action failed against backend"),
        }

        Disposition::Continue
    }
}
