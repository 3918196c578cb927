//! WebSocket layer for the shared listening session
//!
//! One communal session: every connection sees the same now-playing
//! state, anyone can search, authenticated listeners can queue tracks,
//! and admins steer the transport.

pub mod connection;
pub mod dispatch;
pub mod handler;
pub mod messages;
pub mod search;
pub mod state;

pub use connection::{ConnectionId, ConnectionRegistry, SendError};
pub use dispatch::{CommandDispatcher, Disposition};
pub use handler::ws_handler;
pub use messages::{
    ClientMessage, SearchResultEntry, ServerMessage, TrackPayload, TransportAction,
    SEARCH_RESULT_LIMIT,
};
pub use search::SearchRelay;
pub use state::StateBroadcaster;
