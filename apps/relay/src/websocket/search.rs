//! Library search relay
//!
//! Forwards free-text search queries to the playback backend and returns
//! the flattened, truncated results to the requesting connection only.
//! Search is open to everyone, authenticated or not, and a failed search
//! never costs the client its connection.

use jukewire_mopidy_client::{MopidyClient, MopidyError};
use tracing::{debug, warn};

use super::connection::{ConnectionId, ConnectionRegistry};
use super::messages::{SearchResultEntry, ServerMessage, SEARCH_RESULT_LIMIT};

/// Relays library searches to the backend, one requester at a time
#[derive(Debug, Clone)]
pub struct SearchRelay {
    backend: MopidyClient,
    registry: ConnectionRegistry,
}

impl SearchRelay {
    pub fn new(backend: MopidyClient, registry: ConnectionRegistry) -> Self {
        Self { backend, registry }
    }

    /// Run a search and deliver the results to the requester
    ///
    /// An absent or empty query is a no-op: no backend call, no reply.
    /// Backend failures are swallowed so the connection stays open; the
    /// client simply receives nothing for that search.
    pub async fn search(&self, id: ConnectionId, query: Option<&str>) {
        let Some(query) = query.filter(|q| !q.is_empty()) else {
            return;
        };

        let results = match self.backend.search(query).await {
            Ok(results) => results,
            Err(e) => {
                match e {
                    MopidyError::Parse(_) => {
                        debug!(error = %e, query, "Discarding undecodable search results")
                    }
                    _ => warn!(error = %e, query, "Library search failed"),
                }
                return;
            }
        };

        // Flatten every result category in backend order, then cap
        let entries: Vec<SearchResultEntry> = results
            .iter()
            .flat_map(|category| category.tracks.iter())
            .take(SEARCH_RESULT_LIMIT)
            .map(SearchResultEntry::from)
            .collect();

        debug!(query, count = entries.len(), "Relaying search results");

        if let Err(e) = self.registry.send(id, ServerMessage::SearchResults(entries)) {
            debug!(connection_id = %id, error = %e, "Search result delivery failed");
        }
    }
}
