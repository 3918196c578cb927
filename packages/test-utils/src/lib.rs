//! Shared test utilities for the Jukewire workspace
//!
//! This crate provides mock implementations of the relay's external
//! services for testing without network dependencies:
//!
//! - [`MockMopidyServer`] - Mock Mopidy JSON-RPC endpoint for backend tests
//! - [`MockDirectoryServer`] - Mock identity directory for authority tests
//!
//! # Example
//!
//! ```rust,ignore
//! use jukewire_test_utils::{MockMopidyServer, MopidyTrackFixture};
//!
//! #[tokio::test]
//! async fn test_with_mocks() {
//!     let mopidy = MockMopidyServer::start().await;
//!     mopidy
//!         .mock_current_track(Some(MopidyTrackFixture::new(
//!             "spotify:track:1",
//!             "One More Time",
//!         )))
//!         .await;
//!
//!     // Configure your MopidyClient with mopidy.url()
//! }
//! ```

mod directory;
mod mopidy;

pub use directory::MockDirectoryServer;
pub use mopidy::{MockMopidyServer, MopidyTrackFixture};
