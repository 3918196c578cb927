//! Mopidy JSON-RPC client for Jukewire
//!
//! This crate provides a typed client for Mopidy's HTTP JSON-RPC control
//! API, covering:
//! - Now-playing and artwork queries
//! - Free-text library search
//! - Tracklist enqueueing
//! - Transport control (play, pause, next, previous)
//! - Mixer volume adjustment by signed delta
//!
//! # Example
//!
//! ```rust,no_run
//! use jukewire_mopidy_client::MopidyClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MopidyClient::new("http://localhost:6680")?;
//!
//! if let Some(track) = client.current_track().await? {
//!     println!("{} - {}", track.joined_artists(), track.title());
//! }
//!
//! client.fade(-4).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod models;

pub use client::MopidyClient;
pub use error::{MopidyError, MopidyResult};
pub use models::{Album, Artist, Image, SearchResult, Track};
