//! External service integrations

pub mod directory;

pub use directory::{Authority, AuthorityResolver, DirectoryClient};
