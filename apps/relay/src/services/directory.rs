//! Identity directory client and authority resolution
//!
//! The relay never stores credentials. Authority for privileged actions
//! comes from an external identity directory, consulted fresh for every
//! privileged message so a revoked admin flag takes effect on the next
//! action, not the next reconnect.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{RelayError, RelayResult};

/// Resolve endpoint path on the directory service
const RESOLVE_PATH: &str = "/api/v1/resolve";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Resolved authority level of a connection, for one action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Authority {
    pub authenticated: bool,
    pub admin: bool,
}

impl Authority {
    /// No authority at all: the anonymous / failed-lookup level
    pub fn none() -> Self {
        Self::default()
    }

    /// Authenticated, optionally with the admin flag
    pub fn authenticated(admin: bool) -> Self {
        Self {
            authenticated: true,
            admin,
        }
    }
}

/// A known identity as reported by the directory
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityRecord {
    pub username: String,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Serialize)]
struct ResolveRequest<'a> {
    token: &'a str,
}

/// HTTP client for the identity directory service
#[derive(Clone)]
pub struct DirectoryClient {
    http_client: Client,
    resolve_url: Url,
}

impl std::fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryClient")
            .field("resolve_url", &self.resolve_url.as_str())
            .finish()
    }
}

impl DirectoryClient {
    /// Create a client for the directory at `base_url`
    pub fn new(base_url: &str) -> RelayResult<Self> {
        let base: Url = base_url.parse().map_err(|_| {
            RelayError::Configuration(format!("invalid directory URL: {}", base_url))
        })?;
        let resolve_url = base.join(RESOLVE_PATH).map_err(|_| {
            RelayError::Configuration(format!("invalid directory URL: {}", base_url))
        })?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .user_agent("Jukewire/1.0")
            .build()?;

        Ok(Self {
            http_client,
            resolve_url,
        })
    }

    /// Resolve a token to an identity record
    ///
    /// Returns `Ok(None)` for an unknown identity (404); any other
    /// non-success status or transport failure is an error for the
    /// caller to fail closed on.
    pub async fn resolve(&self, token: &str) -> RelayResult<Option<IdentityRecord>> {
        let response = self
            .http_client
            .post(self.resolve_url.clone())
            .json(&ResolveRequest { token })
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let record: IdentityRecord = response.error_for_status()?.json().await?;
        Ok(Some(record))
    }
}

/// Per-action authority resolution, failing closed
///
/// Every lookup failure mode resolves to [`Authority::none`]: missing
/// token, unknown identity, directory outage, malformed response. The
/// resolver never raises and never elevates.
#[derive(Debug, Clone)]
pub struct AuthorityResolver {
    client: DirectoryClient,
}

impl AuthorityResolver {
    /// Create a resolver over a directory client
    pub fn new(client: DirectoryClient) -> Self {
        Self { client }
    }

    /// Resolve the authority a token grants right now
    pub async fn authority_for(&self, token: Option<&str>) -> Authority {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Authority::none();
        };

        match self.client.resolve(token).await {
            Ok(Some(record)) => {
                debug!(username = %record.username, admin = record.admin, "Identity resolved");
                Authority::authenticated(record.admin)
            }
            Ok(None) => {
                debug!("Unknown identity token");
                Authority::none()
            }
            Err(e) => {
                warn!(error = %e, "Identity lookup failed, resolving to no authority");
                Authority::none()
            }
        }
    }
}
