//! Relay server configuration

use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Default Mopidy base URL for development setups
const DEFAULT_MOPIDY_URL: &str = "http://localhost:6680";

/// Default identity directory base URL for development setups
const DEFAULT_DIRECTORY_URL: &str = "http://localhost:8081";

/// Application environment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "staging" | "stage" => Self::Staging,
            _ => Self::Development,
        })
    }
}

impl Environment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Relay configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 8080)
    pub port: u16,

    /// Environment mode (development, staging, production)
    pub environment: Environment,

    /// Base URL of the Mopidy playback backend
    pub mopidy_url: String,

    /// Base URL of the identity directory service
    pub directory_url: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// In production mode `MOPIDY_URL` and `DIRECTORY_URL` must be set
    /// explicitly; development falls back to localhost defaults.
    pub fn from_env() -> Result<Self> {
        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .parse()
            .unwrap_or_default();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT value")?,

            environment,

            mopidy_url: Self::load_service_url("MOPIDY_URL", DEFAULT_MOPIDY_URL, environment)?,

            directory_url: Self::load_service_url(
                "DIRECTORY_URL",
                DEFAULT_DIRECTORY_URL,
                environment,
            )?,
        })
    }

    /// Load a service base URL, strict in production
    fn load_service_url(name: &str, default: &str, environment: Environment) -> Result<String> {
        match env::var(name) {
            Ok(url) if !url.is_empty() => Ok(url),
            _ if environment.is_production() => {
                bail!("{} environment variable is required in production", name);
            }
            _ => {
                tracing::warn!(
                    "{} not set, using development default {}",
                    name,
                    default
                );
                Ok(default.to_string())
            }
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }
}
