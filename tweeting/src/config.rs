use std::env;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Connection settings for a Firestore collection
#[derive(Clone, Debug)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database: String,
    pub collection: String,
    /// `host:port` of the Firestore emulator; talks to Cloud Firestore when unset
    pub emulator_host: Option<String>,
    pub bearer_token: Option<String>,
}

/// Which backend holds the feed
#[derive(Clone, Debug)]
pub enum StoreConfig {
    /// Process-local collection, lost on exit
    Memory,
    Firestore(FirestoreConfig),
    Postgres { database_url: String },
}

impl StoreConfig {
    pub fn name(&self) -> &'static str {
        match self {
            StoreConfig::Memory => "memory",
            StoreConfig::Firestore(_) => "firestore",
            StoreConfig::Postgres { .. } => "postgres",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub store: StoreConfig,
    /// How often remote stores are re-read for changes made by other clients
    pub poll_interval: Duration,
    /// Pre-filled author field
    pub author: String,
    pub dark_mode: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let store_kind = var("FEED_STORE").unwrap_or_else(|| "memory".to_string());
        let store = match store_kind.to_lowercase().as_str() {
            "memory" => StoreConfig::Memory,
            "firestore" => StoreConfig::Firestore(FirestoreConfig {
                project_id: required("FIRESTORE_PROJECT_ID")?,
                database: var("FIRESTORE_DATABASE").unwrap_or_else(|| "(default)".to_string()),
                collection: var("FIRESTORE_COLLECTION").unwrap_or_else(|| "tweets".to_string()),
                emulator_host: var("FIRESTORE_EMULATOR_HOST"),
                bearer_token: var("FIRESTORE_BEARER_TOKEN"),
            }),
            "postgres" => StoreConfig::Postgres {
                database_url: required("DATABASE_URL")?,
            },
            _ => {
                return Err(ConfigError::Invalid {
                    name: "FEED_STORE",
                    value: store_kind,
                })
            }
        };

        let poll_interval = match var("FEED_POLL_INTERVAL_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "FEED_POLL_INTERVAL_MS",
                        value: raw,
                    })
                }
            },
            None => Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        };

        let dark_mode = match var("FEED_DARK_MODE") {
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "FEED_DARK_MODE",
                        value: raw,
                    })
                }
            },
            None => false,
        };

        Ok(Self {
            store,
            poll_interval,
            author: var("FEED_AUTHOR").unwrap_or_default(),
            dark_mode,
        })
    }
}
