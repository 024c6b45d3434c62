//! Configuration management for the document server and sync client

use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::sync::{SyncConfig, DEFAULT_QUIET_PERIOD};
use crate::transport::{HttpTransportConfig, DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin; any origin when unset
    pub cors_origin: Option<String>,
}

/// Settings for a sync client talking to the server
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub api_base: String,
    pub debounce_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                cors_origin: None,
            },
            client: ClientConfig {
                api_base: DEFAULT_API_BASE.to_string(),
                debounce_ms: DEFAULT_QUIET_PERIOD.as_millis() as u64,
                request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT").unwrap_or(defaults.server.port),
                cors_origin: env::var("CORS_ORIGIN").ok().filter(|s| !s.is_empty()),
            },
            client: ClientConfig {
                api_base: env::var("DOCSYNC_API_BASE").unwrap_or(defaults.client.api_base),
                debounce_ms: parse_var("DOCSYNC_DEBOUNCE_MS").unwrap_or(defaults.client.debounce_ms),
                request_timeout_ms: parse_var("DOCSYNC_REQUEST_TIMEOUT_MS")
                    .unwrap_or(defaults.client.request_timeout_ms),
            },
        }
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ClientConfig {
    pub fn transport(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            api_base: self.api_base.clone(),
            timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn sync(&self) -> SyncConfig {
        SyncConfig {
            quiet_period: Duration::from_millis(self.debounce_ms),
            document_id: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = env::var(key).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value = %value, "Ignoring unparseable environment variable");
            None
        }
    }
}
