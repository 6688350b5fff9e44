//! Client configuration

use std::env;

use crate::error::{Error, Result};
use crate::path::{normalize_root, API_VERSION};

/// Configuration options for the etcd client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server endpoint URL (default: http://localhost:2379)
    pub endpoint: String,
    /// Protocol version tag used in every path (default: v2)
    pub version: String,
    /// Prefix applied to every key, e.g. `/app`. Normalized on use.
    pub root: String,
    /// Request timeout in milliseconds (default: 30000). Not applied to watches.
    pub timeout_ms: u64,
    /// Watch timeout in milliseconds. `None` lets a watch block until the
    /// server answers or the connection drops.
    pub watch_timeout_ms: Option<u64>,
    /// Optional SSL certificate fingerprint (SHA-256 hex) for certificate pinning.
    /// Accepts hex with or without colons. Requires an https:// endpoint.
    pub ssl_fingerprint: Option<String>,
    /// Enable TLS verification (default: true).
    /// When false, any certificate is accepted (self-signed clusters).
    /// Only valid for https:// endpoints.
    pub reject_unauthorized: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:2379".to_string(),
            version: API_VERSION.to_string(),
            root: String::new(),
            timeout_ms: 30000,
            watch_timeout_ms: None,
            ssl_fingerprint: None,
            reject_unauthorized: true,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from `ETCD_*` environment variables, falling
    /// back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let endpoint = env::var("ETCD_ENDPOINT").unwrap_or(defaults.endpoint);
        let root = env::var("ETCD_ROOT").unwrap_or_default();
        let timeout_ms = env::var("ETCD_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.timeout_ms);
        let watch_timeout_ms = env::var("ETCD_WATCH_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok());
        let ssl_fingerprint = env::var("ETCD_SSL_FINGERPRINT")
            .ok()
            .filter(|s| !s.is_empty());
        let reject_unauthorized = env::var("ETCD_REJECT_UNAUTHORIZED")
            .ok()
            .and_then(|s| parse_bool(&s))
            .unwrap_or(defaults.reject_unauthorized);

        ClientConfig {
            endpoint,
            version: defaults.version,
            root,
            timeout_ms,
            watch_timeout_ms,
            ssl_fingerprint,
            reject_unauthorized,
        }
    }

    /// Set the key prefix
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Check the fields that do not depend on the network.
    pub fn validate(&self) -> Result<()> {
        if self.version != API_VERSION {
            return Err(Error::Config(format!(
                "unsupported protocol version '{}', only {} is implemented",
                self.version, API_VERSION
            )));
        }
        if self.ssl_fingerprint.is_some() && !self.endpoint.starts_with("https://") {
            return Err(Error::Tls(
                "ssl_fingerprint requires an https:// endpoint".to_string(),
            ));
        }
        if !self.reject_unauthorized && !self.endpoint.starts_with("https://") {
            return Err(Error::Tls(
                "reject_unauthorized = false requires an https:// endpoint".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn normalized(mut self) -> Self {
        self.root = normalize_root(&self.root);
        self.endpoint = self.endpoint.trim_end_matches('/').to_string();
        self
    }
}

/// Parse a boolean flag (true/false, 1/0, yes/no)
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
