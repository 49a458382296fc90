// src/utils/config.rs
//! Relay configuration loaded once per monitored process
//!
//! All inputs come from `BLOOM_*` environment variables supplied by the
//! orchestrator before the monitored process starts. The resulting
//! [`RelayConfig`] is immutable for the process lifetime; every intercepted
//! call reads the same snapshot.

use crate::utils::errors::{InterceptError, Result};
use hyper::Uri;
use serde::Deserialize;
use tracing::debug;

/// Production relay address, used when `BLOOM_RELAY_URL` is unset.
pub const DEFAULT_RELAY_URL: &str = "https://relay.bloom.dev";

/// Local relay address, used when `BLOOM_DEBUG` is set and no URL is given.
pub const DEBUG_RELAY_URL: &str = "http://localhost:8000";

/// Raw environment view, prior to validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSettings {
    /// `BLOOM_API_KEY`: caller credential, `<prefix>_<org>_agent_<id>`.
    pub api_key: Option<String>,

    /// `BLOOM_RELAY_URL`: relay base address (scheme + host + port).
    pub relay_url: Option<String>,

    /// `BLOOM_SERVICE_NAME`: declared service override.
    pub service_name: Option<String>,

    /// `BLOOM_DEBUG`: debug flag ("1", "true", "yes").
    pub debug: Option<String>,
}

/// Caller identity derived from the credential string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Organization key segment of the credential.
    pub org_key: String,

    /// Agent id segment of the credential.
    pub agent_id: String,
}

/// Immutable relay configuration, one per process.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Relay base address (scheme + authority, no path).
    pub relay: Uri,

    /// Lowercased relay hostname, used for loop prevention.
    pub relay_host: String,

    /// Opaque bearer credential forwarded to the relay.
    pub credential: String,

    /// Identity parsed out of the credential.
    pub identity: CallerIdentity,

    /// Declared service override; always wins over classification.
    pub service_override: Option<String>,

    /// Debug-logging flag.
    pub debug: bool,
}

impl RelayConfig {
    /// Load configuration from `BLOOM_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let raw: RawSettings = config::Config::builder()
            .add_source(config::Environment::with_prefix("BLOOM"))
            .build()
            .map_err(|e| InterceptError::config(format!("Environment read error: {}", e)))?
            .try_deserialize()
            .map_err(|e| InterceptError::config(format!("Environment parse error: {}", e)))?;

        Self::from_settings(raw)
    }

    /// Build and validate configuration from a raw settings view.
    pub fn from_settings(raw: RawSettings) -> Result<Self> {
        let credential = raw
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| InterceptError::config("BLOOM_API_KEY is not set"))?;

        let identity = parse_credential(&credential)?;
        let debug = raw
            .debug
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let relay_url = raw.relay_url.unwrap_or_else(|| {
            if debug {
                DEBUG_RELAY_URL.to_string()
            } else {
                DEFAULT_RELAY_URL.to_string()
            }
        });

        let relay: Uri = relay_url
            .parse()
            .map_err(|e| InterceptError::config(format!("Invalid relay URL '{}': {}", relay_url, e)))?;

        if relay.scheme().is_none() {
            return Err(InterceptError::config(format!(
                "Relay URL '{}' has no scheme",
                relay_url
            )));
        }

        let relay_host = relay
            .host()
            .ok_or_else(|| {
                InterceptError::config(format!("Relay URL '{}' has no host", relay_url))
            })?
            .to_lowercase();

        let service_override = raw
            .service_name
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        debug!(
            "Relay config loaded: relay={}, agent={}, override={:?}",
            relay_host, identity.agent_id, service_override
        );

        Ok(Self {
            relay,
            relay_host,
            credential,
            identity,
            service_override,
            debug,
        })
    }
}

/// Parse a credential of the form `<prefix>_<org-key>_agent_<agent-id>`.
///
/// The org key may itself contain underscores; the last `_agent_` marker
/// separates it from the agent id.
pub fn parse_credential(raw: &str) -> Result<CallerIdentity> {
    let (_prefix, rest) = raw.split_once('_').ok_or_else(|| malformed(raw))?;

    let (org_key, agent_id) = rest
        .rsplit_once("_agent_")
        .ok_or_else(|| malformed(raw))?;

    if org_key.is_empty() || agent_id.is_empty() {
        return Err(malformed(raw));
    }

    Ok(CallerIdentity {
        org_key: org_key.to_string(),
        agent_id: agent_id.to_string(),
    })
}

fn malformed(raw: &str) -> InterceptError {
    InterceptError::credential(format!(
        "'{}' does not match <prefix>_<org>_agent_<id>",
        raw
    ))
}
