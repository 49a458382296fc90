// src/interception/descriptor.rs
//! Canonical outbound-call descriptors
//!
//! Every calling convention the wrapped client accepts collapses into one
//! normalized [`OutboundCall`] before any policy or rewrite logic runs.
//! The rewrite produces a [`RewrittenCall`]: the same call re-addressed to
//! the relay, with credential headers swapped. Request bodies never pass
//! through here; they are moved byte-for-byte by the engine.

use crate::utils::config::RelayConfig;
use crate::utils::errors::{InterceptError, Result};
use hyper::header::{HeaderMap, HeaderValue, AUTHORIZATION, HOST};
use hyper::http::request::Parts;
use hyper::http::uri::Authority;
use hyper::{Method, Uri};

/// Injected caller-identity header.
pub const X_AGENT_ID: &str = "x-agent-id";

/// Injected provenance header carrying the original destination.
pub const X_ORIGINAL_HOST: &str = "x-original-host";

/// Injected service-identifier header.
pub const X_SERVICE_NAME: &str = "x-service-name";

/// Service-identifier alias read by MCP-aware relays.
pub const X_MCP_SERVICE: &str = "x-mcp-service";

/// Credential header stripped from the original call.
pub const X_API_KEY: &str = "x-api-key";

/// Normalized view of one outbound call.
#[derive(Debug, Clone)]
pub struct OutboundCall {
    /// URI scheme ("http" or "https").
    pub scheme: String,

    /// Destination hostname, lowercased.
    pub host: String,

    /// Explicit destination port, if any.
    pub port: Option<u16>,

    /// Path plus query, exactly as the caller supplied it (may be empty).
    pub path_and_query: String,

    /// Request method.
    pub method: Method,

    /// Request headers (keys case-insensitive).
    pub headers: HeaderMap,
}

impl OutboundCall {
    /// Normalize from a request head. Returns `None` when no destination
    /// host can be derived from either the URI or the `Host` header.
    pub fn from_parts(parts: &Parts) -> Option<Self> {
        // The Host header is authority-form: splitting on ':' would mangle
        // bracketed IPv6 literals, so parse it properly.
        let host = match parts.uri.host() {
            Some(h) => h.to_lowercase(),
            None => parts
                .headers
                .get(HOST)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.parse::<Authority>().ok())?
                .host()
                .to_lowercase(),
        };

        Some(Self {
            scheme: parts.uri.scheme_str().unwrap_or("http").to_string(),
            host,
            port: parts.uri.port_u16(),
            path_and_query: parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_default(),
            method: parts.method.clone(),
            headers: parts.headers.clone(),
        })
    }

    /// Normalize from a bare address string (GET, no headers).
    pub fn from_url(url: &str) -> Option<Self> {
        let uri: Uri = url.parse().ok()?;
        let host = uri.host()?.to_lowercase();

        Some(Self {
            scheme: uri.scheme_str().unwrap_or("http").to_string(),
            host,
            port: uri.port_u16(),
            path_and_query: uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_default(),
            method: Method::GET,
            headers: HeaderMap::new(),
        })
    }
}

/// The relay-directed form of an outbound call.
#[derive(Debug, Clone)]
pub struct RewrittenCall {
    /// Relay URI, `<relay>/proxy/<service><path>[?query]`.
    pub uri: Uri,

    /// Adjusted headers: credential headers stripped, relay headers added.
    pub headers: HeaderMap,

    /// Service identifier the call was attributed to.
    pub service: String,
}

/// Rewrite an outbound call for relay delivery.
///
/// Invariant: the result never carries the original `Authorization` or
/// `X-API-Key` material, in any casing.
pub fn rewrite(call: &OutboundCall, service: &str, config: &RelayConfig) -> Result<RewrittenCall> {
    let (path, query) = match call.path_and_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (call.path_and_query.as_str(), None),
    };

    // The proxied path always starts with a slash after the service token
    let mut proxy_path = format!("/proxy/{}", service);
    if path.is_empty() {
        proxy_path.push('/');
    } else {
        if !path.starts_with('/') {
            proxy_path.push('/');
        }
        proxy_path.push_str(path);
    }
    if let Some(q) = query {
        proxy_path.push('?');
        proxy_path.push_str(q);
    }

    let authority = config
        .relay
        .authority()
        .map(|a| a.as_str())
        .unwrap_or(config.relay_host.as_str());

    let uri = Uri::builder()
        .scheme(config.relay.scheme_str().unwrap_or("http"))
        .authority(authority)
        .path_and_query(proxy_path)
        .build()
        .map_err(|e| InterceptError::rewrite(format!("Relay URI build error: {}", e)))?;

    let mut headers = call.headers.clone();
    headers.remove(AUTHORIZATION);
    headers.remove(X_API_KEY);
    // Let the client derive Host from the relay authority
    headers.remove(HOST);

    let bearer = HeaderValue::from_str(&format!("Bearer {}", config.credential))
        .map_err(|e| InterceptError::rewrite(format!("Credential header error: {}", e)))?;
    headers.insert(AUTHORIZATION, bearer);

    headers.insert(
        X_AGENT_ID,
        header_value(&config.identity.agent_id, "agent id")?,
    );
    headers.insert(X_ORIGINAL_HOST, header_value(&call.host, "original host")?);
    headers.insert(X_SERVICE_NAME, header_value(service, "service name")?);
    headers.insert(X_MCP_SERVICE, header_value(service, "service name")?);

    Ok(RewrittenCall {
        uri,
        headers,
        service: service.to_string(),
    })
}

fn header_value(value: &str, what: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| InterceptError::rewrite(format!("Invalid {} '{}': {}", what, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::{RawSettings, RelayConfig};
    use hyper::header::HeaderName;
    use hyper::Request;

    fn test_config() -> RelayConfig {
        RelayConfig::from_settings(RawSettings {
            api_key: Some("bloom_org_abc_agent_123".to_string()),
            relay_url: Some("http://localhost:8000".to_string()),
            service_name: None,
            debug: None,
        })
        .unwrap()
    }

    fn call(url: &str) -> OutboundCall {
        OutboundCall::from_url(url).unwrap()
    }

    #[test]
    fn test_from_parts() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("https://API.GitHub.com/repos/x/y?per_page=5")
            .header("content-type", "application/json")
            .body(())
            .unwrap();
        let (parts, _) = req.into_parts();

        let call = OutboundCall::from_parts(&parts).unwrap();
        assert_eq!(call.scheme, "https");
        assert_eq!(call.host, "api.github.com");
        assert_eq!(call.port, None);
        assert_eq!(call.path_and_query, "/repos/x/y?per_page=5");
        assert_eq!(call.method, Method::POST);
        assert!(call.headers.contains_key("content-type"));
    }

    #[test]
    fn test_from_parts_host_header_fallback() {
        let req = Request::builder()
            .uri("/v1/models")
            .header("host", "api.openai.com:443")
            .body(())
            .unwrap();
        let (parts, _) = req.into_parts();

        let call = OutboundCall::from_parts(&parts).unwrap();
        assert_eq!(call.host, "api.openai.com");
        assert_eq!(call.path_and_query, "/v1/models");
    }

    #[test]
    fn test_from_parts_bracketed_ipv6_host_header() {
        let req = Request::builder()
            .uri("/metrics")
            .header("host", "[::1]:8080")
            .body(())
            .unwrap();
        let (parts, _) = req.into_parts();

        // The bracketed literal survives intact; the port does not
        let call = OutboundCall::from_parts(&parts).unwrap();
        assert_eq!(call.host, "[::1]");
    }

    #[test]
    fn test_from_url() {
        let call = OutboundCall::from_url("https://api.openai.com:8443/v1/models").unwrap();
        assert_eq!(call.scheme, "https");
        assert_eq!(call.host, "api.openai.com");
        assert_eq!(call.port, Some(8443));
        assert_eq!(call.method, Method::GET);

        assert!(OutboundCall::from_url("not a url").is_none());
        assert!(OutboundCall::from_url("/path/only").is_none());
    }

    #[test]
    fn test_rewrite_path_forms() {
        let config = test_config();

        let mut c = call("https://api.github.com/repos/user/repo");
        let r = rewrite(&c, "github", &config).unwrap();
        assert_eq!(r.uri.path(), "/proxy/github/repos/user/repo");

        c.path_and_query = String::new();
        let r = rewrite(&c, "github", &config).unwrap();
        assert_eq!(r.uri.path(), "/proxy/github/");

        c.path_and_query = "v1/models".to_string();
        let r = rewrite(&c, "openai", &config).unwrap();
        assert_eq!(r.uri.path(), "/proxy/openai/v1/models");
    }

    #[test]
    fn test_rewrite_preserves_query() {
        let config = test_config();
        let c = call("https://api.github.com/search?q=rust&page=2");
        let r = rewrite(&c, "github", &config).unwrap();
        assert_eq!(r.uri.path_and_query().unwrap().as_str(), "/proxy/github/search?q=rust&page=2");
    }

    #[test]
    fn test_rewrite_targets_relay() {
        let config = test_config();
        let r = rewrite(&call("https://api.github.com/repos/x/y"), "github", &config).unwrap();
        assert_eq!(r.uri.scheme_str(), Some("http"));
        assert_eq!(r.uri.host(), Some("localhost"));
        assert_eq!(r.uri.port_u16(), Some(8000));
    }

    #[test]
    fn test_rewrite_strips_credentials() {
        let config = test_config();
        let mut c = call("https://api.github.com/repos/x/y");
        c.headers
            .insert(AUTHORIZATION, HeaderValue::from_static("token original"));
        c.headers.insert(
            HeaderName::from_bytes(b"X-API-Key").unwrap(),
            HeaderValue::from_static("sk-original"),
        );

        let r = rewrite(&c, "github", &config).unwrap();
        assert_eq!(
            r.headers.get(AUTHORIZATION).unwrap(),
            "Bearer bloom_org_abc_agent_123"
        );
        assert!(r.headers.get(X_API_KEY).is_none());
        for value in r.headers.values() {
            assert_ne!(value, "token original");
            assert_ne!(value, "sk-original");
        }
    }

    #[test]
    fn test_rewrite_injects_relay_headers() {
        let config = test_config();
        let r = rewrite(&call("https://api.github.com/repos/x/y"), "github", &config).unwrap();

        assert_eq!(r.headers.get(X_AGENT_ID).unwrap(), "123");
        assert_eq!(r.headers.get(X_ORIGINAL_HOST).unwrap(), "api.github.com");
        assert_eq!(r.headers.get(X_SERVICE_NAME).unwrap(), "github");
        assert_eq!(r.headers.get(X_MCP_SERVICE).unwrap(), "github");
        assert_eq!(r.service, "github");
    }

    #[test]
    fn test_rewrite_keeps_unrelated_headers() {
        let config = test_config();
        let mut c = call("https://api.github.com/repos/x/y");
        c.headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("application/json"),
        );

        let r = rewrite(&c, "github", &config).unwrap();
        assert_eq!(r.headers.get("content-type").unwrap(), "application/json");
    }
}
