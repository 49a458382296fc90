// src/interception/policy.rs
//! Bypass policy for outbound calls
//!
//! Decides which destinations must never be redirected to the relay:
//! the relay itself (loop prevention), local and private-network hosts,
//! and package-registry / CDN infrastructure. These checks run before
//! service classification; classification has no veto over them.

use std::net::{Ipv4Addr, Ipv6Addr};

/// Package-registry and CDN domains whose traffic must reach its real
/// destination unmodified. Matched by domain suffix.
const INFRA_ALLOWLIST: &[&str] = &[
    "registry.npmjs.org",
    "registry.yarnpkg.com",
    "nodejs.org",
    "pypi.org",
    "pythonhosted.org",
    "crates.io",
    "jsdelivr.net",
    "unpkg.com",
    "githubusercontent.com",
];

/// Why a call was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassReason {
    /// Interception is disabled for this process (no usable config).
    Disabled,

    /// Destination is the relay itself.
    RelayLoop,

    /// Loopback or private-range destination.
    LocalDestination,

    /// Package-registry / CDN infrastructure.
    InfraAllowlist,

    /// No service identifier from the table, heuristic, or override.
    Unclassified,
}

/// Apply bypass rules 1-3 in order. Returns `None` when the destination
/// is eligible for classification.
pub fn bypass_reason(hostname: &str, relay_host: &str) -> Option<BypassReason> {
    let host = hostname.trim().to_lowercase();

    if !relay_host.is_empty() && host.contains(relay_host) {
        return Some(BypassReason::RelayLoop);
    }

    if is_local_destination(&host) {
        return Some(BypassReason::LocalDestination);
    }

    if is_infrastructure(&host) {
        return Some(BypassReason::InfraAllowlist);
    }

    None
}

/// Loopback names and addresses, plus RFC 1918 private ranges.
pub fn is_local_destination(host: &str) -> bool {
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    // Bracketed IPv6 literals appear in authority form
    let bare = host.trim_start_matches('[').trim_end_matches(']');

    if let Ok(v4) = bare.parse::<Ipv4Addr>() {
        return v4.is_loopback() || v4.is_private();
    }

    if let Ok(v6) = bare.parse::<Ipv6Addr>() {
        return v6.is_loopback();
    }

    false
}

/// Suffix match against the registry/CDN allowlist, allocation-free.
pub fn is_infrastructure(host: &str) -> bool {
    INFRA_ALLOWLIST.iter().any(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .map_or(false, |prefix| prefix.ends_with('.'))
    })
}
