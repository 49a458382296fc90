// src/interception/classifier.rs
//! Hostname to service-identifier classification
//!
//! Maps a destination hostname to the short token naming the logical API
//! family it belongs to ("github", "openai", ...). Well-known hosts come
//! from a fixed table; anything else falls back to a label heuristic.
//! Pure and lock-free, so any number of in-flight calls may classify
//! concurrently.

/// Known API hosts, matched by substring against the lowercased hostname.
/// First match wins, so more specific patterns go first.
const SERVICE_TABLE: &[(&str, &str)] = &[
    ("api.github.com", "github"),
    ("api.openai.com", "openai"),
    ("api.anthropic.com", "anthropic"),
    ("api.stripe.com", "stripe"),
    ("api.cohere", "cohere"),
    ("serper.dev", "serper"),
    ("generativelanguage.googleapis.com", "google"),
    ("huggingface.co", "huggingface"),
];

/// Leading labels that name an endpoint rather than a service.
const GENERIC_PREFIXES: &[&str] = &["api", "www"];

/// Classify a hostname into a service identifier.
///
/// Returns `None` for empty or malformed hostnames, or when the fallback
/// heuristic cannot produce a usable label. The declared-service override
/// is applied above this layer, in the engine.
pub fn classify(hostname: &str) -> Option<String> {
    let host = hostname.trim().to_lowercase();
    if host.is_empty() {
        return None;
    }

    for (pattern, service) in SERVICE_TABLE {
        if host.contains(pattern) {
            return Some((*service).to_string());
        }
    }

    // Fallback: take the leading label, skipping a generic prefix like
    // "api." so that api.unknown.com classifies as "unknown".
    let mut labels = host.split('.').filter(|l| !l.is_empty());
    let first = labels.next()?;

    let label = if GENERIC_PREFIXES.contains(&first) {
        labels.next()?
    } else {
        first
    };

    // An IP literal is not a service name
    if label.is_empty() || label.chars().all(|c| c.is_ascii_digit()) {
        None
    } else {
        Some(label.to_string())
    }
}
