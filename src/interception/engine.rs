// src/interception/engine.rs
//! Interception engine
//!
//! The explicit per-process context behind every interception decision.
//! Construction happens once, from the environment, via [`install`]; the
//! engine then answers `decide`/`should_proxy` for each outbound call and
//! rebuilds request heads for relay delivery with [`InterceptionEngine::prepare`].
//!
//! An engine with no usable configuration is *disabled*: every call passes
//! through untouched. Installation never panics and never kills the host
//! process.

use crate::interception::classifier::classify;
use crate::interception::descriptor::{rewrite, OutboundCall, RewrittenCall};
use crate::interception::policy::{bypass_reason, BypassReason};
use crate::utils::config::{CallerIdentity, RelayConfig};
use crate::utils::errors::{InterceptError, Result};
use hyper::Request;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, info, warn};

static ENGINE: OnceCell<Arc<InterceptionEngine>> = OnceCell::new();

/// Install the process-wide engine. Idempotent: the first call constructs
/// the engine from the environment, every later call returns the same one.
pub fn install() -> Arc<InterceptionEngine> {
    ENGINE
        .get_or_init(|| Arc::new(InterceptionEngine::from_env()))
        .clone()
}

/// Per-call routing decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Rewrite toward the relay, attributed to this service identifier.
    Proxy(String),

    /// Forward unmodified.
    Bypass(BypassReason),
}

/// Outbound-call interception engine.
pub struct InterceptionEngine {
    /// `None` disables interception for the process lifetime.
    config: Option<Arc<RelayConfig>>,
}

impl InterceptionEngine {
    /// Build from `BLOOM_*` environment variables. Configuration problems
    /// disable interception and emit a diagnostic; they never propagate.
    pub fn from_env() -> Self {
        match RelayConfig::from_env() {
            Ok(config) => {
                info!(
                    "Interception enabled: relay={}, agent={}",
                    config.relay_host, config.identity.agent_id
                );
                Self::new(config)
            }
            Err(e) => {
                warn!("Interception disabled: {}", e);
                Self::disabled()
            }
        }
    }

    /// Build an active engine from an explicit configuration.
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config: Some(Arc::new(config)),
        }
    }

    /// Build a pass-through engine.
    pub fn disabled() -> Self {
        Self { config: None }
    }

    /// Whether calls can be intercepted at all.
    pub fn is_active(&self) -> bool {
        self.config.is_some()
    }

    /// Caller identity, when configured.
    pub fn identity(&self) -> Option<&CallerIdentity> {
        self.config.as_deref().map(|c| &c.identity)
    }

    /// Decide whether a call is relayed and as which service.
    ///
    /// Ordering matters: loop prevention and locality run before
    /// classification, which has no veto over infrastructure traffic.
    pub fn decide(&self, call: &OutboundCall) -> Decision {
        let Some(config) = self.config.as_deref() else {
            return Decision::Bypass(BypassReason::Disabled);
        };

        if let Some(reason) = bypass_reason(&call.host, &config.relay_host) {
            return Decision::Bypass(reason);
        }

        match config
            .service_override
            .clone()
            .or_else(|| classify(&call.host))
        {
            Some(service) => Decision::Proxy(service),
            None => Decision::Bypass(BypassReason::Unclassified),
        }
    }

    /// Boolean view of [`Self::decide`].
    pub fn should_proxy(&self, call: &OutboundCall) -> bool {
        matches!(self.decide(call), Decision::Proxy(_))
    }

    /// Rewrite a call for relay delivery.
    pub fn rewrite(&self, call: &OutboundCall, service: &str) -> Result<RewrittenCall> {
        let config = self
            .config
            .as_deref()
            .ok_or_else(|| InterceptError::rewrite("Interception is disabled"))?;
        rewrite(call, service, config)
    }

    /// Normalize, decide, and rewrite one request head. The body is moved
    /// through untouched in either direction.
    pub fn prepare<B>(&self, req: Request<B>) -> Result<Request<B>> {
        let (mut parts, body) = req.into_parts();

        let Some(call) = OutboundCall::from_parts(&parts) else {
            debug!("No destination host on {}, passing through", parts.uri);
            return Ok(Request::from_parts(parts, body));
        };

        match self.decide(&call) {
            Decision::Bypass(reason) => {
                debug!("Bypassing {} ({:?})", call.host, reason);
                Ok(Request::from_parts(parts, body))
            }
            Decision::Proxy(service) => {
                let rewritten = self.rewrite(&call, &service)?;
                debug!(
                    "Relaying {} {} as service '{}' via {}",
                    call.method, call.host, service, rewritten.uri
                );
                parts.uri = rewritten.uri;
                parts.headers = rewritten.headers;
                Ok(Request::from_parts(parts, body))
            }
        }
    }
}
