// src/interception/mod.rs
//! Outbound-request interception layer
//!
//! Everything a monitored process sends transits this layer exactly once:
//!
//! - **Classifier**: hostname to service-identifier mapping
//! - **Policy**: relay-loop, locality, and infrastructure bypass rules
//! - **Descriptor**: canonical call normalization and relay rewrite
//! - **Engine**: per-call decision plus request-head rebuild
//! - **Layer**: tower middleware mounting the engine on an HTTP client
//!
//! # Architecture
//!
//! ```text
//! Caller (unmodified)
//!     │
//!     └─ Request → InterceptService ─ bypass ──────────→ original destination
//!                        │
//!                        └─ rewrite → relay /proxy/<service><path>
//! ```

pub mod classifier;
pub mod descriptor;
pub mod engine;
pub mod layer;
pub mod policy;

// Re-export commonly used types
pub use classifier::classify;
pub use descriptor::{OutboundCall, RewrittenCall};
pub use engine::{install, Decision, InterceptionEngine};
pub use layer::{InterceptLayer, InterceptService};
pub use policy::BypassReason;
