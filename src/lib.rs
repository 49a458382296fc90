// src/lib.rs
//! Bloom Interception Library
//!
//! Transparent outbound-request interception for monitored agent
//! processes: every HTTP(S) call is either forwarded untouched or
//! rewritten toward the trusted Bloom relay, with the caller none the
//! wiser. The orchestrator that spawns the process supplies `BLOOM_*`
//! environment variables; this crate does the rest.
//!
//! # Architecture
//!
//! The crate is structured into these modules:
//!
//! - **interception**: classifier, bypass policy, rewrite, engine, layer
//! - **observability**: stderr tracing setup
//! - **utils**: relay configuration and error types
//!
//! # Usage
//!
//! ```no_run
//! use bloom_intercept::{install, InterceptLayer};
//! use tower::Layer;
//!
//! bloom_intercept::observability::init_tracing(false);
//! let engine = install();
//!
//! let client = hyper_util::client::legacy::Client::builder(
//!     hyper_util::rt::TokioExecutor::new(),
//! )
//! .build_http::<http_body_util::Full<bytes::Bytes>>();
//!
//! // Every call through `client` now transits the engine
//! let client = InterceptLayer::new(engine).layer(client);
//! # let _ = client;
//! ```

// Public module exports
pub mod interception;
pub mod observability;
pub mod utils;

// Re-export commonly used types
pub use interception::engine::{install, Decision, InterceptionEngine};
pub use interception::layer::{InterceptLayer, InterceptService};
pub use interception::policy::BypassReason;
pub use utils::config::{CallerIdentity, RelayConfig};
pub use utils::errors::{InterceptError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
