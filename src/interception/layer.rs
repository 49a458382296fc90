// src/interception/layer.rs
//! Tower middleware mounting the engine in front of an HTTP client
//!
//! [`InterceptLayer`] is the single seam through which every outbound call
//! transits: wrap the process's client service once at construction time
//! and both pass-through and relay-directed requests keep the caller's own
//! client, body type, completion future, and error channel. Relay errors
//! therefore reach the caller exactly as a server error would; nothing is
//! retried or redirected back to the original destination.

use crate::interception::engine::InterceptionEngine;
use futures::future::BoxFuture;
use hyper::Request;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{BoxError, Layer, Service};

/// Layer that installs the interception engine around a client service.
#[derive(Clone)]
pub struct InterceptLayer {
    engine: Arc<InterceptionEngine>,
}

impl InterceptLayer {
    /// Create a layer around an engine handle.
    pub fn new(engine: Arc<InterceptionEngine>) -> Self {
        Self { engine }
    }

    /// Create a layer around the process-wide installed engine.
    pub fn installed() -> Self {
        Self::new(crate::interception::engine::install())
    }
}

impl<S> Layer<S> for InterceptLayer {
    type Service = InterceptService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InterceptService {
            inner,
            engine: Arc::clone(&self.engine),
        }
    }
}

/// Client service with the interception engine in front.
#[derive(Clone)]
pub struct InterceptService<S> {
    inner: S,
    engine: Arc<InterceptionEngine>,
}

impl<S, B> Service<Request<B>> for InterceptService<S>
where
    S: Service<Request<B>>,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<S::Response, BoxError>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        match self.engine.prepare(req) {
            Ok(prepared) => {
                let fut = self.inner.call(prepared);
                Box::pin(async move { fut.await.map_err(Into::into) })
            }
            // Rewrite failures surface through the call's own error channel
            Err(e) => Box::pin(async move { Err(e.into()) }),
        }
    }
}
