// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client pipelines: an ordered chain of interceptors in front of a transport.
//!
//! ```text
//! Pipeline::send
//!     → interceptor[0] → interceptor[1] → … → Transport::send
//! ```
//!
//! Pipelines are assembled by a [`PipelineRegistry`], which runs every
//! registered [`PipelineFilter`] over a [`PipelineBuilder`] before freezing
//! the result.

mod builder;
mod registry;


pub use builder::{FilterNext, PipelineBuilder, PipelineContext, PipelineFilter};
pub use registry::{ClientRegistration, PipelineRegistry, PipelineRegistryBuilder};

use crate::body::Body;
use crate::error::{BoxError, HttpTracingError, Result};
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use http::{Request, Response};
use std::fmt;
use std::sync::Arc;
use tower::{Service, ServiceExt};

/// The terminal stage of a pipeline, the one that actually talks to the network.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>>;
}

/// A pipeline stage that observes a call and hands it on through [`Next`].
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    async fn intercept(&self, request: Request<Body>, next: Next<'_>) -> Result<Response<Body>>;
}

/// The remainder of the pipeline after the current interceptor.
#[derive(Clone)]
pub struct Next<'a> {
    transport: &'a dyn Transport,
    interceptors: &'a [Arc<dyn Interceptor>],
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        transport: &'a dyn Transport,
        interceptors: &'a [Arc<dyn Interceptor>],
    ) -> Self {
        Self {
            transport,
            interceptors,
        }
    }

    /// Forward the request to the next interceptor, or to the transport once
    /// the chain is exhausted.
    pub fn run(mut self, request: Request<Body>) -> BoxFuture<'a, Result<Response<Body>>> {
        if let Some((current, rest)) = self.interceptors.split_first() {
            self.interceptors = rest;
            current.intercept(request, self)
        } else {
            self.transport.send(request)
        }
    }
}

/// Adapts a `tower` service into a [`Transport`].
///
/// The service is cloned for every call, so it should be cheap to clone
/// (most connection pools are an `Arc` inside).
#[derive(Debug, Clone)]
pub struct ServiceTransport<S> {
    inner: S,
}

impl<S> ServiceTransport<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S> Transport for ServiceTransport<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
{
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>> {
        self.inner
            .clone()
            .oneshot(request)
            .await
            .map_err(HttpTracingError::transport)
    }
}

/// An assembled, immutable client pipeline.
///
/// Cloning is cheap and clones share the same interceptor instances, so a
/// pipeline is built once per client and then used from any number of tasks.
#[derive(Clone)]
pub struct Pipeline {
    name: Arc<str>,
    interceptors: Arc<[Arc<dyn Interceptor>]>,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    pub(crate) fn new(
        name: &str,
        interceptors: Vec<Arc<dyn Interceptor>>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            name: Arc::from(name),
            interceptors: interceptors.into(),
            transport,
        }
    }

    /// The client name this pipeline was built for.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of interceptors in front of the transport.
    #[must_use]
    pub fn interceptor_count(&self) -> usize {
        self.interceptors.len()
    }

    /// Send a request through every interceptor and the transport.
    pub async fn send(&self, request: Request<Body>) -> Result<Response<Body>> {
        Next::new(self.transport.as_ref(), &self.interceptors)
            .run(request)
            .await
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}
