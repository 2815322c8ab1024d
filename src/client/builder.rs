// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pipeline assembly.
//!
//! Every [`PipelineFilter`] receives the in-progress [`PipelineBuilder`] and
//! a [`FilterNext`] continuation standing for all filters registered after
//! it, followed by the client's own registration. A filter that wants to
//! decorate runs `next` first and appends afterwards, which puts its stage
//! after everything the rest of the chain added.

use super::{Interceptor, Pipeline, Transport};
use crate::config::TracingConfig;
use http::Extensions;
use std::fmt;
use std::sync::Arc;

/// Shared services visible to filters while pipelines are assembled.
#[derive(Debug, Default)]
pub struct PipelineContext {
    services: Extensions,
}

impl PipelineContext {
    pub(crate) fn new(services: Extensions) -> Self {
        Self { services }
    }

    /// Get a service registered on the registry builder.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.services.get::<T>()
    }
}

/// A pipeline being assembled.
pub struct PipelineBuilder {
    name: String,
    transport: Arc<dyn Transport>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    tracing: Option<TracingConfig>,
}

impl PipelineBuilder {
    pub fn new(name: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            name: name.into(),
            transport,
            interceptors: Vec::new(),
            tracing: None,
        }
    }

    /// Name of the client this pipeline belongs to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tracing configuration registered explicitly for this client.
    #[must_use]
    pub fn tracing(&self) -> Option<&TracingConfig> {
        self.tracing.as_ref()
    }

    pub fn set_tracing(&mut self, config: TracingConfig) {
        self.tracing = Some(config);
    }

    /// Whether tracing was explicitly turned off for this client.
    #[must_use]
    pub fn is_tracing_disabled(&self) -> bool {
        self.tracing.as_ref().is_some_and(|c| !c.enabled)
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) {
        self.transport = transport;
    }

    /// Interceptors added so far, outermost first.
    #[must_use]
    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }

    /// Append an interceptor; it becomes the stage closest to the transport.
    pub fn push(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    /// Freeze the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline::new(&self.name, self.interceptors, self.transport)
    }
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("name", &self.name)
            .field("interceptors", &self.interceptors.len())
            .field("tracing", &self.tracing)
            .finish_non_exhaustive()
    }
}

/// One step of pipeline assembly, applied to every pipeline a registry builds.
pub trait PipelineFilter: Send + Sync + 'static {
    fn configure(
        &self,
        context: &PipelineContext,
        builder: &mut PipelineBuilder,
        next: FilterNext<'_>,
    );
}

/// The remaining assembly steps after the current filter.
pub struct FilterNext<'a> {
    filters: &'a [Arc<dyn PipelineFilter>],
    terminal: &'a dyn Fn(&mut PipelineBuilder),
}

impl<'a> FilterNext<'a> {
    pub(crate) fn new(
        filters: &'a [Arc<dyn PipelineFilter>],
        terminal: &'a dyn Fn(&mut PipelineBuilder),
    ) -> Self {
        Self { filters, terminal }
    }

    /// Run the remaining filters, then the client's own registration.
    pub fn run(mut self, context: &PipelineContext, builder: &mut PipelineBuilder) {
        if let Some((current, rest)) = self.filters.split_first() {
            self.filters = rest;
            current.configure(context, builder, self);
        } else {
            (self.terminal)(builder);
        }
    }
}
