// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named client registrations and the filters applied to all of them.
//!
//! # Example
//!
//! ```
//! use http::{Request, Response};
//! use http_tracing::body::Body;
//! use http_tracing::client::{ClientRegistration, PipelineRegistry, ServiceTransport};
//! use http_tracing::runtime::TracingLoggerFactory;
//!
//! let transport = ServiceTransport::new(tower::service_fn(|_req: Request<Body>| async {
//!     Ok::<_, std::convert::Infallible>(Response::new(Body::from("pong")))
//! }));
//!
//! let registry = PipelineRegistry::builder()
//!     .logger_factory(TracingLoggerFactory)
//!     .add_tracing_to_all_clients()
//!     .client(ClientRegistration::new("ping").with_transport(transport))
//!     .build()
//!     .unwrap();
//!
//! let pipeline = registry.pipeline("ping").unwrap();
//! assert_eq!(pipeline.interceptor_count(), 1);
//! ```

use super::builder::{FilterNext, PipelineBuilder, PipelineContext, PipelineFilter};
use super::{Interceptor, Pipeline, Transport};
use crate::config::TracingConfig;
use crate::error::{HttpTracingError, Result};
use crate::runtime::category::type_simple_name;
use crate::runtime::filter::{tracing_interceptor, ConfigureTracing, TracingFilter};
use crate::runtime::{LoggerFactory, TRACE_TARGET};
use http::Extensions;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Registration of one named client.
pub struct ClientRegistration {
    name: String,
    transport: Option<Arc<dyn Transport>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    tracing: Option<TracingConfig>,
}

impl ClientRegistration {
    /// Register a client under `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: None,
            interceptors: Vec::new(),
            tracing: None,
        }
    }

    /// Register a typed client, named after the type.
    #[must_use]
    pub fn typed<T: ?Sized>() -> Self {
        Self::new(type_simple_name::<T>())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the transport of this client.
    #[must_use]
    pub fn with_transport(self, transport: impl Transport) -> Self {
        self.with_shared_transport(Arc::new(transport))
    }

    /// Set a transport shared with other clients.
    #[must_use]
    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Add an interceptor of this client.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: impl Interceptor) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Trace this client explicitly.
    ///
    /// A disabled configuration also keeps the global tracing filter away
    /// from this client.
    #[must_use]
    pub fn with_tracing(mut self, config: TracingConfig) -> Self {
        self.tracing = Some(config);
        self
    }

    fn apply(&self, builder: &mut PipelineBuilder, logger_factory: Option<&dyn LoggerFactory>) {
        for interceptor in &self.interceptors {
            builder.push(interceptor.clone());
        }

        if let (Some(config), Some(factory)) = (&self.tracing, logger_factory) {
            if config.enabled {
                builder.push(tracing_interceptor(factory, &self.name, config));
            }
        }
    }
}

impl fmt::Debug for ClientRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRegistration")
            .field("name", &self.name)
            .field("has_transport", &self.transport.is_some())
            .field("interceptors", &self.interceptors.len())
            .field("tracing", &self.tracing)
            .finish()
    }
}

enum FilterSpec {
    Custom(Arc<dyn PipelineFilter>),
    Tracing(Option<ConfigureTracing>),
}

/// Builder for [`PipelineRegistry`].
#[derive(Default)]
pub struct PipelineRegistryBuilder {
    clients: Vec<ClientRegistration>,
    filters: Vec<FilterSpec>,
    default_transport: Option<Arc<dyn Transport>>,
    logger_factory: Option<Arc<dyn LoggerFactory>>,
    services: Extensions,
}

impl PipelineRegistryBuilder {
    /// Set the factory used to create trace loggers.
    #[must_use]
    pub fn logger_factory(mut self, factory: impl LoggerFactory + 'static) -> Self {
        self.logger_factory = Some(Arc::new(factory));
        self
    }

    /// Set the transport used by clients that did not register their own,
    /// including names that were never registered.
    #[must_use]
    pub fn default_transport(mut self, transport: impl Transport) -> Self {
        self.default_transport = Some(Arc::new(transport));
        self
    }

    /// Register a client.
    #[must_use]
    pub fn client(mut self, registration: ClientRegistration) -> Self {
        self.clients.push(registration);
        self
    }

    /// Make a service available to filters through [`PipelineContext::get`].
    #[must_use]
    pub fn service<T: Clone + Send + Sync + 'static>(mut self, service: T) -> Self {
        self.services.insert(service);
        self
    }

    /// Add a custom assembly step.
    #[must_use]
    pub fn filter(mut self, filter: impl PipelineFilter) -> Self {
        self.filters.push(FilterSpec::Custom(Arc::new(filter)));
        self
    }

    /// Trace every client with the default configuration.
    #[must_use]
    pub fn add_tracing_to_all_clients(self) -> Self {
        self.push_tracing_filter(None)
    }

    /// Trace every client, asking `configure` for each pipeline's
    /// configuration. Returning `None` selects the default configuration.
    ///
    /// Only the first tracing filter registered is kept.
    #[must_use]
    pub fn add_tracing_to_all_clients_with<F>(self, configure: F) -> Self
    where
        F: Fn(&PipelineContext, &PipelineBuilder) -> Option<TracingConfig> + Send + Sync + 'static,
    {
        let configure: ConfigureTracing = Arc::new(configure);
        self.push_tracing_filter(Some(configure))
    }

    fn push_tracing_filter(mut self, configure: Option<ConfigureTracing>) -> Self {
        if self.filters.iter().any(|f| matches!(f, FilterSpec::Tracing(_))) {
            debug!(target: TRACE_TARGET, "tracing filter already registered, ignoring");
            return self;
        }
        self.filters.push(FilterSpec::Tracing(configure));
        self
    }

    /// Validate the registrations and build the registry.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a client name is empty or registered
    /// twice, if a client has no transport and there is no default one, or
    /// if tracing is requested without a logger factory.
    pub fn build(self) -> Result<PipelineRegistry> {
        let tracing_requested = self
            .filters
            .iter()
            .any(|f| matches!(f, FilterSpec::Tracing(_)))
            || self
                .clients
                .iter()
                .any(|c| c.tracing.as_ref().is_some_and(|t| t.enabled));

        if tracing_requested && self.logger_factory.is_none() {
            return Err(HttpTracingError::Config(
                "Tracing requires a logger factory".to_string(),
            ));
        }

        let mut clients = HashMap::with_capacity(self.clients.len());
        for registration in self.clients {
            if registration.name.is_empty() {
                return Err(HttpTracingError::Config(
                    "Client name must not be empty".to_string(),
                ));
            }
            if registration.transport.is_none() && self.default_transport.is_none() {
                return Err(HttpTracingError::Config(format!(
                    "No transport registered for client '{}'",
                    registration.name
                )));
            }
            if clients.contains_key(&registration.name) {
                return Err(HttpTracingError::Config(format!(
                    "Client '{}' is registered twice",
                    registration.name
                )));
            }
            clients.insert(registration.name.clone(), registration);
        }

        let filters = self
            .filters
            .into_iter()
            .filter_map(|spec| match spec {
                FilterSpec::Custom(filter) => Some(filter),
                FilterSpec::Tracing(configure) => {
                    self.logger_factory.clone().map(|factory| {
                        Arc::new(TracingFilter::new(factory, configure)) as Arc<dyn PipelineFilter>
                    })
                }
            })
            .collect();

        Ok(PipelineRegistry {
            clients,
            filters,
            default_transport: self.default_transport,
            logger_factory: self.logger_factory,
            context: PipelineContext::new(self.services),
            pipelines: RwLock::new(HashMap::new()),
        })
    }
}

/// Builds client pipelines from registrations and filters.
///
/// Registrations are read-only once built. A client's pipeline is assembled
/// on its first [`pipeline`](Self::pipeline) call and every later call
/// returns a clone sharing the same interceptor instances.
pub struct PipelineRegistry {
    clients: HashMap<String, ClientRegistration>,
    filters: Vec<Arc<dyn PipelineFilter>>,
    default_transport: Option<Arc<dyn Transport>>,
    logger_factory: Option<Arc<dyn LoggerFactory>>,
    context: PipelineContext,
    pipelines: RwLock<HashMap<String, Pipeline>>,
}

impl PipelineRegistry {
    #[must_use]
    pub fn builder() -> PipelineRegistryBuilder {
        PipelineRegistryBuilder::default()
    }

    /// Names of the registered clients.
    #[must_use]
    pub fn client_names(&self) -> Vec<&str> {
        self.clients.keys().map(String::as_str).collect()
    }

    /// Get the pipeline of the client called `name`, assembling it on first use.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the client is unknown and there is
    /// no default transport.
    pub fn pipeline(&self, name: &str) -> Result<Pipeline> {
        if let Some(pipeline) = self
            .pipelines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Ok(pipeline.clone());
        }

        let mut pipelines = self
            .pipelines
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Another caller may have assembled it while we waited for the lock.
        if let Some(pipeline) = pipelines.get(name) {
            return Ok(pipeline.clone());
        }

        let pipeline = self.assemble(name)?;
        pipelines.insert(name.to_string(), pipeline.clone());
        Ok(pipeline)
    }

    fn assemble(&self, name: &str) -> Result<Pipeline> {
        let registration = self.clients.get(name);
        let transport = registration
            .and_then(|r| r.transport.clone())
            .or_else(|| self.default_transport.clone())
            .ok_or_else(|| {
                HttpTracingError::Config(format!("No transport registered for client '{name}'"))
            })?;

        let mut builder = PipelineBuilder::new(name, transport);
        if let Some(config) = registration.and_then(|r| r.tracing.clone()) {
            builder.set_tracing(config);
        }

        let logger_factory = self.logger_factory.as_deref();
        let terminal = |builder: &mut PipelineBuilder| {
            if let Some(registration) = registration {
                registration.apply(builder, logger_factory);
            }
        };
        FilterNext::new(&self.filters, &terminal).run(&self.context, &mut builder);

        debug!(
            target: TRACE_TARGET,
            client = name,
            interceptors = builder.interceptors().len(),
            "pipeline assembled"
        );
        Ok(builder.build())
    }

    /// Assemble the pipeline of a typed client.
    ///
    /// # Errors
    ///
    /// See [`pipeline`](Self::pipeline).
    pub fn typed_pipeline<T: ?Sized>(&self) -> Result<Pipeline> {
        self.pipeline(type_simple_name::<T>())
    }
}

impl fmt::Debug for PipelineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineRegistry")
            .field("clients", &self.clients.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.len())
            .field("has_default_transport", &self.default_transport.is_some())
            .finish_non_exhaustive()
    }
}
