// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pipeline filter adding a [`TracingInterceptor`] to every client.

use crate::client::{FilterNext, Interceptor, PipelineBuilder, PipelineContext, PipelineFilter};
use crate::config::TracingConfig;
use crate::runtime::category::logger_category;
use crate::runtime::interceptor::TracingInterceptor;
use crate::runtime::logging::{LoggerFactory, TRACE_TARGET};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Per-pipeline configuration callback of a [`TracingFilter`].
pub type ConfigureTracing =
    Arc<dyn Fn(&PipelineContext, &PipelineBuilder) -> Option<TracingConfig> + Send + Sync>;

/// Build the tracing interceptor of client `name` from `config`.
pub(crate) fn tracing_interceptor(
    factory: &dyn LoggerFactory,
    name: &str,
    config: &TracingConfig,
) -> Arc<dyn Interceptor> {
    let category = config
        .category_name
        .clone()
        .unwrap_or_else(|| logger_category(name));
    let logger = factory.create_logger(&category);
    Arc::new(TracingInterceptor::from_config(logger, config))
}

/// Traces every pipeline it is applied to.
///
/// The filter decorates: it lets the rest of the assembly run first and then
/// appends its interceptor, so the interceptor sits right in front of the
/// transport and sees the request exactly as it goes out.
pub struct TracingFilter {
    logger_factory: Arc<dyn LoggerFactory>,
    configure: Option<ConfigureTracing>,
}

impl TracingFilter {
    pub fn new(
        logger_factory: Arc<dyn LoggerFactory>,
        configure: Option<ConfigureTracing>,
    ) -> Self {
        Self {
            logger_factory,
            configure,
        }
    }
}

impl fmt::Debug for TracingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingFilter")
            .field("has_configure", &self.configure.is_some())
            .finish_non_exhaustive()
    }
}

impl PipelineFilter for TracingFilter {
    fn configure(
        &self,
        context: &PipelineContext,
        builder: &mut PipelineBuilder,
        next: FilterNext<'_>,
    ) {
        next.run(context, builder);

        if builder.is_tracing_disabled() {
            debug!(
                target: TRACE_TARGET,
                client = builder.name(),
                "tracing disabled by client registration"
            );
            return;
        }

        let config = self
            .configure
            .as_ref()
            .and_then(|configure| configure(context, builder))
            .unwrap_or_default();

        if !config.enabled {
            debug!(
                target: TRACE_TARGET,
                client = builder.name(),
                "tracing disabled by configuration"
            );
            return;
        }

        let interceptor =
            tracing_interceptor(self.logger_factory.as_ref(), builder.name(), &config);
        builder.push(interceptor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use crate::client::{ServiceTransport, Transport};
    use crate::runtime::events::TraceEvent;
    use crate::runtime::logging::{LogLevel, TraceLogger};
    use http::{Request, Response};
    use std::convert::Infallible;
    use std::sync::Mutex;

    struct NullLogger;

    impl TraceLogger for NullLogger {
        fn is_enabled(&self, _level: LogLevel) -> bool {
            false
        }

        fn log(&self, _event: &TraceEvent) {}
    }

    #[derive(Default)]
    struct CategoryRecorder {
        categories: Mutex<Vec<String>>,
    }

    impl LoggerFactory for CategoryRecorder {
        fn create_logger(&self, category: &str) -> Arc<dyn TraceLogger> {
            self.categories.lock().unwrap().push(category.to_string());
            Arc::new(NullLogger)
        }
    }

    fn transport() -> Arc<dyn Transport> {
        Arc::new(ServiceTransport::new(tower::service_fn(
            |_req: Request<Body>| async { Ok::<_, Infallible>(Response::new(Body::empty())) },
        )))
    }

    fn apply(filter: &TracingFilter, builder: &mut PipelineBuilder) {
        let terminal = |_: &mut PipelineBuilder| {};
        let filters: [Arc<dyn PipelineFilter>; 0] = [];
        filter.configure(
            &PipelineContext::default(),
            builder,
            FilterNext::new(&filters, &terminal),
        );
    }

    #[test]
    fn test_default_category_from_client_name() {
        let factory = Arc::new(CategoryRecorder::default());
        let filter = TracingFilter::new(factory.clone(), None);
        let mut builder = PipelineBuilder::new("github", transport());

        apply(&filter, &mut builder);

        assert_eq!(builder.interceptors().len(), 1);
        assert_eq!(
            factory.categories.lock().unwrap().as_slice(),
            ["System.Net.Http.HttpClient.github.TraceHandler"]
        );
    }

    #[test]
    fn test_category_override() {
        let factory = Arc::new(CategoryRecorder::default());
        let configure: ConfigureTracing = Arc::new(|_: &PipelineContext, _: &PipelineBuilder| {
            Some(TracingConfig::new().with_category_name("outbound"))
        });
        let filter = TracingFilter::new(factory.clone(), Some(configure));
        let mut builder = PipelineBuilder::new("github", transport());

        apply(&filter, &mut builder);

        assert_eq!(factory.categories.lock().unwrap().as_slice(), ["outbound"]);
    }

    #[test]
    fn test_callback_disables() {
        let factory = Arc::new(CategoryRecorder::default());
        let configure: ConfigureTracing =
            Arc::new(|_: &PipelineContext, builder: &PipelineBuilder| {
                (builder.name() == "quiet").then(TracingConfig::disabled)
            });
        let filter = TracingFilter::new(factory.clone(), Some(configure));

        let mut quiet = PipelineBuilder::new("quiet", transport());
        apply(&filter, &mut quiet);
        assert!(quiet.interceptors().is_empty());

        let mut loud = PipelineBuilder::new("loud", transport());
        apply(&filter, &mut loud);
        assert_eq!(loud.interceptors().len(), 1);
    }

    #[test]
    fn test_explicit_disable_wins() {
        let factory = Arc::new(CategoryRecorder::default());
        let filter = TracingFilter::new(factory.clone(), None);
        let mut builder = PipelineBuilder::new("github", transport());
        builder.set_tracing(TracingConfig::disabled());

        apply(&filter, &mut builder);

        assert!(builder.interceptors().is_empty());
        assert!(factory.categories.lock().unwrap().is_empty());
    }
}
