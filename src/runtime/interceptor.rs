// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interceptor tracing complete request/response pairs.
//!
//! Mind the cost of full tracing: rendering copies headers and bodies, and
//! request buffering keeps every request body in memory for the duration of
//! the call.
//!
//! # Example
//!
//! ```
//! use http_tracing::runtime::{TracingInterceptor, TracingLogger};
//! use std::sync::Arc;
//!
//! let interceptor = TracingInterceptor::new(Arc::new(TracingLogger::new("github")))
//!     .with_buffer_requests(true);
//! ```

use crate::body::Body;
use crate::client::{Interceptor, Next};
use crate::config::TracingConfig;
use crate::error::Result;
use crate::runtime::capture;
use crate::runtime::classifier::SuccessClassifier;
use crate::runtime::events::{TraceEvent, TraceEventKind};
use crate::runtime::format::{response_message, RequestSnapshot};
use crate::runtime::logging::{LogLevel, TraceLogger};
use async_trait::async_trait;
use http::{Request, Response};
use std::fmt;
use std::sync::Arc;

/// Logs every request and its response, or its failure.
///
/// Successful calls are logged at trace level, and only when the logger has
/// trace enabled. Calls classified as failures are always logged at warn
/// level. Transport failures are logged once and returned untouched.
///
/// The interceptor holds no per-call state and can be shared by any number
/// of concurrent calls.
#[derive(Clone)]
pub struct TracingInterceptor {
    logger: Arc<dyn TraceLogger>,
    classifier: SuccessClassifier,
    buffer_requests: bool,
}

impl TracingInterceptor {
    /// Create an interceptor with the 2xx classifier and no buffering.
    #[must_use]
    pub fn new(logger: Arc<dyn TraceLogger>) -> Self {
        Self {
            logger,
            classifier: SuccessClassifier::default(),
            buffer_requests: false,
        }
    }

    /// Create an interceptor from a pipeline configuration.
    ///
    /// The category of `config` is not consulted here; it selects `logger`.
    #[must_use]
    pub fn from_config(logger: Arc<dyn TraceLogger>, config: &TracingConfig) -> Self {
        Self {
            logger,
            classifier: config.classifier(),
            buffer_requests: config.buffer_requests,
        }
    }

    /// Set the success classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: SuccessClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Enable or disable request buffering.
    #[must_use]
    pub fn with_buffer_requests(mut self, enabled: bool) -> Self {
        self.buffer_requests = enabled;
        self
    }

    #[must_use]
    pub fn buffers_requests(&self) -> bool {
        self.buffer_requests
    }
}

impl fmt::Debug for TracingInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingInterceptor")
            .field("classifier", &self.classifier)
            .field("buffer_requests", &self.buffer_requests)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Interceptor for TracingInterceptor {
    async fn intercept(
        &self,
        mut request: Request<Body>,
        next: Next<'_>,
    ) -> Result<Response<Body>> {
        if self.buffer_requests && !request.body().is_empty() {
            let body = std::mem::take(request.body_mut());
            *request.body_mut() = capture::buffer(body).await;
        }

        let snapshot = RequestSnapshot::capture(&request);

        let response = match next.run(request).await {
            Ok(response) => response,
            Err(err) => {
                let message = snapshot.message().await;
                self.logger.log(&TraceEvent::new(
                    TraceEventKind::RequestError,
                    message,
                    Some(err.to_string()),
                ));
                return Err(err);
            }
        };

        let successful = self.classifier.is_successful(&response);
        if successful && !self.logger.is_enabled(LogLevel::Trace) {
            return Ok(response);
        }

        let (request_kind, response_kind) = if successful {
            (TraceEventKind::RequestSuccessful, TraceEventKind::ResponseSuccessful)
        } else {
            (TraceEventKind::RequestError, TraceEventKind::ResponseError)
        };

        // Peek at the response body without taking it away from the caller.
        let (parts, body) = response.into_parts();
        let response = Response::from_parts(parts, capture::buffer(body).await);

        let request_message = snapshot.message().await;
        self.logger
            .log(&TraceEvent::new(request_kind, request_message, None));

        let rendered = response_message(&response).await;
        self.logger
            .log(&TraceEvent::new(response_kind, rendered, None));

        Ok(response)
    }
}
