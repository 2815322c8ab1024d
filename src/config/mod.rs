// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing configuration.
//!
//! [`TracingConfig`] is the per-pipeline configuration, built in code.
//! [`TracingSettings`] is its file form, loaded from YAML and the
//! environment and turned into per-pipeline configurations on demand.
//!
//! # Environment Variables
//!
//! - `HTTP_TRACING_CONFIG` - Path to the settings file
//! - `HTTP_TRACING_ENABLED` - Override the default `enabled` flag
//! - `HTTP_TRACING_BUFFER_REQUESTS` - Override the default `buffer_requests` flag
//!
//! # Example
//!
//! ```
//! use http_tracing::config::TracingConfig;
//!
//! let config = TracingConfig::new()
//!     .with_category_name("outbound.github")
//!     .with_buffer_requests(true);
//! assert!(config.enabled);
//! ```

mod settings;

pub use settings::{
    ClientTracingSettings, TracingSettings, ENV_HTTP_TRACING_BUFFER_REQUESTS,
    ENV_HTTP_TRACING_CONFIG, ENV_HTTP_TRACING_ENABLED,
};

use crate::body::Body;
use crate::runtime::SuccessClassifier;
use http::Response;

/// Configuration of tracing for one client pipeline.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Whether to trace the pipeline at all.
    pub enabled: bool,
    /// Logger category. Defaults to the category derived from the client name.
    pub category_name: Option<String>,
    /// Override of the success classification. Defaults to 2xx.
    pub is_response_successful: Option<SuccessClassifier>,
    /// Buffer request bodies so forward-only content can be logged.
    ///
    /// Costs a full read and an in-memory copy of every request body.
    pub buffer_requests: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            category_name: None,
            is_response_successful: None,
            buffer_requests: false,
        }
    }
}

impl TracingConfig {
    /// Create the default, enabled configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration that turns tracing off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Enable or disable tracing.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the logger category.
    #[must_use]
    pub fn with_category_name(mut self, category: impl Into<String>) -> Self {
        self.category_name = Some(category.into());
        self
    }

    /// Set the success classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: SuccessClassifier) -> Self {
        self.is_response_successful = Some(classifier);
        self
    }

    /// Set the success classifier from a predicate.
    #[must_use]
    pub fn with_response_classifier<F>(self, predicate: F) -> Self
    where
        F: Fn(&Response<Body>) -> bool + Send + Sync + 'static,
    {
        self.with_classifier(SuccessClassifier::new(predicate))
    }

    /// Enable or disable request buffering.
    #[must_use]
    pub fn with_buffer_requests(mut self, enabled: bool) -> Self {
        self.buffer_requests = enabled;
        self
    }

    /// The effective classifier.
    #[must_use]
    pub fn classifier(&self) -> SuccessClassifier {
        self.is_response_successful.clone().unwrap_or_default()
    }
}
