// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing settings file.
//!
//! ```yaml
//! enabled: true
//! buffer_requests: false
//! clients:
//!   github:
//!     buffer_requests: true
//!   health-probe:
//!     enabled: false
//!   billing:
//!     category_name: outbound.billing
//! ```
//!
//! Client entries override the top-level defaults field by field.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::TracingConfig;
use crate::client::{PipelineBuilder, PipelineContext};
use crate::error::{HttpTracingError, Result};

/// Environment variable naming the settings file.
pub const ENV_HTTP_TRACING_CONFIG: &str = "HTTP_TRACING_CONFIG";

/// Environment variable overriding [`TracingSettings::enabled`].
pub const ENV_HTTP_TRACING_ENABLED: &str = "HTTP_TRACING_ENABLED";

/// Environment variable overriding [`TracingSettings::buffer_requests`].
pub const ENV_HTTP_TRACING_BUFFER_REQUESTS: &str = "HTTP_TRACING_BUFFER_REQUESTS";

/// Tracing settings for every client of a process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TracingSettings {
    /// Default for clients without their own `enabled`.
    pub enabled: bool,

    /// Default for clients without their own `buffer_requests`.
    pub buffer_requests: bool,

    /// Per-client overrides, keyed by client name.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub clients: HashMap<String, ClientTracingSettings>,
}

/// Overrides for a single client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientTracingSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_requests: Option<bool>,
}

impl Default for TracingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            buffer_requests: false,
            clients: HashMap::new(),
        }
    }
}

impl TracingSettings {
    /// Parse settings from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the YAML is malformed.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            HttpTracingError::Config(format!("Failed to parse tracing settings YAML: {}", e))
        })
    }

    /// Load settings from a file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            HttpTracingError::Config(format!(
                "Failed to read tracing settings {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// The settings file named by `HTTP_TRACING_CONFIG`, if set.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        std::env::var_os(ENV_HTTP_TRACING_CONFIG).map(PathBuf::from)
    }

    /// Load settings from `HTTP_TRACING_CONFIG` (or defaults), then apply
    /// the environment overrides.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be loaded or an
    /// override is not a boolean.
    pub fn load_with_env() -> Result<Self> {
        let settings = match Self::config_path() {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        settings.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `HTTP_TRACING_ENABLED` and `HTTP_TRACING_BUFFER_REQUESTS` as
    /// resolved by `lookup`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a value is not a boolean.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_HTTP_TRACING_ENABLED) {
            self.enabled = parse_flag(ENV_HTTP_TRACING_ENABLED, &value)?;
        }
        if let Some(value) = lookup(ENV_HTTP_TRACING_BUFFER_REQUESTS) {
            self.buffer_requests = parse_flag(ENV_HTTP_TRACING_BUFFER_REQUESTS, &value)?;
        }
        Ok(self)
    }

    /// Resolve the configuration of the client called `name`.
    #[must_use]
    pub fn config_for(&self, name: &str) -> TracingConfig {
        let client = self.clients.get(name);
        TracingConfig {
            enabled: client.and_then(|c| c.enabled).unwrap_or(self.enabled),
            category_name: client.and_then(|c| c.category_name.clone()),
            is_response_successful: None,
            buffer_requests: client
                .and_then(|c| c.buffer_requests)
                .unwrap_or(self.buffer_requests),
        }
    }

    /// Use these settings as the configuration callback of a tracing filter.
    pub fn into_configure_fn(
        self,
    ) -> impl Fn(&PipelineContext, &PipelineBuilder) -> Option<TracingConfig> + Send + Sync {
        move |_context: &PipelineContext, builder: &PipelineBuilder| {
            Some(self.config_for(builder.name()))
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(HttpTracingError::Config(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}
