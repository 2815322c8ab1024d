// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logger abstraction used by the tracing interceptor.
//!
//! Interceptors never write log lines themselves. They ask a [`TraceLogger`]
//! whether a level is enabled and hand it finished [`TraceEvent`]s. Loggers
//! are created per category by a [`LoggerFactory`].
//!
//! The default backend forwards every event to the `tracing` crate:
//!
//! ```
//! use http_tracing::runtime::{LoggerFactory, TracingLoggerFactory};
//!
//! let category = "System.Net.Http.HttpClient.github.TraceHandler";
//! let logger = TracingLoggerFactory.create_logger(category);
//! ```

use crate::runtime::events::TraceEvent;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn, Level};

/// `tracing` target used for every trace event.
pub const TRACE_TARGET: &str = "http_tracing";

/// Severity of a trace event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Trace level - most verbose.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    Info,
    /// Warn level.
    Warn,
    /// Error level.
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// A logger bound to one category.
///
/// Implementations must be cheap to query with [`is_enabled`](Self::is_enabled):
/// the interceptor calls it on every successful call to decide whether to
/// render anything at all.
pub trait TraceLogger: Send + Sync {
    /// Whether events of `level` would be recorded.
    fn is_enabled(&self, level: LogLevel) -> bool;

    /// Record a rendered event.
    fn log(&self, event: &TraceEvent);
}

/// Creates category-scoped loggers.
pub trait LoggerFactory: Send + Sync {
    fn create_logger(&self, category: &str) -> Arc<dyn TraceLogger>;
}

/// [`TraceLogger`] writing to the `tracing` crate under [`TRACE_TARGET`].
///
/// The category is attached as a field, so subscribers can filter on it.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    category: String,
}

impl TracingLogger {
    /// Create a logger for `category`.
    #[must_use]
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }

    /// Get the category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }
}

impl TraceLogger for TracingLogger {
    fn is_enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Trace => tracing::enabled!(target: TRACE_TARGET, Level::TRACE),
            LogLevel::Debug => tracing::enabled!(target: TRACE_TARGET, Level::DEBUG),
            LogLevel::Info => tracing::enabled!(target: TRACE_TARGET, Level::INFO),
            LogLevel::Warn => tracing::enabled!(target: TRACE_TARGET, Level::WARN),
            LogLevel::Error => tracing::enabled!(target: TRACE_TARGET, Level::ERROR),
        }
    }

    fn log(&self, event: &TraceEvent) {
        let category = self.category.as_str();
        let event_id = event.id();
        let event_name = event.name();
        let err = event.error();
        let msg = event.message();

        match event.level() {
            LogLevel::Trace => {
                trace!(target: TRACE_TARGET, category, event_id, event_name, error = ?err, "{msg}")
            }
            LogLevel::Debug => {
                debug!(target: TRACE_TARGET, category, event_id, event_name, error = ?err, "{msg}")
            }
            LogLevel::Info => {
                info!(target: TRACE_TARGET, category, event_id, event_name, error = ?err, "{msg}")
            }
            LogLevel::Warn => {
                warn!(target: TRACE_TARGET, category, event_id, event_name, error = ?err, "{msg}")
            }
            LogLevel::Error => {
                error!(target: TRACE_TARGET, category, event_id, event_name, error = ?err, "{msg}")
            }
        }
    }
}

/// [`LoggerFactory`] producing [`TracingLogger`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLoggerFactory;

impl LoggerFactory for TracingLoggerFactory {
    fn create_logger(&self, category: &str) -> Arc<dyn TraceLogger> {
        Arc::new(TracingLogger::new(category))
    }
}
