// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing of outbound HTTP calls.
//!
//! This module provides the [`TracingInterceptor`], the pieces it is built
//! from (classification, buffering, rendering, the logger abstraction) and
//! the [`TracingFilter`] that installs it on every client of a registry.

pub mod capture;
pub mod category;
mod classifier;
mod events;
pub(crate) mod filter;
pub mod format;
mod interceptor;
mod logging;

pub use category::{category_for, logger_category, LOG_CATEGORY_PREFIX, LOG_CATEGORY_SUFFIX};
pub use classifier::SuccessClassifier;
pub use events::{TraceEvent, TraceEventKind, TraceMessage};
pub use filter::{ConfigureTracing, TracingFilter};
pub use interceptor::TracingInterceptor;
pub use logging::{
    LogLevel, LoggerFactory, TraceLogger, TracingLogger, TracingLoggerFactory, TRACE_TARGET,
};
