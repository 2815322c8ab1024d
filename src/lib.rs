// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full request/response tracing for outbound HTTP client pipelines.
//!
//! A [`TracingInterceptor`] sits in front of a client's transport and logs
//! every request together with its response or failure, without changes at
//! the call sites. A [`PipelineRegistry`] can install it on every client of
//! a process while letting individual clients opt out or tune it.

pub mod body;
pub mod client;
pub mod config;
pub mod error;
pub mod runtime;

pub use body::Body;
pub use client::{ClientRegistration, Pipeline, PipelineRegistry};
pub use config::{TracingConfig, TracingSettings};
pub use error::{HttpTracingError, Result};
pub use runtime::TracingInterceptor;
