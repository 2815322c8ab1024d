// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::body::BodyError;
use thiserror::Error;

/// Boxed error produced by a transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum HttpTracingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(BoxError),

    #[error("Body error: {0}")]
    Body(#[from] BodyError),
}

impl HttpTracingError {
    /// Wrap any transport failure.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }
}

pub type Result<T> = std::result::Result<T, HttpTracingError>;
