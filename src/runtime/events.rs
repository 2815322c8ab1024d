// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trace event taxonomy.
//!
//! | id  | name               | level |
//! |-----|--------------------|-------|
//! | 200 | RequestSuccessful  | Trace |
//! | 201 | RequestError       | Warn  |
//! | 210 | ResponseSuccessful | Trace |
//! | 211 | ResponseError      | Warn  |
//!
//! Ids and names are consumed by existing log pipelines and must not change.

use crate::runtime::logging::LogLevel;
use std::fmt;

/// The four kinds of trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEventKind {
    RequestSuccessful,
    RequestError,
    ResponseSuccessful,
    ResponseError,
}

impl TraceEventKind {
    /// Stable numeric event id.
    #[must_use]
    pub const fn id(self) -> u16 {
        match self {
            TraceEventKind::RequestSuccessful => 200,
            TraceEventKind::RequestError => 201,
            TraceEventKind::ResponseSuccessful => 210,
            TraceEventKind::ResponseError => 211,
        }
    }

    /// Stable event name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TraceEventKind::RequestSuccessful => "RequestSuccessful",
            TraceEventKind::RequestError => "RequestError",
            TraceEventKind::ResponseSuccessful => "ResponseSuccessful",
            TraceEventKind::ResponseError => "ResponseError",
        }
    }

    #[must_use]
    pub const fn level(self) -> LogLevel {
        match self {
            TraceEventKind::RequestSuccessful | TraceEventKind::ResponseSuccessful => {
                LogLevel::Trace
            }
            TraceEventKind::RequestError | TraceEventKind::ResponseError => LogLevel::Warn,
        }
    }
}

impl fmt::Display for TraceEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}

/// Rendered fields of a request or a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceMessage {
    Request {
        method: String,
        uri: String,
        protocol: String,
        headers: String,
        body: String,
    },
    Response {
        protocol: String,
        status_code: u16,
        reason: String,
        headers: String,
        body: String,
    },
}

impl TraceMessage {
    /// The rendered headers block.
    #[must_use]
    pub fn headers(&self) -> &str {
        match self {
            TraceMessage::Request { headers, .. } | TraceMessage::Response { headers, .. } => {
                headers
            }
        }
    }

    /// The rendered body, or the placeholder when it could not be read.
    #[must_use]
    pub fn body(&self) -> &str {
        match self {
            TraceMessage::Request { body, .. } | TraceMessage::Response { body, .. } => body,
        }
    }

    /// Status code of a response message.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TraceMessage::Response { status_code, .. } => Some(*status_code),
            TraceMessage::Request { .. } => None,
        }
    }
}

impl fmt::Display for TraceMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceMessage::Request {
                method,
                uri,
                protocol,
                headers,
                body,
            } => write!(f, "\n{method} {uri} {protocol}\n{headers}\n{body}"),
            TraceMessage::Response {
                protocol,
                status_code,
                reason,
                headers,
                body,
            } => write!(f, "\n{protocol} {status_code} {reason}\n{headers}\n{body}"),
        }
    }
}

/// One trace event, created and logged within a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    kind: TraceEventKind,
    message: TraceMessage,
    error: Option<String>,
}

impl TraceEvent {
    #[must_use]
    pub fn new(kind: TraceEventKind, message: TraceMessage, error: Option<String>) -> Self {
        Self {
            kind,
            message,
            error,
        }
    }

    #[must_use]
    pub fn kind(&self) -> TraceEventKind {
        self.kind
    }

    #[must_use]
    pub fn id(&self) -> u16 {
        self.kind.id()
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    #[must_use]
    pub fn level(&self) -> LogLevel {
        self.kind.level()
    }

    #[must_use]
    pub fn message(&self) -> &TraceMessage {
        &self.message
    }

    /// The transport failure attached to a `RequestError`, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
