// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP payloads flowing through a client pipeline.
//!
//! A [`Body`] is a cheap handle. Buffered bodies can be read any number of
//! times, while streaming bodies are forward-only: the first reader drains
//! the stream and every later read, through any clone of the handle, fails
//! with [`BodyError::Consumed`].

use crate::error::BoxError;
use bytes::{Bytes, BytesMut};
use futures_util::stream::{BoxStream, Stream, StreamExt};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

type ByteStream = BoxStream<'static, std::result::Result<Bytes, BoxError>>;

/// Failure to read a [`Body`].
#[derive(Debug, Clone, Error)]
pub enum BodyError {
    /// The forward-only stream was already read by someone else.
    #[error("content has already been consumed")]
    Consumed,

    /// The underlying stream yielded an error.
    #[error("content stream failed: {0}")]
    Stream(Arc<dyn std::error::Error + Send + Sync>),
}

/// Request or response payload.
#[derive(Clone, Default)]
pub struct Body {
    kind: Kind,
}

#[derive(Clone, Default)]
enum Kind {
    #[default]
    Empty,
    Full(Bytes),
    Streaming(Arc<Mutex<Option<ByteStream>>>),
    Failed(BodyError),
}

impl Body {
    /// A body without content.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A forward-only body backed by a stream of chunks.
    pub fn from_stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        let stream = stream.map(|chunk| chunk.map_err(Into::into)).boxed();
        Self {
            kind: Kind::Streaming(Arc::new(Mutex::new(Some(stream)))),
        }
    }

    /// A body that replays a previous read failure to every reader.
    pub(crate) fn from_error(err: BodyError) -> Self {
        Self {
            kind: Kind::Failed(err),
        }
    }

    /// Whether this body carries no content at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.kind, Kind::Empty)
    }

    /// Whether the content can be read more than once.
    #[must_use]
    pub fn is_replayable(&self) -> bool {
        matches!(self.kind, Kind::Empty | Kind::Full(_))
    }

    /// Read the whole content.
    ///
    /// Buffered content is returned without copying. A streaming body is
    /// drained, so this succeeds at most once across all clones.
    pub async fn bytes(&self) -> std::result::Result<Bytes, BodyError> {
        match &self.kind {
            Kind::Empty => Ok(Bytes::new()),
            Kind::Full(bytes) => Ok(bytes.clone()),
            Kind::Failed(err) => Err(err.clone()),
            Kind::Streaming(slot) => {
                let mut stream = slot.lock().await.take().ok_or(BodyError::Consumed)?;
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(|e| BodyError::Stream(Arc::from(e)))?;
                    buf.extend_from_slice(&chunk);
                }
                Ok(buf.freeze())
            }
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Empty => f.write_str("Body::Empty"),
            Kind::Full(bytes) => f.debug_tuple("Body::Full").field(&bytes.len()).finish(),
            Kind::Streaming(_) => f.write_str("Body::Streaming"),
            Kind::Failed(err) => f.debug_tuple("Body::Failed").field(err).finish(),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self {
            kind: Kind::Full(bytes),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Bytes::from(text).into()
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Bytes::from_static(text.as_bytes()).into()
    }
}
