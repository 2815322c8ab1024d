// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rematerialization of forward-only bodies.
//!
//! Buffering costs one full read and a copy of the content in memory, so the
//! interceptor only does it for requests when asked to, and for responses
//! only when an event is actually going to be rendered.

use crate::body::{Body, BodyError};
use crate::runtime::logging::TRACE_TARGET;
use tracing::debug;

/// Turn `body` into a body that can be read any number of times.
///
/// Replayable bodies are returned untouched. A body that was already
/// consumed upstream stays consumed, and the formatter will render its
/// placeholder. A stream failure is captured and replayed to every later
/// reader, so the caller still observes it.
pub async fn buffer(body: Body) -> Body {
    if body.is_replayable() {
        return body;
    }

    match body.bytes().await {
        Ok(bytes) => Body::from(bytes),
        Err(BodyError::Consumed) => {
            debug!(target: TRACE_TARGET, "content already consumed, buffering skipped");
            body
        }
        Err(err) => Body::from_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures_util::stream;

    fn forward_only(text: &'static str) -> Body {
        Body::from_stream(stream::iter(vec![Ok::<_, std::io::Error>(
            Bytes::from_static(text.as_bytes()),
        )]))
    }

    #[tokio::test]
    async fn test_buffer_makes_stream_replayable() {
        let body = buffer(forward_only("payload")).await;
        assert!(body.is_replayable());
        assert_eq!(body.bytes().await.unwrap(), "payload");
        assert_eq!(body.bytes().await.unwrap(), "payload");
    }

    #[test]
    fn test_buffer_keeps_replayable_body() {
        let body = tokio_test::block_on(buffer(Body::from("already")));
        assert!(body.is_replayable());
        assert_eq!(tokio_test::block_on(body.bytes()).unwrap(), "already");
    }

    #[tokio::test]
    async fn test_buffer_consumed_body_stays_consumed() {
        let body = forward_only("gone");
        body.bytes().await.unwrap();
        let body = buffer(body).await;
        assert!(matches!(body.bytes().await, Err(BodyError::Consumed)));
    }

    #[tokio::test]
    async fn test_buffer_replays_stream_failure() {
        let body = Body::from_stream(stream::iter(vec![Err::<Bytes, _>(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset by peer",
        ))]));
        let body = buffer(body).await;
        for _ in 0..2 {
            match body.bytes().await {
                Err(BodyError::Stream(e)) => assert!(e.to_string().contains("reset by peer")),
                other => panic!("Expected stream error, got {:?}", other),
            }
        }
    }
}
