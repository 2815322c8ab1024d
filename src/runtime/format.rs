// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of requests and responses into [`TraceMessage`]s.
//!
//! Rendering never fails: unreadable content becomes a placeholder text.

use crate::body::{Body, BodyError};
use crate::runtime::events::TraceMessage;
use bytes::Bytes;
use http::{HeaderMap, Method, Request, Response, Uri, Version};
use hyper::ext::ReasonPhrase;

/// Protocol label such as `HTTP/1.1`.
#[must_use]
pub fn protocol_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/?",
    }
}

/// Headers as `name: value1 value2` lines, one per header name.
#[must_use]
pub fn headers_as_string(headers: &HeaderMap) -> String {
    headers
        .keys()
        .map(|name| {
            let values: Vec<String> = headers
                .get_all(name)
                .iter()
                .map(|v| match v.to_str() {
                    Ok(s) => s.to_string(),
                    Err(_) => String::from_utf8_lossy(v.as_bytes()).into_owned(),
                })
                .collect();
            format!("{}: {}", name, values.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Placeholder logged instead of request content that could not be read.
#[must_use]
pub fn unbuffered_request_body(err: &BodyError) -> String {
    format!(
        "[Request content is not buffered ({err}). \
         Use the buffer_requests option to allow the reading.]"
    )
}

/// Placeholder logged instead of response content that could not be read.
#[must_use]
pub fn unreadable_response_body(err: &BodyError) -> String {
    format!("[Response content could not be read ({err})]")
}

/// Decoded request body text, or its placeholder.
#[must_use]
pub fn request_body_as_string(content: &std::result::Result<Bytes, BodyError>) -> String {
    decode(content, unbuffered_request_body)
}

/// Decoded response body text, or its placeholder.
#[must_use]
pub fn response_body_as_string(content: &std::result::Result<Bytes, BodyError>) -> String {
    decode(content, unreadable_response_body)
}

fn decode(
    content: &std::result::Result<Bytes, BodyError>,
    placeholder: fn(&BodyError) -> String,
) -> String {
    match content {
        Ok(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Err(err) => placeholder(err),
    }
}

/// Read-only copy of the request fields, taken before the request is
/// handed to the rest of the pipeline.
///
/// The body handle is shared with the forwarded request: if the transport
/// drains a forward-only body, the snapshot sees it as consumed.
#[derive(Debug, Clone)]
pub(crate) struct RequestSnapshot {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Body,
}

impl RequestSnapshot {
    pub(crate) fn capture(request: &Request<Body>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            version: request.version(),
            headers: request.headers().clone(),
            body: request.body().clone(),
        }
    }

    pub(crate) async fn message(&self) -> TraceMessage {
        let content = self.body.bytes().await;
        TraceMessage::Request {
            method: self.method.to_string(),
            uri: self.uri.to_string(),
            protocol: protocol_label(self.version).to_string(),
            headers: headers_as_string(&self.headers),
            body: request_body_as_string(&content),
        }
    }
}

/// The reason phrase received on the wire, or the canonical one.
fn reason_phrase(response: &Response<Body>) -> String {
    match response.extensions().get::<ReasonPhrase>() {
        Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
        None => response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Render a response.
///
/// The body is read through its handle, so callers should make it
/// replayable first or the caller of the pipeline loses it.
pub async fn response_message(response: &Response<Body>) -> TraceMessage {
    let content = response.body().bytes().await;
    TraceMessage::Response {
        protocol: protocol_label(response.version()).to_string(),
        status_code: response.status().as_u16(),
        reason: reason_phrase(response),
        headers: headers_as_string(response.headers()),
        body: response_body_as_string(&content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use http::header::{ACCEPT, CONTENT_TYPE};

    #[test]
    fn test_protocol_label() {
        assert_eq!(protocol_label(Version::HTTP_11), "HTTP/1.1");
        assert_eq!(protocol_label(Version::HTTP_2), "HTTP/2.0");
    }

    #[test]
    fn test_headers_multi_values_are_space_joined() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());
        headers.append(ACCEPT, "text/plain".parse().unwrap());
        headers.append(ACCEPT, "application/json".parse().unwrap());

        assert_eq!(
            headers_as_string(&headers),
            "content-type: application/json\naccept: text/plain application/json"
        );
    }

    #[test]
    fn test_headers_empty() {
        assert_eq!(headers_as_string(&HeaderMap::new()), "");
    }

    #[test]
    fn test_body_placeholder() {
        let text = request_body_as_string(&Err(BodyError::Consumed));
        assert_eq!(
            text,
            "[Request content is not buffered (content has already been consumed). \
             Use the buffer_requests option to allow the reading.]"
        );
    }

    #[test]
    fn test_response_placeholder_does_not_mention_buffering() {
        let text = response_body_as_string(&Err(BodyError::Consumed));
        assert_eq!(
            text,
            "[Response content could not be read (content has already been consumed)]"
        );
    }

    #[tokio::test]
    async fn test_failed_response_stream_renders_response_placeholder() {
        let response = Response::builder()
            .status(500)
            .body(Body::from_stream(stream::iter(vec![Err::<Bytes, _>(
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
            )])))
            .unwrap();

        let message = response_message(&response).await;
        assert_eq!(message.status_code(), Some(500));
        assert_eq!(
            message.body(),
            "[Response content could not be read (content stream failed: reset)]"
        );
        assert!(!message.body().contains("buffer_requests"));
    }

    #[tokio::test]
    async fn test_reason_phrase_from_the_wire() {
        let mut response = Response::builder()
            .status(200)
            .body(Body::empty())
            .unwrap();
        response
            .extensions_mut()
            .insert(ReasonPhrase::from_static(b"Everything Fine"));

        let message = response_message(&response).await;
        assert!(message.to_string().starts_with("\nHTTP/1.1 200 Everything Fine\n"));
    }

    #[tokio::test]
    async fn test_reason_phrase_falls_back_to_canonical() {
        let response = Response::builder()
            .status(418)
            .body(Body::empty())
            .unwrap();

        let message = response_message(&response).await;
        assert!(message.to_string().starts_with("\nHTTP/1.1 418 I'm a teapot\n"));
    }

    #[tokio::test]
    async fn test_snapshot_sees_consumed_stream() {
        let request = Request::post("http://localhost/api/echo")
            .header(CONTENT_TYPE, "text/plain")
            .body(Body::from_stream(stream::iter(vec![Ok::<_, std::io::Error>(
                Bytes::from_static(b"once"),
            )])))
            .unwrap();
        let snapshot = RequestSnapshot::capture(&request);

        // The transport drains the body.
        assert_eq!(request.body().bytes().await.unwrap(), "once");

        match snapshot.message().await {
            TraceMessage::Request {
                method,
                uri,
                protocol,
                headers,
                body,
            } => {
                assert_eq!(method, "POST");
                assert_eq!(uri, "http://localhost/api/echo");
                assert_eq!(protocol, "HTTP/1.1");
                assert_eq!(headers, "content-type: text/plain");
                assert!(body.contains("not buffered"));
            }
            other => panic!("Expected request message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_response_message() {
        let response = Response::builder()
            .status(200)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"MyName"}"#))
            .unwrap();

        let message = response_message(&response).await;
        assert_eq!(message.status_code(), Some(200));
        assert_eq!(message.body(), r#"{"name":"MyName"}"#);
        assert_eq!(message.headers(), "content-type: application/json");
        assert!(message.to_string().contains("HTTP/1.1 200 OK"));
        // Still readable by the caller.
        assert_eq!(response.body().bytes().await.unwrap(), r#"{"name":"MyName"}"#);
    }
}
