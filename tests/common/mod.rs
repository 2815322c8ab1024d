// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures: an in-memory server and loggers that record events.

#![allow(dead_code)]

use bytes::Bytes;
use futures_util::stream;
use http::header::CONTENT_TYPE;
use http::{Request, Response, StatusCode};
use http_tracing::body::Body;
use http_tracing::client::{ServiceTransport, Transport};
use http_tracing::runtime::{LogLevel, LoggerFactory, TraceEvent, TraceLogger};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Logger keeping every event in memory.
#[derive(Default)]
pub struct RecordingLogger {
    trace: bool,
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingLogger {
    /// A logger with trace level enabled.
    pub fn verbose() -> Arc<Self> {
        Arc::new(Self {
            trace: true,
            ..Default::default()
        })
    }

    /// A logger recording warnings and above only.
    pub fn quiet() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn ids(&self) -> Vec<u16> {
        self.events().iter().map(TraceEvent::id).collect()
    }
}

impl TraceLogger for RecordingLogger {
    fn is_enabled(&self, level: LogLevel) -> bool {
        level > LogLevel::Trace || self.trace
    }

    fn log(&self, event: &TraceEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Factory handing out one shared [`RecordingLogger`] and remembering the
/// categories asked for.
#[derive(Clone)]
pub struct RecordingFactory {
    pub logger: Arc<RecordingLogger>,
    categories: Arc<Mutex<Vec<String>>>,
}

impl RecordingFactory {
    pub fn new(logger: Arc<RecordingLogger>) -> Self {
        Self {
            logger,
            categories: Arc::default(),
        }
    }

    pub fn categories(&self) -> Vec<String> {
        self.categories.lock().unwrap().clone()
    }
}

impl LoggerFactory for RecordingFactory {
    fn create_logger(&self, category: &str) -> Arc<dyn TraceLogger> {
        self.categories.lock().unwrap().push(category.to_string());
        self.logger.clone()
    }
}

fn query_param<'a>(request: &'a Request<Body>, key: &str) -> Option<&'a str> {
    request.uri().query()?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then_some(v)
    })
}

/// Body delivered as a forward-only stream, the way a socket would.
pub fn streamed(content: impl Into<Bytes>) -> Body {
    let chunk: Bytes = content.into();
    Body::from_stream(stream::iter(vec![Ok::<_, Infallible>(chunk)]))
}

/// In-memory server.
///
/// - `/api/json?name=N` answers `{"name":"N"}`
/// - `/api/status?statusCode=C` answers an empty body with status `C`
/// - `/api/echo` reads the request body and sends it back
/// - `/api/slow` answers after five seconds
async fn serve(request: Request<Body>) -> Result<Response<Body>, Infallible> {
    let response = match request.uri().path() {
        "/api/json" => {
            let name = query_param(&request, "name").unwrap_or_default();
            Response::builder()
                .header(CONTENT_TYPE, "application/json; charset=utf-8")
                .body(streamed(format!("{{\"name\":\"{name}\"}}")))
        }
        "/api/status" => {
            let status = query_param(&request, "statusCode")
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(200);
            Response::builder().status(status).body(Body::empty())
        }
        "/api/echo" => {
            let content_type = request.headers().get(CONTENT_TYPE).cloned();
            let content = request.body().bytes().await.unwrap_or_default();
            let mut builder = Response::builder();
            if let Some(value) = content_type {
                builder = builder.header(CONTENT_TYPE, value);
            }
            builder.body(streamed(content))
        }
        "/api/slow" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Response::builder().body(Body::from("late"))
        }
        _ => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::empty()),
    };
    Ok(response.unwrap())
}

pub fn server() -> impl Transport {
    ServiceTransport::new(tower::service_fn(serve))
}

/// Transport whose connection always fails.
pub fn unreachable() -> impl Transport {
    ServiceTransport::new(tower::service_fn(|_req: Request<Body>| async {
        Err::<Response<Body>, _>(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ))
    }))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(format!("http://localhost{uri}"))
        .body(Body::empty())
        .unwrap()
}
