// SPDX-License-Identifier: MIT OR Apache-2.0

//! Success classification of responses.

use crate::body::Body;
use http::Response;
use std::fmt;
use std::sync::Arc;

type Predicate = dyn Fn(&Response<Body>) -> bool + Send + Sync;

/// Decides whether a response counts as successful for logging purposes.
///
/// The default treats 2xx as success. Overrides are trusted: a panicking
/// predicate is a programming error and is not caught.
///
/// ```
/// use http::StatusCode;
/// use http_tracing::runtime::SuccessClassifier;
///
/// // Existence checks: a 404 is an expected answer.
/// let classifier = SuccessClassifier::new(|response| {
///     response.status().is_success() || response.status() == StatusCode::NOT_FOUND
/// });
/// ```
#[derive(Clone)]
pub struct SuccessClassifier {
    predicate: Option<Arc<Predicate>>,
}

impl SuccessClassifier {
    /// Classify with a custom predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Response<Body>) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Some(Arc::new(predicate)),
        }
    }

    /// The 2xx classifier.
    #[must_use]
    pub fn status_success() -> Self {
        Self { predicate: None }
    }

    #[must_use]
    pub fn is_successful(&self, response: &Response<Body>) -> bool {
        match &self.predicate {
            Some(predicate) => predicate(response),
            None => response.status().is_success(),
        }
    }
}

impl Default for SuccessClassifier {
    fn default() -> Self {
        Self::status_success()
    }
}

impl fmt::Debug for SuccessClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.predicate {
            Some(_) => f.write_str("SuccessClassifier(custom)"),
            None => f.write_str("SuccessClassifier(2xx)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    fn response(status: u16) -> Response<Body> {
        Response::builder()
            .status(status)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_default_is_2xx() {
        let classifier = SuccessClassifier::default();
        assert!(classifier.is_successful(&response(200)));
        assert!(classifier.is_successful(&response(204)));
        assert!(!classifier.is_successful(&response(302)));
        assert!(!classifier.is_successful(&response(404)));
        assert!(!classifier.is_successful(&response(500)));
    }

    #[test]
    fn test_custom_predicate() {
        let classifier = SuccessClassifier::new(|r| {
            r.status().is_success() || r.status() == StatusCode::NOT_FOUND
        });
        assert!(classifier.is_successful(&response(404)));
        assert!(!classifier.is_successful(&response(500)));
    }

    #[test]
    fn test_debug() {
        assert_eq!(
            format!("{:?}", SuccessClassifier::default()),
            "SuccessClassifier(2xx)"
        );
        assert_eq!(
            format!("{:?}", SuccessClassifier::new(|_| true)),
            "SuccessClassifier(custom)"
        );
    }
}
