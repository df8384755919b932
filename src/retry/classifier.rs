//! Source-specific error classification for retry decisions.

use crate::arxiv::ArxivError;
use crate::feishu::FeishuError;
use crate::retry::policy::{RetryDecision, RetryableError};

/// Classifies an error from one upstream dependency and decides whether
/// the retry executor should retry it.
pub trait ErrorClassifier<E>: Send + Sync {
    fn classify(&self, error: &E) -> RetryDecision;
}

/// Classifier for the upstream article API.
///
/// # Retry Policy
/// - **Retry on**: network errors, timeouts, 5xx responses.
/// - **Don't retry on**: parse errors (malformed feed body).
pub struct ArxivErrorClassifier;

impl ErrorClassifier<ArxivError> for ArxivErrorClassifier {
    fn classify(&self, error: &ArxivError) -> RetryDecision {
        match error {
            ArxivError::RequestError(e) => {
                if e.is_timeout() {
                    RetryDecision::retryable(RetryableError::Timeout, &format!("request timeout: {e}"))
                } else if e.is_connect() {
                    RetryDecision::retryable(RetryableError::NetworkError, &format!("connection failed: {e}"))
                } else if let Some(status) = e.status() {
                    if status.as_u16() == 429 {
                        RetryDecision::retryable(RetryableError::RateLimit, "rate limited by upstream")
                    } else if status.as_u16() >= 500 {
                        RetryDecision::retryable(RetryableError::ServerError, &format!("server error {status}"))
                    } else {
                        RetryDecision::not_retryable(&format!("non-retryable status {status}"))
                    }
                } else {
                    RetryDecision::retryable(RetryableError::NetworkError, &format!("network error: {e}"))
                }
            }
            ArxivError::ParseError(msg) => {
                RetryDecision::not_retryable(&format!("malformed feed response: {msg}"))
            }
        }
    }
}

/// Classifier for the remote table / messaging API.
///
/// # Retry Policy
/// - **Retry on**: network errors, timeouts, 5xx responses.
/// - **Single retry**: authentication-expired, after a forced token
///   refresh (handled by the caller, not this classifier).
/// - **Don't retry**: other business errors, missing credentials.
pub struct TableApiErrorClassifier;

impl ErrorClassifier<FeishuError> for TableApiErrorClassifier {
    fn classify(&self, error: &FeishuError) -> RetryDecision {
        match error {
            FeishuError::RequestError(e) => {
                if e.is_timeout() {
                    RetryDecision::retryable(RetryableError::Timeout, &format!("request timeout: {e}"))
                } else if e.is_connect() {
                    RetryDecision::retryable(RetryableError::NetworkError, &format!("connection failed: {e}"))
                } else if let Some(status) = e.status() {
                    if status.as_u16() >= 500 {
                        RetryDecision::retryable(RetryableError::ServerError, &format!("server error {status}"))
                    } else {
                        RetryDecision::not_retryable(&format!("non-retryable status {status}"))
                    }
                } else {
                    RetryDecision::retryable(RetryableError::NetworkError, &format!("network error: {e}"))
                }
            }
            FeishuError::AuthExpired => {
                RetryDecision::retryable(RetryableError::ServerError, "token expired, refresh and retry once")
            }
            FeishuError::Business { code, message } => {
                RetryDecision::not_retryable(&format!("business error {code}: {message}"))
            }
            FeishuError::MissingCredentials(msg) => {
                RetryDecision::not_retryable(&format!("missing credentials: {msg}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_not_retryable() {
        let classifier = ArxivErrorClassifier;
        let decision = classifier.classify(&ArxivError::ParseError("bad xml".to_string()));
        assert!(!decision.should_retry);
    }

    #[test]
    fn auth_expired_is_retryable_once() {
        let classifier = TableApiErrorClassifier;
        let decision = classifier.classify(&FeishuError::AuthExpired);
        assert!(decision.should_retry);
    }

    #[test]
    fn business_error_not_retryable() {
        let classifier = TableApiErrorClassifier;
        let decision = classifier.classify(&FeishuError::Business { code: 1254, message: "invalid field".to_string() });
        assert!(!decision.should_retry);
    }
}
