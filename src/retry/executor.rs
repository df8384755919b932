//! Retry execution engine
//!
//! Provides the core retry logic with exponential backoff and logging,
//! generic over the upstream error type and its classifier.

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::retry::classifier::ErrorClassifier;
use crate::retry::policy::RetryableError;
use crate::retry::strategy::{calculate_backoff, has_time_budget};
use crate::retry::RetryConfig;

/// Wraps an async operation with retry logic, exponential backoff, and
/// logging. Generic over the source-specific error type `E`.
pub struct RetryExecutor<E> {
    config: RetryConfig,
    classifier: Box<dyn ErrorClassifier<E>>,
}

impl<E> RetryExecutor<E> {
    pub fn new(config: RetryConfig, classifier: Box<dyn ErrorClassifier<E>>) -> Self {
        Self { config, classifier }
    }

    pub async fn execute<F, T>(&self, operation: F, operation_name: &str) -> Result<T, E>
    where
        F: Fn() -> Pin<Box<dyn Future<Output = Result<T, E>> + Send>>,
    {
        let start_time = Instant::now();

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!(attempt, operation = operation_name, "succeeded after retry");
                    }
                    return Ok(result);
                }
                Err(error) => {
                    let decision = self.classifier.classify(&error);
                    warn!(attempt, operation = operation_name, reason = %decision.reason, "operation failed");

                    if !decision.should_retry {
                        return Err(error);
                    }

                    let should_retry = match decision.error_type {
                        Some(RetryableError::RateLimit) => self.config.retry_on_rate_limit,
                        Some(RetryableError::ServerError) => self.config.retry_on_server_error,
                        Some(RetryableError::Timeout) | Some(RetryableError::NetworkError) => {
                            self.config.retry_on_network_error
                        }
                        None => false,
                    };
                    if !should_retry || attempt >= self.config.max_retries {
                        return Err(error);
                    }

                    let elapsed = start_time.elapsed();
                    if !has_time_budget(elapsed, self.config.max_retry_duration_secs) {
                        return Err(error);
                    }

                    let delay = calculate_backoff(
                        attempt,
                        self.config.initial_backoff_ms,
                        self.config.max_backoff_ms,
                        self.config.backoff_multiplier,
                        self.config.jitter_factor,
                    );
                    sleep(delay).await;
                }
            }
        }

        unreachable!("loop always returns on its last iteration")
    }
}
