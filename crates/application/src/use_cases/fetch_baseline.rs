//! Fetch Baseline Use Case
//!
//! One-shot read of the time authority's status at startup. It is not
//! repeated or retried; a failure is reported on the error surface and the
//! canonical time stays unknown until the push channel delivers one.

use std::sync::Arc;
use std::time::Duration;

use tickwatch_domain::{CanonicalTime, StatusPayload, decode_status};

use crate::error_surface::ErrorSurface;
use crate::ports::StatusSource;
use crate::store::TimeWriter;
use crate::{ApplicationError, ApplicationResult};

/// Default bound on the baseline request.
pub const DEFAULT_BASELINE_TIMEOUT: Duration = Duration::from_secs(10);

/// Use case for establishing the initial canonical time.
///
/// # Example
///
/// ```ignore
/// let fetch = FetchBaseline::new(Arc::new(api_client)).with_timeout(config.baseline_timeout());
/// fetch.bootstrap(&store.writer(), &errors).await;
/// ```
pub struct FetchBaseline<S: StatusSource> {
    source: Arc<S>,
    timeout: Duration,
}

impl<S: StatusSource> FetchBaseline<S> {
    /// Creates the use case with the default timeout.
    pub const fn new(source: Arc<S>) -> Self {
        Self {
            source,
            timeout: DEFAULT_BASELINE_TIMEOUT,
        }
    }

    /// Overrides the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetches and validates the status document.
    ///
    /// # Errors
    ///
    /// Returns `Timeout`/`Transport` for network failures and `Validation`
    /// when the body does not match `{ currentTick, currentCount }`.
    pub async fn fetch(&self) -> ApplicationResult<StatusPayload> {
        let body = tokio::time::timeout(self.timeout, self.source.fetch_status())
            .await
            .map_err(|_| ApplicationError::Timeout)??;
        Ok(decode_status(&body)?)
    }

    /// Runs the baseline step: writes the time on success, posts a message
    /// to `errors` on failure. Never propagates the failure.
    pub async fn bootstrap(
        &self,
        writer: &TimeWriter,
        errors: &ErrorSurface,
    ) -> Option<CanonicalTime> {
        match self.fetch().await {
            Ok(status) => {
                tracing::info!(
                    time = %status.current_tick,
                    count = status.current_count,
                    "baseline time received"
                );
                if !writer.set_baseline(status.current_tick) {
                    tracing::debug!("baseline arrived after a live tick, keeping the newer time");
                }
                Some(status.current_tick)
            }
            Err(err) => {
                tracing::warn!(error = %err, "baseline fetch failed");
                errors.set_error(format!("Unexpected error when fetching: {err}"));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TimeStore;
    use serde_json::{Value, json};
    use std::future::Future;

    struct FixedStatus(ApplicationResult<Value>);

    impl StatusSource for FixedStatus {
        fn fetch_status(&self) -> impl Future<Output = ApplicationResult<Value>> + Send {
            let result = self.0.clone();
            async move { result }
        }
    }

    struct NeverAnswers;

    impl StatusSource for NeverAnswers {
        fn fetch_status(&self) -> impl Future<Output = ApplicationResult<Value>> + Send {
            std::future::pending()
        }
    }

    #[tokio::test]
    async fn success_initializes_canonical_time() {
        let store = TimeStore::new();
        let errors = ErrorSurface::new();
        let fetch = FetchBaseline::new(Arc::new(FixedStatus(Ok(json!({
            "currentTick": "2024-01-01T00:00:00Z",
            "currentCount": 12
        })))));

        let time = fetch.bootstrap(&store.writer(), &errors).await;

        assert_eq!(time, Some(CanonicalTime::parse("2024-01-01T00:00:00Z").unwrap()));
        assert_eq!(store.snapshot().now, time);
        assert_eq!(errors.current(), None);
    }

    #[tokio::test]
    async fn transport_failure_surfaces_an_error() {
        let store = TimeStore::new();
        let errors = ErrorSurface::new();
        let fetch = FetchBaseline::new(Arc::new(FixedStatus(Err(ApplicationError::Transport(
            "connection refused".into(),
        )))));

        assert_eq!(fetch.bootstrap(&store.writer(), &errors).await, None);

        assert_eq!(store.snapshot().now, None);
        let message = errors.current().unwrap();
        assert!(message.starts_with("Unexpected error when fetching:"));
        assert!(message.contains("connection refused"));
    }

    #[tokio::test]
    async fn schema_mismatch_is_a_validation_error() {
        let fetch = FetchBaseline::new(Arc::new(FixedStatus(Ok(json!({
            "currentTick": "2024-01-01T00:00:00Z",
            "currentCount": -3
        })))));
        let err = fetch.fetch().await.unwrap_err();
        assert!(matches!(err, ApplicationError::Validation(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_request_times_out() {
        let store = TimeStore::new();
        let errors = ErrorSurface::new();
        let fetch =
            FetchBaseline::new(Arc::new(NeverAnswers)).with_timeout(Duration::from_secs(2));

        assert_eq!(fetch.bootstrap(&store.writer(), &errors).await, None);
        assert_eq!(
            errors.current().as_deref(),
            Some("Unexpected error when fetching: operation timed out")
        );
    }
}
