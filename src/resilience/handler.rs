// src/resilience/handler.rs

//! Error handling with classification and exponential-backoff retry.
//!
//! [`ErrorHandler`] wraps an async operation, classifies each failure,
//! reports it to an optional [`PerformanceTracker`], and retries according
//! to [`RetryOptions`]. A terminal failure is always returned to the caller.
//! The handler publishes an [`ErrorState`] snapshot through a watch channel
//! for UI binding; only the handler writes it.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::watch;

use super::options::RetryOptions;
use super::telemetry::{ErrorReport, PerformanceTracker};
use crate::error::{AppError, ErrorKind, Result};

/// Where an operation runs, for telemetry and display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    pub component: String,
    pub action: String,
}

impl ErrorContext {
    pub fn new(component: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            action: action.into(),
        }
    }
}

/// A classified failure.
#[derive(Debug, Clone, PartialEq)]
pub struct HandledError {
    pub kind: ErrorKind,
    pub message: String,
    pub user_message: &'static str,
    pub context: ErrorContext,
    pub occurred_at: DateTime<Utc>,
}

/// Shared error state exposed to the rendering layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorState {
    pub has_error: bool,
    pub error: Option<HandledError>,
    pub is_retrying: bool,
    pub retry_count: u32,
}

/// Retrying error handler. Clones share the same state.
#[derive(Clone)]
pub struct ErrorHandler {
    state: Arc<watch::Sender<ErrorState>>,
    tracker: Option<Arc<dyn PerformanceTracker>>,
}

impl ErrorHandler {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ErrorState::default());
        Self {
            state: Arc::new(state),
            tracker: None,
        }
    }

    /// Report every failed attempt to `tracker`.
    pub fn with_tracker(mut self, tracker: Arc<dyn PerformanceTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Current state snapshot.
    pub fn state(&self) -> ErrorState {
        self.state.borrow().clone()
    }

    /// Receive a notification on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ErrorState> {
        self.state.subscribe()
    }

    /// Reset to the no-error state.
    pub fn clear_error(&self) {
        self.state.send_replace(ErrorState::default());
    }

    /// Run `operation` until it succeeds, the predicate declines, or
    /// `options.max_attempts` is exhausted.
    pub async fn run<T, F, Fut>(
        &self,
        context: &ErrorContext,
        options: &RetryOptions,
        mut operation: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = options.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let error = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        log::info!(
                            "{}.{} succeeded after {} attempts",
                            context.component,
                            context.action,
                            attempt
                        );
                    }
                    self.state.send_modify(|state| {
                        state.has_error = false;
                        state.error = None;
                        state.is_retrying = false;
                        state.retry_count = attempt - 1;
                    });
                    return Ok(value);
                }
                Err(error) => error,
            };

            let handled = Self::classify(&error, context);
            self.report(&handled, attempt);

            let retry = attempt < max_attempts && (options.should_retry)(&error, attempt);
            if !retry {
                log::error!(
                    "{}.{} failed after {} attempt(s) [{}]: {}",
                    context.component,
                    context.action,
                    attempt,
                    handled.kind,
                    error
                );
                self.state.send_modify(|state| {
                    state.has_error = true;
                    state.error = Some(handled);
                    state.is_retrying = false;
                    state.retry_count = attempt - 1;
                });
                return Err(error);
            }

            let delay = options.delay_for(attempt);
            log::warn!(
                "{}.{} attempt {}/{} failed [{}]: {}. Retrying in {:?}",
                context.component,
                context.action,
                attempt,
                max_attempts,
                handled.kind,
                error,
                delay
            );
            self.state.send_modify(|state| {
                state.has_error = true;
                state.error = Some(handled);
                state.is_retrying = true;
                state.retry_count = attempt;
            });

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Wrap `operation` into a function with the same argument, adding
    /// classification, telemetry and retry.
    pub fn with_error_handling<A, T, F, Fut>(
        &self,
        operation: F,
        context: ErrorContext,
        options: RetryOptions,
    ) -> impl Fn(A) -> BoxFuture<'static, Result<T>> + Send + Sync + 'static
    where
        A: Clone + Send + Sync + 'static,
        T: Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let handler = self.clone();
        let operation = Arc::new(operation);

        move |args: A| {
            let handler = handler.clone();
            let operation = Arc::clone(&operation);
            let context = context.clone();
            let options = options.clone();

            async move {
                handler
                    .run(&context, &options, move || (*operation)(args.clone()))
                    .await
            }
            .boxed()
        }
    }

    fn classify(error: &AppError, context: &ErrorContext) -> HandledError {
        let kind = error.kind();
        HandledError {
            kind,
            message: error.to_string(),
            user_message: kind.user_message(),
            context: context.clone(),
            occurred_at: Utc::now(),
        }
    }

    fn report(&self, handled: &HandledError, attempt: u32) {
        let Some(tracker) = &self.tracker else {
            return;
        };
        let report = ErrorReport::new(
            handled.kind,
            &handled.context.component,
            &handled.context.action,
            attempt,
            &handled.message,
        );
        if let Err(e) = tracker.track_error(&report) {
            log::warn!("Failed to record error telemetry: {}", e);
        }
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingTracker {
        reports: Mutex<Vec<ErrorReport>>,
        fail: bool,
    }

    impl PerformanceTracker for RecordingTracker {
        fn track_error(&self, report: &ErrorReport) -> Result<()> {
            self.reports.lock().push(report.clone());
            if self.fail {
                return Err(AppError::network("telemetry endpoint down"));
            }
            Ok(())
        }
    }

    fn context() -> ErrorContext {
        ErrorContext::new("EventsStore", "fetch_events")
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempts_then_reraises() {
        let handler = ErrorHandler::new();
        let calls = AtomicU32::new(0);
        let options = RetryOptions::default().with_max_attempts(3);

        let result: Result<()> = handler
            .run(&context(), &options, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AppError::http(503, "Service Unavailable")) }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let state = handler.state();
        assert!(state.has_error);
        assert!(!state.is_retrying);
        assert_eq!(state.retry_count, 2);
        assert_eq!(state.error.unwrap().kind, ErrorKind::Server);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failure() {
        let handler = ErrorHandler::new();
        let calls = AtomicU32::new(0);

        let value = handler
            .run(&context(), &RetryOptions::default(), || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(AppError::network("connection reset"))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 42);
        let state = handler.state();
        assert!(!state.has_error);
        assert_eq!(state.retry_count, 1);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let handler = ErrorHandler::new();
        let calls = AtomicU32::new(0);

        let result: Result<()> = handler
            .run(&context(), &RetryOptions::default(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AppError::http(404, "Not Found")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let error = handler.state().error.unwrap();
        assert_eq!(error.kind, ErrorKind::NotFound);
        assert_eq!(error.user_message, ErrorKind::NotFound.user_message());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_delays_are_applied() {
        let handler = ErrorHandler::new();
        let options = RetryOptions::default()
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(100));
        let start = tokio::time::Instant::now();

        let _: Result<()> = handler
            .run(&context(), &options, || async {
                Err(AppError::timeout("/api/v1/events", 10))
            })
            .await;

        // 100ms + 200ms, each with at most 10% jitter.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed <= Duration::from_millis(330));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tracker_receives_every_attempt_and_failures_are_swallowed() {
        let tracker = Arc::new(RecordingTracker {
            fail: true,
            ..RecordingTracker::default()
        });
        let handler = ErrorHandler::new().with_tracker(tracker.clone());

        let result: Result<()> = handler
            .run(&context(), &RetryOptions::default(), || async {
                Err(AppError::network("offline"))
            })
            .await;

        assert!(matches!(result, Err(AppError::Network(_))));
        let reports = tracker.reports.lock();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[2].attempt, 3);
        assert_eq!(reports[0].kind, "network");
        assert_eq!(reports[0].component, "EventsStore");
    }

    #[tokio::test]
    async fn test_clear_error_notifies_subscribers() {
        let handler = ErrorHandler::new();
        let mut rx = handler.subscribe();

        let _: Result<()> = handler
            .run(&context(), &RetryOptions::no_retry(), || async {
                Err(AppError::http(401, "Unauthorized"))
            })
            .await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(
            rx.borrow_and_update().error.as_ref().unwrap().kind,
            ErrorKind::Authentication
        );

        handler.clear_error();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ErrorState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrapped_function_keeps_signature() {
        let handler = ErrorHandler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_op = Arc::clone(&calls);

        let double = handler.with_error_handling(
            move |n: u32| {
                let attempt = calls_in_op.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        Err(AppError::http(502, "Bad Gateway"))
                    } else {
                        Ok(n * 2)
                    }
                }
            },
            context(),
            RetryOptions::default(),
        );

        assert_eq!(double(21).await.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_custom_predicate_limits_retries() {
        let handler = ErrorHandler::new();
        let calls = AtomicU32::new(0);
        let options = RetryOptions::default()
            .with_base_delay(Duration::ZERO)
            .with_predicate(|error, _| error.kind() == ErrorKind::RateLimit);

        let _: Result<()> = handler
            .run(&context(), &options, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AppError::http(500, "Internal Server Error")) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
