//! Error classification, retry with exponential backoff, and telemetry.

mod handler;
mod options;
mod telemetry;

pub use handler::{ErrorContext, ErrorHandler, ErrorState, HandledError};
pub use options::{JITTER_RATIO, RetryOptions, RetryPredicate};
pub use telemetry::{ErrorReport, LogTracker, PerformanceTracker};
