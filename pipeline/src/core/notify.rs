//! Run outcome notification
//!
//! Chat/webhook delivery lives outside this crate; the pipeline only reports
//! through the [`Notifier`] contract. [`LogNotifier`] routes events into the
//! tracing subscriber.

use std::time::Duration;

use super::constants::APP_NAME;

/// Outcome of one pipeline invocation
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Succeeded {
        line_items: usize,
        facts: usize,
        total_rows: usize,
        elapsed: Duration,
    },
    /// No line items were produced; nothing was written
    Skipped { elapsed: Duration },
    Failed { error: String },
}

impl RunEvent {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Human-readable one-line message
    pub fn message(&self) -> String {
        match self {
            Self::Succeeded {
                line_items,
                facts,
                total_rows,
                elapsed,
            } => format!(
                "{} sales refresh completed in {:.1}s: {} line items, {} facts, {} rows in table",
                APP_NAME,
                elapsed.as_secs_f64(),
                line_items,
                facts,
                total_rows
            ),
            Self::Skipped { elapsed } => format!(
                "{} sales refresh found no line items after {:.1}s; tables left unchanged",
                APP_NAME,
                elapsed.as_secs_f64()
            ),
            Self::Failed { error } => format!("{} sales refresh failed: {}", APP_NAME, error),
        }
    }
}

/// Receives run outcomes
pub trait Notifier {
    fn notify(&self, event: &RunEvent);
}

/// Notifier that writes events to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &RunEvent) {
        let message = event.message();
        match event {
            RunEvent::Succeeded { .. } => tracing::info!(notification = %message, "Run succeeded"),
            RunEvent::Skipped { .. } => tracing::warn!(notification = %message, "Run skipped"),
            RunEvent::Failed { .. } => tracing::error!(notification = %message, "Run failed"),
        }
    }
}
