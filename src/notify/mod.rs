use chrono::{DateTime, Duration, Utc};
use log::{error, info, warn};
use std::sync::Mutex;

/// Default auto-dismiss time for a toast, matching the web UI.
pub const DEFAULT_TOAST_MS: i64 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Icon shown in front of the toast message.
    pub fn icon(self) -> &'static str {
        match self {
            Severity::Success => "✓",
            Severity::Error => "✕",
            Severity::Warning => "⚠",
            Severity::Info => "ℹ",
        }
    }
}

/// A transient notification with an auto-dismiss deadline.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
    pub raised_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl Toast {
    pub fn expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.raised_at + Duration::milliseconds(self.duration_ms)
    }
}

/// Sink for user-facing notifications. The vote controller and the event
/// handlers report outcomes here instead of printing directly.
pub trait Notifier: Send + Sync {
    fn toast(&self, message: &str, severity: Severity, duration_ms: i64);

    fn success(&self, message: &str) {
        self.toast(message, Severity::Success, DEFAULT_TOAST_MS);
    }

    fn error(&self, message: &str) {
        self.toast(message, Severity::Error, DEFAULT_TOAST_MS);
    }

    fn warning(&self, message: &str) {
        self.toast(message, Severity::Warning, DEFAULT_TOAST_MS);
    }

    fn info(&self, message: &str) {
        self.toast(message, Severity::Info, DEFAULT_TOAST_MS);
    }
}

/// Production notifier: renders toasts to stdout and mirrors them to the log.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn toast(&self, message: &str, severity: Severity, _duration_ms: i64) {
        println!("{} {}", severity.icon(), message);
        match severity {
            Severity::Error => error!("toast: {}", message),
            Severity::Warning => warn!("toast: {}", message),
            Severity::Success | Severity::Info => info!("toast: {}", message),
        }
    }
}

/// Test notifier that records every toast it receives.
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            toasts: Mutex::new(Vec::new()),
        }
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.toasts.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.lock().unwrap().is_empty()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for RecordingNotifier {
    fn toast(&self, message: &str, severity: Severity, duration_ms: i64) {
        self.toasts.lock().unwrap().push(Toast {
            message: message.to_string(),
            severity,
            raised_at: Utc::now(),
            duration_ms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_captures_toasts() {
        let notifier = RecordingNotifier::new();
        assert!(notifier.is_empty());

        notifier.error("Vote failed. Please try again.");
        notifier.success("Vote recorded.");

        let toasts = notifier.toasts();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].severity, Severity::Error);
        assert_eq!(toasts[1].message, "Vote recorded.");
        assert_eq!(toasts[1].duration_ms, DEFAULT_TOAST_MS);
    }

    #[test]
    fn toast_expiry_honors_duration() {
        let raised_at = Utc::now();
        let toast = Toast {
            message: "hello".to_string(),
            severity: Severity::Info,
            raised_at,
            duration_ms: 4000,
        };

        assert!(!toast.expired_at(raised_at + Duration::milliseconds(3999)));
        assert!(toast.expired_at(raised_at + Duration::milliseconds(4000)));
    }
}
