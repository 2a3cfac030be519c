use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient notification for the host to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
}

impl Toast {
    pub fn success(message: &str) -> Self {
        Self::new(message, Severity::Success)
    }

    pub fn error(message: &str) -> Self {
        Self::new(message, Severity::Error)
    }

    pub fn new(message: &str, severity: Severity) -> Self {
        Self {
            message: message.to_string(),
            severity,
        }
    }
}

/// Where toasts go. The host owns display and dismissal.
pub trait Notifier {
    fn notify(&mut self, toast: Toast);
}

/// Collects toasts for hosts that poll.
#[derive(Debug, Default)]
pub struct ToastQueue {
    pending: Vec<Toast>,
}

impl ToastQueue {
    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Notifier for ToastQueue {
    fn notify(&mut self, toast: Toast) {
        self.pending.push(toast);
    }
}
