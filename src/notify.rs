//! Notification gateway. The SMS transport is injected; the shipped
//! implementation only logs what it would have sent.

use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// `true` when the provider accepted the message. No retries.
    async fn send_alert(&self, destination: &str, message: &str) -> bool;
}

/// Simulated SMS delivery through the log.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier {
    from: Option<String>,
}

impl LogNotifier {
    pub fn new(from: Option<String>) -> Self {
        Self { from }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_alert(&self, destination: &str, message: &str) -> bool {
        info!(
            to = %destination,
            from = self.from.as_deref().unwrap_or("-"),
            %message,
            "simulated sms send"
        );
        true
    }
}
