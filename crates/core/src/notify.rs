//! Notification sink for trade loop messages

use async_trait::async_trait;

use crate::error::ArbitrageResult;

/// Somewhere a plain text message can be delivered, usually a chat
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, text: &str) -> ArbitrageResult<()>;
}
