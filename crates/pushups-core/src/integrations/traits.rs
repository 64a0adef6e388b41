use async_trait::async_trait;

use crate::error::NotifyError;
use crate::record::UserId;

/// Outbound message delivery.
///
/// The reminder scheduler and the bot runner only know users by id; the
/// transport decides how a message reaches them. `text` is Telegram-style
/// HTML.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message to one user.
    async fn notify(&self, user: UserId, text: &str) -> Result<(), NotifyError>;
}
