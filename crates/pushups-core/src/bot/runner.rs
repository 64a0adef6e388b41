//! Long-poll loop tying the transport, the command service and the
//! reminder scheduler together.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::service::BotService;
use crate::error::{CoreError, Result};
use crate::integrations::telegram::{TelegramClient, Update};
use crate::record::UserId;
use crate::reminder::ReminderScheduler;

/// Pause after a failed `getUpdates` before polling again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct BotRunner {
    client: TelegramClient,
    service: Arc<BotService>,
    poll_timeout_secs: u64,
    reminders: Option<ReminderScheduler>,
}

impl BotRunner {
    pub fn new(client: TelegramClient, service: Arc<BotService>, poll_timeout_secs: u64) -> Self {
        Self {
            client,
            service,
            poll_timeout_secs,
            reminders: None,
        }
    }

    /// Run `scheduler` alongside polling.
    pub fn with_reminders(mut self, scheduler: ReminderScheduler) -> Self {
        self.reminders = Some(scheduler);
        self
    }

    /// Serve until `shutdown` resolves.
    ///
    /// # Errors
    /// Fails before serving anything if the bot token is rejected. Errors
    /// after startup are logged and never end the loop.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let me = self.client.get_me().await.map_err(|e| {
            error!(error = %e, "bot authentication failed");
            CoreError::Notify(e)
        })?;
        info!(
            bot = me.username.as_deref().unwrap_or(&me.first_name),
            "bot authenticated"
        );

        let reminders = self.reminders.map(|scheduler| {
            info!(at = %scheduler.trigger_time(), "starting reminder scheduler");
            scheduler.spawn()
        });

        tokio::pin!(shutdown);
        let mut offset: i64 = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
                polled = self.client.get_updates(Some(offset), self.poll_timeout_secs) => {
                    match polled {
                        Ok(updates) => {
                            for update in updates {
                                offset = offset.max(update.update_id + 1);
                                process_update(&self.client, &self.service, update).await;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "polling failed, retrying");
                            tokio::time::sleep(POLL_RETRY_DELAY).await;
                        }
                    }
                }
            }
        }

        if let Some(handle) = reminders {
            handle.shutdown().await;
        }
        info!("bot stopped");
        Ok(())
    }
}

async fn process_update(client: &TelegramClient, service: &BotService, update: Update) {
    let Some(message) = update.message else {
        return;
    };
    let Some(text) = message.text.as_deref() else {
        return;
    };
    // Records are keyed by the sender; reminders go to that id as a chat.
    let user = UserId(message.from.as_ref().map_or(message.chat.id, |u| u.id));

    let Some(reply) = service.handle_text(user, text) else {
        debug!(user = %user, "ignoring non-command message");
        return;
    };
    if let Err(e) = client.send_message(message.chat.id, &reply).await {
        warn!(user = %user, chat = message.chat.id, error = %e, "failed to send reply");
    }
}
