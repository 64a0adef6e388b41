use std::sync::Arc;

use pushups_core::integrations::telegram::resolve_token;
use pushups_core::{
    BotRunner, BotService, Config, NotifyError, ReminderScheduler, SystemClock, TelegramClient,
};
use tracing::info;

use super::{open_database, CommandResult};

pub async fn run() -> CommandResult {
    let config = Config::load()?;
    let token = resolve_token().ok_or(NotifyError::NotConfigured)?;
    let store = open_database(&config)?;
    let clock = Arc::new(SystemClock);
    let goal = config.goal.daily;

    let client = TelegramClient::new(token, config.telegram.api_base.clone())?;
    let service = Arc::new(BotService::new(
        store.clone(),
        clock.clone(),
        goal,
        config.history.days as usize,
    ));

    let mut runner = BotRunner::new(client.clone(), service, config.telegram.poll_timeout_secs);
    if config.reminder.enabled {
        let scheduler = ReminderScheduler::new(
            store,
            Arc::new(client),
            clock,
            goal,
            config.reminder_time()?,
        );
        runner = runner.with_reminders(scheduler);
    } else {
        info!("reminders disabled");
    }

    runner
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await?;
    Ok(())
}
