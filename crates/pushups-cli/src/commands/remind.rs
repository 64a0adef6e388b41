use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use clap::Args;
use pushups_core::integrations::telegram::resolve_token;
use pushups_core::{
    Clock, Config, Notifier, NotifyError, ReminderScheduler, SystemClock, TelegramClient, UserId,
};

use super::{open_database, print_json, CommandResult};

#[derive(Args)]
pub struct RemindArgs {
    /// Day to scan, YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Print reminders instead of sending them
    #[arg(long)]
    dry_run: bool,
    /// Output the cycle report as JSON
    #[arg(long)]
    json: bool,
}

/// Prints reminders instead of sending them.
///
/// Lines go to stderr when stdout carries the JSON report.
struct ConsoleNotifier {
    stderr: bool,
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, user: UserId, text: &str) -> Result<(), NotifyError> {
        let line = format!("[{user}] {}", text.replace('\n', " "));
        if self.stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
        Ok(())
    }
}

pub async fn run(args: RemindArgs) -> CommandResult {
    let config = Config::load()?;
    let store = open_database(&config)?;
    let clock = Arc::new(SystemClock);
    let day = args.date.unwrap_or_else(|| clock.today());

    let notifier: Arc<dyn Notifier> = if args.dry_run {
        Arc::new(ConsoleNotifier { stderr: args.json })
    } else {
        let token = resolve_token().ok_or(NotifyError::NotConfigured)?;
        Arc::new(TelegramClient::new(token, config.telegram.api_base.clone())?)
    };

    let scheduler = ReminderScheduler::new(
        store,
        notifier,
        clock,
        config.goal.daily,
        config.reminder_time()?,
    );
    let report = scheduler.run_cycle(day).await?;

    if args.json {
        return print_json(&report);
    }
    println!(
        "{}: {} scanned, {} below goal, {} notified, {} failed",
        report.day, report.scanned, report.below_goal, report.notified, report.failed
    );
    Ok(())
}
