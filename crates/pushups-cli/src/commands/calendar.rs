use std::sync::Arc;

use clap::Args;
use pushups_core::{Config, ProgressReporter, SystemClock, UserId};

use super::{open_database, print_json, CommandResult};

#[derive(Args)]
pub struct CalendarArgs {
    /// Telegram user id
    #[arg(long)]
    user: i64,
    /// Number of active days to show (default: history.days)
    #[arg(long)]
    days: Option<usize>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: CalendarArgs) -> CommandResult {
    let config = Config::load()?;
    let store = open_database(&config)?;
    let reporter = ProgressReporter::new(store, Arc::new(SystemClock), config.goal.daily);

    let days = args.days.unwrap_or(config.history.days as usize);
    let history = reporter.recent_history(UserId(args.user), days)?;
    if args.json {
        return print_json(&history);
    }

    if history.is_empty() {
        println!("no push-ups recorded");
    }
    for day in &history {
        println!("{}  {} {:>4}/{}", day.day, day.bar(), day.count, day.goal);
    }
    Ok(())
}
