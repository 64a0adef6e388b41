use std::sync::Arc;

use clap::Args;
use pushups_core::{Config, ProgressReporter, SystemClock, UserId};

use super::{open_database, print_json, CommandResult};

#[derive(Args)]
pub struct ProgressArgs {
    /// Telegram user id
    #[arg(long)]
    user: i64,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ProgressArgs) -> CommandResult {
    let config = Config::load()?;
    let store = open_database(&config)?;
    let reporter = ProgressReporter::new(store, Arc::new(SystemClock), config.goal.daily);

    let today = reporter.today_progress(UserId(args.user))?;
    if args.json {
        return print_json(&today);
    }

    match today {
        Some(p) => {
            println!("{} {}/{}", p.bar(), p.count, p.goal);
            if p.goal_met() {
                println!("goal met");
            } else {
                println!("remaining: {}", p.remaining());
            }
        }
        None => println!("no push-ups recorded today"),
    }
    Ok(())
}
