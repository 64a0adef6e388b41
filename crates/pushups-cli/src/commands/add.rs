use std::sync::Arc;

use clap::Args;
use pushups_core::{Accumulator, Config, SystemClock, UserId};

use super::{open_database, print_json, CommandResult};

#[derive(Args)]
pub struct AddArgs {
    /// Telegram user id
    #[arg(long)]
    user: i64,
    /// Number of push-ups (positive integer)
    #[arg(allow_hyphen_values = true)]
    amount: String,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: AddArgs) -> CommandResult {
    let config = Config::load()?;
    let store = open_database(&config)?;
    let accumulator = Accumulator::new(store, Arc::new(SystemClock), config.goal.daily);

    let added = accumulator.add_from_text(UserId(args.user), Some(&args.amount))?;
    if args.json {
        return print_json(&added);
    }

    println!("+{} push-ups, total today: {}/{}", added.added, added.total(), added.goal);
    if added.goal_met() {
        println!("goal met");
    } else {
        println!("remaining: {}", added.remaining());
    }
    Ok(())
}
