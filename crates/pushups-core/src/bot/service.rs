//! Command handling on top of the accumulator and reporter.

use std::sync::Arc;

use tracing::{debug, error};

use super::command::Command;
use crate::accumulator::Accumulator;
use crate::clock::Clock;
use crate::error::CoreError;
use crate::messages;
use crate::progress::ProgressReporter;
use crate::record::UserId;
use crate::storage::RecordStore;

/// Turns commands into reply texts.
///
/// Never fails: validation problems and storage errors become replies, and
/// storage errors are logged.
#[derive(Clone)]
pub struct BotService {
    accumulator: Accumulator,
    reporter: ProgressReporter,
    goal: u32,
    history_days: usize,
}

impl BotService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        goal: u32,
        history_days: usize,
    ) -> Self {
        Self {
            accumulator: Accumulator::new(store.clone(), clock.clone(), goal),
            reporter: ProgressReporter::new(store, clock, goal),
            goal,
            history_days,
        }
    }

    /// Parse `text` and handle it; `None` if it is not a command.
    pub fn handle_text(&self, user: UserId, text: &str) -> Option<String> {
        Command::parse(text).map(|command| self.handle(user, &command))
    }

    pub fn handle(&self, user: UserId, command: &Command) -> String {
        debug!(user = %user, command = command.name(), "handling command");
        match command {
            Command::Start => messages::help(self.goal),
            Command::Add(arg) => match self.accumulator.add_from_text(user, arg.as_deref()) {
                Ok(acc) => messages::added(&acc),
                Err(e) => self.failure_reply(user, command, e),
            },
            Command::Progress => match self.reporter.today_progress(user) {
                Ok(Some(progress)) => messages::progress(&progress),
                Ok(None) => messages::no_activity_today(),
                Err(e) => self.failure_reply(user, command, e),
            },
            Command::Calendar => match self.reporter.recent_history(user, self.history_days) {
                Ok(history) => messages::calendar(&history, self.history_days),
                Err(e) => self.failure_reply(user, command, e),
            },
        }
    }

    fn failure_reply(&self, user: UserId, command: &Command, err: CoreError) -> String {
        match err {
            CoreError::Validation(v) => messages::validation(&v),
            other => {
                error!(
                    user = %user,
                    command = command.name(),
                    retryable = other.is_retryable(),
                    error = %other,
                    "command failed"
                );
                messages::storage_failure()
            }
        }
    }
}
