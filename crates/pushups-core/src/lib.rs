//! # Pushups Core Library
//!
//! Core logic for a daily push-up tracker bot: users log counts, the library
//! keeps one running total per user per day, reports progress against a
//! fixed daily goal, and reminds users who are behind near the end of the
//! day.
//!
//! ## Architecture
//!
//! - **Storage**: SQLite record store behind the [`RecordStore`] trait and
//!   TOML-based configuration
//! - **Accumulator**: the only writer; one atomic upsert per increment
//! - **Progress**: today's total, recent history and the 10-segment bar
//! - **Reminders**: a background task that fires once a day at a fixed
//!   local time
//! - **Integrations**: Telegram Bot API transport behind [`Notifier`]
//!
//! ## Key Components
//!
//! - [`Accumulator`]: validated increments of today's total
//! - [`ProgressReporter`]: read-only progress queries
//! - [`ReminderScheduler`]: daily reminder loop
//! - [`BotService`] / [`BotRunner`]: command handling and long polling

pub mod accumulator;
pub mod bot;
pub mod clock;
pub mod error;
pub mod integrations;
pub mod messages;
pub mod progress;
pub mod record;
pub mod reminder;
pub mod storage;

pub use accumulator::{parse_amount, Accumulated, Accumulator};
pub use bot::{BotRunner, BotService, Command};
pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use error::{ConfigError, CoreError, DatabaseError, NotifyError, ValidationError};
pub use integrations::{Notifier, TelegramClient};
pub use progress::{DayProgress, History, ProgressBar, ProgressReporter};
pub use record::{DailyRecord, UserId, DEFAULT_DAILY_GOAL};
pub use reminder::{next_trigger_after, CycleReport, ReminderHandle, ReminderScheduler, SchedulerState};
pub use storage::{Config, Database, RecordStore};
