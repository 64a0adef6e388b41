//! End-of-day reminders.
//!
//! ```text
//! Waiting --(trigger instant)--> Dispatching --(scan done)--> Waiting
//! ```
//!
//! The scheduler runs as one background task. It sleeps until the next
//! trigger instant, scans that day's records and reminds every user below
//! the goal, then schedules the following day.

mod scheduler;
mod trigger;

pub use scheduler::{CycleReport, ReminderHandle, ReminderScheduler, SchedulerState};
pub use trigger::{next_trigger_after, time_until, time_until_in};
