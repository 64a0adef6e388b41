use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::trigger::next_trigger_after;
use crate::clock::Clock;
use crate::error::DatabaseError;
use crate::integrations::Notifier;
use crate::messages;
use crate::storage::RecordStore;

/// Where the scheduler currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SchedulerState {
    /// Sleeping until the next trigger instant.
    Waiting { until: NaiveDateTime },
    /// Scanning `day` and sending reminders.
    Dispatching { day: NaiveDate },
    /// Shut down through its handle.
    Stopped,
}

/// Summary of one dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub day: NaiveDate,
    /// Records found for `day`.
    pub scanned: usize,
    pub below_goal: usize,
    pub notified: usize,
    pub failed: usize,
}

/// Daily reminder loop.
pub struct ReminderScheduler {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    goal: u32,
    trigger_time: NaiveTime,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        goal: u32,
        trigger_time: NaiveTime,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            goal,
            trigger_time,
        }
    }

    pub fn trigger_time(&self) -> NaiveTime {
        self.trigger_time
    }

    /// Remind every user whose total for `day` is below the goal.
    ///
    /// Users with no record for `day` are not contacted. A failed send is
    /// logged and counted; the remaining users are still notified.
    ///
    /// # Errors
    /// Returns the storage error if `day` cannot be scanned. Nothing is sent
    /// in that case.
    pub async fn run_cycle(&self, day: NaiveDate) -> Result<CycleReport, DatabaseError> {
        let records = self.store.records_for_day(day)?;
        let mut report = CycleReport {
            day,
            scanned: records.len(),
            below_goal: 0,
            notified: 0,
            failed: 0,
        };

        for record in records.iter().filter(|r| !r.goal_met(self.goal)) {
            report.below_goal += 1;
            let text = messages::reminder(record.count, self.goal);
            match self.notifier.notify(record.user, &text).await {
                Ok(()) => {
                    report.notified += 1;
                    debug!(user = %record.user, count = record.count, "reminder sent");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(user = %record.user, error = %e, "failed to send reminder");
                }
            }
        }

        Ok(report)
    }

    /// Start the loop on the current tokio runtime.
    ///
    /// The first trigger is the next `trigger_time` after now. Dropping the
    /// returned handle closes the shutdown channel, so the loop exits right
    /// away and the task is detached.
    pub fn spawn(self) -> ReminderHandle {
        let first = next_trigger_after(self.clock.now(), self.trigger_time);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(SchedulerState::Waiting { until: first });
        let task = tokio::spawn(self.run(first, shutdown_rx, state_tx));
        ReminderHandle {
            shutdown: shutdown_tx,
            state: state_rx,
            task,
        }
    }

    async fn run(
        self,
        first: NaiveDateTime,
        mut shutdown: watch::Receiver<bool>,
        state: watch::Sender<SchedulerState>,
    ) {
        let mut next = first;
        info!(next = %next, "reminder scheduler started");

        loop {
            state.send_replace(SchedulerState::Waiting { until: next });
            let wait = self.clock.until(next);
            debug!(next = %next, ?wait, "waiting for reminder trigger");

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let now = self.clock.now();
            if now < next {
                // Woke early relative to the wall clock; sleep the rest.
                continue;
            }

            if now.date() == next.date() {
                let day = next.date();
                state.send_replace(SchedulerState::Dispatching { day });
                match self.run_cycle(day).await {
                    Ok(report) => info!(
                        %day,
                        scanned = report.scanned,
                        below_goal = report.below_goal,
                        notified = report.notified,
                        failed = report.failed,
                        "reminder cycle finished"
                    ),
                    Err(e) => error!(%day, error = %e, "reminder scan failed, skipping cycle"),
                }
            } else {
                warn!(missed = %next, now = %now, "reminder day already over, skipping");
            }

            // Measured from whichever is later so a late wake-up never
            // replays days that were missed.
            next = next_trigger_after(now.max(next), self.trigger_time);
        }

        state.send_replace(SchedulerState::Stopped);
        info!("reminder scheduler stopped");
    }
}

/// Control handle for a spawned [`ReminderScheduler`].
pub struct ReminderHandle {
    shutdown: watch::Sender<bool>,
    state: watch::Receiver<SchedulerState>,
    task: JoinHandle<()>,
}

impl ReminderHandle {
    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "reminder scheduler task failed");
        }
    }
}
