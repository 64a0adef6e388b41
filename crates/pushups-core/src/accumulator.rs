//! Applying increments to today's record.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use crate::clock::Clock;
use crate::error::{Result, ValidationError};
use crate::record::{DailyRecord, UserId};
use crate::storage::RecordStore;

/// Parse the argument of `add <amount>`.
///
/// Only the first whitespace-separated token is considered.
pub fn parse_amount(arg: Option<&str>) -> Result<u32, ValidationError> {
    let token = arg
        .and_then(|a| a.split_whitespace().next())
        .ok_or(ValidationError::MissingAmount)?;
    let amount: i64 = token
        .parse()
        .map_err(|_| ValidationError::InvalidAmount(token.to_string()))?;
    validate_amount(amount)
}

fn validate_amount(amount: i64) -> Result<u32, ValidationError> {
    if amount <= 0 {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    u32::try_from(amount).map_err(|_| ValidationError::InvalidValue {
        field: "amount".into(),
        message: format!("must fit in a daily total (at most {})", u32::MAX),
    })
}

/// Outcome of a successful increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Accumulated {
    pub added: u32,
    pub record: DailyRecord,
    pub goal: u32,
}

impl Accumulated {
    pub fn total(&self) -> u32 {
        self.record.count
    }

    pub fn goal_met(&self) -> bool {
        self.record.goal_met(self.goal)
    }

    pub fn remaining(&self) -> u32 {
        self.record.remaining(self.goal)
    }
}

/// The only writer of daily records.
#[derive(Clone)]
pub struct Accumulator {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    goal: u32,
}

impl Accumulator {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, goal: u32) -> Self {
        Self { store, clock, goal }
    }

    /// Add `amount` to today's total for `user` and return the new total.
    ///
    /// Non-positive amounts fail validation before storage is touched.
    /// Storage failures are returned as retryable [`CoreError::Database`](crate::CoreError::Database).
    pub fn add_count(&self, user: UserId, amount: i64) -> Result<Accumulated> {
        let amount = validate_amount(amount)?;
        let day = self.clock.today();
        let total = self.store.upsert_add(user, day, amount).map_err(|e| {
            error!(user = %user, %day, error = %e, "failed to record increment");
            e
        })?;
        debug!(user = %user, %day, amount, total, "recorded increment");
        Ok(Accumulated {
            added: amount,
            record: DailyRecord::new(user, day, total),
            goal: self.goal,
        })
    }

    /// [`parse_amount`] then [`add_count`](Self::add_count).
    pub fn add_from_text(&self, user: UserId, arg: Option<&str>) -> Result<Accumulated> {
        let amount = parse_amount(arg)?;
        self.add_count(user, i64::from(amount))
    }

    pub fn goal(&self) -> u32 {
        self.goal
    }
}
