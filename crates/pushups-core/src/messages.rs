//! User-facing texts. All output is Telegram HTML.

use indoc::formatdoc;

use crate::accumulator::Accumulated;
use crate::error::ValidationError;
use crate::progress::{DayProgress, History};
use crate::record::DAY_FORMAT;

pub fn help(goal: u32) -> String {
    formatdoc! {"
        🏋️ <b>{goal} push-ups a day tracker</b>

        Commands:
        /add &lt;number&gt; — log push-ups
        /progress — today's progress
        /calendar — recent history

        <i>Goal: {goal} push-ups every day!</i>"
    }
}

pub fn validation(err: &ValidationError) -> String {
    match err {
        ValidationError::MissingAmount => "Usage: /add &lt;number&gt;".to_string(),
        ValidationError::InvalidValue { message, .. } => format!("❌ {message}"),
        ValidationError::InvalidAmount(_) | ValidationError::NonPositiveAmount(_) => {
            "❌ Enter a number greater than 0!".to_string()
        }
    }
}

pub fn storage_failure() -> String {
    "❌ Database error! Please try again later.".to_string()
}

pub fn added(acc: &Accumulated) -> String {
    if acc.goal_met() {
        format!(
            "🔥 <b>You did {} push-ups today!</b> Keep it up!\nTotal today: {}",
            acc.goal,
            acc.total()
        )
    } else {
        format!(
            "✅ +{} push-ups! Total today: {}/{}\nRemaining: {}",
            acc.added,
            acc.total(),
            acc.goal,
            acc.remaining()
        )
    }
}

pub fn no_activity_today() -> String {
    "📌 No push-ups yet today. Go for the goal!".to_string()
}

pub fn progress(p: &DayProgress) -> String {
    let status = if p.goal_met() {
        "🔥 Goal met!".to_string()
    } else {
        format!("Remaining: {}", p.remaining())
    };
    format!(
        "📊 <b>Today's progress:</b>\n\n{}\n{} of {} push-ups\n{}",
        p.bar(),
        p.count,
        p.goal,
        status
    )
}

pub fn calendar(history: &History, window_days: usize) -> String {
    if history.is_empty() {
        return "📅 No push-ups recorded yet.".to_string();
    }
    let mut text = format!("📅 <b>Last {window_days} days:</b>\n\n");
    for day in history {
        text.push_str(&format!(
            "<i>{}:</i> {} <b>{}</b>/{}\n",
            day.day.format(DAY_FORMAT),
            day.bar(),
            day.count,
            day.goal
        ));
    }
    text
}

pub fn reminder(count: u32, goal: u32) -> String {
    format!(
        "⏰ <b>Reminder</b>\nToday you did {count}/{goal} push-ups.\nOnly {} to go! 💪",
        goal.saturating_sub(count)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DailyRecord, UserId};
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn added_below_goal_shows_deficit() {
        let acc = Accumulated {
            added: 40,
            record: DailyRecord::new(UserId(1), day(), 40),
            goal: 100,
        };
        let text = added(&acc);
        assert!(text.contains("+40"));
        assert!(text.contains("40/100"));
        assert!(text.contains("Remaining: 60"));
    }

    #[test]
    fn added_at_goal_is_framed_as_met() {
        let acc = Accumulated {
            added: 70,
            record: DailyRecord::new(UserId(1), day(), 110),
            goal: 100,
        };
        let text = added(&acc);
        assert!(text.contains("You did 100 push-ups today"));
        assert!(!text.contains("Remaining"));
    }

    #[test]
    fn progress_over_goal_says_met() {
        let p = DayProgress {
            day: day(),
            count: 110,
            goal: 100,
        };
        let text = progress(&p);
        assert!(text.contains("110 of 100"));
        assert!(text.contains("Goal met"));
        assert!(text.contains("■■■■■■■■■■"));
    }

    #[test]
    fn reminder_states_count_and_deficit() {
        let text = reminder(35, 100);
        assert!(text.contains("35/100"));
        assert!(text.contains("Only 65 to go"));
    }

    #[test]
    fn help_escapes_angle_brackets() {
        let text = help(100);
        assert!(text.contains("/add &lt;number&gt;"));
        assert!(!text.contains("<number>"));
    }

    #[test]
    fn validation_messages() {
        assert!(validation(&ValidationError::MissingAmount).starts_with("Usage"));
        assert!(validation(&ValidationError::NonPositiveAmount(-5)).contains("greater than 0"));
    }
}
