//! Recurrence engine: next occurrence of a repeating task, and the
//! completion transition that renews it.

use crate::clock::{local_datetime, resolve_local};
use crate::reminder::policy::{build_reminder_config, effective_target};
use crate::task::{RepeatRule, Task, Timestamp};
use chrono::{Datelike, Days, Months, NaiveDate, TimeZone};
use tracing::debug;

/// Next due time after completing an occurrence due at `completed_due_at`.
///
/// Returns `None` for [`RepeatRule::None`]. The local time of day of
/// `completed_due_at` is preserved.
pub fn next_occurrence<Tz: TimeZone>(
    rule: &RepeatRule,
    completed_due_at: Timestamp,
    tz: &Tz,
) -> Option<Timestamp> {
    let base = local_datetime(completed_due_at, tz);
    let base_date = base.date_naive();

    let next_date = match rule {
        RepeatRule::None => return None,
        RepeatRule::Daily { workday_only } => next_daily(base_date, *workday_only),
        RepeatRule::Weekly { days } => next_weekly(base_date, days.iter().copied()),
        RepeatRule::Monthly { day } => next_monthly(base_date, *day),
        RepeatRule::Yearly { month, day } => next_yearly(base_date, *month, *day),
    };

    let naive = next_date.and_time(base.time());
    let resolved = resolve_local(tz, naive)
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| {
            let days = next_date.signed_duration_since(base_date).num_days();
            completed_due_at.saturating_add(days.saturating_mul(86_400))
        });
    Some(resolved)
}

fn next_daily(date: NaiveDate, workday_only: bool) -> NaiveDate {
    let mut next = add_days(date, 1);
    if workday_only {
        while !crate::clock::is_workday(next) {
            next = add_days(next, 1);
        }
    }
    next
}

fn next_weekly(date: NaiveDate, days: impl Iterator<Item = u8>) -> NaiveDate {
    let current = date.weekday().number_from_monday();
    let mut valid: Vec<u32> = days
        .map(u32::from)
        .filter(|d| (1..=7).contains(d))
        .collect();
    valid.sort_unstable();

    let offset = match valid.iter().find(|d| **d > current) {
        Some(later) => later - current,
        None => match valid.first() {
            Some(first) => 7 - current + first,
            // Empty sets are rejected at the edit boundary.
            None => 7,
        },
    };
    add_days(date, u64::from(offset))
}

fn next_monthly(date: NaiveDate, day: u8) -> NaiveDate {
    let first = first_of_month(date);
    let target_month = first.checked_add_months(Months::new(1)).unwrap_or(first);
    clamp_to_month(target_month.year(), target_month.month(), day).unwrap_or(date)
}

fn next_yearly(date: NaiveDate, month: u8, day: u8) -> NaiveDate {
    let month = u32::from(month.clamp(1, 12));
    clamp_to_month(date.year() + 1, month, day).unwrap_or(date)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// `day` in the given month, clamped to the month's last day.
fn clamp_to_month(year: i32, month: u32, day: u8) -> Option<NaiveDate> {
    let last = last_day_of_month(year, month)?;
    let day = u32::from(day).clamp(1, last);
    NaiveDate::from_ymd_opt(year, month, day)
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    next.pred_opt().map(|last| last.day())
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}

/// Result of completing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The task as completed.
    pub completed: Task,
    /// Renewed occurrence, when the task has an active repeat rule.
    pub next: Option<Task>,
}

/// Complete `task` at `now` and renew it if it repeats.
///
/// Any pending reminder on the completed record is discarded. The renewed
/// record gets a fresh due time, a reset reminder whose target keeps the
/// previous lead time, and incomplete steps. A task that is already
/// completed is returned unchanged and is not renewed again.
pub fn complete_task<Tz: TimeZone>(task: &Task, now: Timestamp, tz: &Tz) -> Completion {
    if task.completed {
        debug!(task_id = %task.id, "task already completed");
        return Completion {
            completed: task.clone(),
            next: None,
        };
    }

    let mut completed = task.clone();
    completed.completed = true;
    completed.completed_at = Some(now);
    completed.updated_at = now;
    if let Some(target) = effective_target(&completed.reminder, completed.due_at) {
        let fired = completed.reminder.last_fired_at.unwrap_or(target).max(target);
        completed.reminder.last_fired_at = Some(fired);
    }
    completed.reminder.snoozed_until = None;

    let next = next_occurrence(&task.repeat, task.due_at, tz).map(|due_at| {
        let lead = task.reminder.lead_minutes(task.due_at);
        let mut next = task.clone();
        next.id = renewed_id(&task.id, now);
        next.due_at = due_at;
        next.completed = false;
        next.completed_at = None;
        next.created_at = now;
        next.updated_at = now;
        for step in &mut next.steps {
            step.completed = false;
            step.completed_at = None;
        }
        next.reminder = build_reminder_config(task.reminder.kind, due_at, lead, now);
        next
    });

    debug!(
        task_id = %task.id,
        repeat = %task.repeat,
        next_id = next.as_ref().map(|t| t.id.as_str()).unwrap_or("-"),
        next_due = next.as_ref().map(|t| t.due_at),
        "task completed"
    );

    Completion { completed, next }
}

/// Reopen a completed task.
pub fn uncomplete_task(task: &mut Task, now: Timestamp) {
    task.completed = false;
    task.completed_at = None;
    task.updated_at = now;
}

/// Id for the renewed occurrence: `{base}@{now}`, where a suffix from a
/// previous renewal is replaced rather than stacked. Only the `@` suffix
/// is ever stripped, so distinct ids stay distinct.
fn renewed_id(id: &str, now: Timestamp) -> String {
    let base = match id.rsplit_once('@') {
        Some((head, tail))
            if !head.is_empty() && !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) =>
        {
            head
        }
        _ => id,
    };
    format!("{base}@{now}")
}
