//! Reminder policy: effective targets, due checks and the
//! fire / snooze / dismiss / reschedule transitions.
//!
//! A reminder's target is `snoozed_until`, else `remind_at`, else the kind
//! default (`due_at - 600` for normal, `due_at` for forced). A target fires
//! at most once: `last_fired_at` records it, and only a later target (after
//! a snooze, an edit, a re-arm or a renewal) can fire again.

use crate::clock::{next_workday, relative, tomorrow_at};
use crate::config::ReminderSettings;
use crate::error::{EngineError, Result};
use crate::task::{ReminderConfig, ReminderKind, Task, Timestamp};
use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Build a reminder for a task due at `due_at`.
///
/// The target is `offset_minutes` before `due_at` but never earlier than
/// `now`, so a lead time that is already in the past fires as soon as
/// possible rather than being skipped. Negative offsets are treated as zero.
#[must_use]
pub fn build_reminder_config(
    kind: ReminderKind,
    due_at: Timestamp,
    offset_minutes: i64,
    now: Timestamp,
) -> ReminderConfig {
    if kind == ReminderKind::None {
        return ReminderConfig::disabled();
    }
    let offset = offset_minutes.max(0);
    let remind_at = due_at.saturating_sub(offset.saturating_mul(60)).max(now);
    ReminderConfig {
        kind,
        remind_at: Some(remind_at),
        offset_minutes: Some(offset),
        ..ReminderConfig::default()
    }
}

/// Apply a user edit of the reminder kind and lead time.
pub fn configure_reminder(
    task: &mut Task,
    kind: ReminderKind,
    offset_minutes: i64,
    now: Timestamp,
) {
    task.reminder = build_reminder_config(kind, task.due_at, offset_minutes, now);
    task.updated_at = now;
}

/// Current reminder target, or `None` when the reminder is disabled.
#[must_use]
pub fn effective_target(reminder: &ReminderConfig, due_at: Timestamp) -> Option<Timestamp> {
    let default_target = reminder.default_target(due_at)?;
    Some(
        reminder
            .snoozed_until
            .or(reminder.remind_at)
            .unwrap_or(default_target),
    )
}

/// Returns `true` when the task's reminder should fire at `now`.
#[must_use]
pub fn is_due(task: &Task, now: Timestamp) -> bool {
    if task.completed {
        return false;
    }
    let reminder = &task.reminder;
    if reminder.kind == ReminderKind::Forced && reminder.forced_dismissed {
        return false;
    }
    let Some(target) = effective_target(reminder, task.due_at) else {
        return false;
    };
    let already_fired = reminder.last_fired_at.is_some_and(|last| last >= target);
    now >= target && !already_fired
}

/// Outcome of [`fire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// Nothing was due; the task is unchanged.
    Skipped,
    /// The target fired.
    Fired {
        /// Target recorded in `last_fired_at`.
        target: Timestamp,
        /// Next notification scheduled by the re-notify policy, if any.
        rearmed_at: Option<Timestamp>,
    },
}

/// Record that the task's reminder fired.
///
/// Sets `last_fired_at` to the effective target and consumes a snooze that
/// has been reached. When re-notify is enabled and the cap allows it, the
/// next notification is scheduled `repeat_interval_sec` after the target (or
/// after the last missed interval, so it lies strictly after `now`).
/// Applying `fire` again at the same `now` is a no-op.
pub fn fire(task: &mut Task, now: Timestamp, settings: &ReminderSettings) -> FireOutcome {
    if !is_due(task, now) {
        return FireOutcome::Skipped;
    }
    let Some(target) = effective_target(&task.reminder, task.due_at) else {
        return FireOutcome::Skipped;
    };

    let reminder = &mut task.reminder;
    reminder.last_fired_at = Some(target);
    if reminder.snoozed_until.is_some_and(|until| until <= target) {
        reminder.snoozed_until = None;
    }

    let rearmed_at = if settings.allows_rearm(reminder.repeat_fired_count) {
        let interval = settings.interval();
        let mut next = target.saturating_add(interval);
        if next <= now {
            let missed = (now - next) / interval + 1;
            next = next.saturating_add(missed.saturating_mul(interval));
        }
        reminder.remind_at = Some(next);
        reminder.repeat_fired_count = reminder.repeat_fired_count.saturating_add(1);
        Some(next)
    } else {
        None
    };

    debug!(
        task_id = %task.id,
        kind = ?task.reminder.kind,
        target,
        rearmed_at,
        "reminder fired"
    );
    FireOutcome::Fired { target, rearmed_at }
}

/// Snooze presets offered on a fired reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnoozePreset {
    /// Five minutes.
    M5,
    /// Fifteen minutes.
    M15,
    /// One hour.
    H1,
    /// Tomorrow at 09:00.
    Tomorrow0900,
}

impl SnoozePreset {
    /// Snooze target for this preset.
    pub fn target<Tz: TimeZone>(self, now: Timestamp, tz: &Tz) -> Timestamp {
        match self {
            Self::M5 => relative(now, 5),
            Self::M15 => relative(now, 15),
            Self::H1 => relative(now, 60),
            Self::Tomorrow0900 => tomorrow_at(now, 9, 0, tz),
        }
    }
}

impl std::str::FromStr for SnoozePreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m5" | "5m" => Ok(Self::M5),
            "m15" | "15m" => Ok(Self::M15),
            "h1" | "1h" => Ok(Self::H1),
            "tomorrow" | "tomorrow_0900" => Ok(Self::Tomorrow0900),
            other => Err(format!("unknown snooze preset: {other}")),
        }
    }
}

/// Snooze the task's reminder.
///
/// Sets `snoozed_until` and clears a forced dismissal; the stored
/// `remind_at` and re-notify count are left alone. Returns the snooze
/// target, or `None` when the reminder is disabled.
pub fn snooze<Tz: TimeZone>(
    task: &mut Task,
    preset: SnoozePreset,
    now: Timestamp,
    tz: &Tz,
) -> Option<Timestamp> {
    if !task.reminder.is_enabled() {
        return None;
    }
    let until = preset.target(now, tz);
    task.reminder.snoozed_until = Some(until);
    task.reminder.forced_dismissed = false;
    task.updated_at = now;
    debug!(task_id = %task.id, ?preset, until, "reminder snoozed");
    Some(until)
}

/// Dismiss the current occurrence of a forced reminder.
///
/// Returns `Ok(true)` when the task changed and `Ok(false)` when it was
/// already dismissed.
///
/// # Errors
///
/// Returns [`EngineError::NotForced`] when the reminder is not forced.
pub fn dismiss_forced(task: &mut Task) -> Result<bool> {
    if task.reminder.kind != ReminderKind::Forced {
        return Err(EngineError::NotForced(task.id.clone()));
    }
    if task.reminder.forced_dismissed {
        return Ok(false);
    }
    task.reminder.forced_dismissed = true;
    debug!(task_id = %task.id, "forced reminder dismissed");
    Ok(true)
}

/// User-initiated due-date changes offered on a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReschedulePreset {
    /// Ten minutes from now.
    Plus10m,
    /// One hour from now.
    Plus1h,
    /// Tomorrow at 18:00.
    Tomorrow1800,
    /// Next workday at 09:00.
    NextWorkday0900,
}

impl ReschedulePreset {
    /// New due time for this preset.
    pub fn target<Tz: TimeZone>(self, now: Timestamp, tz: &Tz) -> Timestamp {
        match self {
            Self::Plus10m => relative(now, 10),
            Self::Plus1h => relative(now, 60),
            Self::Tomorrow1800 => tomorrow_at(now, 18, 0, tz),
            Self::NextWorkday0900 => next_workday(now, 9, 0, tz),
        }
    }
}

impl std::str::FromStr for ReschedulePreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "+10m" | "10m" => Ok(Self::Plus10m),
            "+1h" | "1h" => Ok(Self::Plus1h),
            "tomorrow" | "tomorrow_1800" => Ok(Self::Tomorrow1800),
            "workday" | "next_workday_0900" => Ok(Self::NextWorkday0900),
            other => Err(format!("unknown reschedule preset: {other}")),
        }
    }
}

/// Move the task's due time and reset its reminder to the kind default
/// relative to the new due time. Returns the new due time.
pub fn reschedule<Tz: TimeZone>(
    task: &mut Task,
    preset: ReschedulePreset,
    now: Timestamp,
    tz: &Tz,
) -> Timestamp {
    let due_at = preset.target(now, tz);
    let kind = task.reminder.kind;
    task.due_at = due_at;
    task.reminder = build_reminder_config(kind, due_at, kind.default_offset_minutes(), now);
    task.updated_at = now;
    debug!(task_id = %task.id, ?preset, due_at, "task rescheduled");
    due_at
}
