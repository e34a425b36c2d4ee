//! Task records and the reminder/repeat configuration they carry.
//!
//! These are plain data types. All scheduling logic lives in
//! [`crate::reminder`], [`crate::recurrence`], [`crate::ordering`] and
//! [`crate::filter`], and takes the current time as an explicit argument.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

/// Lead time applied to a `Normal` reminder with no explicit `remind_at`.
pub const NORMAL_DEFAULT_LEAD_SECS: i64 = 10 * 60;

/// How a task's reminder is surfaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Reminder disabled.
    #[default]
    None,
    /// Passive, informational notification.
    Normal,
    /// Blocking notification that must be dismissed, snoozed or completed.
    Forced,
}

impl ReminderKind {
    /// Default lead time in minutes for this kind.
    #[must_use]
    pub fn default_offset_minutes(self) -> i64 {
        match self {
            Self::None | Self::Forced => 0,
            Self::Normal => NORMAL_DEFAULT_LEAD_SECS / 60,
        }
    }
}

impl std::str::FromStr for ReminderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "normal" => Ok(Self::Normal),
            "forced" => Ok(Self::Forced),
            other => Err(format!("unknown reminder kind: {other}")),
        }
    }
}

/// Reminder state stored on a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Reminder kind; `None` means every other field is inert.
    pub kind: ReminderKind,
    /// Stored reminder target.
    #[serde(default)]
    pub remind_at: Option<Timestamp>,
    /// Active snooze; always wins over `remind_at`.
    #[serde(default)]
    pub snoozed_until: Option<Timestamp>,
    /// Forced reminder suppressed until its target changes.
    #[serde(default)]
    pub forced_dismissed: bool,
    /// Target most recently fired.
    #[serde(default)]
    pub last_fired_at: Option<Timestamp>,
    /// Number of re-notifications scheduled since the reminder was armed.
    #[serde(default)]
    pub repeat_fired_count: u32,
    /// Lead time chosen when the reminder was configured.
    #[serde(default)]
    pub offset_minutes: Option<i64>,
}

impl ReminderConfig {
    /// Disabled reminder.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Returns `true` when the reminder kind is not `None`.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.kind != ReminderKind::None
    }

    /// Target used when neither a snooze nor an explicit `remind_at` is set.
    #[must_use]
    pub fn default_target(&self, due_at: Timestamp) -> Option<Timestamp> {
        match self.kind {
            ReminderKind::None => None,
            ReminderKind::Normal => Some(due_at.saturating_sub(NORMAL_DEFAULT_LEAD_SECS)),
            ReminderKind::Forced => Some(due_at),
        }
    }

    /// Lead time to carry over when the task's due time moves.
    ///
    /// Prefers the recorded offset, then the distance between `due_at` and a
    /// `remind_at` that has not been re-armed, then the kind default.
    #[must_use]
    pub fn lead_minutes(&self, due_at: Timestamp) -> i64 {
        if let Some(offset) = self.offset_minutes {
            return offset.max(0);
        }
        match self.remind_at {
            Some(remind_at) if self.repeat_fired_count == 0 => {
                (due_at.saturating_sub(remind_at) / 60).max(0)
            }
            _ => self.kind.default_offset_minutes(),
        }
    }
}

/// Rule producing the next due time after a recurring task is completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepeatRule {
    /// No recurrence.
    #[default]
    None,
    /// Every day, optionally skipping weekends.
    Daily {
        /// Skip Saturday and Sunday.
        workday_only: bool,
    },
    /// On the given ISO weekdays (1 = Monday .. 7 = Sunday).
    Weekly {
        /// Non-empty set of weekdays.
        days: BTreeSet<u8>,
    },
    /// On the given day of every month.
    Monthly {
        /// Day of month (1-31), clamped to the month's length.
        day: u8,
    },
    /// On the given month and day every year.
    Yearly {
        /// Month (1-12).
        month: u8,
        /// Day of month (1-31), clamped to the month's length.
        day: u8,
    },
}

impl RepeatRule {
    /// Returns `true` for every rule except `None`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Clamp fields into their valid ranges.
    #[must_use]
    pub fn normalized(&self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Daily { workday_only } => Self::Daily {
                workday_only: *workday_only,
            },
            Self::Weekly { days } => Self::Weekly {
                days: days.iter().copied().filter(|d| (1..=7).contains(d)).collect(),
            },
            Self::Monthly { day } => Self::Monthly {
                day: (*day).clamp(1, 31),
            },
            Self::Yearly { month, day } => Self::Yearly {
                month: (*month).clamp(1, 12),
                day: (*day).clamp(1, 31),
            },
        }
    }

    /// Edit-boundary validation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRepeat`] for a weekly rule with no
    /// weekday in 1..=7, or a month/day outside its range.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::None | Self::Daily { .. } => Ok(()),
            Self::Weekly { days } => {
                if days.iter().any(|d| (1..=7).contains(d)) {
                    Ok(())
                } else {
                    Err(EngineError::InvalidRepeat(
                        "weekly rule needs at least one weekday".to_owned(),
                    ))
                }
            }
            Self::Monthly { day } => check_day(*day),
            Self::Yearly { month, day } => {
                if !(1..=12).contains(month) {
                    return Err(EngineError::InvalidRepeat(format!(
                        "month {month} out of range"
                    )));
                }
                check_day(*day)
            }
        }
    }
}

fn check_day(day: u8) -> Result<()> {
    if (1..=31).contains(&day) {
        Ok(())
    } else {
        Err(EngineError::InvalidRepeat(format!("day {day} out of range")))
    }
}

impl std::fmt::Display for RepeatRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
        match self {
            Self::None => write!(f, "never"),
            Self::Daily { workday_only: true } => write!(f, "every workday"),
            Self::Daily {
                workday_only: false,
            } => write!(f, "every day"),
            Self::Weekly { days } => {
                let names: Vec<&str> = days
                    .iter()
                    .filter(|d| (1..=7).contains(*d))
                    .map(|d| NAMES[usize::from(*d) - 1])
                    .collect();
                write!(f, "weekly on {}", names.join(", "))
            }
            Self::Monthly { day } => write!(f, "monthly on day {day}"),
            Self::Yearly { month, day } => write!(f, "yearly on {month:02}-{day:02}"),
        }
    }
}

/// A checklist item inside a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Step identifier.
    pub id: String,
    /// Step text.
    pub title: String,
    /// Whether the step is checked off.
    pub completed: bool,
    /// Creation time.
    pub created_at: Timestamp,
    /// Completion time.
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
}

/// A task with a due time, reminder and optional repeat rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable identifier.
    pub id: String,
    /// Task title.
    pub title: String,
    /// Due time; the anchor for reminders and recurrence.
    pub due_at: Timestamp,
    /// Pinned above non-important tasks in every ordering.
    #[serde(default)]
    pub important: bool,
    /// Completion flag.
    #[serde(default)]
    pub completed: bool,
    /// Completion time.
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last modification time.
    pub updated_at: Timestamp,
    /// Manual-order key.
    #[serde(default)]
    pub sort_order: i64,
    /// Urgent/important matrix bucket (1-4).
    #[serde(default = "default_quadrant")]
    pub quadrant: u8,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Checklist.
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Tags without the leading `#`.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Reminder state.
    #[serde(default)]
    pub reminder: ReminderConfig,
    /// Repeat rule.
    #[serde(default)]
    pub repeat: RepeatRule,
}

fn default_quadrant() -> u8 {
    1
}

impl Task {
    /// Create an open task with no reminder and no repeat rule.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        due_at: Timestamp,
        now: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            due_at,
            important: false,
            completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
            sort_order: now.saturating_mul(1000),
            quadrant: default_quadrant(),
            notes: None,
            steps: Vec::new(),
            tags: Vec::new(),
            reminder: ReminderConfig::disabled(),
            repeat: RepeatRule::None,
        }
    }
}

/// On-disk envelope for a task list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TasksFile {
    /// Schema version; files written before versioning read as `0`.
    #[serde(default)]
    pub schema_version: u32,
    /// Tasks.
    #[serde(default)]
    pub tasks: Vec<Task>,
}
