//! Reminder policy and per-poll due collection.
//!
//! [`policy`] holds the per-task state transitions; [`queue`] evaluates a
//! whole snapshot on each host tick and produces notification events.

pub mod policy;
pub mod queue;

pub use policy::{
    FireOutcome, ReschedulePreset, SnoozePreset, build_reminder_config, configure_reminder,
    dismiss_forced, effective_target, fire, is_due, reschedule, snooze,
};
pub use queue::{DueReminders, ForcedQueue, ReminderEvent, collect_due, poll};
