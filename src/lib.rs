//! Mustdo: reminder and recurrence engine for a personal task list.
//!
//! The engine decides when a task's reminder fires, how snooze, dismiss and
//! reschedule change that, what the next due date of a recurring task is,
//! and how tasks are ordered and filtered for display.
//!
//! # Architecture
//!
//! Every engine operation is synchronous and takes `now` (and, where local
//! calendar math is involved, a timezone) as an explicit argument:
//! - **Clock presets**: default due time, relative and calendar presets
//! - **Reminder policy**: effective target, due check, fire, snooze, dismiss, reschedule
//! - **Reminder queue**: per-poll collection into forced / normal events
//! - **Recurrence**: next occurrence per repeat rule, completion and renewal
//! - **Ordering**: pinned-important sorting, quadrants, manual reorder
//! - **Filter**: tab membership and search
//!
//! The host side ([`store`], [`poller`], the `mustdo` binary) owns I/O and
//! the wall clock.

pub mod clock;
pub mod config;
pub mod error;
pub mod filter;
pub mod ordering;
pub mod paths;
pub mod poller;
pub mod recurrence;
pub mod reminder;
pub mod store;
pub mod task;

pub use config::{EngineConfig, ReminderSettings};
pub use error::{EngineError, Result};
pub use filter::{Tab, matches, visible_tasks};
pub use ordering::{Direction, SortMode, find_reorder_target, sort_with_pinned_important};
pub use poller::ReminderPoller;
pub use recurrence::{Completion, complete_task, next_occurrence};
pub use reminder::{ReminderEvent, collect_due, poll};
pub use store::{JsonFileStore, MemoryStore, TaskStore};
pub use task::{ReminderConfig, ReminderKind, RepeatRule, Task, Timestamp};
