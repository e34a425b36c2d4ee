//! Due-reminder collection for one poll.
//!
//! The host calls [`poll`] on every tick with the current snapshot. Due
//! reminders are fired in place and surfaced as [`ReminderEvent`]s: forced
//! reminders one at a time through a [`ForcedQueue`], normal reminders as a
//! single batch. Both are ordered important-first, then by due time.

use crate::config::ReminderSettings;
use crate::reminder::policy::{FireOutcome, fire, is_due};
use crate::task::{ReminderKind, Task, Timestamp};
use serde::Serialize;
use std::cmp::Ordering;

/// Notification-layer event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ReminderEvent {
    /// A blocking reminder to show on its own.
    ForcedDue(Task),
    /// Passive reminders to show together.
    NormalDue(Vec<Task>),
}

/// FIFO of forced reminders surfaced one at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForcedQueue {
    items: Vec<Task>,
    cursor: usize,
}

impl ForcedQueue {
    /// Build a queue from already-ordered tasks.
    #[must_use]
    pub fn new(items: Vec<Task>) -> Self {
        Self { items, cursor: 0 }
    }

    /// Task currently shown, if any remain.
    #[must_use]
    pub fn current(&self) -> Option<&Task> {
        self.items.get(self.cursor)
    }

    /// Zero-based position of the current task.
    #[must_use]
    pub fn index(&self) -> usize {
        self.cursor.min(self.items.len())
    }

    /// Number of tasks in the queue, handled or not.
    #[must_use]
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Move to the next task and return it.
    pub fn advance(&mut self) -> Option<&Task> {
        if self.cursor < self.items.len() {
            self.cursor += 1;
        }
        self.current()
    }

    /// Returns `true` when every task has been handled.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.items.len()
    }

    /// Returns `true` when the queue holds no tasks at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All queued tasks in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.items.iter()
    }

    /// Remove a task (e.g. completed from another view), keeping the cursor
    /// on the same logical position. Returns `true` when found.
    pub fn remove(&mut self, task_id: &str) -> bool {
        let Some(pos) = self.items.iter().position(|t| t.id == task_id) else {
            return false;
        };
        self.items.remove(pos);
        if pos < self.cursor {
            self.cursor -= 1;
        }
        true
    }
}

impl IntoIterator for ForcedQueue {
    type Item = Task;
    type IntoIter = std::vec::IntoIter<Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Due reminders partitioned by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DueReminders {
    /// Forced reminders, surfaced one at a time.
    pub forced: ForcedQueue,
    /// Normal reminders, surfaced as a batch.
    pub normal: Vec<Task>,
}

impl DueReminders {
    /// Partition and order the given due tasks.
    #[must_use]
    pub fn from_tasks(mut due: Vec<Task>) -> Self {
        due.sort_by(due_order);
        let (forced, normal): (Vec<Task>, Vec<Task>) = due
            .into_iter()
            .partition(|t| t.reminder.kind == ReminderKind::Forced);
        Self {
            forced: ForcedQueue::new(forced),
            normal,
        }
    }

    /// Total number of due reminders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forced.total() + self.normal.len()
    }

    /// Returns `true` when nothing is due.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert into notification events: one per forced task, then at most
    /// one normal batch.
    #[must_use]
    pub fn into_events(self) -> Vec<ReminderEvent> {
        let mut events: Vec<ReminderEvent> =
            self.forced.into_iter().map(ReminderEvent::ForcedDue).collect();
        if !self.normal.is_empty() {
            events.push(ReminderEvent::NormalDue(self.normal));
        }
        events
    }
}

/// Important first, then earlier due time, then id.
fn due_order(a: &Task, b: &Task) -> Ordering {
    b.important
        .cmp(&a.important)
        .then_with(|| a.due_at.cmp(&b.due_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Collect the reminders due at `now` without changing any task.
#[must_use]
pub fn collect_due(tasks: &[Task], now: Timestamp) -> DueReminders {
    let due: Vec<Task> = tasks.iter().filter(|t| is_due(t, now)).cloned().collect();
    DueReminders::from_tasks(due)
}

/// Fire every reminder due at `now` and return the resulting events.
///
/// Fired transitions are written back onto `tasks`; events carry the fired
/// snapshots.
pub fn poll(
    tasks: &mut [Task],
    now: Timestamp,
    settings: &ReminderSettings,
) -> Vec<ReminderEvent> {
    let mut fired = Vec::new();
    for task in tasks.iter_mut() {
        if let FireOutcome::Fired { .. } = fire(task, now, settings) {
            fired.push(task.clone());
        }
    }
    DueReminders::from_tasks(fired).into_events()
}
