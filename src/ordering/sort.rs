//! Total orderings over tasks and quadrant grouping.
//!
//! Important tasks always precede non-important ones, whatever the sort
//! mode. Within each group the mode's key applies, with `id` as the final
//! tie-break so every ordering is total and deterministic.

use crate::task::{Task, Timestamp};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ordering key used within the important / non-important groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Due time, then creation time.
    #[default]
    Due,
    /// Creation time, then due time.
    Created,
    /// Manual order key, then due time.
    Manual,
}

impl std::str::FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "due" | "default" => Ok(Self::Due),
            "created" => Ok(Self::Created),
            "manual" => Ok(Self::Manual),
            other => Err(format!("unknown sort mode: {other}")),
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Due => write!(f, "due"),
            Self::Created => write!(f, "created"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Compare two tasks under `mode` with important tasks pinned first.
#[must_use]
pub fn compare(a: &Task, b: &Task, mode: SortMode) -> Ordering {
    let pinned = b.important.cmp(&a.important);
    let keyed = match mode {
        SortMode::Due => a
            .due_at
            .cmp(&b.due_at)
            .then_with(|| a.created_at.cmp(&b.created_at)),
        SortMode::Created => a
            .created_at
            .cmp(&b.created_at)
            .then_with(|| a.due_at.cmp(&b.due_at)),
        SortMode::Manual => a
            .sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.due_at.cmp(&b.due_at)),
    };
    pinned.then(keyed).then_with(|| a.id.cmp(&b.id))
}

/// Sort `tasks` in place under `mode`.
pub fn sort_with_pinned_important(tasks: &mut [Task], mode: SortMode) {
    tasks.sort_by(|a, b| compare(a, b, mode));
}

/// Borrowing variant of [`sort_with_pinned_important`].
#[must_use]
pub fn sorted(tasks: &[Task], mode: SortMode) -> Vec<&Task> {
    let mut out: Vec<&Task> = tasks.iter().collect();
    out.sort_by(|a, b| compare(a, b, mode));
    out
}

/// Fill missing manual-order keys from the creation time.
pub fn normalize_sort_order(tasks: &mut [Task]) {
    for task in tasks.iter_mut().filter(|t| t.sort_order == 0) {
        task.sort_order = task.created_at.saturating_mul(1000);
    }
}

/// Clamp a stored quadrant into 1..=4.
#[must_use]
pub fn clamp_quadrant(quadrant: u8) -> u8 {
    quadrant.clamp(1, 4)
}

/// Tasks split into the four urgent/important quadrants.
///
/// Each bucket keeps the order of the input slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuadrantGroups {
    buckets: [Vec<Task>; 4],
}

impl QuadrantGroups {
    /// Tasks in `quadrant` (1-4; other values are clamped).
    #[must_use]
    pub fn get(&self, quadrant: u8) -> &[Task] {
        &self.buckets[usize::from(clamp_quadrant(quadrant) - 1)]
    }

    /// Iterate `(quadrant, tasks)` pairs in quadrant order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[Task])> {
        (1u8..=4).zip(self.buckets.iter().map(Vec::as_slice))
    }
}

/// Group tasks by quadrant.
#[must_use]
pub fn group_by_quadrant(tasks: &[Task]) -> QuadrantGroups {
    let mut groups = QuadrantGroups::default();
    for task in tasks {
        groups.buckets[usize::from(clamp_quadrant(task.quadrant) - 1)].push(task.clone());
    }
    groups
}

/// Move a task to another quadrant, placing it last in manual order.
pub fn move_to_quadrant(task: &mut Task, quadrant: u8, now: Timestamp) {
    task.quadrant = clamp_quadrant(quadrant);
    task.sort_order = now.saturating_mul(1000);
    task.updated_at = now;
}
