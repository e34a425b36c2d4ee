//! Manual reordering within importance and completion boundaries.
//!
//! A task can only trade places with a neighbour that has the same
//! `important` and `completed` flags, so a manual move never crosses the
//! pinned-important or done/open boundary.

use crate::task::{Task, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Direction of a manual move in the displayed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards index 0.
    Up,
    /// Towards the end of the list.
    Down,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// Index of the first task in `direction` from `task_id` that shares its
/// `important` and `completed` flags.
///
/// Returns `None` when the task is not in the list or the scan leaves the
/// list first.
#[must_use]
pub fn find_reorder_target(list: &[Task], task_id: &str, direction: Direction) -> Option<usize> {
    let from = list.iter().position(|t| t.id == task_id)?;
    let mover = &list[from];
    let same_group = |t: &Task| t.important == mover.important && t.completed == mover.completed;

    match direction {
        Direction::Up => (0..from).rev().find(|&i| same_group(&list[i])),
        Direction::Down => (from + 1..list.len()).find(|&i| same_group(&list[i])),
    }
}

/// Swap the manual-order keys of two tasks. Returns `false` when either id
/// is missing.
pub fn swap_sort_order(
    tasks: &mut [Task],
    first_id: &str,
    second_id: &str,
    updated_at: Timestamp,
) -> bool {
    let first = tasks.iter().position(|t| t.id == first_id);
    let second = tasks.iter().position(|t| t.id == second_id);
    let (Some(first), Some(second)) = (first, second) else {
        return false;
    };
    if first == second {
        return true;
    }

    let first_order = tasks[first].sort_order;
    tasks[first].sort_order = tasks[second].sort_order;
    tasks[second].sort_order = first_order;
    tasks[first].updated_at = updated_at;
    tasks[second].updated_at = updated_at;
    true
}

/// Move `task_id` one step in `direction` within its group.
///
/// Swaps the manual-order keys with the target and the two positions in
/// `list`. Returns the task's new index, or `None` when there is no valid
/// target.
pub fn apply_reorder(
    list: &mut [Task],
    task_id: &str,
    direction: Direction,
    now: Timestamp,
) -> Option<usize> {
    let from = list.iter().position(|t| t.id == task_id)?;
    let to = find_reorder_target(list, task_id, direction)?;
    let other_id = list[to].id.clone();
    swap_sort_order(list, task_id, &other_id, now);
    list.swap(from, to);
    debug!(task_id, from, to, "task reordered");
    Some(to)
}
