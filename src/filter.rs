//! Tab membership and the search predicate used by the display layer.

use crate::clock::{start_of_day, start_of_next_day};
use crate::ordering::sort::{SortMode, compare};
use crate::task::{Task, Timestamp};
use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// List tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    /// Open tasks that are overdue or due today.
    #[default]
    Todo,
    /// Open tasks due today.
    Today,
    /// Every task.
    All,
    /// Completed tasks, most recently completed first.
    Done,
}

impl Tab {
    /// All tabs in display order.
    pub const ALL: [Tab; 4] = [Tab::Todo, Tab::Today, Tab::All, Tab::Done];
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "today" => Ok(Self::Today),
            "all" => Ok(Self::All),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Todo => "todo",
            Self::Today => "today",
            Self::All => "all",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Day window `[start, end)` containing `now` in `tz`.
fn today_window<Tz: TimeZone>(now: Timestamp, tz: &Tz) -> (Timestamp, Timestamp) {
    (start_of_day(now, tz), start_of_next_day(now, tz))
}

fn is_visible_in(task: &Task, tab: Tab, (day_start, day_end): (Timestamp, Timestamp)) -> bool {
    match tab {
        Tab::Todo => !task.completed && task.due_at < day_end,
        Tab::Today => !task.completed && task.due_at >= day_start && task.due_at < day_end,
        Tab::All => true,
        Tab::Done => task.completed,
    }
}

/// Whether `task` belongs on `tab` at `now`.
#[must_use]
pub fn is_visible<Tz: TimeZone>(task: &Task, tab: Tab, now: Timestamp, tz: &Tz) -> bool {
    is_visible_in(task, tab, today_window(now, tz))
}

/// Done-tab ordering: latest completion first, then oldest creation, then id.
#[must_use]
pub fn compare_done(a: &Task, b: &Task) -> Ordering {
    let finished = |t: &Task| t.completed_at.unwrap_or(t.updated_at);
    finished(b)
        .cmp(&finished(a))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Search predicate.
///
/// The query is lowercased and split on whitespace; a leading `#` on each
/// token is dropped. Every token must appear somewhere in the title, notes,
/// step titles or tags. An empty query matches everything.
#[must_use]
pub fn matches(task: &Task, query: &str) -> bool {
    let query = query.to_lowercase();
    let mut tokens = query
        .split_whitespace()
        .map(|token| token.strip_prefix('#').unwrap_or(token))
        .filter(|token| !token.is_empty())
        .peekable();
    if tokens.peek().is_none() {
        return true;
    }

    let mut haystack = task.title.to_lowercase();
    if let Some(notes) = &task.notes {
        haystack.push(' ');
        haystack.push_str(&notes.to_lowercase());
    }
    for step in &task.steps {
        haystack.push(' ');
        haystack.push_str(&step.title.to_lowercase());
    }
    for tag in &task.tags {
        haystack.push(' ');
        haystack.push_str(&tag.to_lowercase());
    }

    tokens.all(|token| haystack.contains(token))
}

/// Tasks for one render: tab membership, search, then ordering.
///
/// The done tab ignores `mode` and uses [`compare_done`].
#[must_use]
pub fn visible_tasks<Tz: TimeZone>(
    tasks: &[Task],
    tab: Tab,
    mode: SortMode,
    query: &str,
    now: Timestamp,
    tz: &Tz,
) -> Vec<Task> {
    let window = today_window(now, tz);
    let mut out: Vec<Task> = tasks
        .iter()
        .filter(|t| is_visible_in(t, tab, window) && matches(t, query))
        .cloned()
        .collect();
    match tab {
        Tab::Done => out.sort_by(compare_done),
        _ => out.sort_by(|a, b| compare(a, b, mode)),
    }
    out
}

/// Per-tab badge counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TabCounts {
    /// Open tasks overdue or due today.
    pub todo: usize,
    /// Open tasks due today.
    pub today: usize,
    /// Every task.
    pub all: usize,
    /// Completed tasks.
    pub done: usize,
}

impl TabCounts {
    /// Count for a single tab.
    #[must_use]
    pub fn get(&self, tab: Tab) -> usize {
        match tab {
            Tab::Todo => self.todo,
            Tab::Today => self.today,
            Tab::All => self.all,
            Tab::Done => self.done,
        }
    }
}

/// Count the tasks on every tab at `now`.
#[must_use]
pub fn tab_counts<Tz: TimeZone>(tasks: &[Task], now: Timestamp, tz: &Tz) -> TabCounts {
    let window = today_window(now, tz);
    let count = |tab| tasks.iter().filter(|t| is_visible_in(t, tab, window)).count();
    TabCounts {
        todo: count(Tab::Todo),
        today: count(Tab::Today),
        all: tasks.len(),
        done: count(Tab::Done),
    }
}
