//! CLI binary for mustdo.

use anyhow::Context;
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use mustdo::clock::{self, RelativePreset};
use mustdo::filter::{Tab, tab_counts, visible_tasks};
use mustdo::ordering::{
    Direction, SortMode, apply_reorder, clamp_quadrant, move_to_quadrant,
    sort_with_pinned_important,
};
use mustdo::recurrence::{complete_task, uncomplete_task};
use mustdo::reminder::{
    ReschedulePreset, SnoozePreset, configure_reminder, dismiss_forced, reschedule, snooze,
};
use mustdo::{
    EngineConfig, EngineError, JsonFileStore, ReminderKind, ReminderPoller, RepeatRule, Task,
    TaskStore, Timestamp,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Mustdo: task reminders and recurring due dates.
#[derive(Parser)]
#[command(name = "mustdo", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the tasks JSON file.
    #[arg(short, long)]
    tasks: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Add a task.
    Add {
        /// Task title.
        title: String,
        /// Due preset: 30m, 1h, 2h, 4h, tomorrow, sunday or workday.
        /// Defaults to 18:00 today (or tomorrow once past 18:00).
        #[arg(long)]
        due: Option<String>,
        /// Pin above non-important tasks.
        #[arg(long)]
        important: bool,
        /// Urgent/important quadrant (1-4).
        #[arg(long, default_value_t = 1)]
        quadrant: u8,
        /// Reminder kind: none, normal or forced.
        #[arg(long, default_value = "none")]
        remind: ReminderKind,
        /// Minutes before the due time to remind. Defaults to the kind's lead.
        #[arg(long)]
        offset: Option<i64>,
        /// Repeat rule: daily, workdays, weekly:1,5, monthly:31 or yearly:2-29.
        #[arg(long)]
        repeat: Option<String>,
        /// Tags, without the leading `#`.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// List tasks on a tab.
    List {
        /// Tab: todo, today, all or done.
        #[arg(long)]
        tab: Option<Tab>,
        /// Sort mode: due, created or manual.
        #[arg(long)]
        sort: Option<SortMode>,
        /// Search query.
        #[arg(long, default_value = "")]
        query: String,
    },

    /// Complete a task, renewing it if it repeats.
    Complete {
        /// Task id.
        id: String,
    },

    /// Reopen a completed task.
    Reopen {
        /// Task id.
        id: String,
    },

    /// Snooze a task's reminder.
    Snooze {
        /// Task id.
        id: String,
        /// Preset: m5, m15, h1 or tomorrow.
        preset: SnoozePreset,
    },

    /// Dismiss a forced reminder until its target changes.
    Dismiss {
        /// Task id.
        id: String,
    },

    /// Move a task's due time.
    Reschedule {
        /// Task id.
        id: String,
        /// Preset: 10m, 1h, tomorrow or workday.
        preset: ReschedulePreset,
    },

    /// Move a task up or down in manual order.
    Move {
        /// Task id.
        id: String,
        /// Direction: up or down.
        direction: Direction,
    },

    /// Move a task to another quadrant.
    Quadrant {
        /// Task id.
        id: String,
        /// Target quadrant (1-4).
        quadrant: u8,
    },

    /// Poll for due reminders and print them as JSON lines.
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mustdo=info")),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(EngineConfig::default_config_path);
    let config = EngineConfig::load_or_default(&config_path)?;
    let store = match cli.tasks {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::at_default_path(),
    };

    match cli.command {
        Command::Watch => watch(config, store).await,
        command => run_command(command, &config, &store),
    }
}

fn run_command(
    command: Command,
    config: &EngineConfig,
    store: &JsonFileStore,
) -> anyhow::Result<()> {
    let now = Utc::now().timestamp();
    let tz = Local;
    let mut tasks = store.load()?;

    match command {
        Command::Add {
            title,
            due,
            important,
            quadrant,
            remind,
            offset,
            repeat,
            tags,
        } => {
            let due_at = match due.as_deref() {
                Some(preset) => parse_due(preset, now, &tz)?,
                None => clock::default_due_at(now, &tz),
            };
            let id = format!("task-{}", Utc::now().timestamp_millis());
            let mut task = Task::new(id.clone(), title, due_at, now);
            task.important = important;
            task.quadrant = clamp_quadrant(quadrant);
            task.tags = tags;
            if let Some(rule) = repeat.as_deref() {
                let rule = parse_repeat(rule)?;
                rule.validate()?;
                task.repeat = rule.normalized();
            }
            let offset = offset.unwrap_or_else(|| remind.default_offset_minutes());
            configure_reminder(&mut task, remind, offset, now);
            tasks.push(task);
            store.save(&tasks)?;
            info!(task_id = %id, "task added");
            println!("{id}");
        }

        Command::List { tab, sort, query } => {
            let tab = tab.unwrap_or(config.display.default_tab);
            let mode = sort.unwrap_or(config.display.default_sort);
            let counts = tab_counts(&tasks, now, &tz);
            println!(
                "todo {} | today {} | all {} | done {}",
                counts.todo, counts.today, counts.all, counts.done
            );
            for task in visible_tasks(&tasks, tab, mode, &query, now, &tz) {
                println!("{}", format_row(&task));
            }
        }

        Command::Complete { id } => {
            let index = find(&tasks, &id)?;
            if tasks[index].completed {
                println!("{id} is already completed");
                return Ok(());
            }
            let completion = complete_task(&tasks[index], now, &tz);
            tasks[index] = completion.completed;
            if let Some(next) = completion.next {
                println!("renewed as {} due {}", next.id, format_time(next.due_at));
                tasks.push(next);
            }
            store.save(&tasks)?;
        }

        Command::Reopen { id } => {
            let index = find(&tasks, &id)?;
            uncomplete_task(&mut tasks[index], now);
            store.save(&tasks)?;
        }

        Command::Snooze { id, preset } => {
            let index = find(&tasks, &id)?;
            match snooze(&mut tasks[index], preset, now, &tz) {
                Some(until) => {
                    store.save(&tasks)?;
                    println!("snoozed until {}", format_time(until));
                }
                None => println!("{id} has no reminder"),
            }
        }

        Command::Dismiss { id } => {
            let index = find(&tasks, &id)?;
            if dismiss_forced(&mut tasks[index])? {
                store.save(&tasks)?;
            }
        }

        Command::Reschedule { id, preset } => {
            let index = find(&tasks, &id)?;
            let due_at = reschedule(&mut tasks[index], preset, now, &tz);
            store.save(&tasks)?;
            println!("due {}", format_time(due_at));
        }

        Command::Move { id, direction } => {
            find(&tasks, &id)?;
            sort_with_pinned_important(&mut tasks, SortMode::Manual);
            if apply_reorder(&mut tasks, &id, direction, now).is_some() {
                store.save(&tasks)?;
            } else {
                println!("{id} cannot move {direction:?}");
            }
        }

        Command::Quadrant { id, quadrant } => {
            let index = find(&tasks, &id)?;
            move_to_quadrant(&mut tasks[index], quadrant, now);
            store.save(&tasks)?;
        }

        Command::Watch => anyhow::bail!("watch runs the async poll loop"),
    }
    Ok(())
}

async fn watch(config: EngineConfig, store: JsonFileStore) -> anyhow::Result<()> {
    info!(path = %store.path().display(), "watching for due reminders");
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = ReminderPoller::new(Arc::new(store), config.reminder, tx)
        .with_tick_interval(config.poll.tick_interval())
        .run();

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                println!("{}", serde_json::to_string(&event).context("encode reminder event")?);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    handle.abort();
    Ok(())
}

fn find(tasks: &[Task], id: &str) -> mustdo::Result<usize> {
    tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| EngineError::TaskNotFound(id.to_owned()))
}

fn parse_due(preset: &str, now: Timestamp, tz: &Local) -> anyhow::Result<Timestamp> {
    let due = match preset.trim().to_ascii_lowercase().as_str() {
        "30m" => RelativePreset::Minutes30.apply(now),
        "1h" => RelativePreset::Hour1.apply(now),
        "2h" => RelativePreset::Hours2.apply(now),
        "4h" => RelativePreset::Hours4.apply(now),
        "tomorrow" => clock::tomorrow_at(now, clock::DEFAULT_DUE_HOUR, 0, tz),
        "sunday" => clock::next_sunday_1800(now, tz),
        "workday" => clock::next_workday(now, 9, 0, tz),
        other => anyhow::bail!("unknown due preset: {other}"),
    };
    Ok(due)
}

fn parse_repeat(raw: &str) -> anyhow::Result<RepeatRule> {
    let (name, arg) = raw.split_once(':').unwrap_or((raw, ""));
    let number = |s: &str| -> anyhow::Result<u8> {
        s.trim()
            .parse()
            .with_context(|| format!("invalid number in repeat rule: {s}"))
    };
    let rule = match name.trim().to_ascii_lowercase().as_str() {
        "none" => RepeatRule::None,
        "daily" => RepeatRule::Daily {
            workday_only: false,
        },
        "workdays" => RepeatRule::Daily { workday_only: true },
        "weekly" => RepeatRule::Weekly {
            days: arg
                .split(',')
                .map(number)
                .collect::<anyhow::Result<BTreeSet<u8>>>()?,
        },
        "monthly" => RepeatRule::Monthly { day: number(arg)? },
        "yearly" => {
            let (month, day) = arg
                .split_once('-')
                .context("yearly repeat needs MONTH-DAY")?;
            RepeatRule::Yearly {
                month: number(month)?,
                day: number(day)?,
            }
        }
        other => anyhow::bail!("unknown repeat rule: {other}"),
    };
    Ok(rule)
}

fn format_time(ts: Timestamp) -> String {
    clock::local_datetime(ts, &Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

fn format_row(task: &Task) -> String {
    let check = if task.completed { "x" } else { " " };
    let pin = if task.important { "!" } else { " " };
    let mut row = format!(
        "[{check}]{pin} {:<20} {}  Q{}  {}",
        task.id,
        format_time(task.due_at),
        task.quadrant,
        task.title
    );
    if task.repeat.is_active() {
        row.push_str(&format!("  ({})", task.repeat));
    }
    if !task.tags.is_empty() {
        let tags: Vec<String> = task.tags.iter().map(|t| format!("#{t}")).collect();
        row.push_str(&format!("  {}", tags.join(" ")));
    }
    row
}
