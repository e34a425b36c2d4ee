//! Integration tests for the reminder lifecycle.
//!
//! Walks a recurring forced reminder through fire, re-notify, dismiss,
//! snooze and completion the way a host drives it: one `poll` per tick with
//! an explicit `now`.

use chrono::{TimeZone, Utc};
use mustdo::config::ReminderSettings;
use mustdo::recurrence::complete_task;
use mustdo::reminder::{
    ReschedulePreset, SnoozePreset, collect_due, configure_reminder, dismiss_forced, poll,
    reschedule, snooze,
};
use mustdo::store::{JsonFileStore, TaskStore};
use mustdo::{EngineError, ReminderEvent, ReminderKind, RepeatRule, Task, Timestamp};

fn ts(y: i32, m: u32, d: u32, h: u32, mi: u32) -> Timestamp {
    Utc.with_ymd_and_hms(y, m, d, h, mi, 0).unwrap().timestamp()
}

/// Friday 2025-03-14 18:00 UTC.
fn friday_evening() -> Timestamp {
    ts(2025, 3, 14, 18, 0)
}

fn watering_task() -> Task {
    let due = friday_evening();
    let created = due - 2 * 3600;
    let mut task = Task::new("water", "Water the plants", due, created);
    task.repeat = RepeatRule::Daily { workday_only: true };
    configure_reminder(&mut task, ReminderKind::Forced, 5, created);
    task
}

fn nagging() -> ReminderSettings {
    ReminderSettings {
        repeat_interval_sec: 300,
        repeat_max_times: 2,
    }
}

fn forced_ids(events: &[ReminderEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            ReminderEvent::ForcedDue(t) => Some(t.id.as_str()),
            ReminderEvent::NormalDue(_) => None,
        })
        .collect()
}

#[test]
fn forced_reminder_full_lifecycle() {
    let due = friday_evening();
    let settings = nagging();
    let mut tasks = vec![watering_task()];

    // Not yet at the 5 minute lead.
    assert!(poll(&mut tasks, due - 301, &settings).is_empty());

    // Fires once at the lead time and re-arms at the due time.
    let events = poll(&mut tasks, due - 300, &settings);
    assert_eq!(forced_ids(&events), ["water"]);
    assert_eq!(tasks[0].reminder.last_fired_at, Some(due - 300));
    assert_eq!(tasks[0].reminder.remind_at, Some(due));
    assert!(poll(&mut tasks, due - 300, &settings).is_empty());

    // Dismiss suppresses the re-armed target.
    assert!(dismiss_forced(&mut tasks[0]).unwrap());
    assert!(!dismiss_forced(&mut tasks[0]).unwrap());
    assert!(poll(&mut tasks, due + 10, &settings).is_empty());

    // A snooze is a new target and lifts the dismissal.
    let until = snooze(&mut tasks[0], SnoozePreset::M5, due + 60, &Utc).unwrap();
    assert_eq!(until, due + 360);
    assert!(!tasks[0].reminder.forced_dismissed);
    assert!(poll(&mut tasks, due + 359, &settings).is_empty());
    assert_eq!(forced_ids(&poll(&mut tasks, due + 360, &settings)), ["water"]);
    assert_eq!(tasks[0].reminder.snoozed_until, None);
    assert_eq!(tasks[0].reminder.remind_at, Some(due + 660));

    // Last allowed re-notify, then nothing more.
    assert_eq!(poll(&mut tasks, due + 660, &settings).len(), 1);
    assert_eq!(tasks[0].reminder.repeat_fired_count, 2);
    assert!(poll(&mut tasks, due + 2_000, &settings).is_empty());

    // Completion renews onto Monday with a fresh reminder.
    let done_at = due + 2_100;
    let completion = complete_task(&tasks[0], done_at, &Utc);
    assert!(completion.completed.completed);
    let next = completion.next.expect("daily task renews");
    let monday = ts(2025, 3, 17, 18, 0);
    assert_eq!(next.due_at, monday);
    assert_eq!(next.id, format!("water@{done_at}"));
    assert!(!next.completed);
    assert_eq!(next.reminder.kind, ReminderKind::Forced);
    assert_eq!(next.reminder.remind_at, Some(monday - 300));
    assert_eq!(next.reminder.last_fired_at, None);
    assert_eq!(next.reminder.repeat_fired_count, 0);
    assert!(!next.reminder.forced_dismissed);

    let next_id = next.id.clone();
    let snapshot = vec![completion.completed, next];
    let due_now = collect_due(&snapshot, monday - 300);
    assert_eq!(due_now.len(), 1);
    assert_eq!(due_now.forced.current().map(|t| t.id.clone()), Some(next_id));
}

#[test]
fn reschedule_resets_reminder_state() {
    let due = friday_evening();
    let mut tasks = vec![watering_task()];
    poll(&mut tasks, due - 300, &ReminderSettings::default());
    dismiss_forced(&mut tasks[0]).unwrap();

    let now = due + 600;
    let new_due = reschedule(&mut tasks[0], ReschedulePreset::Plus1h, now, &Utc);
    assert_eq!(new_due, now + 3600);
    let reminder = &tasks[0].reminder;
    assert_eq!(reminder.kind, ReminderKind::Forced);
    assert_eq!(reminder.remind_at, Some(new_due));
    assert!(!reminder.forced_dismissed);
    assert_eq!(reminder.last_fired_at, None);
    assert_eq!(reminder.snoozed_until, None);

    assert_eq!(poll(&mut tasks, new_due, &ReminderSettings::default()).len(), 1);
}

#[test]
fn normal_reminders_batch_after_forced() {
    let due = friday_evening();
    let mut normal_a = Task::new("a", "Stretch", due, 0);
    let mut normal_b = Task::new("b", "Email", due - 60, 0);
    normal_b.important = true;
    configure_reminder(&mut normal_a, ReminderKind::Normal, 10, 0);
    configure_reminder(&mut normal_b, ReminderKind::Normal, 10, 0);
    let mut tasks = vec![normal_a, watering_task(), normal_b];

    let events = poll(&mut tasks, due, &ReminderSettings::default());
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], ReminderEvent::ForcedDue(t) if t.id == "water"));
    match &events[1] {
        ReminderEvent::NormalDue(batch) => {
            let ids: Vec<&str> = batch.iter().map(|t| t.id.as_str()).collect();
            assert_eq!(ids, ["b", "a"]);
        }
        other => panic!("expected a normal batch, got {other:?}"),
    }
}

#[test]
fn dismiss_rejects_normal_reminders() {
    let mut task = Task::new("n", "Normal", friday_evening(), 0);
    configure_reminder(&mut task, ReminderKind::Normal, 10, 0);
    assert!(matches!(
        dismiss_forced(&mut task),
        Err(EngineError::NotForced(id)) if id == "n"
    ));
}

#[test]
fn fired_state_survives_the_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("tasks.json"));
    store.save(&[watering_task()]).unwrap();

    let due = friday_evening();
    let mut tasks = store.load().unwrap();
    assert_eq!(poll(&mut tasks, due - 300, &ReminderSettings::default()).len(), 1);
    store.save(&tasks).unwrap();

    let mut reloaded = store.load().unwrap();
    assert_eq!(reloaded, tasks);
    assert!(poll(&mut reloaded, due, &ReminderSettings::default()).is_empty());
}
