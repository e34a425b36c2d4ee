//! Ordering and reorder invariants over seeded random task lists.

use mustdo::filter::{Tab, visible_tasks};
use mustdo::ordering::{
    Direction, SortMode, apply_reorder, find_reorder_target, group_by_quadrant,
    sort_with_pinned_important, sorted,
};
use mustdo::Task;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MODES: [SortMode; 3] = [SortMode::Due, SortMode::Created, SortMode::Manual];

fn random_tasks(rng: &mut StdRng, len: usize) -> Vec<Task> {
    (0..len)
        .map(|i| {
            let mut task = Task::new(
                format!("t{i:02}"),
                format!("task {i}"),
                rng.gen_range(0..50),
                rng.gen_range(0..50),
            );
            task.important = rng.gen_bool(0.4);
            task.completed = rng.gen_bool(0.3);
            task.completed_at = task.completed.then(|| rng.gen_range(0..1_000));
            task.sort_order = rng.gen_range(0..20);
            task.quadrant = rng.gen_range(0..6);
            task
        })
        .collect()
}

fn important_prefix_holds(tasks: &[&Task]) -> bool {
    let first_plain = tasks.iter().position(|t| !t.important).unwrap_or(tasks.len());
    tasks[first_plain..].iter().all(|t| !t.important)
}

#[test]
fn important_tasks_always_come_first() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let len = rng.gen_range(0..25);
        let tasks = random_tasks(&mut rng, len);
        for mode in MODES {
            assert!(important_prefix_holds(&sorted(&tasks, mode)), "mode {mode}");

            let mut in_place = tasks.clone();
            sort_with_pinned_important(&mut in_place, mode);
            let refs: Vec<&Task> = in_place.iter().collect();
            assert!(important_prefix_holds(&refs), "mode {mode}");

            let shown = visible_tasks(&tasks, Tab::All, mode, "", 0, &chrono::Utc);
            let refs: Vec<&Task> = shown.iter().collect();
            assert!(important_prefix_holds(&refs), "mode {mode}");
        }
    }
}

#[test]
fn ordering_is_independent_of_input_order() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let tasks = random_tasks(&mut rng, 15);
        let mut reversed = tasks.clone();
        reversed.reverse();
        for mode in MODES {
            let a: Vec<&str> = sorted(&tasks, mode).iter().map(|t| t.id.as_str()).collect();
            let b: Vec<&str> = sorted(&reversed, mode).iter().map(|t| t.id.as_str()).collect();
            assert_eq!(a, b, "mode {mode}");
        }
    }
}

#[test]
fn reorder_target_shares_flags() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let len = rng.gen_range(1..20);
        let tasks = random_tasks(&mut rng, len);
        for mover in &tasks {
            for direction in [Direction::Up, Direction::Down] {
                if let Some(index) = find_reorder_target(&tasks, &mover.id, direction) {
                    let target = &tasks[index];
                    assert_ne!(target.id, mover.id);
                    assert_eq!(target.important, mover.important);
                    assert_eq!(target.completed, mover.completed);
                }
            }
        }
    }
}

#[test]
fn reorder_moves_one_step_within_group() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..100 {
        let mut tasks = random_tasks(&mut rng, 12);
        for (i, task) in tasks.iter_mut().enumerate() {
            task.sort_order = i as i64;
        }
        sort_with_pinned_important(&mut tasks, SortMode::Manual);

        let mover = tasks[rng.gen_range(0..tasks.len())].id.clone();
        let direction = if rng.gen_bool(0.5) {
            Direction::Up
        } else {
            Direction::Down
        };
        let before = tasks.clone();
        match apply_reorder(&mut tasks, &mover, direction, 1_000) {
            Some(to) => {
                assert_eq!(tasks[to].id, mover);
                let mut resorted = tasks.clone();
                sort_with_pinned_important(&mut resorted, SortMode::Manual);
                let ids = |ts: &[Task]| ts.iter().map(|t| t.id.clone()).collect::<Vec<_>>();
                assert_eq!(ids(&resorted), ids(&tasks));
            }
            None => assert_eq!(tasks, before),
        }
    }
}

#[test]
fn quadrant_groups_partition_the_list() {
    let mut rng = StdRng::seed_from_u64(3);
    let tasks = random_tasks(&mut rng, 40);
    let groups = group_by_quadrant(&tasks);
    let total: usize = groups.iter().map(|(_, bucket)| bucket.len()).sum();
    assert_eq!(total, tasks.len());
    for (quadrant, bucket) in groups.iter() {
        assert!(bucket.iter().all(|t| t.quadrant.clamp(1, 4) == quadrant));
    }
}
