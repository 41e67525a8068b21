//! Processing order for an allocation run.

use std::cmp::{Ordering, Reverse};

use crate::task::Task;

/// Composite ordering key: priority rank, then zone ascending, then
/// difficulty descending.
fn sort_key(task: &Task) -> (u8, &str, Reverse<u32>) {
    (task.priority.rank(), task.zone.as_str(), Reverse(task.difficulty))
}

/// Compare two tasks by processing order.
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

/// Return the tasks in processing order. The input is left untouched and
/// ties keep their input order (`sort_by` is stable).
pub fn sort_tasks(tasks: &[Task]) -> Vec<Task> {
    let mut ordered = tasks.to_vec();
    ordered.sort_by(compare_tasks);
    ordered
}
