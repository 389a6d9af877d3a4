//! Ordered, best-effort task execution
//!
//! Tasks run one at a time in input order. A failing task is recorded as
//! skipped and never stops the tasks after it.

use shortsmith_core::Result;

/// Result of one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Stored,
    Skipped(String),
}

impl TaskOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, TaskOutcome::Stored)
    }
}

/// Run `task` for each item in order, collecting one outcome per item
pub fn run_ordered<T, F>(items: impl IntoIterator<Item = T>, mut task: F) -> Vec<TaskOutcome>
where
    F: FnMut(usize, T) -> Result<()>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match task(index, item) {
            Ok(()) => TaskOutcome::Stored,
            Err(e) => {
                log::warn!("Task {} skipped: {}", index, e);
                TaskOutcome::Skipped(e.to_string())
            }
        })
        .collect()
}

/// Indices that were skipped, with their reasons
pub fn skipped(outcomes: &[TaskOutcome]) -> Vec<(usize, String)> {
    outcomes
        .iter()
        .enumerate()
        .filter_map(|(i, o)| match o {
            TaskOutcome::Skipped(reason) => Some((i, reason.clone())),
            TaskOutcome::Stored => None,
        })
        .collect()
}
