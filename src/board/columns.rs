use crate::api::{Task, TaskStatus};

/// Tasks of one status, in server order.
#[derive(Debug, Clone)]
pub struct Column<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a Task>,
}

impl Column<'_> {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Split a snapshot into the five status columns, in [`TaskStatus::ALL`] order.
/// Every task lands in exactly one column.
pub fn partition(tasks: &[Task]) -> [Column<'_>; 5] {
    TaskStatus::ALL.map(|status| Column {
        status,
        tasks: tasks.iter().filter(|t| t.status == status).collect(),
    })
}
