//! Board state store.
//!
//! Holds the tasks of one board in backend order, keyed by id. Status
//! columns are derived from the task list on every call and never stored,
//! so a task's column and its `status` field cannot disagree.

use std::collections::HashMap;

use taskboard_proto::task::{Task, TaskId, TaskStatus};

use super::BoardError;

/// Tasks of one board, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct BoardStore {
    /// Tasks in the order the backend returned them.
    tasks: Vec<Task>,
    /// Task ID -> index into `tasks`.
    index: HashMap<TaskId, usize>,
    /// Bumped on every mutation.
    revision: u64,
}

/// Tasks partitioned by status, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusGroups<'a> {
    columns: [Vec<&'a Task>; 3],
}

impl<'a> StatusGroups<'a> {
    /// Tasks in the column for `status`.
    #[must_use]
    pub fn get(&self, status: TaskStatus) -> &[&'a Task] {
        &self.columns[status.column_index()]
    }

    /// Number of tasks per column, in column order.
    #[must_use]
    pub fn counts(&self) -> [usize; 3] {
        [
            self.columns[0].len(),
            self.columns[1].len(),
            self.columns[2].len(),
        ]
    }

    /// Iterates `(status, tasks)` in column order.
    pub fn iter(&self) -> impl Iterator<Item = (TaskStatus, &[&'a Task])> {
        TaskStatus::ALL
            .into_iter()
            .map(move |status| (status, self.get(status)))
    }
}

impl BoardStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `tasks`.
    #[must_use]
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut store = Self::new();
        store.replace_all(tasks);
        store
    }

    /// Current tasks, in backend order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.index.get(&id).map(|&i| &self.tasks[i])
    }

    /// Number of tasks on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the board has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Mutation counter; unchanged revision means unchanged state.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the whole task set with a fresh fetch.
    ///
    /// If the list repeats an id, the last copy wins and keeps the
    /// position of the first.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks.clear();
        self.index.clear();
        for task in tasks {
            if let Some(&i) = self.index.get(&task.id) {
                self.tasks[i] = task;
            } else {
                self.index.insert(task.id, self.tasks.len());
                self.tasks.push(task);
            }
        }
        self.revision += 1;
    }

    /// Sets one task's status and returns the status it had before.
    ///
    /// Setting the status a task already has changes nothing and leaves
    /// the revision alone.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TaskNotFound`] if the task is not on the board.
    pub fn patch_status(
        &mut self,
        id: TaskId,
        status: TaskStatus,
    ) -> Result<TaskStatus, BoardError> {
        let &i = self.index.get(&id).ok_or(BoardError::TaskNotFound(id))?;
        let task = &mut self.tasks[i];
        let previous = task.status;
        if previous != status {
            task.status = status;
            self.revision += 1;
        }
        Ok(previous)
    }

    /// Tasks grouped by status, derived from the current list.
    #[must_use]
    pub fn grouped(&self) -> StatusGroups<'_> {
        let mut columns: [Vec<&Task>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for task in &self.tasks {
            columns[task.status.column_index()].push(task);
        }
        StatusGroups { columns }
    }

    /// Tasks in one column, derived from the current list.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    /// Column and row of a task on the board.
    #[must_use]
    pub fn locate(&self, id: TaskId) -> Option<(TaskStatus, usize)> {
        let status = self.get(id)?.status;
        let row = self
            .tasks
            .iter()
            .filter(|t| t.status == status)
            .position(|t| t.id == id)?;
        Some((status, row))
    }
}
