//! The two backend calls the board core needs.
//!
//! Implementations:
//! - [`ApiClient`] — the real REST backend
//! - [`super::memory::InMemoryBackend`] — offline demo mode and tests

use taskboard_proto::task::{Task, TaskId, TaskStatus};

use super::{ApiClient, ApiError};

/// Which task list a board shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardScope {
    /// Tasks of one project.
    Project(u64),
    /// The caller's personal tasks.
    Personal,
}

impl std::fmt::Display for BoardScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Project(id) => write!(f, "project #{id}"),
            Self::Personal => write!(f, "my tasks"),
        }
    }
}

/// Async source of truth for a board.
pub trait TaskBackend: Send + Sync {
    /// Fetch the full task list for `scope`.
    fn fetch_tasks(
        &self,
        scope: BoardScope,
    ) -> impl std::future::Future<Output = Result<Vec<Task>, ApiError>> + Send;

    /// Write a task's status and return the task as stored.
    fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
    ) -> impl std::future::Future<Output = Result<Task, ApiError>> + Send;
}

impl TaskBackend for ApiClient {
    async fn fetch_tasks(&self, scope: BoardScope) -> Result<Vec<Task>, ApiError> {
        match scope {
            BoardScope::Project(id) => self.list_project_tasks(id).await,
            BoardScope::Personal => self.list_personal_tasks().await,
        }
    }

    async fn update_status(&self, id: TaskId, status: TaskStatus) -> Result<Task, ApiError> {
        self.set_task_status(id, status).await
    }
}
