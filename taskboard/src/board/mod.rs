//! Kanban board core.
//!
//! A board view owns one [`BoardStore`] (the task set, grouped by status
//! on demand), one [`DragController`] (turns pointer gestures into
//! transition requests) and one [`Coordinator`] (applies transitions
//! optimistically and reconciles with the backend by re-fetching).

pub mod coordinator;
pub mod drag;
pub mod store;

pub use coordinator::{
    Coordinator, DispatchTicket, Notice, NoticeLevel, PendingTransition, SettleOutcome,
    Settlement, SyncPhase,
};
pub use drag::{BoardLayout, DragController, DragSession, DropOutcome, MoveDirection};
pub use store::{BoardStore, StatusGroups};

use taskboard_proto::task::{TaskId, TaskStatus};

use crate::api::ApiError;

/// A request to move one task to another column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRequest {
    /// Task being moved.
    pub task_id: TaskId,
    /// Column it was dropped on.
    pub target: TaskStatus,
}

/// Errors that can occur in board operations.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// Task with the given ID is not on the board.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// Re-fetching the task list failed; the board keeps its current state.
    #[error("refresh failed: {0}")]
    RefreshFailed(#[source] ApiError),
}
