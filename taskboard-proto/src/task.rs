//! Task wire types for the Taskboard backend.
//!
//! Mirrors the backend's task serializer: status and priority travel as
//! short upper-case codes (`"INPR"`, `"MED"`), the assignee is a nested
//! user object on reads and a bare `assignee_id` on writes.

use serde::{Deserialize, Deserializer, Serialize};

use crate::user::User;

/// Maximum allowed task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 200;

/// Backend-assigned task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a raw backend identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kanban column a task sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started.
    #[serde(rename = "TODO")]
    Todo,
    /// Being worked on.
    #[serde(rename = "INPR")]
    InProgress,
    /// Finished.
    #[serde(rename = "DONE")]
    Done,
}

impl TaskStatus {
    /// All statuses in board column order.
    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Wire code used by the backend.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "INPR",
            Self::Done => "DONE",
        }
    }

    /// Column heading shown on the board.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Todo => "TO DO",
            Self::InProgress => "IN PROGRESS",
            Self::Done => "DONE",
        }
    }

    /// Position of this status's column on the board, left to right.
    #[must_use]
    pub const fn column_index(self) -> usize {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::Done => 2,
        }
    }

    /// Status of the column at `index`, if any.
    #[must_use]
    pub const fn from_column_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Todo),
            1 => Some(Self::InProgress),
            2 => Some(Self::Done),
            _ => None,
        }
    }

    /// Parses a wire code such as `"INPR"`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskPriority {
    /// Low priority.
    #[serde(rename = "LOW")]
    Low,
    /// Medium priority (backend default).
    #[default]
    #[serde(rename = "MED")]
    Medium,
    /// High priority.
    #[serde(rename = "HIGH")]
    High,
}

impl TaskPriority {
    /// Wire code used by the backend.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MED",
            Self::High => "HIGH",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A task as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Backend identifier.
    pub id: TaskId,
    /// Short title.
    pub title: String,
    /// Free-form description (empty when unset).
    #[serde(default)]
    pub description: String,
    /// Board column.
    pub status: TaskStatus,
    /// Priority.
    #[serde(default)]
    pub priority: TaskPriority,
    /// Due date as an ISO `YYYY-MM-DD` string.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Assigned user, if any.
    #[serde(default)]
    pub assignee: Option<User>,
    /// Owning project; `None` for personal tasks.
    #[serde(default)]
    pub project: Option<u64>,
    /// Whether this is a personal (project-less) task.
    #[serde(default)]
    pub is_personal: bool,
    /// User id of the creator.
    #[serde(default)]
    pub created_by: Option<u64>,
    /// Creation timestamp (ISO 8601).
    #[serde(default)]
    pub created_at: String,
    /// Last modification timestamp (ISO 8601).
    #[serde(default)]
    pub updated_at: String,
}

impl Task {
    /// Builds a minimal task, mostly useful for fixtures and demo data.
    #[must_use]
    pub fn new(id: u64, title: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id: TaskId::new(id),
            title: title.into(),
            description: String::new(),
            status,
            priority: TaskPriority::default(),
            due_date: None,
            assignee: None,
            project: None,
            is_personal: false,
            created_by: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

/// Body of `POST /projects/{id}/tasks/` and `POST /my-tasks/`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewTask {
    /// Title (required).
    pub title: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial status; the backend defaults to `TODO`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Initial priority; the backend defaults to `MED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    /// Assignee user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<u64>,
    /// Due date (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl NewTask {
    /// A payload carrying only a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial body of `PATCH /tasks/{id}/`.
///
/// Absent fields are omitted from the JSON. `assignee_id` and `due_date`
/// are tri-state: `None` leaves them alone, `Some(None)` sends `null` to
/// clear them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// New priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    /// New assignee, or `Some(None)` to unassign.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub assignee_id: Option<Option<u64>>,
    /// New due date, or `Some(None)` to clear it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub due_date: Option<Option<String>>,
}

impl TaskPatch {
    /// A patch that changes only the status.
    #[must_use]
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Maps a present JSON field (including `null`) to `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
