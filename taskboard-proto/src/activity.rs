//! Comments, attachments, activity log entries and notifications.

use serde::{Deserialize, Serialize};

use crate::task::TaskId;
use crate::user::User;

/// A comment on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Backend identifier.
    pub id: u64,
    /// Comment text.
    pub body: String,
    /// Author.
    pub author: User,
    /// Creation timestamp (ISO 8601).
    #[serde(default)]
    pub created_at: String,
    /// Last edit timestamp (ISO 8601).
    #[serde(default)]
    pub updated_at: String,
}

/// Body of comment create/update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentBody {
    /// Comment text.
    pub body: String,
}

/// A file attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Backend identifier.
    pub id: u64,
    /// Download URL of the stored file.
    pub file: String,
    /// Optional caption.
    #[serde(default)]
    pub description: String,
    /// Uploading user.
    pub uploader: User,
    /// Upload timestamp (ISO 8601).
    #[serde(default)]
    pub uploaded_at: String,
}

/// One entry of a project or task activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLog {
    /// Backend identifier.
    pub id: u64,
    /// What happened, as rendered by the backend.
    pub action_description: String,
    /// Who did it.
    pub actor: User,
    /// When it happened (ISO 8601).
    #[serde(default)]
    pub timestamp: String,
}

/// A notification addressed to the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Backend identifier.
    pub id: u64,
    /// Short title.
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub message: String,
    /// Related project.
    #[serde(default)]
    pub project: Option<u64>,
    /// Name of the related project.
    #[serde(default)]
    pub project_name: Option<String>,
    /// Related task.
    #[serde(default)]
    pub task: Option<TaskId>,
    /// Title of the related task.
    #[serde(default)]
    pub task_title: Option<String>,
    /// Whether the user has read it.
    #[serde(default)]
    pub is_read: bool,
    /// Creation timestamp (ISO 8601).
    #[serde(default)]
    pub created_at: String,
}
