//! Project wire types.

use serde::{Deserialize, Serialize};

use crate::user::User;

/// A project and its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Backend identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Description (empty when unset).
    #[serde(default)]
    pub description: String,
    /// Owner of the project.
    pub owner: User,
    /// Members, owner included.
    #[serde(default)]
    pub members: Vec<User>,
    /// Creation timestamp (ISO 8601).
    #[serde(default)]
    pub created_at: String,
    /// Last modification timestamp (ISO 8601).
    #[serde(default)]
    pub updated_at: String,
}

/// Body of `POST /projects/` and `PATCH /projects/{id}/`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectPayload {
    /// Project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Project description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of the add/remove member endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRequest {
    /// User to add or remove.
    pub user_id: u64,
}

/// `{"message": ...}` acknowledgement returned by the member endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageAck {
    /// Human-readable confirmation.
    #[serde(default)]
    pub message: String,
}
