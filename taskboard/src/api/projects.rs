//! Project endpoints.

use reqwest::Method;
use taskboard_proto::activity::ActivityLog;
use taskboard_proto::project::{MemberRequest, MessageAck, Project, ProjectPayload};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /projects/` — projects the caller owns or belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get_json("projects/").await
    }

    /// `POST /projects/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when no name is given, otherwise
    /// [`ApiError`] on transport failure or a non-success status.
    pub async fn create_project(&self, payload: &ProjectPayload) -> Result<Project, ApiError> {
        if payload.name.as_deref().is_none_or(str::is_empty) {
            return Err(ApiError::InvalidRequest("project name is required".to_string()));
        }
        self.send_json(Method::POST, "projects/", payload).await
    }

    /// `GET /projects/{id}/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn get_project(&self, id: u64) -> Result<Project, ApiError> {
        self.get_json(&format!("projects/{id}/")).await
    }

    /// `PATCH /projects/{id}/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn update_project(
        &self,
        id: u64,
        payload: &ProjectPayload,
    ) -> Result<Project, ApiError> {
        self.send_json(Method::PATCH, &format!("projects/{id}/"), payload)
            .await
    }

    /// `DELETE /projects/{id}/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn delete_project(&self, id: u64) -> Result<(), ApiError> {
        self.send_unit::<()>(Method::DELETE, &format!("projects/{id}/"), None)
            .await
    }

    /// `POST /projects/{id}/add_member/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn add_member(&self, project_id: u64, user_id: u64) -> Result<MessageAck, ApiError> {
        self.send_json(
            Method::POST,
            &format!("projects/{project_id}/add_member/"),
            &MemberRequest { user_id },
        )
        .await
    }

    /// `POST /projects/{id}/remove_member/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status
    /// (the backend refuses to remove the owner).
    pub async fn remove_member(
        &self,
        project_id: u64,
        user_id: u64,
    ) -> Result<MessageAck, ApiError> {
        self.send_json(
            Method::POST,
            &format!("projects/{project_id}/remove_member/"),
            &MemberRequest { user_id },
        )
        .await
    }

    /// `GET /projects/{id}/activity/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn project_activity(&self, project_id: u64) -> Result<Vec<ActivityLog>, ApiError> {
        self.get_json(&format!("projects/{project_id}/activity/"))
            .await
    }
}
