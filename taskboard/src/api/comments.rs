//! Task comments, attachments and the task activity log.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use taskboard_proto::activity::{ActivityLog, Attachment, Comment, CommentBody};
use taskboard_proto::task::TaskId;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /tasks/{id}/comments/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn list_comments(&self, task_id: TaskId) -> Result<Vec<Comment>, ApiError> {
        self.get_json(&format!("tasks/{task_id}/comments/")).await
    }

    /// `POST /tasks/{id}/comments/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for a blank body, otherwise
    /// [`ApiError`] on transport failure or a non-success status.
    pub async fn create_comment(&self, task_id: TaskId, body: &str) -> Result<Comment, ApiError> {
        let body = comment_body(body)?;
        self.send_json(Method::POST, &format!("tasks/{task_id}/comments/"), &body)
            .await
    }

    /// `PUT /tasks/{id}/comments/{comment}/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for a blank body, otherwise
    /// [`ApiError`] on transport failure or a non-success status.
    pub async fn update_comment(
        &self,
        task_id: TaskId,
        comment_id: u64,
        body: &str,
    ) -> Result<Comment, ApiError> {
        let body = comment_body(body)?;
        self.send_json(
            Method::PUT,
            &format!("tasks/{task_id}/comments/{comment_id}/"),
            &body,
        )
        .await
    }

    /// `DELETE /tasks/{id}/comments/{comment}/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn delete_comment(&self, task_id: TaskId, comment_id: u64) -> Result<(), ApiError> {
        self.send_unit::<()>(
            Method::DELETE,
            &format!("tasks/{task_id}/comments/{comment_id}/"),
            None,
        )
        .await
    }

    /// `GET /tasks/{id}/attachments/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn list_attachments(&self, task_id: TaskId) -> Result<Vec<Attachment>, ApiError> {
        self.get_json(&format!("tasks/{task_id}/attachments/")).await
    }

    /// `POST /tasks/{id}/attachments/` as `multipart/form-data`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn upload_attachment(
        &self,
        task_id: TaskId,
        file_name: &str,
        contents: Vec<u8>,
        description: Option<&str>,
    ) -> Result<Attachment, ApiError> {
        let part = Part::bytes(contents).file_name(file_name.to_string());
        let mut form = Form::new().part("file", part);
        if let Some(description) = description {
            form = form.text("description", description.to_string());
        }
        tracing::debug!(%task_id, file_name, "uploading attachment");
        let builder = self
            .request(Method::POST, &format!("tasks/{task_id}/attachments/"))?
            .multipart(form);
        self.execute_json(builder).await
    }

    /// `DELETE /tasks/{id}/attachments/{attachment}/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn delete_attachment(
        &self,
        task_id: TaskId,
        attachment_id: u64,
    ) -> Result<(), ApiError> {
        self.send_unit::<()>(
            Method::DELETE,
            &format!("tasks/{task_id}/attachments/{attachment_id}/"),
            None,
        )
        .await
    }

    /// `GET /tasks/{id}/activity/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn task_activity(&self, task_id: TaskId) -> Result<Vec<ActivityLog>, ApiError> {
        self.get_json(&format!("tasks/{task_id}/activity/")).await
    }
}

fn comment_body(body: &str) -> Result<CommentBody, ApiError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidRequest("comment body is empty".to_string()));
    }
    Ok(CommentBody {
        body: trimmed.to_string(),
    })
}
