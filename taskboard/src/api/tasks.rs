//! Task endpoints.

use reqwest::Method;
use taskboard_proto::task::{MAX_TASK_TITLE_LENGTH, NewTask, Task, TaskId, TaskPatch, TaskStatus};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /projects/{id}/tasks/` — all tasks of a project.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn list_project_tasks(&self, project_id: u64) -> Result<Vec<Task>, ApiError> {
        self.get_json(&format!("projects/{project_id}/tasks/")).await
    }

    /// `GET /my-tasks/` — the caller's personal tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn list_personal_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.get_json("my-tasks/").await
    }

    /// `POST /projects/{id}/tasks/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an empty or overlong title,
    /// otherwise [`ApiError`] on transport failure or a non-success status.
    pub async fn create_task(&self, project_id: u64, task: &NewTask) -> Result<Task, ApiError> {
        validate_title(&task.title)?;
        self.send_json(Method::POST, &format!("projects/{project_id}/tasks/"), task)
            .await
    }

    /// `POST /my-tasks/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn create_personal_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        validate_title(&task.title)?;
        self.send_json(Method::POST, "my-tasks/", task).await
    }

    /// `GET /tasks/{id}/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn get_task(&self, id: TaskId) -> Result<Task, ApiError> {
        self.get_json(&format!("tasks/{id}/")).await
    }

    /// `PATCH /tasks/{id}/` with a partial body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an empty patch, otherwise
    /// [`ApiError`] on transport failure or a non-success status.
    pub async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        if patch.is_empty() {
            return Err(ApiError::InvalidRequest("empty task patch".to_string()));
        }
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        self.send_json(Method::PATCH, &format!("tasks/{id}/"), patch)
            .await
    }

    /// `PATCH /tasks/{id}/ {"status": ...}` — the board's drag-and-drop write.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn set_task_status(&self, id: TaskId, status: TaskStatus) -> Result<Task, ApiError> {
        self.update_task(id, &TaskPatch::status(status)).await
    }

    /// `DELETE /tasks/{id}/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        self.send_unit::<()>(Method::DELETE, &format!("tasks/{id}/"), None)
            .await
    }
}

/// Rejects empty titles and titles longer than the backend column.
fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::InvalidRequest("task title cannot be empty".to_string()));
    }
    if title.chars().count() > MAX_TASK_TITLE_LENGTH {
        return Err(ApiError::InvalidRequest(format!(
            "task title too long (max {MAX_TASK_TITLE_LENGTH} characters)"
        )));
    }
    Ok(())
}
