//! Notification endpoints.

use reqwest::Method;
use taskboard_proto::activity::Notification;

use super::{ApiClient, ApiError};

/// Empty JSON object body; the read endpoints expect a POST with `{}`.
#[derive(serde::Serialize)]
struct Empty {}

impl ApiClient {
    /// `GET /notifications/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.get_json("notifications/").await
    }

    /// `POST /notifications/{id}/read/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn mark_notification_read(&self, id: u64) -> Result<(), ApiError> {
        self.send_unit(Method::POST, &format!("notifications/{id}/read/"), Some(&Empty {}))
            .await
    }

    /// `POST /notifications/read-all/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn mark_all_notifications_read(&self) -> Result<(), ApiError> {
        self.send_unit(Method::POST, "notifications/read-all/", Some(&Empty {}))
            .await
    }
}
