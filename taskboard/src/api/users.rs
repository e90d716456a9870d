//! User search and login.

use reqwest::Method;
use taskboard_proto::user::{LoginRequest, TokenPair, User};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /users/?search=q`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn search_users(&self, query: &str) -> Result<Vec<User>, ApiError> {
        let builder = self
            .request(Method::GET, "users/")?
            .query(&[("search", query)]);
        self.execute_json(builder).await
    }

    /// `POST /login/` and keep the returned access token for later calls.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for bad credentials, otherwise
    /// [`ApiError`] on transport failure or a non-success status.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let pair: TokenPair = self.send_json(Method::POST, "login/", &body).await?;
        self.set_token(Some(pair.access.clone()));
        tracing::info!(username, "logged in");
        Ok(pair)
    }
}
