//! Authenticated HTTP client.
//!
//! Every request gets `Authorization: Bearer <token>` once a token is
//! set. Status checks are centralized in [`check_response`] so the
//! resource modules only build requests and name response types.

use std::time::Duration;

use parking_lot::RwLock;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use taskboard_proto::codec;
use url::Url;

use super::ApiError;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the task-management backend.
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    /// Creates a client for the backend rooted at `base_url`
    /// (e.g. `http://localhost:8000/api/`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` does not parse, or
    /// [`ApiError::Http`] if the underlying client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("taskboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base,
            token: RwLock::new(None),
        })
    }

    /// Sets the bearer token, builder style.
    #[must_use]
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.set_token(Some(token.into()));
        self
    }

    /// Replaces (or clears) the bearer token.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    /// Whether a bearer token is currently set.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    /// The normalized base URL (always ends with `/`).
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolves an endpoint path such as `tasks/7/` against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// Starts a request to `path` with the bearer token attached.
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        let builder = self.http.request(method, url);
        let token = self.token.read().clone();
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Sends a prepared request and checks its status.
    pub(crate) async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let resp = builder.send().await?;
        check_response(resp).await
    }

    /// Sends a prepared request and decodes the JSON response.
    pub(crate) async fn execute_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = self.execute(builder).await?;
        let bytes = resp.bytes().await?;
        Ok(codec::decode(&bytes)?)
    }

    /// `GET path` and decode the JSON response.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        tracing::debug!(path, "GET");
        self.execute_json(self.request(Method::GET, path)?).await
    }

    /// Send `body` as JSON with `method` and decode the JSON response.
    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(%method, path, "request");
        self.execute_json(self.request(method, path)?.json(body))
            .await
    }

    /// Send `body` (if any) with `method` and ignore the response body.
    pub(crate) async fn send_unit<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        tracing::debug!(%method, path, "request");
        let mut builder = self.request(method, path)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(builder).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("has_token", &self.has_token())
            .finish_non_exhaustive()
    }
}

/// Maps non-success responses to [`ApiError`].
///
/// - **401/403** → [`ApiError::Unauthorized`]
/// - **404** → [`ApiError::NotFound`] with the request URL
/// - **other non-2xx** → [`ApiError::Status`] with the body text
async fn check_response(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized {
            status: status.as_u16(),
        }),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(resp.url().path().to_string())),
        _ => Err(ApiError::Status {
            status: status.as_u16(),
            body: resp.text().await.unwrap_or_default(),
        }),
    }
}
