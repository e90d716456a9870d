//! User and authentication wire types.

use serde::{Deserialize, Serialize};

/// A backend user as embedded in tasks, projects and comments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Backend identifier.
    pub id: u64,
    /// Login name.
    pub username: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
}

impl User {
    /// Upper-cased first letter of the username, used as an avatar.
    #[must_use]
    pub fn initial(&self) -> char {
        self.username
            .chars()
            .next()
            .map_or('?', |c| c.to_ascii_uppercase())
    }
}

/// Body of `POST /login/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

/// JWT pair returned by `POST /login/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer token.
    pub access: String,
    /// Long-lived refresh token.
    pub refresh: String,
}
