use serde::{Deserialize, Serialize};

use crate::users::repo_types::Role;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Identity of the caller as seen by `/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub role: Role,
}
