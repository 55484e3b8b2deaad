use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, MeResponse, TokenResponse},
        gate::Identity,
    },
    error::ApiError,
    state::AppState,
};

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "login body rejected");
        ApiError::BadRequest("Invalid login request body".into())
    })?;

    let user = match state
        .directory
        .find_by_credentials(&payload.username, &payload.password)
        .await?
    {
        Some(u) => u,
        None => {
            warn!(username = %payload.username, "login invalid credentials");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let token = state.keys.issue(&user)?;

    info!(user_id = user.id, role = %user.role, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, identity), fields(user_id = identity.0.user_id))]
pub async fn get_me(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<MeResponse>, ApiError> {
    let Identity(claims) = identity;
    let user = state.directory.find_by_id(claims.user_id).await?.ok_or_else(|| {
        warn!(user_id = claims.user_id, "token refers to unknown user");
        ApiError::NotFound("User not found".into())
    })?;

    Ok(Json(MeResponse {
        id: user.id,
        role: user.role,
    }))
}
