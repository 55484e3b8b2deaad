use axum::{extract::State, Json};
use tracing::{debug, instrument};

use crate::{auth::gate::Identity, error::ApiError, state::AppState, users::dto::PublicUser};

#[instrument(skip(state, identity), fields(user_id = identity.0.user_id))]
pub async fn list_users(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users: Vec<PublicUser> = state
        .directory
        .list_all()
        .await?
        .into_iter()
        .map(PublicUser::from)
        .collect();
    debug!(count = users.len(), "listed users");
    Ok(Json(users))
}
