use axum::{middleware, routing::get, Router};

use crate::{
    auth::gate::{enforce, Gate, Guarded},
    state::AppState,
};

mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

use repo_types::Role;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::list_users))
        .route_layer(middleware::from_fn_with_state(
            Guarded::new(state.keys.clone(), Gate::role(Role::Admin)),
            enforce,
        ))
}
