use axum::{middleware, routing::get, Router};

use crate::{
    auth::gate::{enforce, Gate, Guarded},
    state::AppState,
    users::repo_types::Role,
};

pub mod handlers;
pub mod repo;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/contracts/:company", get(handlers::get_contracts))
        .route_layer(middleware::from_fn_with_state(
            Guarded::new(state.keys.clone(), Gate::role(Role::Admin)),
            enforce,
        ))
}
