use axum::{middleware, routing::get, routing::post, Router};

use crate::state::AppState;

pub mod claims;
mod dto;
pub mod gate;
pub mod handlers;
pub mod jwt;
pub mod password;

use gate::{enforce, Gate, Guarded};

pub fn router(state: &AppState) -> Router<AppState> {
    let me = Router::new()
        .route("/me", get(handlers::get_me))
        .route_layer(middleware::from_fn_with_state(
            Guarded::new(state.keys.clone(), Gate::authenticated()),
            enforce,
        ));

    Router::new()
        .route("/auth/login", post(handlers::login))
        .merge(me)
}
