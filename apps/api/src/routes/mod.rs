pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::simplify::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/simplify", post(handlers::handle_simplify))
        .with_state(state)
}
