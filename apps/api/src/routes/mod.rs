pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::reviews::handlers as reviews;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Reviews API
        .route(
            "/api/reviews/import/:place_id",
            post(reviews::handle_import),
        )
        .route("/api/reviews/:place_id", get(reviews::handle_list_reviews))
        // Analysis API
        .route("/api/analysis/:place_id", get(analysis::handle_analyze))
        .route(
            "/api/analysis/:place_id/trends",
            get(analysis::handle_trends),
        )
        .with_state(state)
}
