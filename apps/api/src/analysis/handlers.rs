//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::analysis::analyzer::analyze_reviews;
use crate::analysis::models::{AnalysisResult, TrendAnalysisResult};
use crate::analysis::trends::analyze_trends;
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/analysis/:place_id
///
/// Full generator-backed analysis. One outbound call per request, no caching.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<Json<AnalysisResult>, AppError> {
    let result =
        analyze_reviews(state.store.as_ref(), state.generator.as_ref(), &place_id).await?;
    Ok(Json(result))
}

/// GET /api/analysis/:place_id/trends
pub async fn handle_trends(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<Json<TrendAnalysisResult>, AppError> {
    let result = analyze_trends(state.store.as_ref(), &place_id).await?;
    Ok(Json(result))
}
