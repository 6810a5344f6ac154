use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::review::ReviewRow;
use crate::reviews::category::matches_category;
use crate::reviews::import::import_reviews;
use crate::reviews::require_place_id;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

/// POST /api/reviews/import/:place_id
pub async fn handle_import(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<Json<Vec<ReviewRow>>, AppError> {
    let inserted = import_reviews(state.source.as_ref(), state.store.as_ref(), &place_id).await?;
    Ok(Json(inserted))
}

/// GET /api/reviews/:place_id?category=
///
/// Lists stored reviews; a non-blank `category` keeps only keyword matches.
pub async fn handle_list_reviews(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
    Query(params): Query<CategoryQuery>,
) -> Result<Json<Vec<ReviewRow>>, AppError> {
    let place_id = require_place_id(&place_id)?;
    let reviews = state.store.list_by_place(place_id).await?;

    let reviews = match params.category.as_deref().map(str::trim) {
        Some(category) if !category.is_empty() => reviews
            .into_iter()
            .filter(|r| matches_category(r.text.as_deref(), category))
            .collect(),
        _ => reviews,
    };

    Ok(Json(reviews))
}
