//! Review analysis. Orchestrates the generator-backed analysis pipeline.
//!
//! Flow: list_by_place → serialize reviews with store ids → build prompt →
//!       one generator call → unwrap envelope → parse → reconcile fake-review
//!       ids against the reviews that were sent → return.
//!
//! Read-only with respect to the store. Nothing is cached; every request
//! recomputes from scratch.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::analysis::models::{AnalysisResult, FakeReviewDetail, FakeReviewEntry};
use crate::analysis::prompts::ANALYSIS_PROMPT_TEMPLATE;
use crate::errors::AppError;
use crate::llm_client::prompts::{ID_STABILITY_INSTRUCTION, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{extract_completion_content, LlmError, TextGenerator};
use crate::models::review::ReviewRow;
use crate::reviews::require_place_id;
use crate::reviews::store::ReviewStore;

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the full analysis for a place.
///
/// Steps:
/// 1. list_by_place() → Vec<ReviewRow> (NotFound when empty, before any call)
/// 2. build_analysis_prompt() → prompt carrying each review's store id
/// 3. generator.complete() → raw envelope (single call, no retry)
/// 4. parse_analysis() → AnalysisResult
/// 5. reconcile_fake_reviews() → details for ids that exist in the batch
pub async fn analyze_reviews(
    store: &dyn ReviewStore,
    generator: &dyn TextGenerator,
    place_id: &str,
) -> Result<AnalysisResult, AppError> {
    let place_id = require_place_id(place_id)?;

    // Step 1: Load reviews
    let reviews = store.list_by_place(place_id).await?;
    if reviews.is_empty() {
        return Err(AppError::no_reviews(place_id));
    }

    // Step 2: Prompt
    let prompt = build_analysis_prompt(&reviews);

    // Step 3: Generator call
    info!(
        "Requesting analysis of {} reviews for place {}",
        reviews.len(),
        place_id
    );
    let raw = generator.complete(&prompt).await?;

    // Step 4: Unwrap and parse
    let mut result = parse_analysis(&raw)?;

    // Step 5: Reconcile
    result.fake_review_details = reconcile_fake_reviews(&result.fake_reviews, &reviews);
    result.review_count = reviews.len();

    info!(
        "Analysis for place {}: {} reviews, {} flagged, {} reconciled",
        place_id,
        result.review_count,
        result.fake_reviews.len(),
        result.fake_review_details.len()
    );
    Ok(result)
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt construction
// ────────────────────────────────────────────────────────────────────────────

/// One line per review: `{"id": 1, "rating": 5, "text": "..."}`.
///
/// Double quotes inside the text become single quotes; nothing else is
/// escaped. Missing text is sent as an empty string.
pub fn serialize_reviews(reviews: &[ReviewRow]) -> String {
    reviews
        .iter()
        .map(|r| {
            format!(
                "{{\"id\": {}, \"rating\": {}, \"text\": \"{}\"}}\n",
                r.id,
                r.rating,
                r.text.as_deref().unwrap_or("").replace('"', "'")
            )
        })
        .collect()
}

pub fn build_analysis_prompt(reviews: &[ReviewRow]) -> String {
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{id_instruction}", ID_STABILITY_INSTRUCTION)
        .replace("{json_only_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{reviews}", &serialize_reviews(reviews))
}

// ────────────────────────────────────────────────────────────────────────────
// Response handling
// ────────────────────────────────────────────────────────────────────────────

/// Unwraps the generator envelope and parses its content as an
/// `AnalysisResult`. Parse failures keep the raw envelope.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, LlmError> {
    let content = extract_completion_content(raw)?;
    serde_json::from_str(&content).map_err(|source| LlmError::InvalidContent {
        source,
        raw: raw.to_string(),
    })
}

/// Joins flagged ids back to the reviews that were sent to the generator.
///
/// Ids with no matching review are dropped, never fabricated. Repeated ids
/// collapse into one detail carrying the highest reported probability, in
/// order of first appearance.
pub fn reconcile_fake_reviews(
    entries: &[FakeReviewEntry],
    reviews: &[ReviewRow],
) -> Vec<FakeReviewDetail> {
    let mut by_id: HashMap<i64, &ReviewRow> = HashMap::with_capacity(reviews.len());
    for review in reviews {
        by_id.entry(review.id).or_insert(review);
    }

    let mut details: Vec<FakeReviewDetail> = Vec::new();
    let mut position: HashMap<i64, usize> = HashMap::new();
    let mut unknown_ids = Vec::new();

    for entry in entries {
        let Some(review) = by_id.get(&entry.review_id) else {
            unknown_ids.push(entry.review_id);
            continue;
        };
        match position.get(&entry.review_id) {
            Some(&idx) => {
                if entry.probability > details[idx].probability {
                    details[idx].probability = entry.probability;
                }
            }
            None => {
                position.insert(entry.review_id, details.len());
                details.push(FakeReviewDetail::from_review(review, entry.probability));
            }
        }
    }

    if !unknown_ids.is_empty() {
        warn!(
            "Generator flagged {} review ids not present in the batch, dropped: {:?}",
            unknown_ids.len(),
            unknown_ids
        );
    }

    details
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
