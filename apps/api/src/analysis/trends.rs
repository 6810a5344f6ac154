//! Trend aggregation. Deterministic, no generator call.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;

use crate::analysis::models::TrendAnalysisResult;
use crate::errors::AppError;
use crate::models::review::ReviewRow;
use crate::reviews::dates::{current_day, normalize_relative_date};
use crate::reviews::require_place_id;
use crate::reviews::store::ReviewStore;

pub const TREND_RISING: &str = "rising";
pub const TREND_FALLING: &str = "falling";
pub const TREND_STABLE: &str = "stable";
pub const TREND_INSUFFICIENT: &str = "insufficient data for trend analysis";

/// Loads a place's reviews and aggregates them per normalized date.
pub async fn analyze_trends(
    store: &dyn ReviewStore,
    place_id: &str,
) -> Result<TrendAnalysisResult, AppError> {
    let place_id = require_place_id(place_id)?;

    let reviews = store.list_by_place(place_id).await?;
    if reviews.is_empty() {
        return Err(AppError::no_reviews(place_id));
    }

    let result = aggregate_trends(&reviews, current_day());
    info!(
        "Trend for place {}: {} over {} dates",
        place_id,
        result.trend_summary,
        result.average_rating_per_date.len()
    );
    Ok(result)
}

/// Groups reviews by `normalize_relative_date(review_date, today)` and
/// computes per-date mean rating and count.
pub fn aggregate_trends(reviews: &[ReviewRow], today: NaiveDate) -> TrendAnalysisResult {
    let mut grouped: BTreeMap<NaiveDate, Vec<i32>> = BTreeMap::new();
    for review in reviews {
        grouped
            .entry(normalize_relative_date(&review.review_date, today))
            .or_default()
            .push(review.rating);
    }

    let average_rating_per_date: BTreeMap<NaiveDate, f64> = grouped
        .iter()
        .map(|(date, ratings)| (*date, mean(ratings)))
        .collect();
    let reviews_count_per_date = grouped
        .iter()
        .map(|(date, ratings)| (*date, ratings.len()))
        .collect();

    TrendAnalysisResult {
        trend_summary: summarize_trend(&average_rating_per_date).to_string(),
        average_rating_per_date,
        reviews_count_per_date,
    }
}

/// Compares the earliest and latest buckets only; intermediate dates do not
/// influence the direction.
pub fn summarize_trend(averages: &BTreeMap<NaiveDate, f64>) -> &'static str {
    if averages.len() < 2 {
        return TREND_INSUFFICIENT;
    }
    // BTreeMap iterates in ascending date order.
    let (Some((_, first)), Some((_, last))) =
        (averages.first_key_value(), averages.last_key_value())
    else {
        return TREND_INSUFFICIENT;
    };

    if last > first {
        TREND_RISING
    } else if last < first {
        TREND_FALLING
    } else {
        TREND_STABLE
    }
}

fn mean(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / ratings.len() as f64
}
