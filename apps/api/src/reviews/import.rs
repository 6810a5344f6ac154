use std::collections::HashSet;

use tracing::info;

use crate::errors::AppError;
use crate::models::review::{NewReview, ReviewRow};
use crate::reviews::fetch::{RawReview, ReviewSource};
use crate::reviews::require_place_id;
use crate::reviews::store::ReviewStore;

/// Fetches all reviews for a place and persists the ones not seen before.
///
/// A record is skipped when its external id is already stored, or already
/// appeared earlier in this batch. Records without an external id are always
/// kept. Returns only the newly persisted rows.
pub async fn import_reviews(
    source: &dyn ReviewSource,
    store: &dyn ReviewStore,
    place_id: &str,
) -> Result<Vec<ReviewRow>, AppError> {
    let place_id = require_place_id(place_id)?;

    let raw_reviews = source.fetch_reviews(place_id).await?;
    let fetched = raw_reviews.len();

    let mut seen: HashSet<String> = HashSet::new();
    let mut fresh = Vec::with_capacity(raw_reviews.len());
    for raw in &raw_reviews {
        if let Some(external_id) = raw.external_id() {
            if !seen.insert(external_id.to_string())
                || store.exists_by_external_id(external_id).await?
            {
                continue;
            }
        }
        fresh.push(to_new_review(place_id, raw));
    }

    let inserted = store.insert_all(fresh).await?;

    info!(
        "Imported {} new reviews for place {} ({} fetched)",
        inserted.len(),
        place_id,
        fetched
    );
    Ok(inserted)
}

fn to_new_review(place_id: &str, raw: &RawReview) -> NewReview {
    NewReview {
        place_id: place_id.to_string(),
        author: raw.author(),
        rating: raw.rating(),
        text: Some(raw.text()),
        review_date: raw.date(),
        external_id: raw.external_id().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{raw_review, FailingSource, MemoryReviewStore, StaticSource};

    #[tokio::test]
    async fn test_import_persists_new_reviews() {
        let store = MemoryReviewStore::default();
        let source = StaticSource::new(vec![
            raw_review(Some("ext-1"), 5, "great food"),
            raw_review(Some("ext-2"), 1, "cold food, rude staff"),
        ]);

        let inserted = import_reviews(&source, &store, "place-1").await.unwrap();

        assert_eq!(inserted.len(), 2);
        assert!(inserted.iter().all(|r| r.place_id == "place-1"));
        assert_ne!(inserted[0].id, inserted[1].id);
        assert_eq!(store.list_by_place("place-1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reimport_is_idempotent() {
        let store = MemoryReviewStore::default();
        let source = StaticSource::new(vec![raw_review(Some("ext-1"), 4, "gut")]);

        let first = import_reviews(&source, &store, "place-1").await.unwrap();
        let second = import_reviews(&source, &store, "place-1").await.unwrap();

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(store.list_by_place("place-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_external_id_is_global_across_places() {
        let store = MemoryReviewStore::default();
        let source = StaticSource::new(vec![raw_review(Some("ext-1"), 4, "gut")]);

        import_reviews(&source, &store, "place-1").await.unwrap();
        let other = import_reviews(&source, &store, "place-2").await.unwrap();

        assert!(other.is_empty());
        assert!(store.list_by_place("place-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_within_one_batch_stored_once() {
        let store = MemoryReviewStore::default();
        let source = StaticSource::new(vec![
            raw_review(Some("ext-1"), 4, "first"),
            raw_review(Some("ext-1"), 2, "second copy"),
        ]);

        let inserted = import_reviews(&source, &store, "place-1").await.unwrap();

        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].text.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_reviews_without_external_id_always_kept() {
        let store = MemoryReviewStore::default();
        let source = StaticSource::new(vec![
            raw_review(None, 3, "anonymous"),
            raw_review(None, 3, "anonymous"),
        ]);

        let inserted = import_reviews(&source, &store, "place-1").await.unwrap();
        assert_eq!(inserted.len(), 2);
    }

    #[tokio::test]
    async fn test_defaults_applied_to_sparse_records() {
        let store = MemoryReviewStore::default();
        let source = StaticSource::new(vec![RawReview::default()]);

        let inserted = import_reviews(&source, &store, "place-1").await.unwrap();

        let review = &inserted[0];
        assert_eq!(review.author, "Unknown");
        assert_eq!(review.rating, 0);
        assert_eq!(review.text.as_deref(), Some(""));
        assert_eq!(review.review_date, "unknown");
        assert!(review.external_id.is_none());
    }

    #[tokio::test]
    async fn test_blank_place_id_touches_nothing() {
        let store = MemoryReviewStore::default();
        let source = FailingSource;

        let err = import_reviews(&source, &store, "  ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_as_upstream() {
        let store = MemoryReviewStore::default();

        let err = import_reviews(&FailingSource, &store, "place-1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upstream { .. }));
        assert!(store.list_by_place("place-1").await.unwrap().is_empty());
    }
}
