//! Review persistence behind a narrow, trait-based store.
//!
//! `AppState` holds an `Arc<dyn ReviewStore>`; production uses `PgReviewStore`.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::errors::AppError;
use crate::models::review::{NewReview, ReviewRow};

/// Rows per INSERT statement. Six binds per row keeps this far below the
/// PostgreSQL limit of 65535 parameters.
const INSERT_CHUNK_SIZE: usize = 1000;

const REVIEW_COLUMNS: &str =
    "id, place_id, author, rating, text, review_date, external_id, created_at";

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// All reviews for a place, in no particular order.
    async fn list_by_place(&self, place_id: &str) -> Result<Vec<ReviewRow>, AppError>;

    async fn exists_by_external_id(&self, external_id: &str) -> Result<bool, AppError>;

    /// Persists a batch and returns the rows actually written, with their
    /// store-assigned ids. Rows whose external id already exists are skipped
    /// rather than failing the batch.
    async fn insert_all(&self, reviews: Vec<NewReview>) -> Result<Vec<ReviewRow>, AppError>;
}

#[derive(Clone)]
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn list_by_place(&self, place_id: &str) -> Result<Vec<ReviewRow>, AppError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE place_id = $1 ORDER BY id"
        ))
        .bind(place_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn exists_by_external_id(&self, external_id: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reviews WHERE external_id = $1)")
                .bind(external_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn insert_all(&self, reviews: Vec<NewReview>) -> Result<Vec<ReviewRow>, AppError> {
        let mut inserted = Vec::with_capacity(reviews.len());
        if reviews.is_empty() {
            return Ok(inserted);
        }

        let mut tx = self.pool.begin().await?;
        for chunk in reviews.chunks(INSERT_CHUNK_SIZE) {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO reviews (place_id, author, rating, text, review_date, external_id) ",
            );
            builder.push_values(chunk, |mut row, review| {
                row.push_bind(review.place_id.clone())
                    .push_bind(review.author.clone())
                    .push_bind(review.rating)
                    .push_bind(review.text.clone())
                    .push_bind(review.review_date.clone())
                    .push_bind(review.external_id.clone());
            });
            // Concurrent imports may race past the existence check; the unique
            // index settles it and the losing row is simply not returned.
            builder.push(" ON CONFLICT (external_id) DO NOTHING RETURNING ");
            builder.push(REVIEW_COLUMNS);

            let rows = builder
                .build_query_as::<ReviewRow>()
                .fetch_all(&mut *tx)
                .await?;
            inserted.extend(rows);
        }
        tx.commit().await?;

        debug!(
            requested = reviews.len(),
            inserted = inserted.len(),
            "Inserted review batch"
        );
        Ok(inserted)
    }
}
