//! In-process doubles for the store and both outbound collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::errors::AppError;
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::review::{NewReview, ReviewRow};
use crate::reviews::fetch::{FetchError, RawRating, RawReview, RawReviewUser, ReviewSource};
use crate::reviews::store::ReviewStore;

/// Vector-backed store with the same unique-external-id rule as the real table.
#[derive(Default)]
pub struct MemoryReviewStore {
    rows: Mutex<Vec<ReviewRow>>,
}

impl MemoryReviewStore {
    pub fn with_rows(rows: Vec<ReviewRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn list_by_place(&self, place_id: &str) -> Result<Vec<ReviewRow>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| r.place_id == place_id)
            .cloned()
            .collect())
    }

    async fn exists_by_external_id(&self, external_id: &str) -> Result<bool, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .any(|r| r.external_id.as_deref() == Some(external_id)))
    }

    async fn insert_all(&self, reviews: Vec<NewReview>) -> Result<Vec<ReviewRow>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let mut inserted = Vec::new();
        for review in reviews {
            let duplicate = review.external_id.is_some()
                && rows.iter().any(|r| r.external_id == review.external_id);
            if duplicate {
                continue;
            }
            let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
            let row = ReviewRow {
                id,
                place_id: review.place_id,
                author: review.author,
                rating: review.rating,
                text: review.text,
                review_date: review.review_date,
                external_id: review.external_id,
                created_at: Utc::now(),
            };
            rows.push(row.clone());
            inserted.push(row);
        }
        Ok(inserted)
    }
}

pub fn review_row(id: i64, place_id: &str, rating: i32, text: Option<&str>, date: &str) -> ReviewRow {
    ReviewRow {
        id,
        place_id: place_id.to_string(),
        author: format!("author-{id}"),
        rating,
        text: text.map(str::to_string),
        review_date: date.to_string(),
        external_id: Some(format!("ext-{id}")),
        created_at: Utc::now(),
    }
}

pub fn raw_review(external_id: Option<&str>, rating: i64, text: &str) -> RawReview {
    RawReview {
        user: Some(RawReviewUser {
            name: Some("Reviewer".to_string()),
        }),
        rating: Some(RawRating::Int(rating)),
        snippet: Some(text.to_string()),
        date: Some("a week ago".to_string()),
        review_id: external_id.map(str::to_string),
    }
}

pub struct StaticSource {
    reviews: Vec<RawReview>,
}

impl StaticSource {
    pub fn new(reviews: Vec<RawReview>) -> Self {
        Self { reviews }
    }
}

#[async_trait]
impl ReviewSource for StaticSource {
    async fn fetch_reviews(&self, _place_id: &str) -> Result<Vec<RawReview>, FetchError> {
        Ok(self.reviews.clone())
    }
}

pub struct FailingSource;

#[async_trait]
impl ReviewSource for FailingSource {
    async fn fetch_reviews(&self, _place_id: &str) -> Result<Vec<RawReview>, FetchError> {
        Err(FetchError::Api {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}

/// Returns a canned wrapper payload (or error status), counting calls and
/// remembering the last prompt.
pub struct ScriptedGenerator {
    response: Result<String, u16>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl ScriptedGenerator {
    pub fn replying(raw: impl Into<String>) -> Self {
        Self {
            response: Ok(raw.into()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Wraps `content` in a chat-completions envelope.
    pub fn with_content(content: &str) -> Self {
        Self::replying(
            serde_json::json!({
                "id": "chatcmpl-test",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }]
            })
            .to_string(),
        )
    }

    pub fn failing(status: u16) -> Self {
        Self {
            response: Err(status),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        match &self.response {
            Ok(raw) => Ok(raw.clone()),
            Err(status) => Err(LlmError::Api {
                status: *status,
                message: "{\"error\": {\"message\": \"upstream exploded\"}}".to_string(),
            }),
        }
    }
}
