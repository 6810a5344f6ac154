//! Review fetch collaborator. Pulls raw review records for a place.
//!
//! Raw records are decoded into `RawReview`, an all-optional struct; defaulting
//! rules live on the struct so importers never do key lookups.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Hard stop for pagination in case the service keeps handing out tokens.
const MAX_PAGES: usize = 50;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status})")]
    Api { status: u16, body: String },

    #[error("review service reported an error: {message}")]
    Service { message: String, raw: String },

    #[error("review service response is not valid JSON: {source}")]
    Decode {
        source: serde_json::Error,
        raw: String,
    },
}

impl FetchError {
    /// The raw upstream body, when one was received.
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            FetchError::Api { body, .. } => Some(body),
            FetchError::Service { raw, .. } | FetchError::Decode { raw, .. } => Some(raw),
            FetchError::Http(_) => None,
        }
    }
}

/// One review record as delivered by the fetch service. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReview {
    #[serde(default)]
    pub user: Option<RawReviewUser>,
    #[serde(default)]
    pub rating: Option<RawRating>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub review_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReviewUser {
    #[serde(default)]
    pub name: Option<String>,
}

/// Ratings arrive as integers or floats; anything else is tolerated as 0.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRating {
    Int(i64),
    Float(f64),
    Other(serde_json::Value),
}

impl RawRating {
    /// Floats truncate toward zero; out-of-range values saturate.
    pub fn as_rating(&self) -> i32 {
        match self {
            RawRating::Int(i) => (*i).clamp(i32::MIN as i64, i32::MAX as i64) as i32,
            RawRating::Float(f) => *f as i32,
            RawRating::Other(_) => 0,
        }
    }
}

impl RawReview {
    pub fn external_id(&self) -> Option<&str> {
        self.review_id.as_deref()
    }

    pub fn author(&self) -> String {
        self.user
            .as_ref()
            .and_then(|u| u.name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn rating(&self) -> i32 {
        self.rating.as_ref().map(RawRating::as_rating).unwrap_or(0)
    }

    pub fn text(&self) -> String {
        self.snippet.clone().unwrap_or_default()
    }

    pub fn date(&self) -> String {
        self.date.clone().unwrap_or_else(|| "unknown".to_string())
    }
}

/// A source of raw reviews. Returns every available record for the place.
///
/// Carried in `AppState` as `Arc<dyn ReviewSource>`.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn fetch_reviews(&self, place_id: &str) -> Result<Vec<RawReview>, FetchError>;
}

#[derive(Debug, Default, Deserialize)]
struct SerpApiPage {
    #[serde(default)]
    reviews: Option<Vec<RawReview>>,
    #[serde(default)]
    serpapi_pagination: Option<SerpApiPagination>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SerpApiPagination {
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Google Maps reviews via SerpApi. Follows `next_page_token` until exhausted.
#[derive(Clone)]
pub struct SerpApiClient {
    client: Client,
    api_key: String,
    base_url: String,
    language: String,
}

impl SerpApiClient {
    pub fn new(
        api_key: String,
        base_url: String,
        language: String,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url,
            language,
        })
    }
}

/// One page of the paginated review listing.
#[async_trait]
trait ReviewPages: Send + Sync {
    async fn fetch_page(
        &self,
        place_id: &str,
        page_token: Option<&str>,
    ) -> Result<SerpApiPage, FetchError>;
}

#[async_trait]
impl ReviewPages for SerpApiClient {
    async fn fetch_page(
        &self,
        place_id: &str,
        page_token: Option<&str>,
    ) -> Result<SerpApiPage, FetchError> {
        let mut query: Vec<(&str, &str)> = vec![
            ("engine", "google_maps_reviews"),
            ("place_id", place_id),
            ("hl", self.language.as_str()),
            ("gl", self.language.as_str()),
            ("api_key", self.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("next_page_token", token));
        }

        // The request URL carries the api key; keep it out of error messages.
        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| FetchError::Http(e.without_url()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(e.without_url()))?;

        if !status.is_success() {
            warn!("Review service returned {}: {}", status, body);
            return Err(FetchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        decode_page(body)
    }
}

/// Decodes a 200 body. An `error` field means the service refused the query.
fn decode_page(body: String) -> Result<SerpApiPage, FetchError> {
    let page: SerpApiPage = match serde_json::from_str(&body) {
        Ok(page) => page,
        Err(source) => return Err(FetchError::Decode { source, raw: body }),
    };

    if let Some(message) = page.error.clone() {
        return Err(FetchError::Service { message, raw: body });
    }

    Ok(page)
}

/// Follows `next_page_token` until a page has no reviews or no token,
/// stopping after `MAX_PAGES`.
async fn collect_pages(
    pages: &dyn ReviewPages,
    place_id: &str,
) -> Result<Vec<RawReview>, FetchError> {
    let start = Instant::now();
    let mut all_reviews = Vec::new();
    let mut next_page_token: Option<String> = None;
    let mut fetched = 0;

    loop {
        if fetched == MAX_PAGES {
            warn!("Stopped paging reviews for {place_id} after {MAX_PAGES} pages");
            break;
        }
        let page = pages
            .fetch_page(place_id, next_page_token.as_deref())
            .await?;
        fetched += 1;

        let Some(reviews) = page.reviews else {
            break;
        };
        all_reviews.extend(reviews);

        next_page_token = page.serpapi_pagination.and_then(|p| p.next_page_token);
        if next_page_token.is_none() {
            break;
        }
    }

    debug!(
        place_id,
        pages = fetched,
        reviews = all_reviews.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Fetched raw reviews"
    );
    Ok(all_reviews)
}

#[async_trait]
impl ReviewSource for SerpApiClient {
    async fn fetch_reviews(&self, place_id: &str) -> Result<Vec<RawReview>, FetchError> {
        collect_pages(self, place_id).await
    }
}
