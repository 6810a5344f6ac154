use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::models::review::ReviewRow;

/// Positive/negative mention counts for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    #[serde(default, deserialize_with = "count_or_default")]
    pub positive: u32,
    #[serde(default, deserialize_with = "count_or_default")]
    pub negative: u32,
}

/// The four recognised categories. Any other category the generator invents
/// is dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySentiment {
    #[serde(default, deserialize_with = "null_as_default")]
    pub food: SentimentCounts,
    #[serde(default, deserialize_with = "null_as_default")]
    pub service: SentimentCounts,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ambience: SentimentCounts,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: SentimentCounts,
}

/// A review the generator flagged as likely fake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeReviewEntry {
    #[serde(deserialize_with = "review_id_from_number_or_string")]
    pub review_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub probability: f64,
}

/// A flagged review joined back to the stored review it refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FakeReviewDetail {
    pub id: i64,
    pub author: String,
    pub rating: i32,
    pub text: Option<String>,
    pub review_date: String,
    pub probability: f64,
}

impl FakeReviewDetail {
    pub fn from_review(review: &ReviewRow, probability: f64) -> Self {
        Self {
            id: review.id,
            author: review.author.clone(),
            rating: review.rating,
            text: review.text.clone(),
            review_date: review.review_date.clone(),
            probability,
        }
    }
}

/// Qualitative analysis of a place's reviews. Recomputed on every request.
///
/// The snake_case fields are exactly what the generator is asked to emit;
/// missing or `null` fields fall back to empty values and unknown fields are
/// ignored. `fakeReviewDetails` and `reviewCount` are filled in locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub negative_keywords: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub positive_keywords: Vec<String>,
    #[serde(default, deserialize_with = "counts_by_keyword")]
    pub top_keywords: BTreeMap<String, u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: CategorySentiment,
    #[serde(default, deserialize_with = "null_as_default")]
    pub monthly_trend: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fake_reviews: Vec<FakeReviewEntry>,
    #[serde(rename = "fakeReviewDetails", skip_deserializing)]
    pub fake_review_details: Vec<FakeReviewDetail>,
    #[serde(rename = "reviewCount", skip_deserializing)]
    pub review_count: usize,
}

/// Rating trend over normalized review dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysisResult {
    pub average_rating_per_date: BTreeMap<NaiveDate, f64>,
    pub reviews_count_per_date: BTreeMap<NaiveDate, usize>,
    pub trend_summary: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// JSON number as the generator writes it: `2` and `2.0` both occur.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
}

impl RawNumber {
    /// Fractional counts truncate toward zero; negative or oversized ones fail.
    fn into_count<E: de::Error>(self) -> Result<u32, E> {
        match self {
            RawNumber::Int(i) => {
                u32::try_from(i).map_err(|_| E::custom(format!("count {i} is out of range")))
            }
            RawNumber::Float(f) => {
                let truncated = f.trunc();
                if (0.0..=f64::from(u32::MAX)).contains(&truncated) {
                    Ok(truncated as u32)
                } else {
                    Err(E::custom(format!("count {f} is out of range")))
                }
            }
        }
    }
}

fn count_or_default<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawNumber>::deserialize(deserializer)?
        .map_or(Ok(0), |count| count.into_count())
}

fn counts_by_keyword<'de, D>(deserializer: D) -> Result<BTreeMap<String, u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<BTreeMap<String, RawNumber>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(|(keyword, count)| count.into_count::<D::Error>().map(|count| (keyword, count)))
        .collect()
}

/// Ids must be exact: `2.0` is accepted, `2.5` and `"abc"` are not.
fn review_id_from_number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Float(f64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        RawId::Float(f) => Err(de::Error::custom(format!(
            "review_id {f} is not a whole number"
        ))),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("review_id '{text}' is not numeric"))),
    }
}
