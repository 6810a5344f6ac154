// Keyword stems per category, German first, English after.
// Matching is a lower-cased substring test.
const SERVICE_KEYWORDS: &[&str] = &["service", "personal", "freund", "staff", "friendly"];
const FOOD_KEYWORDS: &[&str] = &[
    "essen", "lecker", "shawarma", "gericht", "food", "tasty", "dish",
];
const PRICE_KEYWORDS: &[&str] = &["preis", "teuer", "günstig", "price", "expensive", "cheap"];
const AMBIENCE_KEYWORDS: &[&str] = &[
    "ambiente",
    "sauber",
    "gemütlich",
    "ambience",
    "atmosphere",
    "clean",
    "cozy",
];

fn keywords_for(category: &str) -> Option<&'static [&'static str]> {
    match category.trim().to_lowercase().as_str() {
        "service" => Some(SERVICE_KEYWORDS),
        "food" => Some(FOOD_KEYWORDS),
        "price" => Some(PRICE_KEYWORDS),
        "ambience" => Some(AMBIENCE_KEYWORDS),
        _ => None,
    }
}

/// Weak keyword classifier used by the review listing filter.
/// Missing text and unknown categories never match.
pub fn matches_category(text: Option<&str>, category: &str) -> bool {
    let (Some(text), Some(keywords)) = (text, keywords_for(category)) else {
        return false;
    };
    let text = text.to_lowercase();
    keywords.iter().any(|k| text.contains(k))
}
