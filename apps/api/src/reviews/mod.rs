// Review ingestion and listing: fetch, deduplicate, persist, filter.
// Everything outbound goes through the `ReviewSource` trait; everything
// persistent goes through the `ReviewStore` trait.

pub mod category;
pub mod dates;
pub mod fetch;
pub mod handlers;
pub mod import;
pub mod store;

use crate::errors::AppError;

/// Rejects blank place identifiers before any store or network access.
/// Returns the trimmed identifier.
pub fn require_place_id(place_id: &str) -> Result<&str, AppError> {
    let trimmed = place_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("place_id cannot be empty".to_string()));
    }
    Ok(trimmed)
}
