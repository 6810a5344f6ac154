use std::sync::Arc;

use crate::llm_client::TextGenerator;
use crate::reviews::fetch::ReviewSource;
use crate::reviews::store::ReviewStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// No per-request mutable state lives here; the store is the only shared resource.
#[derive(Clone)]
pub struct AppState {
    /// Review persistence. Default: PgReviewStore.
    pub store: Arc<dyn ReviewStore>,
    /// Review fetch collaborator. Default: SerpApiClient.
    pub source: Arc<dyn ReviewSource>,
    /// Text-generation collaborator. Default: LlmClient.
    pub generator: Arc<dyn TextGenerator>,
}
