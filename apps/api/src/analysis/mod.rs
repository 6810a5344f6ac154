// Review analysis: generator-backed qualitative analysis and local trend
// aggregation. All generator calls go through llm_client.

pub mod analyzer;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod trends;
