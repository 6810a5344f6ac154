// Shared prompt fragments.
// Each service that needs generator calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments spliced into those templates.

/// Instruction that enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "\
OUTPUT:
- Respond with valid JSON only, no explanations and no prose.
- Do NOT add fields that are not in the schema above.";

/// Instruction that pins the generator to the identifiers it was given.
pub const ID_STABILITY_INSTRUCTION: &str = "\
You MUST reuse the \"id\" values exactly as given whenever you refer to a review. \
You must NEVER invent an id that does not appear in the input.";
