use thiserror::Error;

/// Errors raised while loading a tree description
#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("Failed to parse tree description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse tree description: {0}")]
    SimdJson(#[from] simd_json::Error),

    #[error("Branch with empty name under '{parent}'")]
    EmptyName { parent: String },

    #[error("Counted branch '{0}' is not in the tree")]
    UnknownCounted(String),

    #[error("Counter branch '{counter}' of '{counted}' is not in the tree")]
    UnknownCounter { counted: String, counter: String },
}
