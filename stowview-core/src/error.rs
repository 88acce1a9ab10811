//! Error types for stowview.

use thiserror::Error;

/// Result type alias for plan-level operations.
pub type Result<T> = std::result::Result<T, StowageError>;

/// Errors raised while reading the structural layout document.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The document is not valid JSON or does not have the expected shape.
    #[error("Invalid layout document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A bay or row key could not be read as a non-negative integer.
    #[error("Invalid {table} key `{key}`")]
    InvalidKey { table: &'static str, key: String },

    /// A tier-range entry whose bay or tier start is not an integer.
    #[error("Invalid Rows_Tiers_per_Bay entry: {0}")]
    InvalidTierRange(String),
}

/// Errors raised while reading a manifest document.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// JSON manifest that is neither a record list nor `{ "containers": [...] }`.
    #[error("Invalid JSON manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// Nothing to read.
    #[error("Manifest is empty")]
    Empty,
}

/// Errors surfaced by [`crate::StowagePlan`] operations.
#[derive(Debug, Error)]
pub enum StowageError {
    /// The layout failed to load earlier, containers cannot be placed.
    #[error("Structural layout is not loaded: {0}")]
    LayoutUnavailable(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A search input field holds text that cannot be compared to its field.
    #[error("Invalid search {field}: `{value}`")]
    InvalidCriterion { field: &'static str, value: String },
}
