//! Profile error types

use thiserror::Error;

/// Whole-document profile failures.
///
/// Problems with a single element or field never surface here; they are
/// logged and skipped so the rest of the profile still loads.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Document is not valid JSON or has the wrong top-level shape
    #[error("Invalid profile JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the profile file failed
    #[error("Profile I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A required top-level field is absent
    #[error("Profile is missing field `{0}`")]
    MissingField(&'static str),

    /// Normalized coordinates cannot be resolved against an empty viewport
    #[error("Viewport size is not known yet")]
    ViewportNotReady,
}

/// Result type for profile operations
pub type Result<T> = std::result::Result<T, ProfileError>;
