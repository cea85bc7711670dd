//! Core error types

use thiserror::Error;

/// Failure to resolve a persisted binding name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseBindingError {
    /// Explicitly unbound (`NONE` or empty)
    #[error("binding is unbound")]
    Unbound,

    /// Name does not correspond to any binding
    #[error("unknown binding name: {0}")]
    Unknown(String),
}
