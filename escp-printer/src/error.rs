//! Error types for the printer library

use thiserror::Error;

/// Profile configuration error types
///
/// The encoder itself never fails: invalid layout inputs degrade to
/// defined safe behavior (truncation, empty fields, cursor reset).
/// Errors only arise when loading or validating a printer profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// A pitch width that cannot hold any text
    #[error("invalid width {width} for {pitch} cpi")]
    InvalidWidth { pitch: u8, width: usize },

    /// Malformed profile document
    #[error("malformed profile: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for profile operations
pub type ProfileResult<T> = Result<T, ProfileError>;
