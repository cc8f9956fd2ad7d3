//! Error handling module for pi-cloud-init
//!
//! Every failure the resolver, renderer, or output stage can raise is a
//! variant of [`ProvisionError`]. Each variant names the offending field or
//! path so the binary can report it without extra context.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for configuration resolution and document generation
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// A value from any source failed its field's validator
    #[error("Invalid value for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// An activated field received no value and has no default
    #[error("No value supplied for required field '{field}'")]
    MissingRequiredValue { field: String },

    /// The SSH public key path does not resolve to a readable file
    #[error("Cannot read SSH public key {}: {source}", path.display())]
    KeyUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A generated document could not be written to its destination
    #[error("Writing {} failed: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The password hashing primitive rejected its input
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// The interactive prompt failed (terminal gone, IO error)
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The user aborted the interactive session
    #[error("Cancelled by user")]
    Cancelled,
}

/// Result type alias for pi-cloud-init operations
pub type Result<T> = std::result::Result<T, ProvisionError>;

impl ProvisionError {
    /// Create a validation error for `field`
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing-value error for `field`
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingRequiredValue {
            field: field.into(),
        }
    }

    /// Create a prompt error
    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::Prompt(msg.into())
    }

    /// Name of the field this error concerns, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } | Self::MissingRequiredValue { field } => Some(field),
            _ => None,
        }
    }
}
