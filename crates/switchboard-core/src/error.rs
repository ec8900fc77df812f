//! Error types for the Switchboard registry.

use thiserror::Error;

/// Error type for all registry operations.
///
/// Every variant is a local, recoverable condition. Callers get these
/// back as values and decide how to surface them; nothing here is
/// fatal to the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A draft or patch failed a validation rule. `field` names the
    /// offending field so the presentation layer can mark it inline.
    #[error("invalid field '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// The key does not exist in the collection.
    #[error("record not found: {key}")]
    NotFound { key: String },

    /// An MCP client with this name already exists.
    #[error("duplicate key: {key}")]
    DuplicateKey { key: String },

    /// The in-memory mutation succeeded but writing the snapshot to
    /// disk did not, so durability is uncertain.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl RegistryError {
    pub fn validation(field: &str, reason: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(key: &str) -> Self {
        Self::NotFound {
            key: key.to_string(),
        }
    }

    pub fn duplicate(key: &str) -> Self {
        Self::DuplicateKey {
            key: key.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
