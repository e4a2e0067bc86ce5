//! Error types for tracker operations and persistence

use std::path::PathBuf;
use thiserror::Error;

/// Failure writing the data file
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors surfaced to the user by campaign and tracker operations.
/// None of these are fatal; the record tree is left as it was unless noted.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// No campaign is selected
    #[error("no campaign selected")]
    NoCampaign,

    /// Edit/delete target is gone (the caller should refresh its view)
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// Form-level rejection, raised before any mutation
    #[error("{0}")]
    Validation(String),

    /// Item name already present in a magic item list
    #[error("'{name}' already exists in this list")]
    DuplicateItem { name: String },

    #[error("a campaign named '{name}' already exists")]
    DuplicateCampaign { name: String },

    #[error("import file {} does not exist", .0.display())]
    ImportMissing(PathBuf),

    /// The mutation was applied in memory but could not be written
    #[error("failed to save campaign data to {}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: PersistError,
    },
}

impl TrackerError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        TrackerError::NotFound { kind, id: id.into() }
    }

    pub fn required(field: &str) -> Self {
        TrackerError::Validation(format!("{field} cannot be empty"))
    }
}
