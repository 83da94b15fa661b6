//! Error types for vellum-core

use crate::binding::EntityKind;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vellum-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell reference format
    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),

    /// Band extent is inverted
    #[error("Band '{tag}' has end row {end_row} before start row {start_row}")]
    InvalidBandExtent {
        tag: String,
        start_row: u32,
        end_row: u32,
    },

    /// An entity name was claimed under two different kinds
    #[error("Entity '{name}' is both a {existing} and a {claimed}")]
    AmbiguousKind {
        name: String,
        existing: EntityKind,
        claimed: EntityKind,
    },

    /// A generated cell name collided with an existing one
    #[error("Generated cell name already in use: {0}")]
    DuplicateGeneratedName(String),

    /// Malformed override ("hammer") table
    #[error("Invalid override table: {0}")]
    InvalidOverrideTable(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
