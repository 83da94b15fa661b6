//! Compiler-level errors

use thiserror::Error;
use vellum_core::TranslationFailure;

/// Result type alias using [`CompileError`]
pub type CompileResult<T> = std::result::Result<T, CompileError>;

/// Errors surfaced by a compiler run.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A structural error from the model layer (ambiguous entity kind,
    /// malformed override table, ...)
    #[error(transparent)]
    Model(#[from] vellum_core::Error),

    /// One or more expressions failed both normalization paths. All
    /// failures for the pass are listed at once.
    #[error("{} expression(s) failed to normalize: {}", failures.len(),
        failures.iter().map(|f| f.expression.as_str()).collect::<Vec<_>>().join("; "))]
    Translation { failures: Vec<TranslationFailure> },
}
