//! Error types for vellum-expr

use thiserror::Error;

/// Result type alias using [`ExprError`]
pub type ExprResult<T> = std::result::Result<T, ExprError>;

/// Errors reported by expression normalizers
#[derive(Debug, Error)]
pub enum ExprError {
    /// The external normalizer is not available in this run
    #[error("expression normalizer unavailable")]
    NormalizerUnavailable,

    /// The external normalizer rejected the expression
    #[error("normalizer failed: {0}")]
    NormalizerFailed(String),

    /// The external normalizer replied with something unusable
    #[error("malformed normalizer reply: {0}")]
    MalformedReply(String),
}
