//! # vellum-expr
//!
//! Expression normalization for the vellum layout compiler.
//!
//! Layout cells carry expressions in a legacy placeholder syntax
//! (`$P{name}`, `$F{name}`, `$V{name}`, plus the wrapper forms `$SE{}`,
//! `$RB{}`, `$CB{}` and `$I{}`). This crate brings them to the canonical
//! path syntax (`$['name']`, `$['rel'][index]['name']`,
//! `$.$$VARIABLES[index]['name']`) and extracts the entity references a
//! canonical expression mentions.
//!
//! Normalization prefers an injected [`ExpressionNormalizer`] (an
//! external compiler behind a process or service boundary) and falls
//! back to pure regex substitution when it is unavailable or fails.
//! Expressions that fail both paths are collected as
//! [`TranslationFailure`](vellum_core::TranslationFailure)s rather than
//! aborting the pass.
//!
//! ## Example
//!
//! ```rust
//! use vellum_expr::{Engine, UnavailableNormalizer};
//!
//! let mut engine = Engine::new(UnavailableNormalizer, "lines");
//! let n = engine.normalize("$F{qty}");
//! assert_eq!(n.expression, "$['lines'][index]['qty']");
//! assert_eq!(n.references.len(), 1);
//! ```

pub mod canonical;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod wrapper;

pub use canonical::{extract_references, is_canonical, is_system_variable, SYSTEM_VARIABLES};
pub use engine::{Engine, ExpressionNormalizer, FnNormalizer, Normalized, UnavailableNormalizer};
pub use error::{ExprError, ExprResult};
pub use fallback::legacy_fallback;
pub use wrapper::{unwrap, ContentKind, Unwrapped};
