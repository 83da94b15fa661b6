//! # vellum-core
//!
//! Core data structures for the vellum report-layout compiler.
//!
//! This crate provides the fundamental types shared by the compiler
//! crates:
//! - [`CellRef`] - A1-style cell addressing
//! - [`Value`] - Scalar values carried through the model
//! - [`Band`], [`BandElement`], [`CommentDirective`] - the layout model
//! - [`BindingEntry`], [`EntityReference`], [`NamedCellBinding`] - the
//!   binding model produced by the compiler
//! - [`LayoutSource`] - the contract with the external workbook reader
//!
//! ## Example
//!
//! ```rust
//! use vellum_core::{GridSource, LayoutSource, Value};
//!
//! let mut source = GridSource::new();
//! source.set_cell(4, 0, "DT:");
//! source.set_cell(4, 1, "$F{amount}");
//!
//! assert_eq!(source.cell(4, 1), Some(Value::String("$F{amount}".into())));
//! ```

pub mod band;
pub mod binding;
pub mod cell_ref;
pub mod error;
pub mod source;
pub mod value;

// Re-exports for convenience
pub use band::{Band, BandElement, CommentDirective};
pub use binding::{
    BindingEntry, BindingTables, EntityKind, EntityReference, NamedCellBinding, OverrideTable,
    Provenance, TranslationFailure,
};
pub use cell_ref::CellRef;
pub use error::{Error, Result};
pub use source::{GridSource, LayoutSource};
pub use value::Value;

/// The generic type assigned to entities discovered in the layout
/// without an explicit declaration.
pub const GENERIC_STRING_TYPE: &str = "java.lang.String";

/// The type that triggers date-format parameter injection.
pub const DATE_TYPE: &str = "java.util.Date";

/// Name of the parameter injected when a date-typed entity is present.
pub const DATE_FORMAT_PARAMETER: &str = "i18n_date_format";

/// Default value of the injected date-format parameter.
pub const DEFAULT_DATE_FORMAT: &str = "dd/MM/yyyy";
