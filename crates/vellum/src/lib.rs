//! # vellum
//!
//! A compiler front-end turning spreadsheet-authored report layouts
//! into a typed, in-memory report model: bands, entities
//! (parameters/fields/variables) and per-cell expressions, ready for a
//! downstream serializer.
//!
//! The pipeline scans one directive cell per row into band regions,
//! harvests and sanitizes cell content, unwraps legacy expression
//! wrappers, normalizes legacy placeholder tokens into canonical path
//! syntax (through an injected external normalizer, with an always
//! available regex fallback), and merges declared binding tables with
//! layout-discovered entities.
//!
//! ## Example
//!
//! ```rust
//! use vellum::prelude::*;
//!
//! let mut source = GridSource::new();
//! source.set_cell(0, 0, "Orientation: landscape");
//! source.set_cell(1, 0, "DT:");
//! source.set_cell(1, 1, "$F{amount}");
//! source.set_cell(1, 2, "Total: $F{amount}");
//!
//! let compiler = Compiler::new(UnavailableNormalizer, CompileOptions::default());
//! let model = compiler
//!     .compile(&source, &BindingTables::new(), &OverrideTable::new())
//!     .unwrap();
//!
//! assert_eq!(model.bands[0].tag, "DT:");
//! assert!(model.fields.contains_key("amount"));
//! ```

pub mod prelude;

// Model types
pub use vellum_core::{
    Band, BandElement, BindingEntry, BindingTables, CellRef, CommentDirective, EntityKind,
    EntityReference, Error, GridSource, LayoutSource, NamedCellBinding, OverrideTable, Provenance,
    Result, TranslationFailure, Value,
};

// Expression engine
pub use vellum_expr::{
    extract_references, is_canonical, is_system_variable, legacy_fallback, unwrap, ContentKind,
    Engine, ExprError, ExprResult, ExpressionNormalizer, FnNormalizer, Normalized,
    UnavailableNormalizer, Unwrapped, SYSTEM_VARIABLES,
};

// Compiler
pub use vellum_compile::{
    classify, fold_sub_band, parse_overrides, split_directives, BandBuilder, CompileError,
    CompileOptions, CompileResult, Compiler, Directive, GlobalDirective, GlobalProperties,
    Registry, ReportModel,
};
