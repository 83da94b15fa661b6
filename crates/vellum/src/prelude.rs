//! Prelude module - common imports for vellum users
//!
//! ```rust
//! use vellum::prelude::*;
//! ```

pub use crate::{
    // Model types
    Band,
    BandElement,
    BindingEntry,
    BindingTables,
    CellRef,
    CommentDirective,
    // Compiler
    CompileError,
    CompileOptions,
    CompileResult,
    Compiler,
    // Expression engine
    ContentKind,
    EntityKind,
    EntityReference,
    ExprError,
    ExpressionNormalizer,
    FnNormalizer,
    GlobalProperties,
    GridSource,
    LayoutSource,
    NamedCellBinding,
    OverrideTable,
    Provenance,
    ReportModel,
    TranslationFailure,
    UnavailableNormalizer,
    Value,
};
