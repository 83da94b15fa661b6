//! Layout compiler front-end
//!
//! Scans a tagged spreadsheet layout into bands, harvests and
//! normalizes cell expressions, and merges declared binding tables
//! with layout-discovered entities into a [`ReportModel`] ready for
//! serialization.
//!
//! ```
//! use vellum_compile::{CompileOptions, Compiler};
//! use vellum_core::{BindingTables, GridSource, OverrideTable};
//! use vellum_expr::UnavailableNormalizer;
//!
//! let mut source = GridSource::new();
//! source.set_cell(0, 0, "DT:");
//! source.set_cell(0, 1, "$F{amount}");
//!
//! let compiler = Compiler::new(UnavailableNormalizer, CompileOptions::default());
//! let model = compiler
//!     .compile(&source, &BindingTables::new(), &OverrideTable::new())
//!     .unwrap();
//! assert_eq!(model.bands.len(), 1);
//! assert!(model.fields.contains_key("amount"));
//! ```

pub mod bands;
pub mod compiler;
pub mod directive;
pub mod error;
pub mod hammer;
pub mod harvest;
pub mod options;
pub mod registry;
pub mod scanner;

pub use bands::{BandBuilder, GlobalProperties};
pub use compiler::{Compiler, ReportModel};
pub use directive::{classify, Directive, GlobalDirective};
pub use error::{CompileError, CompileResult};
pub use hammer::parse_overrides;
pub use harvest::{harvest_band, sanitize};
pub use options::CompileOptions;
pub use registry::{MergedBindings, Registry};
pub use scanner::{fold_sub_band, split_directives};
