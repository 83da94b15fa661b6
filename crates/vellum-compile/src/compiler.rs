//! The compiler driver: one pass from layout source to report model

use crate::bands::{BandBuilder, GlobalProperties};
use crate::error::{CompileError, CompileResult};
use crate::harvest::harvest_band;
use crate::options::CompileOptions;
use crate::registry::Registry;
use crate::scanner::{fold_sub_band, split_directives};
use std::collections::BTreeMap;
use vellum_core::{
    Band, BindingEntry, BindingTables, LayoutSource, NamedCellBinding, OverrideTable,
    TranslationFailure,
};
use vellum_expr::{Engine, ExpressionNormalizer};

/// The produced artifact, consumed by the downstream serializer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportModel {
    pub bands: Vec<Band>,
    pub globals: GlobalProperties,
    pub parameters: BTreeMap<String, BindingEntry>,
    pub fields: BTreeMap<String, BindingEntry>,
    pub variables: BTreeMap<String, BindingEntry>,
    pub named_cells: BTreeMap<String, NamedCellBinding>,
    /// Rows consumed by global directives, for the host sheet to clear
    pub cleared_rows: Vec<u32>,
    /// Expressions that failed both normalization paths (empty on a
    /// clean run)
    pub failures: Vec<TranslationFailure>,
}

impl ReportModel {
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One-shot compiler over a layout source.
///
/// Rows are scanned strictly in ascending order; band extents and the
/// current-tag state depend on it.
pub struct Compiler<N> {
    normalizer: N,
    options: CompileOptions,
}

impl<N: ExpressionNormalizer> Compiler<N> {
    pub fn new(normalizer: N, options: CompileOptions) -> Self {
        Self { normalizer, options }
    }

    /// Compile, failing when any expression could not be normalized.
    /// The error carries every failure from the pass, not just the
    /// first.
    pub fn compile(
        self,
        source: &dyn LayoutSource,
        tables: &BindingTables,
        overrides: &OverrideTable,
    ) -> CompileResult<ReportModel> {
        let model = self.run(source, tables, overrides)?;
        if !model.succeeded() {
            return Err(CompileError::Translation {
                failures: model.failures,
            });
        }
        Ok(model)
    }

    /// Compile, keeping normalization failures in the model instead of
    /// failing. Structural errors still abort.
    pub fn compile_lossy(
        self,
        source: &dyn LayoutSource,
        tables: &BindingTables,
        overrides: &OverrideTable,
    ) -> CompileResult<ReportModel> {
        self.run(source, tables, overrides)
    }

    fn run(
        self,
        source: &dyn LayoutSource,
        tables: &BindingTables,
        overrides: &OverrideTable,
    ) -> CompileResult<ReportModel> {
        let mut engine = Engine::new(self.normalizer, self.options.relationship.clone());
        let mut registry = Registry::new();
        registry.declare_tables(tables, &mut engine)?;
        registry.apply_overrides(overrides)?;

        let mut builder = BandBuilder::new();
        for row in source.row_range() {
            let directives: Vec<String> = source
                .cell(row, 0)
                .and_then(|v| v.as_str().map(str::to_owned))
                .map(|text| split_directives(&text))
                .unwrap_or_default()
                .into_iter()
                .map(|d| fold_sub_band(&d, self.options.allow_sub_bands))
                .collect();
            builder.process_row(row, &directives, source, &mut engine);
        }
        let (bands, globals, cleared_rows, discovered) = builder.finish();
        log::debug!(
            "scanned {} band(s), {} global row(s)",
            bands.len(),
            cleared_rows.len()
        );

        for reference in &discovered {
            registry.register_reference(reference)?;
        }

        for band in &bands {
            let label = band.label();
            for element in harvest_band(band, source) {
                registry.process_element(&label, &element, &mut engine)?;
            }
        }

        let failures = engine.into_failures();
        if !failures.is_empty() {
            log::warn!("{} expression(s) failed to normalize", failures.len());
        }
        let merged = registry.finish();

        Ok(ReportModel {
            bands,
            globals,
            parameters: merged.parameters,
            fields: merged.fields,
            variables: merged.variables,
            named_cells: merged.named_cells,
            cleared_rows,
            failures,
        })
    }
}
