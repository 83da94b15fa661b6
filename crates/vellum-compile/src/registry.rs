//! Binding merge: declared tables, layout discoveries, overrides

use ahash::AHashMap;
use std::collections::BTreeMap;
use vellum_core::{
    BandElement, BindingEntry, BindingTables, EntityKind, EntityReference, Error,
    NamedCellBinding, OverrideTable, Provenance, Result, Value, DATE_FORMAT_PARAMETER, DATE_TYPE,
    DEFAULT_DATE_FORMAT, GENERIC_STRING_TYPE,
};
use vellum_expr::{is_system_variable, Engine, ExpressionNormalizer};

/// Value key holding an entity's declared type
pub const TYPE_KEY: &str = "java_class";
/// Value key holding a synthesized default value
pub const DEFAULT_KEY: &str = "default";

/// Cell-comment property tags that fold into an entity entry or a
/// named cell. Values are normalized like any other expression before
/// being stored.
const FOLDABLE_COMMENT_TAGS: &[(&str, &str)] = &[
    ("PT", "pattern"),
    ("pattern", "pattern"),
    ("PE", "printWhenExpression"),
    ("printWhenExpression", "printWhenExpression"),
    ("AS", "autoStretch"),
    ("autoStretch", "autoStretch"),
    ("evaluationTime", "evaluationTime"),
    ("blankIfNull", "blankIfNull"),
];

/// The merged binding output: one map per entity kind plus the named
/// cells, keyed by A1 reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedBindings {
    pub parameters: BTreeMap<String, BindingEntry>,
    pub fields: BTreeMap<String, BindingEntry>,
    pub variables: BTreeMap<String, BindingEntry>,
    pub named_cells: BTreeMap<String, NamedCellBinding>,
}

/// Accumulates binding entries across a compiler run and applies the
/// merge precedence: override > declared > layout-discovered.
///
/// A name claims its kind on first sighting; any later claim under a
/// different kind is a fatal configuration error.
#[derive(Debug, Default)]
pub struct Registry {
    parameters: BTreeMap<String, BindingEntry>,
    fields: BTreeMap<String, BindingEntry>,
    variables: BTreeMap<String, BindingEntry>,
    named_cells: BTreeMap<String, NamedCellBinding>,
    kinds: AHashMap<String, EntityKind>,
    counters: AHashMap<(String, String), u32>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<String, BindingEntry> {
        match kind {
            EntityKind::Parameter => &mut self.parameters,
            EntityKind::Field => &mut self.fields,
            EntityKind::Variable => &mut self.variables,
        }
    }

    fn claim(&mut self, name: &str, kind: EntityKind) -> Result<()> {
        match self.kinds.get(name) {
            Some(existing) if *existing != kind => Err(Error::AmbiguousKind {
                name: name.to_string(),
                existing: *existing,
                claimed: kind,
            }),
            Some(_) => Ok(()),
            None => {
                self.kinds.insert(name.to_string(), kind);
                Ok(())
            }
        }
    }

    /// Load the three explicit binding tables, provenance `Declared`.
    ///
    /// The `name`, `expression` and `initial_expression` columns can
    /// carry layout expressions; they are normalized like cell content
    /// and their references register as discoveries.
    pub fn declare_tables<N: ExpressionNormalizer>(
        &mut self,
        tables: &BindingTables,
        engine: &mut Engine<N>,
    ) -> Result<()> {
        for kind in EntityKind::ALL {
            for (name, columns) in tables.table(kind) {
                self.claim(name, kind)?;
                let mut entry = BindingEntry::new(name.clone(), kind, Provenance::Declared);
                entry.value = columns.clone();
                for column in ["name", "expression", "initial_expression"] {
                    let raw = match entry.value.get(column) {
                        Some(Value::String(s)) => s.clone(),
                        _ => continue,
                    };
                    let normalized = engine.normalize(&raw);
                    for reference in &normalized.references {
                        self.register_reference(reference)?;
                    }
                    entry
                        .value
                        .insert(column.to_string(), Value::String(normalized.expression));
                }
                self.entries_mut(kind).insert(name.clone(), entry);
            }
        }
        Ok(())
    }

    /// Apply the external override table. The pinned type replaces any
    /// declared one; a name unknown so far gets a fresh entry.
    pub fn apply_overrides(&mut self, overrides: &OverrideTable) -> Result<()> {
        for (kind, name, pinned) in overrides.iter() {
            self.claim(name, kind)?;
            let pinned = pinned.to_string();
            let entry = self
                .entries_mut(kind)
                .entry(name.to_string())
                .or_insert_with(|| {
                    BindingEntry::new(name, kind, Provenance::ExternalOverride)
                });
            entry.set(TYPE_KEY, Value::String(pinned));
            entry.provenance = Provenance::ExternalOverride;
        }
        Ok(())
    }

    /// Register one discovered reference, creating a `LayoutAuto`
    /// entry on first sighting. System variables never create entries.
    pub fn register_reference(&mut self, reference: &EntityReference) -> Result<()> {
        if reference.kind == EntityKind::Variable && is_system_variable(&reference.name) {
            return Ok(());
        }
        self.claim(&reference.name, reference.kind)?;
        let entries = self.entries_mut(reference.kind);
        if !entries.contains_key(&reference.name) {
            let mut entry = BindingEntry::new(
                reference.name.clone(),
                reference.kind,
                Provenance::LayoutAuto,
            );
            entry.set(TYPE_KEY, Value::String(GENERIC_STRING_TYPE.to_string()));
            entries.insert(reference.name.clone(), entry);
        }
        Ok(())
    }

    /// Process one harvested cell for `band_label` (the uppercased
    /// band tag without its colon).
    ///
    /// An expression resolving to exactly one known entity folds into
    /// that entity's entry; anything else becomes a [`NamedCellBinding`]
    /// with a generated name.
    pub fn process_element<N: ExpressionNormalizer>(
        &mut self,
        band_label: &str,
        element: &BandElement,
        engine: &mut Engine<N>,
    ) -> Result<()> {
        let normalized = engine.normalize(&element.value);
        for reference in &normalized.references {
            self.register_reference(reference)?;
        }

        let mut properties: BTreeMap<String, Value> = BTreeMap::new();
        for comment in &element.comments {
            let key = FOLDABLE_COMMENT_TAGS
                .iter()
                .find(|(tag, _)| *tag == comment.tag)
                .map(|(_, key)| *key);
            match key {
                Some(key) => {
                    let value = engine.normalize(&comment.value);
                    for reference in &value.references {
                        self.register_reference(reference)?;
                    }
                    properties.insert(key.to_string(), Value::String(value.expression));
                }
                None => {
                    log::debug!(
                        "unknown cell comment tag '{}' at {}",
                        comment.tag,
                        element.cell_ref
                    );
                }
            }
        }

        if normalized.references.len() == 1 {
            let reference = &normalized.references[0];
            let kind = reference.kind;
            let name = reference.name.clone();
            let property = normalized.kind.property_name();
            if let Some(entry) = self.entries_mut(kind).get_mut(&name) {
                entry.set(property, Value::String(normalized.expression));
                for (key, value) in properties {
                    entry.set(key, value);
                }
                return Ok(());
            }
            // a lone system-variable reference has no entry to fold
            // into; fall through to a named cell
        }

        let generated_name = self.next_name(band_label, &normalized.references);
        if self.named_cells.values().any(|c| c.generated_name == generated_name) {
            return Err(Error::DuplicateGeneratedName(generated_name));
        }
        properties.insert(
            normalized.kind.property_name().to_string(),
            Value::String(normalized.expression),
        );
        self.named_cells.insert(
            element.cell_ref.to_string(),
            NamedCellBinding {
                cell_ref: element.cell_ref,
                generated_name,
                properties,
            },
        );
        Ok(())
    }

    /// Next generated name for a cell in `band_label`.
    ///
    /// References sharing one kind name the cell after that kind;
    /// zero or mixed references use the EXPRESSION counter. Counters
    /// are 1-based and scoped per (band, kind) pair; traversal is
    /// row-major within a band, so names are stable across reruns.
    fn next_name(&mut self, band_label: &str, references: &[EntityReference]) -> String {
        let kind_label = match references.split_first() {
            Some((first, rest)) if rest.iter().all(|r| r.kind == first.kind) => first.kind.label(),
            _ => "EXPRESSION",
        };
        let counter = self
            .counters
            .entry((band_label.to_string(), kind_label.to_string()))
            .or_insert(0);
        *counter += 1;
        format!("{}_{}_{}", band_label, kind_label, counter)
    }

    /// Finalize the merge: run the date-format injection rule and hand
    /// out the merged tables.
    pub fn finish(mut self) -> MergedBindings {
        self.inject_date_format();
        MergedBindings {
            parameters: self.parameters,
            fields: self.fields,
            variables: self.variables,
            named_cells: self.named_cells,
        }
    }

    /// A date-typed parameter or field implies date rendering; make
    /// sure the layout can address a date format, defaulting to
    /// `dd/MM/yyyy`, unless one was declared explicitly.
    fn inject_date_format(&mut self) {
        let has_date = self
            .parameters
            .values()
            .chain(self.fields.values())
            .any(|e| matches!(e.value.get(TYPE_KEY), Some(Value::String(t)) if t == DATE_TYPE));
        if !has_date || self.parameters.contains_key(DATE_FORMAT_PARAMETER) {
            return;
        }
        log::debug!("injecting {} parameter", DATE_FORMAT_PARAMETER);
        let mut entry = BindingEntry::new(
            DATE_FORMAT_PARAMETER,
            EntityKind::Parameter,
            Provenance::LayoutAuto,
        );
        entry.set(TYPE_KEY, Value::String(GENERIC_STRING_TYPE.to_string()));
        entry.set(DEFAULT_KEY, Value::String(DEFAULT_DATE_FORMAT.to_string()));
        self.parameters
            .insert(DATE_FORMAT_PARAMETER.to_string(), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vellum_core::{CellRef, CommentDirective};
    use vellum_expr::UnavailableNormalizer;

    fn engine() -> Engine<UnavailableNormalizer> {
        Engine::new(UnavailableNormalizer, "lines")
    }

    fn element(row: u32, col: u16, value: &str) -> BandElement {
        BandElement {
            cell_ref: CellRef::new(row, col),
            row,
            column: col,
            value: value.to_string(),
            comments: Vec::new(),
        }
    }

    #[test]
    fn test_single_reference_folds_into_entity() {
        let mut registry = Registry::new();
        let mut engine = engine();
        registry
            .process_element("DT", &element(5, 1, "$F{qty}"), &mut engine)
            .unwrap();

        let merged = registry.finish();
        let entry = &merged.fields["qty"];
        assert_eq!(entry.provenance, Provenance::LayoutAuto);
        assert_eq!(
            entry.value["text"],
            Value::String("$['lines'][index]['qty']".into())
        );
        assert!(merged.named_cells.is_empty());
    }

    #[test]
    fn test_multi_reference_becomes_named_cell() {
        let mut registry = Registry::new();
        let mut engine = engine();
        registry
            .process_element("DT", &element(5, 1, "$F{qty} + $F{unit}"), &mut engine)
            .unwrap();
        registry
            .process_element("DT", &element(5, 2, "$F{a} + $F{b}"), &mut engine)
            .unwrap();

        let merged = registry.finish();
        assert_eq!(merged.fields.len(), 4);
        let names: Vec<&str> = merged
            .named_cells
            .values()
            .map(|c| c.generated_name.as_str())
            .collect();
        assert_eq!(names, vec!["DT_FIELD_1", "DT_FIELD_2"]);
    }

    #[test]
    fn test_mixed_kinds_use_expression_counter() {
        let mut registry = Registry::new();
        let mut engine = engine();
        registry
            .process_element("CF", &element(9, 1, "$P{rate} + $F{amount}"), &mut engine)
            .unwrap();

        let merged = registry.finish();
        assert_eq!(merged.named_cells.len(), 1);
        assert_eq!(
            merged.named_cells.values().next().unwrap().generated_name,
            "CF_EXPRESSION_1"
        );
    }

    #[test]
    fn test_declared_entry_survives_discovery() {
        let mut registry = Registry::new();
        let mut tables = BindingTables::new();
        tables.parameters.insert(
            "total".into(),
            [(TYPE_KEY.to_string(), Value::String("java.lang.Double".into()))].into(),
        );
        let mut engine = engine();
        registry.declare_tables(&tables, &mut engine).unwrap();

        registry
            .process_element("DT", &element(5, 1, "$P{total}"), &mut engine)
            .unwrap();

        let merged = registry.finish();
        let entry = &merged.parameters["total"];
        assert_eq!(entry.provenance, Provenance::Declared);
        assert_eq!(entry.value[TYPE_KEY], Value::String("java.lang.Double".into()));
    }

    #[test]
    fn test_declared_expression_columns_normalized() {
        let mut registry = Registry::new();
        let mut tables = BindingTables::new();
        tables.variables.insert(
            "line_total".into(),
            [(
                "expression".to_string(),
                Value::String("$F{qty} * $F{unit_price}".into()),
            )]
            .into(),
        );
        registry.declare_tables(&tables, &mut engine()).unwrap();

        let merged = registry.finish();
        assert_eq!(
            merged.variables["line_total"].value["expression"],
            Value::String(
                "$['lines'][index]['qty'] * $['lines'][index]['unit_price']".into()
            )
        );
        // the expression's references registered as discoveries
        assert!(merged.fields.contains_key("qty"));
        assert!(merged.fields.contains_key("unit_price"));
    }

    #[test]
    fn test_override_beats_declared() {
        let mut registry = Registry::new();
        let mut tables = BindingTables::new();
        tables.fields.insert(
            "amount".into(),
            [(TYPE_KEY.to_string(), Value::String("java.lang.Double".into()))].into(),
        );
        registry.declare_tables(&tables, &mut engine()).unwrap();

        let mut overrides = OverrideTable::new();
        overrides
            .fields
            .insert("amount".into(), "java.math.BigDecimal".into());
        registry.apply_overrides(&overrides).unwrap();

        let merged = registry.finish();
        let entry = &merged.fields["amount"];
        assert_eq!(entry.provenance, Provenance::ExternalOverride);
        assert_eq!(
            entry.value[TYPE_KEY],
            Value::String("java.math.BigDecimal".into())
        );
    }

    #[test]
    fn test_ambiguous_kind_is_fatal() {
        let mut registry = Registry::new();
        registry
            .register_reference(&EntityReference::new(EntityKind::Field, "x"))
            .unwrap();
        let err = registry
            .register_reference(&EntityReference::new(EntityKind::Parameter, "x"))
            .unwrap_err();
        assert!(matches!(err, Error::AmbiguousKind { .. }));
    }

    #[test]
    fn test_system_variable_never_auto_declared() {
        let mut registry = Registry::new();
        let mut engine = engine();
        registry
            .process_element("PF", &element(20, 1, "$V{PAGE_NUMBER}"), &mut engine)
            .unwrap();

        let merged = registry.finish();
        assert!(merged.variables.is_empty());
        // it still surfaces, as a named cell
        assert_eq!(
            merged.named_cells.values().next().unwrap().generated_name,
            "PF_VARIABLE_1"
        );
    }

    #[test]
    fn test_comment_properties_fold_with_entity() {
        let mut registry = Registry::new();
        let mut engine = engine();
        let mut el = element(5, 1, "$F{amount}");
        let anchor = el.cell_ref;
        el.comments = vec![
            CommentDirective::parse_line(anchor, "pattern: #,##0.00").unwrap(),
            CommentDirective::parse_line(anchor, "blankIfNull: true").unwrap(),
        ];
        registry.process_element("DT", &el, &mut engine).unwrap();

        let merged = registry.finish();
        let entry = &merged.fields["amount"];
        assert_eq!(entry.value["pattern"], Value::String("#,##0.00".into()));
        assert_eq!(entry.value["blankIfNull"], Value::String("true".into()));
    }

    #[test]
    fn test_date_format_injection() {
        let mut registry = Registry::new();
        let mut tables = BindingTables::new();
        tables.fields.insert(
            "issued_at".into(),
            [(TYPE_KEY.to_string(), Value::String(DATE_TYPE.into()))].into(),
        );
        registry.declare_tables(&tables, &mut engine()).unwrap();

        let merged = registry.finish();
        let injected = &merged.parameters[DATE_FORMAT_PARAMETER];
        assert_eq!(
            injected.value[DEFAULT_KEY],
            Value::String(DEFAULT_DATE_FORMAT.into())
        );
        assert_eq!(
            injected.value[TYPE_KEY],
            Value::String(GENERIC_STRING_TYPE.into())
        );
    }

    #[test]
    fn test_no_injection_when_declared() {
        let mut registry = Registry::new();
        let mut tables = BindingTables::new();
        tables.fields.insert(
            "issued_at".into(),
            [(TYPE_KEY.to_string(), Value::String(DATE_TYPE.into()))].into(),
        );
        tables.parameters.insert(
            DATE_FORMAT_PARAMETER.into(),
            [(DEFAULT_KEY.to_string(), Value::String("yyyy-MM-dd".into()))].into(),
        );
        registry.declare_tables(&tables, &mut engine()).unwrap();

        let merged = registry.finish();
        assert_eq!(
            merged.parameters[DATE_FORMAT_PARAMETER].value[DEFAULT_KEY],
            Value::String("yyyy-MM-dd".into())
        );
    }
}
