//! Binding model: entities, declared tables, overrides, named cells

use crate::cell_ref::CellRef;
use crate::value::Value;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// The three addressable binding kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EntityKind {
    Parameter,
    Field,
    Variable,
}

impl EntityKind {
    /// All kinds, in the order tables are declared
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Parameter,
        EntityKind::Field,
        EntityKind::Variable,
    ];

    /// Plural key used in produced artifacts ("parameters", ...)
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Parameter => "parameters",
            EntityKind::Field => "fields",
            EntityKind::Variable => "variables",
        }
    }

    /// Uppercase label used in generated cell names ("PARAMETER", ...)
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Parameter => "PARAMETER",
            EntityKind::Field => "FIELD",
            EntityKind::Variable => "VARIABLE",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Parameter => write!(f, "parameter"),
            EntityKind::Field => write!(f, "field"),
            EntityKind::Variable => write!(f, "variable"),
        }
    }
}

/// A parameter/field/variable reference extracted from a canonical
/// expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityReference {
    pub kind: EntityKind,
    pub name: String,
}

impl EntityReference {
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// How a [`BindingEntry`] came to exist.
///
/// Provenance is never downgraded: an entry created from a table
/// declaration stays `Declared` when the same name is later discovered
/// in the layout, and `ExternalOverride` wins over both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Provenance {
    /// Declared in an explicit binding table
    Declared,
    /// First discovered in a layout expression
    LayoutAuto,
    /// Type pinned by the external override ("hammer") table
    ExternalOverride,
}

/// One entity's merged binding data.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindingEntry {
    pub name: String,
    pub kind: EntityKind,
    /// Column values from the declaration plus properties folded in
    /// from layout cells
    pub value: BTreeMap<String, Value>,
    pub provenance: Provenance,
    pub updated_at: DateTime<Utc>,
}

impl BindingEntry {
    pub fn new(name: impl Into<String>, kind: EntityKind, provenance: Provenance) -> Self {
        Self {
            name: name.into(),
            kind,
            value: BTreeMap::new(),
            provenance,
            updated_at: Utc::now(),
        }
    }

    /// Set one value key, refreshing the update timestamp
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.value.insert(key.into(), value.into());
        self.updated_at = Utc::now();
    }
}

/// A layout cell whose expression could not be folded into a single
/// entity, addressed by a synthetic generated name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamedCellBinding {
    /// A1-style reference of the originating cell
    pub cell_ref: CellRef,
    /// Unique generated name, `{BAND}_{KIND}_{n}` or
    /// `{BAND}_EXPRESSION_{n}`
    pub generated_name: String,
    /// Cell-level properties (expression, pattern, ...)
    pub properties: BTreeMap<String, Value>,
}

/// An expression that neither the external normalizer nor the local
/// fallback could bring to canonical syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TranslationFailure {
    pub expression: String,
    pub error: String,
}

/// The three explicit binding tables read from the workbook, keyed by
/// entity name within each kind.
///
/// Table/XLSX structure parsing belongs to the external tables reader;
/// this type only normalizes already-read rows.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindingTables {
    pub parameters: BTreeMap<String, BTreeMap<String, Value>>,
    pub fields: BTreeMap<String, BTreeMap<String, Value>>,
    pub variables: BTreeMap<String, BTreeMap<String, Value>>,
}

impl BindingTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the three tables from pre-read raw rows (the external
    /// tables reader hands rows over in declaration order).
    pub fn from_rows(
        parameters: Vec<BTreeMap<String, Value>>,
        fields: Vec<BTreeMap<String, Value>>,
        variables: Vec<BTreeMap<String, Value>>,
    ) -> Self {
        Self {
            parameters: Self::rows_to_map(parameters, "name"),
            fields: Self::rows_to_map(fields, "name"),
            variables: Self::rows_to_map(variables, "name"),
        }
    }

    /// Normalize raw table rows into a keyed map.
    ///
    /// Rows are keyed by their `id` column, falling back to `alt_key`
    /// (the variables table keys by `name`). Rows with neither are
    /// skipped. The key column is dropped from the stored values and an
    /// `editable` column is coerced to a boolean (the legacy tables
    /// store it as 0/1).
    pub fn rows_to_map(
        rows: Vec<BTreeMap<String, Value>>,
        alt_key: &str,
    ) -> BTreeMap<String, BTreeMap<String, Value>> {
        let mut map = BTreeMap::new();
        for mut row in rows {
            let key_column = if row.contains_key("id") { "id" } else { alt_key };
            let id = match row.get(key_column) {
                Some(v) => v.to_string(),
                None => continue,
            };
            row.remove(key_column);
            if let Some(editable) = row.get("editable").and_then(Value::to_bool) {
                row.insert("editable".into(), Value::Bool(editable));
            }
            map.insert(id, row);
        }
        map
    }

    /// Borrow the table for one kind
    pub fn table(&self, kind: EntityKind) -> &BTreeMap<String, BTreeMap<String, Value>> {
        match kind {
            EntityKind::Parameter => &self.parameters,
            EntityKind::Field => &self.fields,
            EntityKind::Variable => &self.variables,
        }
    }
}

/// The optional external override ("hammer") table: `(kind, name)` to
/// pinned type. Absence of a kind or name is equivalent to no override.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverrideTable {
    pub parameters: BTreeMap<String, String>,
    pub fields: BTreeMap<String, String>,
    pub variables: BTreeMap<String, String>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.fields.is_empty() && self.variables.is_empty()
    }

    /// The pinned type for `(kind, name)`, if any
    pub fn pinned_type(&self, kind: EntityKind, name: &str) -> Option<&str> {
        let table = match kind {
            EntityKind::Parameter => &self.parameters,
            EntityKind::Field => &self.fields,
            EntityKind::Variable => &self.variables,
        };
        table.get(name).map(String::as_str)
    }

    /// Iterate all overrides as `(kind, name, type)`
    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &str, &str)> {
        fn tagged(
            kind: EntityKind,
            table: &BTreeMap<String, String>,
        ) -> impl Iterator<Item = (EntityKind, &str, &str)> {
            table.iter().map(move |(n, t)| (kind, n.as_str(), t.as_str()))
        }
        tagged(EntityKind::Parameter, &self.parameters)
            .chain(tagged(EntityKind::Field, &self.fields))
            .chain(tagged(EntityKind::Variable, &self.variables))
    }
}
