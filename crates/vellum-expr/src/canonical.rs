//! Canonical expression syntax: detection and reference extraction

use std::collections::HashSet;

use lazy_regex::regex;
use once_cell::sync::Lazy;
use regex::Regex;
use vellum_core::{EntityKind, EntityReference};

/// Variables provided by the report engine itself. They may be
/// referenced by layout expressions but are never implicitly declared
/// as new entities.
pub const SYSTEM_VARIABLES: &[&str] = &[
    "LOCALE",
    "RENDERER_ID",
    "CONTINUOUS_PAGE_NUMBER",
    "PAGE_NUMBER",
    "ON_ALL_ROWS_PROCESSED",
    "ON_LAST_COPY",
    "ON_LAST_PAGE",
    "ON_LAST_DOCUMENT",
    "SIGNATURE_VISIBLE",
    "NUMBER_OF_COPIES",
    "COPY_NUMBER",
    "NUMBER_OF_DOCUMENTS",
    "DOCUMENT_NUMBER",
    "PAGE_COUNT",
    "REPORT_COUNT",
    "REMAINING_COUNT",
];

static SYSTEM_VARIABLE_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| SYSTEM_VARIABLES.iter().copied().collect());

/// Whether `name` is one of the engine-provided [`SYSTEM_VARIABLES`]
pub fn is_system_variable(name: &str) -> bool {
    SYSTEM_VARIABLE_SET.contains(name)
}

/// Whether an expression is already in canonical path syntax.
///
/// Canonical expressions contain a path root (`$['` or `$.`); legacy
/// placeholder syntax contains neither. Canonical form is idempotent
/// under normalization.
pub fn is_canonical(expression: &str) -> bool {
    expression.contains("$['") || expression.contains("$.")
}

/// All three canonical token shapes in one alternation. Field tokens
/// must come before parameter tokens: both start with `$['` and the
/// longer field shape has to win at the same position.
static TOKEN: &Lazy<Regex> = regex!(
    r"(?x)
      (?P<var>\$\.\$\$VARIABLES\[index\]\['(?P<vname>[A-Za-z0-9_\#]+)'\])
    | (?P<fld>\$\['(?P<rel>[A-Za-z0-9_\#]+)'\]\[index\]\['(?P<fname>[A-Za-z0-9_\#]+)'\])
    | (?P<par>\$\['(?P<pname>[A-Za-z0-9_\#]+)'\])
    "
);

/// Extract the entity references a canonical expression mentions.
///
/// References are deduplicated by exact token text, first occurrence
/// order preserved. Extraction is a pure function of the input: no
/// state from prior normalizations affects it.
pub fn extract_references(expression: &str) -> Vec<EntityReference> {
    let mut seen: Vec<&str> = Vec::new();
    let mut refs = Vec::new();
    for caps in TOKEN.captures_iter(expression) {
        let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        let reference = if let Some(name) = caps.name("vname") {
            EntityReference::new(EntityKind::Variable, name.as_str())
        } else if let Some(name) = caps.name("fname") {
            EntityReference::new(EntityKind::Field, name.as_str())
        } else if let Some(name) = caps.name("pname") {
            // A path continuing with another index is not a bare
            // parameter token.
            let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
            if expression.as_bytes().get(end) == Some(&b'[') {
                continue;
            }
            EntityReference::new(EntityKind::Parameter, name.as_str())
        } else {
            continue;
        };
        if seen.contains(&whole) {
            continue;
        }
        seen.push(whole);
        refs.push(reference);
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vellum_core::EntityKind;

    #[test]
    fn test_is_canonical() {
        assert!(is_canonical("$['total']"));
        assert!(is_canonical("$['lines'][index]['qty']"));
        assert!(is_canonical("$.$$VARIABLES[index]['PAGE_NUMBER']"));
        assert!(!is_canonical("$P{total}"));
        assert!(!is_canonical("'plain text'"));
    }

    #[test]
    fn test_extract_parameter() {
        let refs = extract_references("$['total'] + 1");
        assert_eq!(refs, vec![EntityReference::new(EntityKind::Parameter, "total")]);
    }

    #[test]
    fn test_extract_field_not_parameter() {
        let refs = extract_references("$['lines'][index]['qty']");
        assert_eq!(refs, vec![EntityReference::new(EntityKind::Field, "qty")]);
    }

    #[test]
    fn test_extract_variable() {
        let refs = extract_references("$.$$VARIABLES[index]['REPORT_COUNT']");
        assert_eq!(
            refs,
            vec![EntityReference::new(EntityKind::Variable, "REPORT_COUNT")]
        );
    }

    #[test]
    fn test_extract_mixed_preserves_order() {
        let expr = "$['a'] + $['lines'][index]['b'] + $.$$VARIABLES[index]['c'] + $['a']";
        let refs = extract_references(expr);
        assert_eq!(
            refs,
            vec![
                EntityReference::new(EntityKind::Parameter, "a"),
                EntityReference::new(EntityKind::Field, "b"),
                EntityReference::new(EntityKind::Variable, "c"),
            ]
        );
    }

    #[test]
    fn test_dedup_is_by_token_not_name() {
        // Same name under two shapes stays two references.
        let expr = "$['x'] + $['lines'][index]['x']";
        let refs = extract_references(expr);
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn test_indexed_path_is_not_a_parameter() {
        assert!(extract_references("$['rows'][0]").is_empty());
    }

    #[test]
    fn test_system_variables() {
        assert!(is_system_variable("PAGE_NUMBER"));
        assert!(is_system_variable("REMAINING_COUNT"));
        assert!(!is_system_variable("page_number"));
        assert!(!is_system_variable("TOTAL"));
        assert_eq!(SYSTEM_VARIABLES.len(), 16);
    }
}
