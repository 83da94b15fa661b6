//! Loader for the external override ("hammer") sidecar

use serde_json::Value as Json;
use vellum_core::{Error, OverrideTable, Result};

/// Parse an override table from its JSON sidecar text.
///
/// Expected shape is `{ "parameters"|"fields"|"variables": { name:
/// type } }` where each type is either a plain string or an object
/// carrying a `java_class` key (both forms occur in the wild). Unknown
/// top-level keys are rejected; a missing kind is an empty map.
pub fn parse_overrides(text: &str) -> Result<OverrideTable> {
    let root: Json = serde_json::from_str(text)
        .map_err(|e| Error::InvalidOverrideTable(e.to_string()))?;
    let object = root
        .as_object()
        .ok_or_else(|| Error::InvalidOverrideTable("root is not an object".into()))?;

    let mut table = OverrideTable::new();
    for (key, value) in object {
        let target = match key.as_str() {
            "parameters" => &mut table.parameters,
            "fields" => &mut table.fields,
            "variables" => &mut table.variables,
            other => {
                return Err(Error::InvalidOverrideTable(format!(
                    "unknown kind '{}'",
                    other
                )))
            }
        };
        let entries = value.as_object().ok_or_else(|| {
            Error::InvalidOverrideTable(format!("'{}' is not an object", key))
        })?;
        for (name, pinned) in entries {
            let pinned_type = match pinned {
                Json::String(s) => s.clone(),
                Json::Object(o) => o
                    .get("java_class")
                    .and_then(Json::as_str)
                    .map(str::to_owned)
                    .ok_or_else(|| {
                        Error::InvalidOverrideTable(format!(
                            "override for '{}' has no java_class",
                            name
                        ))
                    })?,
                _ => {
                    return Err(Error::InvalidOverrideTable(format!(
                        "override for '{}' is neither string nor object",
                        name
                    )))
                }
            };
            target.insert(name.clone(), pinned_type);
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_string_form() {
        let table =
            parse_overrides(r#"{"fields": {"amount": "java.math.BigDecimal"}}"#).unwrap();
        assert_eq!(table.fields["amount"], "java.math.BigDecimal");
        assert!(table.parameters.is_empty());
    }

    #[test]
    fn test_object_form() {
        let table = parse_overrides(
            r#"{"parameters": {"issued_at": {"java_class": "java.util.Date"}}}"#,
        )
        .unwrap();
        assert_eq!(table.parameters["issued_at"], "java.util.Date");
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(parse_overrides(r#"{"widgets": {}}"#).is_err());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(parse_overrides("{nope").is_err());
    }
}
