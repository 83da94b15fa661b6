//! Regex fallback for legacy placeholder tokens
//!
//! Always available, pure, and independent of the external normalizer.
//! It only understands bare placeholder tokens; anything the external
//! compiler would have to parse (method calls, operators on wrapped
//! values) passes through untouched around the substituted tokens.

use lazy_regex::{regex, Lazy, Regex};

static PARAM: &Lazy<Regex> = regex!(r"\$P\{([A-Za-z0-9_]+)\}");
static FIELD: &Lazy<Regex> = regex!(r"\$F\{([A-Za-z0-9_]+)\}");
static VARIABLE: &Lazy<Regex> = regex!(r"\$V\{([A-Za-z0-9_]+)\}");

/// Substitute legacy placeholder tokens with their canonical path
/// forms, repeatedly, until none remain:
///
/// - `$P{name}` -> `$['name']`
/// - `$F{name}` -> `$['<relationship>'][index]['name']`
/// - `$V{name}` -> `$.$$VARIABLES[index]['name']`
///
/// Returns `None` when no substitution applied — the caller keeps the
/// recorded failure in that case.
pub fn legacy_fallback(expression: &str, relationship: &str) -> Option<String> {
    let mut current = expression.to_string();
    let mut substituted = false;

    loop {
        let mut changed = false;
        if let Some(caps) = PARAM.captures(&current) {
            let replacement = format!("$['{}']", &caps[1]);
            current = current.replacen(&caps[0], &replacement, 1);
            changed = true;
        } else if let Some(caps) = FIELD.captures(&current) {
            let replacement = format!("$['{}'][index]['{}']", relationship, &caps[1]);
            current = current.replacen(&caps[0], &replacement, 1);
            changed = true;
        } else if let Some(caps) = VARIABLE.captures(&current) {
            let replacement = format!("$.$$VARIABLES[index]['{}']", &caps[1]);
            current = current.replacen(&caps[0], &replacement, 1);
            changed = true;
        }
        if !changed {
            break;
        }
        substituted = true;
    }

    substituted.then_some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parameter() {
        assert_eq!(
            legacy_fallback("$P{total}", "lines").as_deref(),
            Some("$['total']")
        );
    }

    #[test]
    fn test_field_uses_relationship() {
        assert_eq!(
            legacy_fallback("$F{qty}", "lines").as_deref(),
            Some("$['lines'][index]['qty']")
        );
        assert_eq!(
            legacy_fallback("$F{qty}", "items").as_deref(),
            Some("$['items'][index]['qty']")
        );
    }

    #[test]
    fn test_variable() {
        assert_eq!(
            legacy_fallback("$V{PAGE_NUMBER}", "lines").as_deref(),
            Some("$.$$VARIABLES[index]['PAGE_NUMBER']")
        );
    }

    #[test]
    fn test_multiple_tokens_in_one_expression() {
        let out = legacy_fallback("$P{a} + $F{b} + $V{c} + $P{a}", "lines").unwrap();
        assert_eq!(
            out,
            "$['a'] + $['lines'][index]['b'] + $.$$VARIABLES[index]['c'] + $['a']"
        );
    }

    #[test]
    fn test_no_tokens_means_none() {
        assert_eq!(legacy_fallback("'just text'", "lines"), None);
        assert_eq!(legacy_fallback("$X{nope}", "lines"), None);
    }

    #[test]
    fn test_mixed_with_literals() {
        let out = legacy_fallback("'Total: '+ $F{amount}", "lines").unwrap();
        assert_eq!(out, "'Total: '+ $['lines'][index]['amount']");
    }
}
