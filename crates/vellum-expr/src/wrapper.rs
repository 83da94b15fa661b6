//! Legacy wrapper forms: `$SE{}`, `$RB{}`, `$CB{}`, `$I{}`
//!
//! Wrappers carry a presentation hint around the real expression. The
//! hint survives unwrapping as a [`ContentKind`] and later decides which
//! property the binding layer attaches the expression under.

use lazy_regex::regex_captures;

/// What kind of content a cell expression produces, decided by the
/// wrapper form it arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentKind {
    /// Plain text content (no wrapper)
    #[default]
    Text,
    /// A text field expression (`$SE{}`, `$RB{}`, `$CB{}`)
    TextField,
    /// An image expression (`$I{}`)
    Image,
}

impl ContentKind {
    /// The property name the binding layer files the expression under
    pub fn property_name(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::TextField => "textFieldExpression",
            ContentKind::Image => "imageExpression",
        }
    }
}

/// The result of unwrapping a raw cell expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unwrapped {
    /// The inner expression body (still in whatever syntax it was
    /// written in)
    pub body: String,
    pub kind: ContentKind,
}

/// Unwrap a raw expression's wrapper form, if it has one.
///
/// A wrapper that does not match its expected grammar is not an error:
/// the raw text falls through as plain text.
pub fn unwrap(raw: &str) -> Unwrapped {
    let raw = raw.trim();

    if let Some((_, body)) = regex_captures!(r"\A\$SE\{(.*)\}\z"s, raw) {
        return Unwrapped {
            body: body.trim().to_string(),
            kind: ContentKind::TextField,
        };
    }

    if let Some((_, _, entity, unchecked, checked)) = regex_captures!(
        r"\A\$(RB|CB)\{(\$[PFV]\{[A-Za-z0-9_]+\}),([^,]+),([^,]+)\}\z",
        raw
    ) {
        let unchecked = unchecked.trim();
        let checked = checked.trim();
        if is_marker_literal(unchecked) && is_marker_literal(checked) {
            return Unwrapped {
                body: synthesize_ternary(entity, unchecked, checked),
                kind: ContentKind::TextField,
            };
        }
        // malformed markers: fall through to plain text
    }

    if let Some((_, body)) = regex_captures!(r"\A\$I\{(.*)\}\z"s, raw) {
        return Unwrapped {
            body: body.trim().to_string(),
            kind: ContentKind::Image,
        };
    }

    Unwrapped {
        body: raw.to_string(),
        kind: ContentKind::Text,
    }
}

/// Checked/unchecked markers may be integer literals or the bare words
/// `true`/`false`.
fn is_marker_literal(s: &str) -> bool {
    s == "true" || s == "false" || s.parse::<i64>().is_ok()
}

/// Build the ternary a checkbox/radio-button wrapper stands for: blank
/// while the entity is null or unchecked, "X" when checked, blank
/// otherwise.
fn synthesize_ternary(entity: &str, unchecked: &str, checked: &str) -> String {
    format!(
        "({e} == null || {e} == {u}) ? '' : ({e} == {c} ? 'X' : '')",
        e = entity,
        u = unchecked,
        c = checked
    )
}
