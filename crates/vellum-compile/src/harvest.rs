//! Cell harvester: non-empty cells within each band's extent

use vellum_core::{Band, BandElement, CellRef, CommentDirective, LayoutSource};

/// Repair author-typed mixed literal/placeholder text into a valid
/// concatenation expression.
///
/// Applies only when the raw string does not already start like an
/// expression (`$`, `"` or `'`) but mentions a placeholder or path
/// token somewhere inside. The string is split on whitespace and
/// rebuilt `+`-joined: placeholder tokens stay bare, everything else
/// becomes a quoted literal with its trailing space preserved, so the
/// original spacing survives as string content.
pub fn sanitize(value: &str) -> String {
    let needs_repair = !value.starts_with(['$', '"', '\''])
        && ["$P{", "$F{", "$V{", "$[", "$."]
            .iter()
            .any(|t| value.contains(t));
    if !needs_repair {
        return value.to_string();
    }

    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() < 2 {
        return value.to_string();
    }

    let mut out = String::new();
    for part in parts {
        if part.starts_with('$') || part.starts_with("($") {
            out.push_str("+ ");
            out.push_str(part);
            out.push(' ');
        } else {
            out.push_str("+ '");
            out.push_str(part);
            out.push_str(" '");
        }
    }
    if out.len() > 2 {
        out.drain(..2);
    }
    out.trim().to_string()
}

/// Walk one band's row range across every column except the directive
/// column, producing a [`BandElement`] per non-empty sanitized cell,
/// with same-cell comment directives attached. Row-major order.
pub fn harvest_band(band: &Band, source: &dyn LayoutSource) -> Vec<BandElement> {
    let mut elements = Vec::new();
    for row in band.start_row..=band.end_row {
        let columns = source.column_count(row);
        for column in 1..columns {
            let value = match source.cell(row, column) {
                Some(v) => v,
                None => continue,
            };
            let raw = match value.as_str() {
                Some(s) => s.trim().to_string(),
                None => value.to_string(),
            };
            let text = sanitize(&raw);
            if text.is_empty() {
                continue;
            }
            let cell_ref = CellRef::new(row, column);
            let comments = source
                .comments_at(row, column)
                .iter()
                .flat_map(|c| c.lines().map(str::to_owned).collect::<Vec<_>>())
                .filter_map(|line| CommentDirective::parse_line(cell_ref, &line))
                .collect();
            elements.push(BandElement {
                cell_ref,
                row,
                column,
                value: text,
                comments,
            });
        }
    }
    elements
}
