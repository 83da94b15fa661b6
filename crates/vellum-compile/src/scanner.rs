//! Tag scanner: directive cell splitting and sub-band folding

use lazy_regex::regex_captures;

/// Split a directive cell's text into individual directive lines,
/// trimmed, with blank lines dropped.
pub fn split_directives(cell_text: &str) -> Vec<String> {
    cell_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Collapse a numbered sub-band tag to its base band tag when sub-bands
/// are disabled ("DT3:" -> "DT:").
///
/// Folding is pure in the prefix letters: the digit value never affects
/// the result. Group bands (GH/GF) have no sub-band variants and are
/// never folded.
pub fn fold_sub_band(tag: &str, allow_sub_bands: bool) -> String {
    if !allow_sub_bands {
        if let Some((_, prefix)) =
            regex_captures!(r"\A(TL|SU|BG|PH|CH|DT|CF|PF|LPF|ND)\d*:\z", tag)
        {
            return format!("{}:", prefix);
        }
    }
    tag.to_string()
}
