//! Directive classification
//!
//! Each line of a row's tag cell is classified exactly once, into an
//! explicit enum matched exhaustively downstream. Band-opening tags
//! take precedence over the global directive table; anything else is
//! unrecognized and silently ends band tracking.

use lazy_regex::{regex_captures, regex_is_match};
use vellum_core::Value;

/// A classified directive line.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Opens (or continues) the band carrying this exact tag
    BandOpen(String),
    /// Sets a global report property and pauses band tracking
    Global(GlobalDirective),
    /// Not a band tag, not a global: ends band tracking, no error
    Unrecognized,
}

/// The fixed table of global directives.
///
/// `Recognized-and-ignored` entries (CasperBinding through IsReport)
/// still pause band tracking and mark their row for clearing in the
/// host sheet; they just carry no property.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalDirective {
    Orientation(String),
    Size(String),
    VScale(f64),
    IsTitleStartNewPage(bool),
    LeftMargin(i64),
    RightMargin(i64),
    TopMargin(i64),
    BottomMargin(i64),
    GroupExpression(String),
    GroupIsStartNewPage(bool),
    GroupIsReprintHeaderOnEachPage(bool),
    CasperBinding,
    BasicExpressions,
    Style,
    Query,
    Id,
    BandSplitType,
    IsReport,
}

impl GlobalDirective {
    /// Which property bucket the directive lands in: "report", "group"
    /// or "other". Ignored directives land nowhere.
    pub fn bucket(&self) -> Option<&'static str> {
        use GlobalDirective::*;
        match self {
            Orientation(_) | Size(_) | VScale(_) => Some("other"),
            IsTitleStartNewPage(_) | LeftMargin(_) | RightMargin(_) | TopMargin(_)
            | BottomMargin(_) => Some("report"),
            GroupExpression(_) | GroupIsStartNewPage(_) | GroupIsReprintHeaderOnEachPage(_) => {
                Some("group")
            }
            CasperBinding | BasicExpressions | Style | Query | Id | BandSplitType | IsReport => {
                None
            }
        }
    }

    /// Property key and value, for directives that carry one
    pub fn property(&self) -> Option<(&'static str, Value)> {
        use GlobalDirective::*;
        match self {
            Orientation(s) => Some(("orientation", Value::String(s.clone()))),
            Size(s) => Some(("size", Value::String(s.clone()))),
            VScale(f) => Some(("vscale", Value::Number(*f))),
            IsTitleStartNewPage(b) => Some(("isTitleStartNewPage", Value::Bool(*b))),
            LeftMargin(n) => Some(("leftMargin", Value::Number(*n as f64))),
            RightMargin(n) => Some(("rightMargin", Value::Number(*n as f64))),
            TopMargin(n) => Some(("topMargin", Value::Number(*n as f64))),
            BottomMargin(n) => Some(("bottomMargin", Value::Number(*n as f64))),
            GroupExpression(s) => Some(("expression", Value::String(s.clone()))),
            GroupIsStartNewPage(b) => Some(("isStartNewPage", Value::Bool(*b))),
            GroupIsReprintHeaderOnEachPage(b) => {
                Some(("isReprintHeaderOnEachPage", Value::Bool(*b)))
            }
            CasperBinding | BasicExpressions | Style | Query | Id | BandSplitType | IsReport => {
                None
            }
        }
    }
}

/// Classify one directive line.
pub fn classify(directive: &str) -> Directive {
    let directive = directive.trim();
    if directive.is_empty() {
        return Directive::Unrecognized;
    }

    // Band-opening tags first: BG TL PH CH DT CF PF LPF SU ND GH GF,
    // optional digits, colon. Detail tags also occur without the
    // colon in older layouts.
    if regex_is_match!(
        r"\A(?:(?:BG|TL|PH|CH|DT|CF|PF|LPF|SU|ND|GH|GF)\d*:|DT\d*)\z",
        directive
    ) {
        return Directive::BandOpen(directive.to_string());
    }

    if let Some(global) = classify_global(directive) {
        return Directive::Global(global);
    }

    Directive::Unrecognized
}

fn classify_global(directive: &str) -> Option<GlobalDirective> {
    use GlobalDirective::*;

    if let Some((_, v)) = regex_captures!(r"(?i)\AOrientation:(.+)\z", directive) {
        return Some(Orientation(v.trim().to_string()));
    }
    if let Some((_, v)) = regex_captures!(r"(?i)\ASize:(.+)\z", directive) {
        return Some(Size(v.trim().to_string()));
    }
    if let Some((_, v)) = regex_captures!(r"(?i)\AVScale:(.+)\z", directive) {
        return Some(VScale(lenient_f64(v)));
    }
    if let Some((_, v)) = regex_captures!(r"(?i)\AReport\.isTitleStartNewPage:(.+)\z", directive) {
        return Some(IsTitleStartNewPage(lenient_bool(v)));
    }
    if let Some((_, v)) = regex_captures!(r"(?i)\AReport\.leftMargin:(.+)\z", directive) {
        return Some(LeftMargin(lenient_i64(v)));
    }
    if let Some((_, v)) = regex_captures!(r"(?i)\AReport\.rightMargin:(.+)\z", directive) {
        return Some(RightMargin(lenient_i64(v)));
    }
    if let Some((_, v)) = regex_captures!(r"(?i)\AReport\.topMargin:(.+)\z", directive) {
        return Some(TopMargin(lenient_i64(v)));
    }
    if let Some((_, v)) = regex_captures!(r"(?i)\AReport\.bottomMargin:(.+)\z", directive) {
        return Some(BottomMargin(lenient_i64(v)));
    }
    if let Some((_, v)) = regex_captures!(r"(?i)\AGroup\.expression:(.+)\z", directive) {
        // the expression keeps its spacing; only the tag side is fixed
        return Some(GroupExpression(v.to_string()));
    }
    if let Some((_, v)) = regex_captures!(r"(?i)\AGroup\.isStartNewPage:(.+)\z", directive) {
        return Some(GroupIsStartNewPage(lenient_bool(v)));
    }
    if let Some((_, v)) =
        regex_captures!(r"(?i)\AGroup\.isReprintHeaderOnEachPage:(.+)\z", directive)
    {
        return Some(GroupIsReprintHeaderOnEachPage(lenient_bool(v)));
    }
    if regex_is_match!(r"(?i)\ACasperBinding:", directive) {
        return Some(CasperBinding);
    }
    if regex_is_match!(r"(?i)\ABasicExpressions:.+\z", directive) {
        return Some(BasicExpressions);
    }
    if regex_is_match!(r"(?i)\AStyle:.+\z", directive) {
        return Some(Style);
    }
    if regex_is_match!(r"(?i)\AQuery:.+\z", directive) {
        return Some(Query);
    }
    if regex_is_match!(r"(?i)\AId:.+\z", directive) {
        return Some(Id);
    }
    if regex_is_match!(r"(?i)\ABand\.splitType:.+\z", directive) {
        return Some(BandSplitType);
    }
    if regex_is_match!(r"(?i)\AIsReport:.+\z", directive) {
        return Some(IsReport);
    }
    None
}

/// Lenient numeric parsing: a leading numeric prefix is taken
/// ("20pt" is 20), anything without one parses as zero.
fn lenient_i64(s: &str) -> i64 {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end += 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    s[..end].parse().unwrap_or(0)
}

fn lenient_f64(s: &str) -> f64 {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end += 1;
    }
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => end += 1,
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }
    s[..end].parse().unwrap_or(0.0)
}

fn lenient_bool(s: &str) -> bool {
    Value::String(s.trim().to_string())
        .to_bool()
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_band_tags() {
        assert_eq!(classify("DT:"), Directive::BandOpen("DT:".into()));
        assert_eq!(classify("DT2:"), Directive::BandOpen("DT2:".into()));
        assert_eq!(classify("LPF10:"), Directive::BandOpen("LPF10:".into()));
        assert_eq!(classify("GH:"), Directive::BandOpen("GH:".into()));
        // detail tags also occur bare in older layouts
        assert_eq!(classify("DT"), Directive::BandOpen("DT".into()));
        assert_eq!(classify("DT2"), Directive::BandOpen("DT2".into()));
        // other prefixes need the colon; unknown prefixes never match
        assert_eq!(classify("CF2"), Directive::Unrecognized);
        assert_eq!(classify("XX:"), Directive::Unrecognized);
    }

    #[test]
    fn test_global_report_properties() {
        assert_eq!(
            classify("Report.leftMargin: 20"),
            Directive::Global(GlobalDirective::LeftMargin(20))
        );
        assert_eq!(
            classify("report.istitlestartnewpage: true"),
            Directive::Global(GlobalDirective::IsTitleStartNewPage(true))
        );
    }

    #[test]
    fn test_global_other_properties() {
        assert_eq!(
            classify("Orientation: landscape"),
            Directive::Global(GlobalDirective::Orientation("landscape".into()))
        );
        assert_eq!(
            classify("VScale: 1.5"),
            Directive::Global(GlobalDirective::VScale(1.5))
        );
    }

    #[test]
    fn test_group_expression_keeps_value() {
        match classify("Group.expression: $F{group_key}") {
            Directive::Global(GlobalDirective::GroupExpression(v)) => {
                assert_eq!(v.trim(), "$F{group_key}");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_recognized_but_ignored() {
        for tag in [
            "CasperBinding:",
            "BasicExpressions: true",
            "Style: something",
            "Query: q",
            "Id: 42",
            "Band.splitType: Stretch",
            "IsReport: true",
        ] {
            match classify(tag) {
                Directive::Global(g) => assert_eq!(g.bucket(), None, "{}", tag),
                other => panic!("{} classified as {:?}", tag, other),
            }
        }
    }

    #[test]
    fn test_lenient_numbers() {
        assert_eq!(
            classify("Report.topMargin: oops"),
            Directive::Global(GlobalDirective::TopMargin(0))
        );
        // a trailing unit is dropped, the numeric prefix survives
        assert_eq!(
            classify("Report.leftMargin: 20pt"),
            Directive::Global(GlobalDirective::LeftMargin(20))
        );
        assert_eq!(
            classify("Report.bottomMargin: -5mm"),
            Directive::Global(GlobalDirective::BottomMargin(-5))
        );
        assert_eq!(
            classify("VScale: 1.25x"),
            Directive::Global(GlobalDirective::VScale(1.25))
        );
        assert_eq!(
            classify("VScale: junk"),
            Directive::Global(GlobalDirective::VScale(0.0))
        );
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(classify("random note"), Directive::Unrecognized);
        assert_eq!(classify(""), Directive::Unrecognized);
    }
}
