//! Property tests for the normalization engine.

use proptest::prelude::*;
use vellum_expr::{extract_references, Engine, UnavailableNormalizer};

fn legacy_token() -> impl Strategy<Value = String> {
    ("[PFV]", "[a-zA-Z][a-zA-Z0-9_]{0,12}")
        .prop_map(|(kind, name)| format!("${}{{{}}}", kind, name))
}

/// An expression mixing literals and legacy placeholder tokens. Always
/// contains at least one token, so the fallback path succeeds.
fn legacy_expression() -> impl Strategy<Value = String> {
    let literal = "'[a-z ]{0,10}'".prop_map(|s| s);
    let piece = prop_oneof![legacy_token(), literal];
    (legacy_token(), proptest::collection::vec(piece, 0..4)).prop_map(|(first, rest)| {
        let mut pieces = vec![first];
        pieces.extend(rest);
        pieces.join(" + ")
    })
}

proptest! {
    /// normalize(normalize(x)) == normalize(x)
    #[test]
    fn normalization_is_idempotent(expr in legacy_expression()) {
        let mut engine = Engine::new(UnavailableNormalizer, "lines");
        let once = engine.normalize(&expr);
        let twice = engine.normalize(&once.expression);
        prop_assert_eq!(&twice.expression, &once.expression);
    }

    /// Extraction is a pure function: call order of prior
    /// normalizations never changes the result.
    #[test]
    fn extraction_is_deterministic(expr in legacy_expression(), other in legacy_expression()) {
        let mut a = Engine::new(UnavailableNormalizer, "lines");
        let canonical = a.normalize(&expr).expression;

        let direct = extract_references(&canonical);

        // interleave unrelated work, then extract again
        let mut b = Engine::new(UnavailableNormalizer, "lines");
        b.normalize(&other);
        b.normalize(&expr);
        let after = extract_references(&canonical);

        prop_assert_eq!(direct, after);
    }

    /// Every legacy token round-trips into exactly one reference with
    /// the matching kind, regardless of surrounding literals.
    #[test]
    fn tokens_survive_translation(name in "[a-zA-Z][a-zA-Z0-9_]{0,12}") {
        let mut engine = Engine::new(UnavailableNormalizer, "lines");

        let n = engine.normalize(&format!("$P{{{}}}", name));
        prop_assert_eq!(n.references.len(), 1);
        prop_assert_eq!(n.references[0].name.as_str(), name.as_str());

        let n = engine.normalize(&format!("$F{{{}}}", name));
        prop_assert_eq!(n.references.len(), 1);

        let n = engine.normalize(&format!("$V{{{}}}", name));
        prop_assert_eq!(n.references.len(), 1);
    }
}
