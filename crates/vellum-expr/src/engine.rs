//! The normalization engine
//!
//! Ties together wrapper unwrapping, the injected external normalizer,
//! the regex fallback and reference extraction, caching results per
//! distinct expression body and accumulating translation failures for
//! the whole pass.

use crate::canonical::{extract_references, is_canonical};
use crate::error::{ExprError, ExprResult};
use crate::fallback::legacy_fallback;
use crate::wrapper::{unwrap, ContentKind};
use ahash::AHashMap;
use std::collections::BTreeMap;
use vellum_core::{EntityReference, TranslationFailure};

/// The external expression compiler, behind a process or service
/// boundary. The engine treats it as unreliable: any error is handled
/// by the regex fallback, and only expressions failing both paths are
/// reported.
pub trait ExpressionNormalizer {
    /// Bring `body` to canonical path syntax, scoping field references
    /// under `relationship`.
    fn normalize(&self, body: &str, relationship: &str) -> ExprResult<String>;
}

/// A normalizer that is never available. The crate default: with it,
/// every expression takes the fallback path.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableNormalizer;

impl ExpressionNormalizer for UnavailableNormalizer {
    fn normalize(&self, _body: &str, _relationship: &str) -> ExprResult<String> {
        Err(ExprError::NormalizerUnavailable)
    }
}

/// Adapter letting a closure stand in as a normalizer (used by tests
/// and thin adapters).
pub struct FnNormalizer<F>(pub F);

impl<F> ExpressionNormalizer for FnNormalizer<F>
where
    F: Fn(&str, &str) -> ExprResult<String>,
{
    fn normalize(&self, body: &str, relationship: &str) -> ExprResult<String> {
        (self.0)(body, relationship)
    }
}

/// The result of normalizing one raw cell expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Canonical expression text
    pub expression: String,
    /// Deduplicated entity references, first occurrence order
    pub references: Vec<EntityReference>,
    /// Wrapper flag, consumed by the binding layer
    pub kind: ContentKind,
}

/// Normalization engine for one compiler run.
///
/// Results are cached by unwrapped body text — the same legacy
/// expression recurs frequently across cells — and failures are
/// recorded once per distinct body.
pub struct Engine<N> {
    normalizer: N,
    relationship: String,
    cache: AHashMap<String, String>,
    failures: BTreeMap<String, String>,
}

impl<N: ExpressionNormalizer> Engine<N> {
    pub fn new(normalizer: N, relationship: impl Into<String>) -> Self {
        Self {
            normalizer,
            relationship: relationship.into(),
            cache: AHashMap::new(),
            failures: BTreeMap::new(),
        }
    }

    /// The active relationship name (scopes canonical field paths)
    pub fn relationship(&self) -> &str {
        &self.relationship
    }

    /// Normalize a raw cell expression.
    ///
    /// Already-canonical input comes back unchanged with no references
    /// (idempotence); everything else is unwrapped, translated and
    /// scanned for references.
    pub fn normalize(&mut self, raw: &str) -> Normalized {
        let raw = raw.trim();
        if is_canonical(raw) {
            return Normalized {
                expression: raw.to_string(),
                references: Vec::new(),
                kind: ContentKind::Text,
            };
        }

        let unwrapped = unwrap(raw);
        let expression = self.translate_body(&unwrapped.body);
        let references = extract_references(&expression);
        Normalized {
            expression,
            references,
            kind: unwrapped.kind,
        }
    }

    /// Translate one unwrapped body to canonical syntax, consulting the
    /// cache first.
    fn translate_body(&mut self, body: &str) -> String {
        // Literal text with no `$` anywhere has nothing to translate
        // and can never reference an entity.
        if !body.contains('$') {
            return body.to_string();
        }
        if let Some(hit) = self.cache.get(body) {
            return hit.clone();
        }

        let result = match self.normalizer.normalize(body, &self.relationship) {
            Ok(translated) => {
                let translated = translated.trim();
                if translated.is_empty() || translated == body {
                    // the external compiler had nothing to say; the
                    // fallback may still know the tokens
                    match legacy_fallback(body, &self.relationship) {
                        Some(substituted) => {
                            log::trace!("fallback translated '{}' -> '{}'", body, substituted);
                            substituted
                        }
                        None => body.to_string(),
                    }
                } else {
                    log::trace!("normalizer translated '{}' -> '{}'", body, translated);
                    translated.to_string()
                }
            }
            Err(err) => match legacy_fallback(body, &self.relationship) {
                Some(substituted) => {
                    // at least one token substituted: the failure is
                    // superseded, not reported
                    log::debug!(
                        "normalizer failed ({}), fallback translated '{}' -> '{}'",
                        err,
                        body,
                        substituted
                    );
                    substituted
                }
                None => {
                    log::warn!("unable to normalize expression '{}': {}", body, err);
                    self.failures.insert(body.to_string(), err.to_string());
                    // keep the original text around as a string literal
                    format!("'{}'", body)
                }
            },
        };

        self.cache.insert(body.to_string(), result.clone());
        result
    }

    /// Whether any expression failed both normalization paths
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// The accumulated failure set, one entry per distinct expression
    pub fn failures(&self) -> Vec<TranslationFailure> {
        self.failures
            .iter()
            .map(|(expression, error)| TranslationFailure {
                expression: expression.clone(),
                error: error.clone(),
            })
            .collect()
    }

    /// Consume the engine, yielding the failure set
    pub fn into_failures(self) -> Vec<TranslationFailure> {
        self.failures
            .into_iter()
            .map(|(expression, error)| TranslationFailure { expression, error })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use vellum_core::EntityKind;

    #[test]
    fn test_fallback_path_parameter() {
        let mut engine = Engine::new(UnavailableNormalizer, "lines");
        let n = engine.normalize("$P{total}");
        assert_eq!(n.expression, "$['total']");
        assert_eq!(
            n.references,
            vec![EntityReference::new(EntityKind::Parameter, "total")]
        );
        assert_eq!(n.kind, ContentKind::Text);
        assert!(!engine.has_failures());
    }

    #[test]
    fn test_canonical_input_is_idempotent() {
        let mut engine = Engine::new(UnavailableNormalizer, "lines");
        let first = engine.normalize("$F{qty}");
        let second = engine.normalize(&first.expression);
        assert_eq!(second.expression, first.expression);
        assert!(second.references.is_empty());
    }

    #[test]
    fn test_external_normalizer_preferred() {
        let normalizer = FnNormalizer(|_body: &str, _rel: &str| -> ExprResult<String> {
            Ok("$['translated']".into())
        });
        let mut engine = Engine::new(normalizer, "lines");
        let n = engine.normalize("$P{total}");
        assert_eq!(n.expression, "$['translated']");
    }

    #[test]
    fn test_unchanged_reply_falls_back() {
        let normalizer =
            FnNormalizer(|body: &str, _rel: &str| -> ExprResult<String> { Ok(body.to_string()) });
        let mut engine = Engine::new(normalizer, "lines");
        let n = engine.normalize("$F{qty}");
        assert_eq!(n.expression, "$['lines'][index]['qty']");
        assert!(!engine.has_failures());
    }

    #[test]
    fn test_failure_recorded_when_both_paths_fail() {
        let mut engine = Engine::new(UnavailableNormalizer, "lines");
        let n = engine.normalize("$X{broken} + 1");
        assert_eq!(n.expression, "'$X{broken} + 1'");
        assert!(n.references.is_empty());

        let failures = engine.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].expression, "$X{broken} + 1");
    }

    #[test]
    fn test_literal_text_is_not_a_failure() {
        let mut engine = Engine::new(UnavailableNormalizer, "lines");
        let n = engine.normalize("Customer Name");
        assert_eq!(n.expression, "Customer Name");
        assert!(n.references.is_empty());
        assert!(!engine.has_failures());
    }

    #[test]
    fn test_failures_are_distinct_per_body() {
        let mut engine = Engine::new(UnavailableNormalizer, "lines");
        engine.normalize("$X{broken}");
        engine.normalize("$X{broken}");
        engine.normalize("$Y{also}");
        assert_eq!(engine.failures().len(), 2);
    }

    #[test]
    fn test_cache_avoids_repeat_calls() {
        thread_local! {
            static CALLS: Cell<u32> = const { Cell::new(0) };
        }
        let normalizer = FnNormalizer(|_body: &str, _rel: &str| -> ExprResult<String> {
            CALLS.with(|c| c.set(c.get() + 1));
            Ok("$['x']".into())
        });
        let mut engine = Engine::new(normalizer, "lines");
        engine.normalize("$P{x}");
        engine.normalize("$P{x}");
        assert_eq!(CALLS.with(Cell::get), 1);
    }

    #[test]
    fn test_wrapper_flag_carried() {
        let mut engine = Engine::new(UnavailableNormalizer, "lines");
        let n = engine.normalize("$SE{$F{amount}}");
        assert_eq!(n.kind, ContentKind::TextField);
        assert_eq!(n.expression, "$['lines'][index]['amount']");

        let n = engine.normalize("$I{$P{logo}}");
        assert_eq!(n.kind, ContentKind::Image);
        assert_eq!(n.expression, "$['logo']");
    }

    #[test]
    fn test_radio_button_single_reference() {
        let mut engine = Engine::new(UnavailableNormalizer, "lines");
        let n = engine.normalize("$RB{$P{flag},0,1}");
        assert_eq!(
            n.references,
            vec![EntityReference::new(EntityKind::Parameter, "flag")]
        );
        assert!(n.expression.contains("$['flag'] == null"));
        assert_eq!(n.kind, ContentKind::TextField);
    }
}
