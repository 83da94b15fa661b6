//! Band builder: the row-order state machine over classified directives

use crate::directive::{classify, Directive, GlobalDirective};
use std::collections::BTreeMap;
use vellum_core::{Band, CellRef, CommentDirective, EntityReference, LayoutSource, Value};
use vellum_expr::{Engine, ExpressionNormalizer};

/// Global report properties routed out of the directive stream, split
/// into the three buckets the serializer consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalProperties {
    pub report: BTreeMap<String, Value>,
    pub group: BTreeMap<String, Value>,
    pub other: BTreeMap<String, Value>,
}

impl GlobalProperties {
    fn bucket_mut(&mut self, bucket: &str) -> &mut BTreeMap<String, Value> {
        match bucket {
            "report" => &mut self.report,
            "group" => &mut self.group,
            _ => &mut self.other,
        }
    }
}

/// State machine consuming directives in row order.
///
/// `current` holds the tag of the band being tracked; any global or
/// unrecognized directive drops it. Scanning must proceed in ascending
/// row order — extents and the current tag are order-dependent.
#[derive(Debug, Default)]
pub struct BandBuilder {
    current: Option<String>,
    bands: BTreeMap<String, Band>,
    globals: GlobalProperties,
    /// Rows consumed by global directives; the host sheet clears these
    /// after compilation (an external side effect, surfaced as data)
    cleared_rows: Vec<u32>,
    /// References discovered in expression-valued directives
    discovered: Vec<EntityReference>,
}

impl BandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one row's directives through the state machine, then apply
    /// any band-level comment directives anchored at column 0.
    pub fn process_row<N: ExpressionNormalizer>(
        &mut self,
        row: u32,
        directives: &[String],
        source: &dyn LayoutSource,
        engine: &mut Engine<N>,
    ) {
        for directive in directives {
            match classify(directive) {
                Directive::BandOpen(tag) => {
                    self.bands
                        .entry(tag.clone())
                        .or_insert_with(|| Band::new(tag.clone(), row));
                    self.current = Some(tag);
                }
                Directive::Global(global) => {
                    self.current = None;
                    self.cleared_rows.push(row);
                    self.apply_global(global, engine);
                }
                Directive::Unrecognized => {
                    self.current = None;
                }
            }
        }

        if let Some(tag) = self.current.clone() {
            if let Some(band) = self.bands.get_mut(&tag) {
                band.extend_to(row);
            }
            self.apply_band_comments(row, source, engine);
        }
    }

    fn apply_global<N: ExpressionNormalizer>(
        &mut self,
        global: GlobalDirective,
        engine: &mut Engine<N>,
    ) {
        let bucket = match global.bucket() {
            Some(b) => b,
            None => return, // recognized-and-ignored
        };
        if let Some((key, value)) = global.property() {
            let value = match (&global, value) {
                // the group expression is the one global carrying an
                // actual expression
                (GlobalDirective::GroupExpression(_), Value::String(s)) => {
                    let normalized = engine.normalize(&s);
                    self.discovered.extend(normalized.references);
                    Value::String(normalized.expression)
                }
                (_, v) => v,
            };
            self.globals.bucket_mut(bucket).insert(key.to_string(), value);
        }
    }

    /// Band-level properties arrive as comments on the tag cell.
    /// `printWhenExpression` is first-write-wins: a band accepts at
    /// most one, later duplicates are ignored.
    fn apply_band_comments<N: ExpressionNormalizer>(
        &mut self,
        row: u32,
        source: &dyn LayoutSource,
        engine: &mut Engine<N>,
    ) {
        let tag = match &self.current {
            Some(t) => t.clone(),
            None => return,
        };
        let anchor = CellRef::new(row, 0);

        for text in source.comments_at(row, 0) {
            for line in text.lines() {
                let directive = match CommentDirective::parse_line(anchor, line) {
                    Some(d) => d,
                    None => continue,
                };
                let band = match self.bands.get_mut(&tag) {
                    Some(b) => b,
                    None => return,
                };
                match directive.tag.as_str() {
                    "PE" | "printWhenExpression" => {
                        if !band.properties.contains_key("printWhenExpression") {
                            let normalized = engine.normalize(&directive.value);
                            self.discovered.extend(normalized.references);
                            band.properties.insert(
                                "printWhenExpression".into(),
                                Value::String(normalized.expression),
                            );
                        }
                    }
                    "AF" | "autoFloat" => {
                        let flag = Value::String(directive.value).to_bool().unwrap_or(false);
                        band.properties.insert("autoFloat".into(), Value::Bool(flag));
                    }
                    "AS" | "autoStretch" => {
                        let flag = Value::String(directive.value).to_bool().unwrap_or(false);
                        band.properties
                            .insert("autoStretch".into(), Value::Bool(flag));
                    }
                    "splitType" => {
                        band.properties
                            .insert("splitType".into(), Value::String(directive.value));
                    }
                    "stretchType" => {
                        band.properties
                            .insert("stretchType".into(), Value::String(directive.value));
                    }
                    other => {
                        log::debug!("unknown band comment tag '{}' at row {}", other, row);
                    }
                }
            }
        }
    }

    /// Bands in layout order (ascending start row), plus the globals,
    /// cleared rows and directive-level reference discoveries.
    pub fn finish(self) -> (Vec<Band>, GlobalProperties, Vec<u32>, Vec<EntityReference>) {
        let mut bands: Vec<Band> = self.bands.into_values().collect();
        bands.sort_by_key(|b| b.start_row);
        // rows come in ascending order; a row with several global
        // directives was pushed once per directive
        let mut cleared = self.cleared_rows;
        cleared.dedup();
        (bands, self.globals, cleared, self.discovered)
    }
}
