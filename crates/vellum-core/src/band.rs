//! Layout bands and their harvested cells

use crate::cell_ref::CellRef;
use crate::error::{Error, Result};
use crate::value::Value;
use std::collections::BTreeMap;

/// A named row range in the layout representing one report section
/// (detail, header, footer, group header/footer, ...).
///
/// The `tag` is the exact directive string that opened the band, e.g.
/// `"DT2:"`. Sub-band folding may have collapsed a numbered variant to
/// its prefix before the tag was used as a key.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Band {
    /// The directive string that opened this band
    pub tag: String,
    /// First row carrying the tag (0-based)
    pub start_row: u32,
    /// Last row of the band's extent (>= start_row)
    pub end_row: u32,
    /// Band-level properties collected from row comments
    /// (printWhenExpression, autoFloat, autoStretch, splitType,
    /// stretchType)
    pub properties: BTreeMap<String, Value>,
}

impl Band {
    /// Create a band spanning a single row
    pub fn new(tag: impl Into<String>, row: u32) -> Self {
        Self {
            tag: tag.into(),
            start_row: row,
            end_row: row,
            properties: BTreeMap::new(),
        }
    }

    /// Extend the band's extent to include `row`
    pub fn extend_to(&mut self, row: u32) {
        if row > self.end_row {
            self.end_row = row;
        }
    }

    /// Check the extent invariant
    pub fn validate(&self) -> Result<()> {
        if self.end_row < self.start_row {
            return Err(Error::InvalidBandExtent {
                tag: self.tag.clone(),
                start_row: self.start_row,
                end_row: self.end_row,
            });
        }
        Ok(())
    }

    /// The tag uppercased with the trailing colon stripped, used as the
    /// prefix of generated cell names ("DT2:" -> "DT2")
    pub fn label(&self) -> String {
        self.tag.trim_end_matches(':').to_uppercase()
    }
}

/// One non-empty, sanitized cell inside a band's extent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandElement {
    /// A1-style reference of the cell
    pub cell_ref: CellRef,
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based; column 0 is the tag column and never
    /// contributes elements)
    pub column: u16,
    /// Sanitized cell content
    pub value: String,
    /// Directives parsed from comments anchored at this cell
    pub comments: Vec<CommentDirective>,
}

/// One `tag: value` line of a cell comment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommentDirective {
    /// The cell the comment anchors to
    pub cell_ref: CellRef,
    /// Text before the first colon, trimmed
    pub tag: String,
    /// Text after the first colon, trimmed
    pub value: String,
}

impl CommentDirective {
    /// Split one comment line at the first colon.
    ///
    /// Returns `None` for blank lines or lines without a colon, and for
    /// lines where either side is empty after trimming.
    pub fn parse_line(cell_ref: CellRef, line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let idx = line.find(':')?;
        let tag = line[..idx].trim();
        let value = line[idx + 1..].trim();
        if tag.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self {
            cell_ref,
            tag: tag.to_string(),
            value: value.to_string(),
        })
    }
}
