//! The contract with the external workbook reader

use crate::value::Value;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Read access to one layout sheet.
///
/// The compiler only ever queries cells, same-cell comments and the row
/// extent; merged-cell and geometry queries belong to the layout pass,
/// not this crate. Implementations wrap whatever workbook backend the
/// surrounding tool uses.
pub trait LayoutSource {
    /// The cell's value, if the cell exists and is non-empty
    fn cell(&self, row: u32, col: u16) -> Option<Value>;

    /// Raw text of every comment anchored exactly at `(row, col)`
    fn comments_at(&self, row: u32, col: u16) -> Vec<String>;

    /// The sheet's used row range (0-based, inclusive)
    fn row_range(&self) -> RangeInclusive<u32>;

    /// Number of populated column slots in `row` (exclusive upper bound
    /// for column iteration)
    fn column_count(&self, row: u32) -> u16;
}

/// An in-memory [`LayoutSource`] backed by sparse maps.
///
/// Used by the compiler's own tests and handy for callers that already
/// hold sheet data in memory.
#[derive(Debug, Clone, Default)]
pub struct GridSource {
    cells: BTreeMap<(u32, u16), Value>,
    comments: BTreeMap<(u32, u16), Vec<String>>,
}

impl GridSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell value
    pub fn set_cell(&mut self, row: u32, col: u16, value: impl Into<Value>) {
        self.cells.insert((row, col), value.into());
    }

    /// Attach a comment's text to a cell
    pub fn add_comment(&mut self, row: u32, col: u16, text: impl Into<String>) {
        self.comments
            .entry((row, col))
            .or_default()
            .push(text.into());
    }
}

impl LayoutSource for GridSource {
    fn cell(&self, row: u32, col: u16) -> Option<Value> {
        self.cells.get(&(row, col)).cloned()
    }

    fn comments_at(&self, row: u32, col: u16) -> Vec<String> {
        self.comments.get(&(row, col)).cloned().unwrap_or_default()
    }

    fn row_range(&self) -> RangeInclusive<u32> {
        let mut rows = self.cells.keys().map(|(r, _)| *r);
        match rows.next() {
            Some(first) => {
                let max = rows.max().unwrap_or(first);
                first..=max
            }
            None => 0..=0,
        }
    }

    fn column_count(&self, row: u32) -> u16 {
        self.cells
            .range((row, 0)..=(row, u16::MAX))
            .map(|((_, c), _)| c + 1)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_grid_basics() {
        let mut grid = GridSource::new();
        grid.set_cell(4, 0, "DT:");
        grid.set_cell(4, 2, "$F{amount}");
        grid.set_cell(9, 1, 42.0);

        assert_eq!(grid.cell(4, 0), Some(Value::String("DT:".into())));
        assert_eq!(grid.cell(4, 1), None);
        assert_eq!(grid.row_range(), 4..=9);
        assert_eq!(grid.column_count(4), 3);
        assert_eq!(grid.column_count(9), 2);
        assert_eq!(grid.column_count(5), 0);
    }

    #[test]
    fn test_grid_comments() {
        let mut grid = GridSource::new();
        grid.add_comment(2, 3, "PT: #,##0.00");
        assert_eq!(grid.comments_at(2, 3), vec!["PT: #,##0.00".to_string()]);
        assert!(grid.comments_at(2, 4).is_empty());
    }
}
