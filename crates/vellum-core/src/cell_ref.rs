//! A1-style cell references

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A cell reference (e.g., "A1", "B5")
///
/// Row and column indices are 0-based internally; the display form uses
/// Excel's 1-based rows and letter columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRef {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ...)
    pub col: u16,
}

impl CellRef {
    /// Create a new cell reference
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse a cell reference from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use vellum_core::CellRef;
    ///
    /// let r = CellRef::parse("A1").unwrap();
    /// assert_eq!(r.row, 0);
    /// assert_eq!(r.col, 0);
    ///
    /// let r = CellRef::parse("B5").unwrap();
    /// assert_eq!(r.row, 4);
    /// assert_eq!(r.col, 1);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidCellRef("empty reference".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == 0 {
            return Err(Error::InvalidCellRef(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&s[..pos])?;
        let row: u32 = s[pos..]
            .parse::<u32>()
            .ok()
            .and_then(|r| r.checked_sub(1))
            .ok_or_else(|| Error::InvalidCellRef(format!("invalid row number in '{}'", s)))?;

        Ok(Self { row, col })
    }

    /// Convert column letters to a 0-based index (A=0, Z=25, AA=26)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidCellRef(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        }
        if col == 0 || col > u16::MAX as u32 + 1 {
            return Err(Error::InvalidCellRef(format!(
                "column out of range: '{}'",
                letters
            )));
        }
        Ok((col - 1) as u16)
    }

    /// Convert a 0-based column index to letters (0=A, 25=Z, 26=AA)
    pub fn column_to_letters(col: u16) -> String {
        let mut n = col as u32 + 1;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        letters.iter().rev().collect()
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            Self::column_to_letters(self.col),
            self.row + 1
        )
    }
}

impl FromStr for CellRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
