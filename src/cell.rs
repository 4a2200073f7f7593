use serde::{Deserialize, Serialize};
use std::fmt;

use crate::spreadsheet::column_name;

/// Zero-based (row, column) address of a cell.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub row: usize,
    pub col: usize,
}

impl CellAddress {
    pub fn new(row: usize, col: usize) -> Self {
        CellAddress { row, col }
    }

    /// Spreadsheet label, e.g. `(2, 1)` -> `"B3"`.
    pub fn label(&self) -> String {
        format!("{}{}", column_name(self.col), self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Visual style toggled by the formatting commands.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct CellStyle {
    pub bold: bool,
    pub italic: bool,
    /// Free-text CSS color, stored as given.
    pub color: Option<String>,
}

impl CellStyle {
    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic && self.color.is_none()
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    /// The displayed text. Numbers are parsed from it on demand, never cached.
    pub text: String,
    pub style: CellStyle,
}

impl Cell {
    pub fn create(row: usize, col: usize) -> Self {
        Cell {
            row,
            col,
            text: String::new(),
            style: CellStyle::default(),
        }
    }

    pub fn address(&self) -> CellAddress {
        CellAddress::new(self.row, self.col)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn toggle_bold(&mut self) {
        self.style.bold = !self.style.bold;
    }

    pub fn toggle_italic(&mut self) {
        self.style.italic = !self.style.italic;
    }

    pub fn set_color(&mut self, color: &str) {
        self.style.color = Some(color.to_string());
    }
}
