use crate::cell::{Cell, CellAddress};
use crate::error::{Result, SheetError};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

lazy_static! {
    static ref CELL_NAME_REGEX: Regex = Regex::new(r"^([A-Za-z]+)([0-9]+)$").unwrap();
}

pub const DEFAULT_ROWS: usize = 10;
pub const DEFAULT_COLS: usize = 12;

/// Converts a 0-based column index to its spreadsheet label.
/// 0 -> "A", 25 -> "Z", 26 -> "AA", 701 -> "ZZ", 702 -> "AAA".
///
/// The digits are bijective base-26: after taking a letter the remaining
/// index is `index / 26 - 1`, not `index / 26`.
pub fn column_name(index: usize) -> String {
    let mut index = index;
    let mut result = String::new();
    loop {
        result.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    result.chars().rev().collect()
}

/// Inverse of [`column_name`]. Accepts lower case letters.
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters
        .chars()
        .try_fold(0usize, |acc, c| {
            if !c.is_ascii_alphabetic() {
                return None;
            }
            let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
            acc.checked_mul(26)?.checked_add(digit)
        })
        .map(|n| n - 1)
}

/// Parses a label such as `"B3"` into a 0-based address. Bounds are not
/// checked here; see [`Spreadsheet::contains`].
pub fn parse_cell_name(name: &str) -> Option<CellAddress> {
    let captures = CELL_NAME_REGEX.captures(name.trim())?;
    let col = column_index(&captures[1])?;
    let row: usize = captures[2].parse().ok()?;
    if row == 0 {
        return None;
    }
    Some(CellAddress::new(row - 1, col))
}

/// In-memory grid. Cells are stored row-major and the sheet is never smaller
/// than 1x1.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Spreadsheet {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    column_widths: Vec<Option<u32>>,
    row_heights: Vec<Option<u32>>,
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Spreadsheet::create(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl Spreadsheet {
    /// Builds an empty sheet. Zero dimensions are raised to 1.
    pub fn create(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let mut cells = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                cells.push(Cell::create(r, c));
            }
        }
        Spreadsheet {
            rows,
            cols,
            cells,
            column_widths: vec![None; cols],
            row_heights: vec![None; rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, addr: CellAddress) -> bool {
        addr.row < self.rows && addr.col < self.cols
    }

    fn index(&self, addr: CellAddress) -> Result<usize> {
        if self.contains(addr) {
            Ok(addr.row * self.cols + addr.col)
        } else {
            Err(SheetError::OutOfBounds {
                row: addr.row,
                col: addr.col,
            })
        }
    }

    pub fn cell(&self, addr: CellAddress) -> Option<&Cell> {
        self.index(addr).ok().map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, addr: CellAddress) -> Result<&mut Cell> {
        let index = self.index(addr)?;
        Ok(&mut self.cells[index])
    }

    pub fn text(&self, addr: CellAddress) -> Option<&str> {
        self.cell(addr).map(|cell| cell.text.as_str())
    }

    pub fn set_text(&mut self, addr: CellAddress, text: &str) -> Result<()> {
        self.cell_mut(addr)?.text = text.to_string();
        Ok(())
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Row slices, top to bottom.
    pub fn row_iter(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols)
    }

    pub fn row_texts(&self, row: usize) -> Vec<&str> {
        self.cells
            .iter()
            .filter(|cell| cell.row == row)
            .map(|cell| cell.text.as_str())
            .collect()
    }

    pub fn column_texts(&self, col: usize) -> Vec<&str> {
        self.cells
            .iter()
            .filter(|cell| cell.col == col)
            .map(|cell| cell.text.as_str())
            .collect()
    }

    pub fn column_width(&self, col: usize) -> Option<u32> {
        self.column_widths.get(col).copied().flatten()
    }

    pub fn row_height(&self, row: usize) -> Option<u32> {
        self.row_heights.get(row).copied().flatten()
    }

    pub fn set_column_width(&mut self, col: usize, width: u32) -> Result<()> {
        let slot = self
            .column_widths
            .get_mut(col)
            .ok_or(SheetError::OutOfBounds { row: 0, col })?;
        *slot = Some(width);
        Ok(())
    }

    pub fn set_row_height(&mut self, row: usize, height: u32) -> Result<()> {
        let slot = self
            .row_heights
            .get_mut(row)
            .ok_or(SheetError::OutOfBounds { row, col: 0 })?;
        *slot = Some(height);
        Ok(())
    }

    /// Appends an empty row at the bottom and returns its index.
    pub fn add_row(&mut self) -> usize {
        let row = self.rows;
        for c in 0..self.cols {
            self.cells.push(Cell::create(row, c));
        }
        self.row_heights.push(None);
        self.rows += 1;
        row
    }

    /// Appends an empty column on the right and returns its index.
    pub fn add_column(&mut self) -> usize {
        let col = self.cols;
        let mut cells = Vec::with_capacity(self.rows * (self.cols + 1));
        let mut old = std::mem::take(&mut self.cells).into_iter();
        for r in 0..self.rows {
            cells.extend(old.by_ref().take(self.cols));
            cells.push(Cell::create(r, col));
        }
        self.cells = cells;
        self.column_widths.push(None);
        self.cols += 1;
        col
    }

    /// Drops the bottom row. Returns false at the one-row floor.
    pub fn delete_row(&mut self) -> bool {
        if self.rows <= 1 {
            return false;
        }
        self.rows -= 1;
        self.cells.truncate(self.rows * self.cols);
        self.row_heights.pop();
        true
    }

    /// Drops the rightmost column. Returns false at the one-column floor.
    pub fn delete_column(&mut self) -> bool {
        if self.cols <= 1 {
            return false;
        }
        let last = self.cols - 1;
        self.cells.retain(|cell| cell.col != last);
        self.column_widths.pop();
        self.cols -= 1;
        true
    }

    /// Replaces the first occurrence of `find` in every cell containing it.
    /// Returns the addresses that changed.
    pub fn find_and_replace(&mut self, find: &str, replace: &str) -> Result<Vec<CellAddress>> {
        if find.is_empty() {
            return Err(SheetError::EmptyQuery);
        }
        let mut changed = Vec::new();
        for cell in self.cells.iter_mut() {
            if cell.text.contains(find) {
                cell.text = cell.text.replacen(find, replace, 1);
                changed.push(cell.address());
            }
        }
        Ok(changed)
    }

    /// Clears every repeat of an earlier value in `col`, scanning top down.
    pub fn remove_duplicates_in_column(&mut self, col: usize) -> Result<Vec<CellAddress>> {
        if col >= self.cols {
            return Err(SheetError::OutOfBounds { row: 0, col });
        }
        let mut seen: HashSet<String> = HashSet::new();
        let mut cleared = Vec::new();
        for cell in self.cells.iter_mut().filter(|cell| cell.col == col) {
            if seen.contains(&cell.text) {
                if !cell.text.is_empty() {
                    cleared.push(cell.address());
                }
                cell.text.clear();
            } else {
                seen.insert(cell.text.clone());
            }
        }
        Ok(cleared)
    }

    /// Writes tab/newline separated text starting at `origin`, row-major.
    /// Values that would land outside the sheet are dropped; the sheet does
    /// not grow.
    pub fn paste_at(&mut self, origin: CellAddress, text: &str) -> Result<Vec<CellAddress>> {
        self.index(origin)?;
        let mut written = Vec::new();
        if text.is_empty() {
            return Ok(written);
        }
        for (i, line) in text.split('\n').enumerate() {
            let row = origin.row + i;
            if row >= self.rows {
                break;
            }
            for (j, value) in line.split('\t').enumerate() {
                let addr = CellAddress::new(row, origin.col + j);
                if addr.col >= self.cols {
                    break;
                }
                self.set_text(addr, value.trim())?;
                written.push(addr);
            }
        }
        Ok(written)
    }

    /// Checks the structural invariants, used after decoding a snapshot.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(SheetError::CorruptSnapshot(format!(
                "dimensions {}x{} below 1x1",
                self.rows, self.cols
            )));
        }
        let expected = self.rows.checked_mul(self.cols).ok_or_else(|| {
            SheetError::CorruptSnapshot(format!(
                "dimensions {}x{} overflow",
                self.rows, self.cols
            ))
        })?;
        if self.cells.len() != expected {
            return Err(SheetError::CorruptSnapshot(format!(
                "{} cells for a {}x{} sheet",
                self.cells.len(),
                self.rows,
                self.cols
            )));
        }
        if self.column_widths.len() != self.cols || self.row_heights.len() != self.rows {
            return Err(SheetError::CorruptSnapshot(
                "dimension table does not match sheet size".to_string(),
            ));
        }
        for (i, cell) in self.cells.iter().enumerate() {
            if cell.row != i / self.cols || cell.col != i % self.cols {
                return Err(SheetError::CorruptSnapshot(format!(
                    "cell {} stored at slot {}",
                    cell.address(),
                    i
                )));
            }
        }
        Ok(())
    }
}
