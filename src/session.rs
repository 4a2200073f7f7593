use log::debug;

use crate::aggregate::{AggregateValue, Operation, aggregate};
use crate::cell::CellAddress;
use crate::command::{Command, DataQuality, FormatAction, Scope};
use crate::error::{Result, SheetError};
use crate::events::{EventCallback, GridEvent};
use crate::resize::{Axis, ResizeGesture, apply_size};
use crate::spreadsheet::Spreadsheet;

/// The working context of one sheet: the grid, the single selected cell and
/// whoever listens for changes.
///
/// Every operation runs to completion before the next one starts. The
/// selection-scoped operations fail with [`SheetError::NoSelection`] and
/// leave the grid untouched when nothing is selected.
pub struct Session {
    sheet: Spreadsheet,
    selected: Option<CellAddress>,
    subscribers: Vec<EventCallback>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(Spreadsheet::default())
    }
}

impl Session {
    pub fn new(sheet: Spreadsheet) -> Self {
        Session {
            sheet,
            selected: None,
            subscribers: Vec::new(),
        }
    }

    pub fn sheet(&self) -> &Spreadsheet {
        &self.sheet
    }

    pub fn selected(&self) -> Option<CellAddress> {
        self.selected
    }

    pub fn subscribe(&mut self, callback: EventCallback) {
        self.subscribers.push(callback);
    }

    fn emit(&mut self, event: GridEvent) {
        debug!("grid event: {:?}", event);
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&event);
        }
    }

    fn require_selection(&self) -> Result<CellAddress> {
        self.selected.ok_or(SheetError::NoSelection)
    }

    /// Swaps in a different grid (e.g. a loaded snapshot). The selection is
    /// dropped since it may not exist in the new grid.
    pub fn replace_sheet(&mut self, sheet: Spreadsheet) {
        self.sheet = sheet;
        self.selected = None;
        let (rows, cols) = (self.sheet.rows(), self.sheet.cols());
        self.emit(GridEvent::StructureChanged { rows, cols });
        self.emit(GridEvent::SelectionChanged { selected: None });
    }

    pub fn select(&mut self, addr: CellAddress) -> Result<()> {
        if !self.sheet.contains(addr) {
            return Err(SheetError::OutOfBounds {
                row: addr.row,
                col: addr.col,
            });
        }
        self.selected = Some(addr);
        self.emit(GridEvent::SelectionChanged {
            selected: self.selected,
        });
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.emit(GridEvent::SelectionChanged { selected: None });
        }
    }

    pub fn edit(&mut self, addr: CellAddress, text: &str) -> Result<()> {
        self.sheet.set_text(addr, text)?;
        self.emit(GridEvent::CellsChanged { cells: vec![addr] });
        Ok(())
    }

    pub fn apply_formatting(&mut self, action: &FormatAction) -> Result<()> {
        let addr = self.require_selection()?;
        let cell = self.sheet.cell_mut(addr)?;
        match action {
            FormatAction::Bold => cell.toggle_bold(),
            FormatAction::Italic => cell.toggle_italic(),
            FormatAction::Color(color) if color.is_empty() => return Ok(()),
            FormatAction::Color(color) => cell.set_color(color),
        }
        self.emit(GridEvent::CellsChanged { cells: vec![addr] });
        Ok(())
    }

    pub fn apply_data_quality(&mut self, action: DataQuality) -> Result<()> {
        let addr = self.require_selection()?;
        let cell = self.sheet.cell_mut(addr)?;
        let cleaned = action.apply(&cell.text);
        if cleaned != cell.text {
            cell.text = cleaned;
            self.emit(GridEvent::CellsChanged { cells: vec![addr] });
        }
        Ok(())
    }

    /// Clears repeated values in the selected cell's column, keeping the
    /// first occurrence of each. Returns how many cells were cleared.
    pub fn remove_duplicates(&mut self) -> Result<usize> {
        let addr = self.require_selection()?;
        let cleared = self.sheet.remove_duplicates_in_column(addr.col)?;
        let count = cleared.len();
        if count > 0 {
            self.emit(GridEvent::CellsChanged { cells: cleared });
        }
        Ok(count)
    }

    pub fn calculate(&self, op: Operation, scope: Scope) -> Result<AggregateValue> {
        let addr = self.require_selection()?;
        let values = match scope {
            Scope::Row => self.sheet.row_texts(addr.row),
            Scope::Column => self.sheet.column_texts(addr.col),
        };
        aggregate(&values, op)
    }

    pub fn add_row(&mut self) -> usize {
        let row = self.sheet.add_row();
        self.emit_structure();
        row
    }

    pub fn add_column(&mut self) -> usize {
        let col = self.sheet.add_column();
        self.emit_structure();
        col
    }

    pub fn delete_row(&mut self) -> bool {
        let removed = self.sheet.delete_row();
        if removed {
            self.emit_structure();
            self.drop_stale_selection();
        }
        removed
    }

    pub fn delete_column(&mut self) -> bool {
        let removed = self.sheet.delete_column();
        if removed {
            self.emit_structure();
            self.drop_stale_selection();
        }
        removed
    }

    fn emit_structure(&mut self) {
        let (rows, cols) = (self.sheet.rows(), self.sheet.cols());
        self.emit(GridEvent::StructureChanged { rows, cols });
    }

    fn drop_stale_selection(&mut self) {
        if let Some(addr) = self.selected {
            if !self.sheet.contains(addr) {
                self.clear_selection();
            }
        }
    }

    pub fn find_and_replace(&mut self, find: &str, replace: &str) -> Result<usize> {
        let changed = self.sheet.find_and_replace(find, replace)?;
        let count = changed.len();
        if count > 0 {
            self.emit(GridEvent::CellsChanged { cells: changed });
        }
        Ok(count)
    }

    /// Pastes clipboard text at the selection and then clears it.
    pub fn paste(&mut self, text: &str) -> Result<usize> {
        let origin = self.require_selection()?;
        if text.is_empty() {
            return Ok(0);
        }
        let written = self.sheet.paste_at(origin, text)?;
        let count = written.len();
        if count > 0 {
            self.emit(GridEvent::CellsChanged { cells: written });
        }
        self.clear_selection();
        Ok(count)
    }

    pub fn resize(&mut self, axis: Axis, index: usize, size: u32) -> Result<()> {
        apply_size(&mut self.sheet, axis, index, size)?;
        self.emit(GridEvent::Resized { axis, index, size });
        Ok(())
    }

    /// Releases a border drag at `pointer` and applies the resulting size.
    pub fn finish_resize(&mut self, gesture: ResizeGesture, pointer: i32) -> Result<u32> {
        let (axis, index) = (gesture.axis(), gesture.index());
        let size = gesture.finish(pointer);
        self.resize(axis, index, size)?;
        Ok(size)
    }

    /// Runs a grid command and returns the status line to show the user.
    /// Commands that need the outside world (export, show, help, quit) are
    /// left to the caller and reported as [`SheetError::UnknownAction`].
    pub fn execute(&mut self, command: &Command) -> Result<String> {
        debug!("execute {:?}", command);
        let status = match command {
            Command::Select(addr) => {
                self.select(*addr)?;
                format!("selected {}", addr)
            }
            Command::Edit(addr, text) => {
                self.edit(*addr, text)?;
                "ok".to_string()
            }
            Command::Format(action) => {
                self.apply_formatting(action)?;
                "ok".to_string()
            }
            Command::Quality(action) => {
                self.apply_data_quality(*action)?;
                "ok".to_string()
            }
            Command::Dedupe => format!("cleared {}", self.remove_duplicates()?),
            Command::Calculate(op, scope) => format!("{}: {}", op, self.calculate(*op, *scope)?),
            Command::AddRow => format!("added row {}", self.add_row() + 1),
            Command::AddColumn => format!(
                "added column {}",
                crate::spreadsheet::column_name(self.add_column())
            ),
            Command::DeleteRow => removal_status(self.delete_row()),
            Command::DeleteColumn => removal_status(self.delete_column()),
            Command::Replace { find, replace } => {
                format!("replaced in {} cells", self.find_and_replace(find, replace)?)
            }
            Command::Paste(text) => format!("pasted {} cells", self.paste(text)?),
            Command::Resize { axis, index, size } => {
                self.resize(*axis, *index, *size)?;
                "ok".to_string()
            }
            Command::Export(_) | Command::Show | Command::Help | Command::Quit => {
                return Err(SheetError::UnknownAction(format!("{:?}", command)));
            }
        };
        Ok(status)
    }
}

fn removal_status(removed: bool) -> String {
    if removed { "ok" } else { "at minimum size" }.to_string()
}
