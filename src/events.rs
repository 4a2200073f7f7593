//! Change notifications emitted by [`Session`](crate::session::Session).
//!
//! The rendering side never touches the grid while a command runs; it listens
//! for these events and re-reads whatever it needs afterwards.

use serde::Serialize;

use crate::cell::CellAddress;
use crate::resize::Axis;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridEvent {
    /// Text or style of these cells changed.
    CellsChanged { cells: Vec<CellAddress> },

    /// The selection moved or was cleared.
    SelectionChanged { selected: Option<CellAddress> },

    /// A row or column was appended or removed at the trailing edge.
    StructureChanged { rows: usize, cols: usize },

    /// A column width or row height changed.
    Resized { axis: Axis, index: usize, size: u32 },
}

/// Callback type for receiving grid events.
pub type EventCallback = Box<dyn FnMut(&GridEvent) + Send>;

/// Simple event collector for testing.
#[derive(Default, Debug)]
pub struct EventCollector {
    events: Vec<GridEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: GridEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GridEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
