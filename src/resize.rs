use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::spreadsheet::Spreadsheet;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Column,
    Row,
}

/// One drag on a column or row border, from press to release.
///
/// Pointer positions are along the drag axis (x for columns, y for rows).
/// The gesture is consumed by [`ResizeGesture::finish`], so nothing tracks
/// the pointer once the button is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeGesture {
    axis: Axis,
    index: usize,
    origin: i32,
    start_size: u32,
}

impl ResizeGesture {
    pub fn begin(axis: Axis, index: usize, origin: i32, start_size: u32) -> Self {
        ResizeGesture {
            axis,
            index,
            origin,
            start_size,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Size for the current pointer position, never below zero.
    pub fn track(&self, pointer: i32) -> u32 {
        let size = self.start_size as i64 + (pointer as i64 - self.origin as i64);
        size.clamp(0, u32::MAX as i64) as u32
    }

    /// Ends the drag and returns the final size.
    pub fn finish(self, pointer: i32) -> u32 {
        self.track(pointer)
    }
}

/// Applies `size` to a column width or a row height.
pub fn apply_size(sheet: &mut Spreadsheet, axis: Axis, index: usize, size: u32) -> Result<()> {
    match axis {
        Axis::Column => sheet.set_column_width(index, size),
        Axis::Row => sheet.set_row_height(index, size),
    }
}
