use thiserror::Error;

use crate::aggregate::Operation;

/// Everything a grid command can fail with.
///
/// The variants up to `InvalidPath` are input guards: the command is rejected
/// before anything is mutated and the caller can simply reissue it once the
/// input is fixed.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Please select a cell first.")]
    NoSelection,

    #[error("No numeric values found for {0}")]
    NoNumericData(Operation),

    #[error("Please enter text to find.")]
    EmptyQuery,

    #[error("Cell ({row}, {col}) is outside the sheet")]
    OutOfBounds { row: usize, col: usize },

    #[error("Invalid cell name: {0}")]
    InvalidCellName(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Refusing to write outside the working directory: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot encoding error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[cfg(feature = "web")]
    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl SheetError {
    /// True for the guard conditions that leave the sheet untouched.
    pub fn is_input_guard(&self) -> bool {
        matches!(
            self,
            SheetError::NoSelection
                | SheetError::NoNumericData(_)
                | SheetError::EmptyQuery
                | SheetError::OutOfBounds { .. }
                | SheetError::InvalidCellName(_)
                | SheetError::UnknownAction(_)
                | SheetError::InvalidPath(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
