use crate::spreadsheet::{Spreadsheet, column_name};

/// File name offered for XLSX downloads.
pub const XLSX_FILENAME: &str = "Spreadsheet.xlsx";
pub const CSV_FILENAME: &str = "Spreadsheet.csv";

/// Convert spreadsheet to CSV format
///
/// The first line holds the column labels (A, B, C, ...), every following
/// line one grid row of visible text. Fields containing commas, quotes or
/// newlines are quoted, with quotes doubled.
///
/// # Examples
/// ```
/// use websheet::spreadsheet::Spreadsheet;
/// use websheet::cell::CellAddress;
/// use websheet::downloader::to_csv;
///
/// let mut sheet = Spreadsheet::create(1, 2);
/// sheet.set_text(CellAddress::new(0, 1), "a,b").unwrap();
/// assert_eq!(to_csv(&sheet), "A,B\n,\"a,b\"\n");
/// ```
pub fn to_csv(sheet: &Spreadsheet) -> String {
    let mut csv_content = String::new();

    for c in 0..sheet.cols() {
        if c > 0 {
            csv_content.push(',');
        }
        csv_content.push_str(&column_name(c));
    }
    csv_content.push('\n');

    for row in sheet.row_iter() {
        for (c, cell) in row.iter().enumerate() {
            if c > 0 {
                csv_content.push(',');
            }
            let value = &cell.text;
            if value.contains(',') || value.contains('"') || value.contains('\n') {
                let escaped = value.replace('"', "\"\"");
                csv_content.push_str(&format!("\"{}\"", escaped));
            } else {
                csv_content.push_str(value);
            }
        }
        csv_content.push('\n');
    }

    csv_content
}

/// Convert spreadsheet to XLSX format
///
/// Writes one worksheet named `Sheet1`. Cells whose whole text is a number
/// are stored as numbers, everything else non-empty as strings. Column
/// widths and row heights set in the grid carry over.
#[cfg(feature = "web")]
pub fn to_xlsx(sheet: &Spreadsheet) -> crate::error::Result<Vec<u8>> {
    use rust_xlsxwriter::{Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name("Sheet1")?;

    for (r, row) in sheet.row_iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            match cell.text.trim().parse::<f64>() {
                Ok(number) if number.is_finite() => {
                    worksheet.write_number(r as u32, c as u16, number)?;
                }
                _ => {
                    worksheet.write_string(r as u32, c as u16, cell.text.as_str())?;
                }
            }
        }
    }

    for c in 0..sheet.cols() {
        if let Some(width) = sheet.column_width(c) {
            worksheet.set_column_width_pixels(c as u16, width.min(u16::MAX as u32) as u16)?;
        }
    }
    for r in 0..sheet.rows() {
        if let Some(height) = sheet.row_height(r) {
            worksheet.set_row_height_pixels(r as u32, height.min(u16::MAX as u32) as u16)?;
        }
    }

    workbook.push_worksheet(worksheet);
    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}
