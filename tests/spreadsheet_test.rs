use websheet::cell::CellAddress;
use websheet::error::SheetError;
use websheet::spreadsheet::{Spreadsheet, column_name, parse_cell_name};

fn at(row: usize, col: usize) -> CellAddress {
    CellAddress::new(row, col)
}

fn column_of(sheet: &Spreadsheet, col: usize) -> Vec<String> {
    sheet
        .column_texts(col)
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[test]
fn column_names_use_bijective_base_26() {
    assert_eq!(column_name(0), "A");
    assert_eq!(column_name(25), "Z");
    assert_eq!(column_name(26), "AA");
    assert_eq!(column_name(51), "AZ");
    assert_eq!(column_name(52), "BA");
    assert_eq!(column_name(701), "ZZ");
    assert_eq!(column_name(702), "AAA");
    assert_eq!(column_name(18277), "ZZZ");
}

#[test]
fn cell_names_parse_to_zero_based_addresses() {
    assert_eq!(parse_cell_name("A1"), Some(at(0, 0)));
    assert_eq!(parse_cell_name("b3"), Some(at(2, 1)));
    assert_eq!(parse_cell_name("AA10"), Some(at(9, 26)));
    assert_eq!(parse_cell_name("A0"), None);
    assert_eq!(parse_cell_name("1A"), None);
    assert_eq!(parse_cell_name("A1B"), None);
    assert_eq!(parse_cell_name(""), None);
    assert_eq!(at(2, 1).label(), "B3");
}

#[test]
fn new_sheet_is_empty_and_at_least_one_by_one() {
    let sheet = Spreadsheet::create(10, 12);
    assert_eq!((sheet.rows(), sheet.cols()), (10, 12));
    assert_eq!(sheet.cells().len(), 120);
    assert!(sheet.cells().iter().all(|cell| cell.text.is_empty()));

    let tiny = Spreadsheet::create(0, 0);
    assert_eq!((tiny.rows(), tiny.cols()), (1, 1));
}

#[test]
fn insertion_appends_at_the_trailing_edge() {
    let mut sheet = Spreadsheet::create(2, 2);
    sheet.set_text(at(1, 1), "corner").unwrap();

    assert_eq!(sheet.add_row(), 2);
    assert_eq!(sheet.add_column(), 2);
    assert_eq!((sheet.rows(), sheet.cols()), (3, 3));
    assert_eq!(column_name(sheet.cols() - 1), "C");

    assert_eq!(sheet.text(at(1, 1)), Some("corner"));
    assert_eq!(sheet.text(at(2, 2)), Some(""));
    assert!(sheet.validate().is_ok());
}

#[test]
fn deletion_never_goes_below_one_by_one() {
    let mut sheet = Spreadsheet::create(3, 2);
    let mut removed_rows = 0;
    let mut removed_cols = 0;
    for _ in 0..10 {
        removed_rows += sheet.delete_row() as usize;
        removed_cols += sheet.delete_column() as usize;
    }
    assert_eq!((removed_rows, removed_cols), (2, 1));
    assert_eq!((sheet.rows(), sheet.cols()), (1, 1));
    assert_eq!(sheet.cells().len(), 1);
    assert!(sheet.validate().is_ok());
}

#[test]
fn deletion_removes_the_last_row_and_column_only() {
    let mut sheet = Spreadsheet::create(3, 3);
    sheet.set_text(at(0, 0), "keep").unwrap();
    sheet.set_text(at(2, 0), "gone").unwrap();
    sheet.set_text(at(0, 2), "gone too").unwrap();

    assert!(sheet.delete_row());
    assert!(sheet.delete_column());

    assert_eq!(sheet.text(at(0, 0)), Some("keep"));
    assert_eq!(sheet.text(at(2, 0)), None);
    assert_eq!(sheet.text(at(0, 2)), None);
    assert!(sheet.validate().is_ok());
}

#[test]
fn find_and_replace_changes_first_occurrence_only() {
    let mut sheet = Spreadsheet::create(2, 2);
    sheet.set_text(at(0, 0), "xx").unwrap();
    sheet.set_text(at(1, 1), "axbx").unwrap();
    sheet.set_text(at(0, 1), "none").unwrap();

    let changed = sheet.find_and_replace("x", "y").unwrap();
    assert_eq!(changed, vec![at(0, 0), at(1, 1)]);
    assert_eq!(sheet.text(at(0, 0)), Some("yx"));
    assert_eq!(sheet.text(at(1, 1)), Some("aybx"));
    assert_eq!(sheet.text(at(0, 1)), Some("none"));
}

#[test]
fn find_and_replace_rejects_empty_query() {
    let mut sheet = Spreadsheet::create(1, 1);
    sheet.set_text(at(0, 0), "abc").unwrap();
    assert!(matches!(
        sheet.find_and_replace("", "z"),
        Err(SheetError::EmptyQuery)
    ));
    assert_eq!(sheet.text(at(0, 0)), Some("abc"));
}

#[test]
fn duplicates_are_cleared_after_first_occurrence() {
    let mut sheet = Spreadsheet::create(5, 2);
    for (row, value) in ["a", "b", "a", "c", "b"].iter().enumerate() {
        sheet.set_text(at(row, 1), value).unwrap();
        sheet.set_text(at(row, 0), "same").unwrap();
    }

    let cleared = sheet.remove_duplicates_in_column(1).unwrap();
    assert_eq!(cleared, vec![at(2, 1), at(4, 1)]);
    assert_eq!(column_of(&sheet, 1), vec!["a", "b", "", "c", ""]);
    // other columns are untouched
    assert_eq!(column_of(&sheet, 0), vec!["same"; 5]);
}

#[test]
fn paste_fills_row_major_from_origin() {
    let mut sheet = Spreadsheet::create(3, 3);
    let written = sheet.paste_at(at(0, 1), "1\t2\n 3 \t4\r\n").unwrap();
    assert_eq!(written, vec![at(0, 1), at(0, 2), at(1, 1), at(1, 2), at(2, 1)]);
    assert_eq!(sheet.text(at(0, 1)), Some("1"));
    assert_eq!(sheet.text(at(0, 2)), Some("2"));
    assert_eq!(sheet.text(at(1, 1)), Some("3"));
    assert_eq!(sheet.text(at(1, 2)), Some("4"));
    assert_eq!(sheet.text(at(2, 1)), Some(""));
}

#[test]
fn paste_at_the_corner_drops_overflow() {
    let mut sheet = Spreadsheet::create(3, 3);
    let written = sheet.paste_at(at(2, 2), "a\tb\nc\td").unwrap();
    assert_eq!(written, vec![at(2, 2)]);
    assert_eq!(sheet.text(at(2, 2)), Some("a"));
    assert_eq!((sheet.rows(), sheet.cols()), (3, 3));
    let filled = sheet.cells().iter().filter(|cell| !cell.text.is_empty()).count();
    assert_eq!(filled, 1);
}

#[test]
fn sizes_follow_rows_and_columns() {
    let mut sheet = Spreadsheet::create(2, 2);
    sheet.set_column_width(1, 140).unwrap();
    sheet.set_row_height(0, 40).unwrap();
    assert_eq!(sheet.column_width(1), Some(140));
    assert_eq!(sheet.column_width(0), None);
    assert_eq!(sheet.row_height(0), Some(40));
    assert!(matches!(
        sheet.set_column_width(5, 10),
        Err(SheetError::OutOfBounds { .. })
    ));

    sheet.delete_column();
    assert_eq!(sheet.column_width(1), None);
    sheet.add_column();
    assert_eq!(sheet.column_width(1), None);
}
