use std::sync::{Arc, Mutex};

use websheet::aggregate::{AggregateValue, Operation};
use websheet::cell::CellAddress;
use websheet::command::{Command, DataQuality, FormatAction, Scope};
use websheet::error::SheetError;
use websheet::events::{EventCollector, GridEvent};
use websheet::resize::{Axis, ResizeGesture};
use websheet::session::Session;
use websheet::spreadsheet::Spreadsheet;

fn at(row: usize, col: usize) -> CellAddress {
    CellAddress::new(row, col)
}

fn session(rows: usize, cols: usize) -> Session {
    Session::new(Spreadsheet::create(rows, cols))
}

fn watched(rows: usize, cols: usize) -> (Session, Arc<Mutex<EventCollector>>) {
    let mut session = session(rows, cols);
    let collector = Arc::new(Mutex::new(EventCollector::new()));
    let sink = Arc::clone(&collector);
    session.subscribe(Box::new(move |event: &GridEvent| {
        sink.lock().unwrap().push(event.clone());
    }));
    (session, collector)
}

#[test]
fn scoped_operations_require_a_selection() {
    let mut session = session(3, 3);
    session.edit(at(0, 0), " Mixed ").unwrap();
    let before = session.sheet().clone();

    assert!(matches!(
        session.apply_formatting(&FormatAction::Bold),
        Err(SheetError::NoSelection)
    ));
    assert!(matches!(
        session.apply_data_quality(DataQuality::Trim),
        Err(SheetError::NoSelection)
    ));
    assert!(matches!(
        session.remove_duplicates(),
        Err(SheetError::NoSelection)
    ));
    assert!(matches!(
        session.calculate(Operation::Sum, Scope::Row),
        Err(SheetError::NoSelection)
    ));
    assert!(matches!(session.paste("x"), Err(SheetError::NoSelection)));

    assert_eq!(session.sheet(), &before);
}

#[test]
fn selection_is_single_and_bounded() {
    let mut session = session(2, 2);
    session.select(at(0, 0)).unwrap();
    session.select(at(1, 1)).unwrap();
    assert_eq!(session.selected(), Some(at(1, 1)));

    assert!(matches!(
        session.select(at(2, 0)),
        Err(SheetError::OutOfBounds { row: 2, col: 0 })
    ));
    assert_eq!(session.selected(), Some(at(1, 1)));

    session.clear_selection();
    assert_eq!(session.selected(), None);
}

#[test]
fn bold_and_italic_toggle_only_the_selected_cell() {
    let mut session = session(2, 2);
    session.select(at(0, 1)).unwrap();

    session.apply_formatting(&FormatAction::Bold).unwrap();
    session.apply_formatting(&FormatAction::Italic).unwrap();
    let style = &session.sheet().cell(at(0, 1)).unwrap().style;
    assert!(style.bold && style.italic);
    assert!(session.sheet().cell(at(0, 0)).unwrap().style.is_plain());

    session.apply_formatting(&FormatAction::Bold).unwrap();
    assert!(!session.sheet().cell(at(0, 1)).unwrap().style.bold);
}

#[test]
fn color_is_stored_verbatim_and_empty_is_ignored() {
    let mut session = session(1, 1);
    session.select(at(0, 0)).unwrap();

    session
        .apply_formatting(&FormatAction::Color("not-a-color".to_string()))
        .unwrap();
    session
        .apply_formatting(&FormatAction::Color(String::new()))
        .unwrap();

    let style = &session.sheet().cell(at(0, 0)).unwrap().style;
    assert_eq!(style.color.as_deref(), Some("not-a-color"));
}

#[test]
fn data_quality_actions_are_idempotent() {
    let mut session = session(1, 1);
    session.edit(at(0, 0), "  Hello World ").unwrap();
    session.select(at(0, 0)).unwrap();

    session.apply_data_quality(DataQuality::Trim).unwrap();
    session.apply_data_quality(DataQuality::Trim).unwrap();
    assert_eq!(session.sheet().text(at(0, 0)), Some("Hello World"));

    session.apply_data_quality(DataQuality::Upper).unwrap();
    session.apply_data_quality(DataQuality::Upper).unwrap();
    assert_eq!(session.sheet().text(at(0, 0)), Some("HELLO WORLD"));

    session.apply_data_quality(DataQuality::Lower).unwrap();
    assert_eq!(session.sheet().text(at(0, 0)), Some("hello world"));
}

#[test]
fn remove_duplicates_uses_the_selected_column() {
    let mut session = session(5, 2);
    for (row, value) in ["a", "b", "a", "c", "b"].iter().enumerate() {
        session.edit(at(row, 0), value).unwrap();
    }
    session.select(at(3, 0)).unwrap();

    assert_eq!(session.remove_duplicates().unwrap(), 2);
    let column: Vec<&str> = session.sheet().column_texts(0);
    assert_eq!(column, vec!["a", "b", "", "c", ""]);
}

#[test]
fn calculate_reads_the_row_or_the_column() {
    let mut session = session(3, 3);
    session.edit(at(1, 0), "1").unwrap();
    session.edit(at(1, 1), "2").unwrap();
    session.edit(at(1, 2), "x").unwrap();
    session.edit(at(0, 1), "10").unwrap();
    session.edit(at(2, 1), "30").unwrap();
    session.select(at(1, 1)).unwrap();

    assert_eq!(
        session.calculate(Operation::Sum, Scope::Row).unwrap(),
        AggregateValue::Number(3.0)
    );
    assert_eq!(
        session.calculate(Operation::Sum, Scope::Column).unwrap(),
        AggregateValue::Number(42.0)
    );
    assert_eq!(
        session.calculate(Operation::Median, Scope::Column).unwrap(),
        AggregateValue::Number(10.0)
    );
}

#[test]
fn calculate_without_numbers_reports_the_operation() {
    let mut session = session(2, 2);
    session.select(at(0, 0)).unwrap();
    assert!(matches!(
        session.calculate(Operation::Max, Scope::Row),
        Err(SheetError::NoNumericData(Operation::Max))
    ));
}

#[test]
fn paste_writes_at_selection_then_clears_it() {
    let mut session = session(3, 3);
    session.select(at(2, 2)).unwrap();
    assert_eq!(session.paste("1\t2\n3\t4").unwrap(), 1);
    assert_eq!(session.sheet().text(at(2, 2)), Some("1"));
    assert_eq!(session.selected(), None);
    assert_eq!((session.sheet().rows(), session.sheet().cols()), (3, 3));
}

#[test]
fn empty_paste_keeps_the_selection() {
    let (mut session, collector) = watched(2, 2);
    session.select(at(1, 0)).unwrap();
    collector.lock().unwrap().take();

    assert_eq!(session.paste("").unwrap(), 0);
    assert_eq!(session.selected(), Some(at(1, 0)));
    assert!(collector.lock().unwrap().is_empty());
}

#[test]
fn deleting_under_the_selection_clears_it() {
    let mut session = session(3, 3);
    session.select(at(2, 0)).unwrap();
    assert!(session.delete_row());
    assert_eq!(session.selected(), None);

    session.select(at(0, 0)).unwrap();
    assert!(session.delete_column());
    assert_eq!(session.selected(), Some(at(0, 0)));
}

#[test]
fn subscribers_see_every_change() {
    let (mut session, collector) = watched(2, 2);

    session.select(at(0, 0)).unwrap();
    session.edit(at(0, 0), "xx").unwrap();
    session.find_and_replace("x", "y").unwrap();
    session.add_row();
    session.resize(Axis::Column, 1, 120).unwrap();

    let events = collector.lock().unwrap().take();
    assert_eq!(
        events,
        vec![
            GridEvent::SelectionChanged {
                selected: Some(at(0, 0))
            },
            GridEvent::CellsChanged {
                cells: vec![at(0, 0)]
            },
            GridEvent::CellsChanged {
                cells: vec![at(0, 0)]
            },
            GridEvent::StructureChanged { rows: 3, cols: 2 },
            GridEvent::Resized {
                axis: Axis::Column,
                index: 1,
                size: 120
            },
        ]
    );
}

#[test]
fn rejected_commands_emit_nothing() {
    let (mut session, collector) = watched(2, 2);
    let _ = session.apply_formatting(&FormatAction::Bold);
    let _ = session.find_and_replace("", "y");
    for _ in 0..3 {
        session.delete_row();
    }
    // only the one real deletion is reported
    assert_eq!(
        collector.lock().unwrap().take(),
        vec![GridEvent::StructureChanged { rows: 1, cols: 2 }]
    );
}

#[test]
fn resize_gesture_feeds_the_model() {
    let mut session = session(2, 2);
    let gesture = ResizeGesture::begin(Axis::Row, 1, 200, 24);
    let height = gesture.finish(236);
    session.resize(Axis::Row, 1, height).unwrap();
    assert_eq!(session.sheet().row_height(1), Some(60));
}

#[test]
fn finishing_a_drag_resizes_the_column() {
    let (mut session, collector) = watched(2, 3);
    let gesture = ResizeGesture::begin(Axis::Column, 2, 300, 100);
    assert_eq!(session.finish_resize(gesture, 260).unwrap(), 60);
    assert_eq!(session.sheet().column_width(2), Some(60));
    assert_eq!(
        collector.lock().unwrap().take(),
        vec![GridEvent::Resized {
            axis: Axis::Column,
            index: 2,
            size: 60
        }]
    );

    let stray = ResizeGesture::begin(Axis::Row, 5, 0, 20);
    assert!(matches!(
        session.finish_resize(stray, 10),
        Err(SheetError::OutOfBounds { .. })
    ));
}

#[test]
fn execute_runs_parsed_commands() {
    let mut session = session(3, 3);
    let script = [
        "edit A1 4",
        "edit A2 6",
        "select A3",
        "paste 5",
        "select A1",
        "calc SUM column",
    ];
    let mut last = String::new();
    for line in script {
        let command: Command = line.parse().unwrap();
        last = session.execute(&command).unwrap();
    }
    assert_eq!(last, "SUM: 15");
    assert_eq!(
        session.execute(&"addcol".parse().unwrap()).unwrap(),
        "added column D"
    );
    assert!(session.execute(&Command::Show).is_err());
}
