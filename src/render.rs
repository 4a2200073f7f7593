//! Read-only views of a session: the HTML table served to the browser, the
//! JSON snapshot the page polls, and the plain-text grid the REPL prints.

use serde::Serialize;
use std::fmt::Write;

use crate::cell::{Cell, CellAddress, CellStyle};
use crate::session::Session;
use crate::spreadsheet::{Spreadsheet, column_name};

const SELECTED_BACKGROUND: &str = "#ffeb3b";

#[derive(Serialize, Debug)]
pub struct CellView<'a> {
    pub name: String,
    pub row: usize,
    pub col: usize,
    pub text: &'a str,
    pub style: &'a CellStyle,
}

#[derive(Serialize, Debug)]
pub struct SheetView<'a> {
    pub rows: usize,
    pub cols: usize,
    pub revision: u64,
    pub selected: Option<String>,
    pub column_names: Vec<String>,
    pub column_widths: Vec<Option<u32>>,
    pub row_heights: Vec<Option<u32>>,
    /// Only cells with text or a style; blank cells are implied.
    pub cells: Vec<CellView<'a>>,
}

impl<'a> SheetView<'a> {
    pub fn from_session(session: &'a Session, revision: u64) -> Self {
        let sheet = session.sheet();
        let cells = sheet
            .cells()
            .iter()
            .filter(|cell| !cell.is_empty() || !cell.style.is_plain())
            .map(|cell| CellView {
                name: cell.address().label(),
                row: cell.row,
                col: cell.col,
                text: &cell.text,
                style: &cell.style,
            })
            .collect();

        SheetView {
            rows: sheet.rows(),
            cols: sheet.cols(),
            revision,
            selected: session.selected().map(|addr| addr.label()),
            column_names: (0..sheet.cols()).map(column_name).collect(),
            column_widths: (0..sheet.cols()).map(|c| sheet.column_width(c)).collect(),
            row_heights: (0..sheet.rows()).map(|r| sheet.row_height(r)).collect(),
            cells,
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn cell_style(cell: &Cell, selected: bool) -> String {
    let mut style = String::new();
    if cell.style.bold {
        style.push_str("font-weight:bold;");
    }
    if cell.style.italic {
        style.push_str("font-style:italic;");
    }
    if let Some(color) = &cell.style.color {
        let _ = write!(style, "color:{};", escape_html(color));
    }
    if selected {
        let _ = write!(style, "background-color:{};", SELECTED_BACKGROUND);
    }
    style
}

/// Renders the grid as an HTML table with `data-row`/`data-col` tags on
/// every cell.
pub fn render_html(session: &Session) -> String {
    let sheet = session.sheet();
    let selected = session.selected();
    let mut html = String::from("<table id=\"sheet\">\n<thead><tr id=\"header-row\"><th></th>");

    for c in 0..sheet.cols() {
        match sheet.column_width(c) {
            Some(width) => {
                let _ = write!(html, "<th style=\"width:{}px\">{}</th>", width, column_name(c));
            }
            None => {
                let _ = write!(html, "<th>{}</th>", column_name(c));
            }
        }
    }
    html.push_str("</tr></thead>\n<tbody id=\"sheet-body\">\n");

    for (r, row) in sheet.row_iter().enumerate() {
        match sheet.row_height(r) {
            Some(height) => {
                let _ = write!(html, "<tr style=\"height:{}px\">", height);
            }
            None => html.push_str("<tr>"),
        }
        let _ = write!(html, "<th>{}</th>", r + 1);
        for cell in row {
            let is_selected = selected == Some(CellAddress::new(cell.row, cell.col));
            let style = cell_style(cell, is_selected);
            let _ = write!(
                html,
                "<td contenteditable=\"true\" data-row=\"{}\" data-col=\"{}\"",
                cell.row, cell.col
            );
            if !style.is_empty() {
                let _ = write!(html, " style=\"{}\"", style);
            }
            let _ = write!(html, ">{}</td>", escape_html(&cell.text));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

/// Fixed-width text dump of the top-left `max_rows` x `max_cols` corner.
pub fn render_text(sheet: &Spreadsheet, max_rows: usize, max_cols: usize) -> String {
    let end_row = sheet.rows().min(max_rows);
    let end_col = sheet.cols().min(max_cols);
    let mut out = String::new();

    out.push_str("\t");
    for col in 0..end_col {
        let _ = write!(out, "{:<12}", column_name(col));
    }
    out.push('\n');
    for row in 0..end_row {
        let _ = write!(out, "{}\t", row + 1);
        for col in 0..end_col {
            let text = sheet.text(CellAddress::new(row, col)).unwrap_or_default();
            let shown: String = text.chars().take(11).collect();
            let _ = write!(out, "{:<12}", shown);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<b>&\"'"), "&lt;b&gt;&amp;&quot;&#39;");
    }
}
