/*!
# Web Spreadsheet

An editable spreadsheet grid served to the browser, built in Rust.

## Overview

The grid lives on the server. The browser shows the table the server
renders and posts commands back: select a cell, edit it, toggle bold or
italic, set a color, clean up its text, remove duplicates from its column,
aggregate its row or column, insert or delete rows and columns, resize them,
find and replace, paste clipboard text, and export the grid to a spreadsheet
file.

## Architecture

### Model
- **Spreadsheet** - row-major grid of text cells, never smaller than 1x1.
  Rows and columns are only added or removed at the trailing edge.
- **Session** - the grid plus the single selected cell. All selection-scoped
  commands go through it and it notifies subscribers of every change.
- **Aggregator** - SUM, COUNT, AVERAGE/MEAN, MEDIAN, MODE, MAX and MIN over
  the numeric cells of a row or column.

### Views
- **render** - HTML table, JSON snapshot and plain-text dump. Read only.
- **downloader** - CSV and XLSX export.

### Server (feature `web`)
- **app** - axum router exposing every command as a JSON endpoint.

## Addressing

Cells are addressed 0-based internally and labelled spreadsheet style:
column 0 is `A`, column 26 is `AA`, and `(2, 1)` is `B3`.

## REST API Endpoints

- `GET /` - Rendered sheet
- `GET /api/sheet` - JSON snapshot of the grid
- `POST /api/select`, `/api/edit` - Selection and cell text
- `POST /api/format`, `/api/quality`, `/api/dedupe` - Selected cell commands
- `POST /api/calculate` - Aggregate the selected row or column
- `POST /api/find_replace`, `/api/paste`, `/api/resize`
- `POST|DELETE /api/rows`, `/api/columns` - Grow or shrink the grid
- `GET /api/export?format=xlsx|csv` - Download the grid
- `POST /api/save`, `/api/load` - Snapshots
*/

pub mod aggregate;
pub mod cell;
pub mod command;
pub mod config;
pub mod downloader;
pub mod error;
pub mod events;
pub mod render;
pub mod resize;
pub mod saving;
pub mod session;
pub mod spreadsheet;

#[cfg(feature = "web")]
pub mod app;

pub use aggregate::{AggregateValue, Operation, aggregate};
pub use cell::{Cell, CellAddress, CellStyle};
pub use command::{Command, DataQuality, FormatAction, Scope};
pub use error::SheetError;
pub use session::Session;
pub use spreadsheet::{Spreadsheet, column_name, parse_cell_name};
