use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::aggregate::Operation;
use crate::cell::CellAddress;
use crate::error::{Result, SheetError};
use crate::resize::Axis;
use crate::spreadsheet::parse_cell_name;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatAction {
    Bold,
    Italic,
    /// Any CSS color string; it is not validated.
    Color(String),
}

impl FormatAction {
    /// Builds an action from its code. `COLOR` takes its value from `color`,
    /// defaulting to an empty string (which leaves the cell unchanged).
    pub fn from_code(code: &str, color: Option<&str>) -> Result<Self> {
        match code.trim().to_uppercase().as_str() {
            "BOLD" => Ok(FormatAction::Bold),
            "ITALIC" => Ok(FormatAction::Italic),
            "COLOR" => Ok(FormatAction::Color(color.unwrap_or_default().to_string())),
            _ => Err(SheetError::UnknownAction(code.to_string())),
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataQuality {
    Trim,
    Upper,
    Lower,
}

impl DataQuality {
    pub fn apply(&self, text: &str) -> String {
        match self {
            DataQuality::Trim => text.trim().to_string(),
            DataQuality::Upper => text.to_uppercase(),
            DataQuality::Lower => text.to_lowercase(),
        }
    }
}

impl FromStr for DataQuality {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "TRIM" => Ok(DataQuality::Trim),
            "UPPER" => Ok(DataQuality::Upper),
            "LOWER" => Ok(DataQuality::Lower),
            _ => Err(SheetError::UnknownAction(s.to_string())),
        }
    }
}

/// Which cells feed an aggregation: the selected cell's row or its column.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Row,
    Column,
}

impl FromStr for Scope {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "ROW" => Ok(Scope::Row),
            "COLUMN" | "COL" => Ok(Scope::Column),
            _ => Err(SheetError::UnknownAction(s.to_string())),
        }
    }
}

impl FromStr for Axis {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "ROW" => Ok(Axis::Row),
            "COLUMN" | "COL" => Ok(Axis::Column),
            _ => Err(SheetError::UnknownAction(s.to_string())),
        }
    }
}

/// One line of the command language understood by the REPL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Select(CellAddress),
    Edit(CellAddress, String),
    Format(FormatAction),
    Quality(DataQuality),
    Dedupe,
    Calculate(Operation, Scope),
    AddRow,
    AddColumn,
    DeleteRow,
    DeleteColumn,
    Replace { find: String, replace: String },
    Paste(String),
    Resize { axis: Axis, index: usize, size: u32 },
    Export(PathBuf),
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "Commands:
  select <cell>                 Select a cell, e.g. select B2
  edit <cell> <text>            Set the text of a cell
  bold | italic | color <css>   Format the selected cell
  trim | upper | lower          Clean the selected cell
  dedupe                        Clear repeated values in the selected column
  calc <op> row|column          SUM COUNT AVERAGE MEAN MEDIAN MODE MAX MIN
  addrow | addcol               Append a row / column
  delrow | delcol               Remove the last row / column
  replace <find> [replacement]  Replace the first match in every cell
  paste <text>                  Paste at the selection (\\t and \\n escapes)
  resize row|column <n> <px>    Set a row height or column width
  export <file.csv|file.xlsx>   Write the grid to a file
  show                          Print the grid
  q                             Quit";

fn parse_address(name: &str) -> Result<CellAddress> {
    parse_cell_name(name).ok_or_else(|| SheetError::InvalidCellName(name.to_string()))
}

fn unescape(text: &str) -> String {
    text.replace("\\t", "\t").replace("\\n", "\n")
}

impl FromStr for Command {
    type Err = SheetError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim_start()),
            None => (line, ""),
        };
        let unknown = || SheetError::UnknownAction(line.to_string());

        let command = match word.to_lowercase().as_str() {
            "select" => Command::Select(parse_address(rest)?),
            "edit" => {
                let (name, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                Command::Edit(parse_address(name)?, text.to_string())
            }
            "bold" | "italic" | "color" => {
                Command::Format(FormatAction::from_code(word, Some(rest.trim()))?)
            }
            "trim" | "upper" | "lower" => Command::Quality(word.parse()?),
            "dedupe" => Command::Dedupe,
            "calc" => {
                let mut parts = rest.split_whitespace();
                let op = parts.next().ok_or_else(unknown)?.parse()?;
                let scope = parts.next().ok_or_else(unknown)?.parse()?;
                Command::Calculate(op, scope)
            }
            "addrow" => Command::AddRow,
            "addcol" => Command::AddColumn,
            "delrow" => Command::DeleteRow,
            "delcol" => Command::DeleteColumn,
            "replace" => {
                let (find, replace) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                Command::Replace {
                    find: find.to_string(),
                    replace: replace.to_string(),
                }
            }
            "paste" => Command::Paste(unescape(rest)),
            "resize" => {
                let mut parts = rest.split_whitespace();
                let axis = parts.next().ok_or_else(unknown)?.parse()?;
                let index = parts.next().and_then(|n| n.parse().ok()).ok_or_else(unknown)?;
                let size = parts.next().and_then(|n| n.parse().ok()).ok_or_else(unknown)?;
                Command::Resize { axis, index, size }
            }
            "export" if !rest.is_empty() => Command::Export(PathBuf::from(rest)),
            "show" => Command::Show,
            "help" => Command::Help,
            "q" | "quit" => Command::Quit,
            _ => return Err(unknown()),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_calc_with_scope() {
        let command: Command = "calc median column".parse().unwrap();
        assert_eq!(command, Command::Calculate(Operation::Median, Scope::Column));
    }

    #[test]
    fn paste_unescapes_tabs_and_newlines() {
        let command: Command = "paste 1\\t2\\n3\\t4".parse().unwrap();
        assert_eq!(command, Command::Paste("1\t2\n3\t4".to_string()));
    }

    #[test]
    fn edit_keeps_spaces_in_text() {
        let command: Command = "edit c4 hello  world".parse().unwrap();
        assert_eq!(
            command,
            Command::Edit(CellAddress::new(3, 2), "hello  world".to_string())
        );
    }

    #[test]
    fn unknown_words_are_rejected() {
        assert!(matches!(
            "frobnicate".parse::<Command>(),
            Err(SheetError::UnknownAction(_))
        ));
        assert!(matches!(
            "select 9Z".parse::<Command>(),
            Err(SheetError::InvalidCellName(_))
        ));
    }
}
