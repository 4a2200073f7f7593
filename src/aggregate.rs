use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SheetError};

lazy_static! {
    // Longest numeric prefix, the way a browser's parseFloat reads it.
    static ref NUMERIC_PREFIX_REGEX: Regex =
        Regex::new(r"^\s*([+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?))")
            .unwrap();
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Sum,
    Count,
    Average,
    Mean,
    Median,
    Mode,
    Max,
    Min,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::Sum,
        Operation::Count,
        Operation::Average,
        Operation::Mean,
        Operation::Median,
        Operation::Mode,
        Operation::Max,
        Operation::Min,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Operation::Sum => "SUM",
            Operation::Count => "COUNT",
            Operation::Average => "AVERAGE",
            Operation::Mean => "MEAN",
            Operation::Median => "MEDIAN",
            Operation::Mode => "MODE",
            Operation::Max => "MAX",
            Operation::Min => "MIN",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Operation {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_uppercase();
        Operation::ALL
            .into_iter()
            .find(|op| op.code() == upper)
            .ok_or_else(|| SheetError::UnknownAction(s.to_string()))
    }
}

/// Result of an aggregation. MODE may produce several values, so it is text.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum AggregateValue {
    Number(f64),
    Text(String),
}

impl AggregateValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AggregateValue::Number(n) => Some(*n),
            AggregateValue::Text(_) => None,
        }
    }
}

impl fmt::Display for AggregateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateValue::Number(n) => f.write_str(&format_number(*n)),
            AggregateValue::Text(s) => f.write_str(s),
        }
    }
}

/// Formats a number the way the page displayed it: `6`, `2.5`, `Infinity`,
/// and `1e+21` or `1e-7` once the magnitude leaves `[1e-6, 1e21)`.
pub fn format_number(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let exponential = format!("{:e}", n);
        match exponential.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => exponential,
        }
    } else {
        format!("{}", n)
    }
}

/// Reads the leading number of `text`, ignoring whatever follows it.
/// `"12abc"` is 12, `"abc"` and `""` are not numbers.
pub fn parse_numeric_prefix(text: &str) -> Option<f64> {
    let captures = NUMERIC_PREFIX_REGEX.captures(text)?;
    let literal = &captures[1];
    match literal {
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => literal.parse::<f64>().ok(),
    }
}

/// Runs `op` over the numeric entries of `values`. Non-numeric entries are
/// skipped; if none are left the result is [`SheetError::NoNumericData`].
pub fn aggregate<S: AsRef<str>>(values: &[S], op: Operation) -> Result<AggregateValue> {
    let mut numbers: Vec<f64> = values
        .iter()
        .filter_map(|v| parse_numeric_prefix(v.as_ref()))
        .collect();

    if numbers.is_empty() {
        return Err(SheetError::NoNumericData(op));
    }

    let count = numbers.len() as f64;
    let value = match op {
        Operation::Sum => AggregateValue::Number(numbers.iter().sum()),
        Operation::Count => AggregateValue::Number(count),
        Operation::Average | Operation::Mean => {
            AggregateValue::Number(numbers.iter().sum::<f64>() / count)
        }
        Operation::Median => {
            numbers.sort_by(|a, b| a.total_cmp(b));
            let mid = numbers.len() / 2;
            if numbers.len() % 2 == 0 {
                AggregateValue::Number((numbers[mid - 1] + numbers[mid]) / 2.0)
            } else {
                AggregateValue::Number(numbers[mid])
            }
        }
        Operation::Mode => AggregateValue::Text(mode(numbers)),
        Operation::Max => {
            AggregateValue::Number(numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max))
        }
        Operation::Min => {
            AggregateValue::Number(numbers.iter().copied().fold(f64::INFINITY, f64::min))
        }
    };
    Ok(value)
}

// Ties are listed in ascending numeric order.
fn mode(mut numbers: Vec<f64>) -> String {
    // -0 and 0 count as the same value
    for n in numbers.iter_mut() {
        *n += 0.0;
    }
    numbers.sort_by(|a, b| a.total_cmp(b));

    let mut groups: Vec<(f64, usize)> = Vec::new();
    for n in numbers {
        match groups.last_mut() {
            Some((value, freq)) if *value == n => *freq += 1,
            _ => groups.push((n, 1)),
        }
    }

    let max_freq = groups.iter().map(|(_, freq)| *freq).max().unwrap_or(0);
    groups
        .into_iter()
        .filter(|(_, freq)| *freq == max_freq)
        .map(|(value, _)| format_number(value))
        .collect::<Vec<_>>()
        .join(", ")
}
