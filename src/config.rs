use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

use crate::spreadsheet::{DEFAULT_COLS, DEFAULT_ROWS};

pub const MAX_ROWS: usize = 999;
pub const MAX_COLS: usize = 18278;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(pub String);

/// Server settings. Later sources win: defaults, then `WEBSHEET_*`
/// environment variables, then the positional `<rows> <cols>` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub rows: usize,
    pub cols: usize,
    /// Snapshot to start from (if it exists) and to save to.
    pub snapshot: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            snapshot: None,
        }
    }
}

fn parse_dimension(name: &str, value: &str, max: usize) -> Result<usize, ConfigError> {
    let n: usize = value
        .trim()
        .parse()
        .map_err(|_| ConfigError(format!("{} must be a number, got {:?}", name, value)))?;
    if n < 1 || n > max {
        return Err(ConfigError(format!("{} must be between 1 and {}, got {}", name, max, n)));
    }
    Ok(n)
}

/// Reads the positional `<rows> <cols>` pair. No arguments means none given.
pub fn parse_dimensions(args: &[String]) -> Result<Option<(usize, usize)>, ConfigError> {
    match args {
        [] => Ok(None),
        [rows, cols] => Ok(Some((
            parse_dimension("rows", rows, MAX_ROWS)?,
            parse_dimension("cols", cols, MAX_COLS)?,
        ))),
        _ => Err(ConfigError("usage: <rows> <cols>".to_string())),
    }
}

impl ServerConfig {
    /// Reads the process environment and command line.
    pub fn load() -> Result<Self, ConfigError> {
        let vars = env::vars().filter(|(key, _)| key.starts_with("WEBSHEET_"));
        let args: Vec<String> = env::args().skip(1).collect();
        Self::from_sources(vars, &args)
    }

    /// Builds a config from explicit variable pairs and positional args.
    pub fn from_sources<I>(vars: I, args: &[String]) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = ServerConfig::default();

        for (key, value) in vars {
            match key.as_str() {
                "WEBSHEET_BIND" => {
                    config.bind = value
                        .parse()
                        .map_err(|_| ConfigError(format!("bad bind address {:?}", value)))?;
                }
                "WEBSHEET_ROWS" => config.rows = parse_dimension("rows", &value, MAX_ROWS)?,
                "WEBSHEET_COLS" => config.cols = parse_dimension("cols", &value, MAX_COLS)?,
                "WEBSHEET_SNAPSHOT" if !value.is_empty() => {
                    config.snapshot = Some(PathBuf::from(value));
                }
                _ => {}
            }
        }

        if let Some((rows, cols)) = parse_dimensions(args)? {
            config.rows = rows;
            config.cols = cols;
        }

        Ok(config)
    }
}
