#![cfg(not(tarpaulin_include))]

use log::warn;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use websheet::command::{Command, HELP};
use websheet::config::parse_dimensions;
use websheet::downloader;
use websheet::render::render_text;
use websheet::session::Session;
use websheet::spreadsheet::{DEFAULT_COLS, DEFAULT_ROWS, Spreadsheet};

const VIEW_ROWS: usize = 10;
const VIEW_COLS: usize = 10;

fn export(session: &Session, path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => fs::write(path, downloader::to_csv(session.sheet()))?,
        #[cfg(feature = "web")]
        Some("xlsx") => fs::write(path, downloader::to_xlsx(session.sheet())?)?,
        #[cfg(not(feature = "web"))]
        Some("xlsx") => return Err("XLSX export requires the 'web' feature".into()),
        Some(ext) => return Err(format!("Unsupported file extension: {}", ext).into()),
        None => return Err("File has no extension".into()),
    }
    Ok(format!("exported to {}", path.display()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (rows, cols) = parse_dimensions(&args)?.unwrap_or((DEFAULT_ROWS, DEFAULT_COLS));

    let mut session = Session::new(Spreadsheet::create(rows, cols));
    let mut start_time = Instant::now();
    let mut status = String::from("ok");
    let mut show = true;

    loop {
        if show {
            print!("{}", render_text(session.sheet(), VIEW_ROWS, VIEW_COLS));
        }
        show = false;

        let selected = session
            .selected()
            .map(|addr| addr.label())
            .unwrap_or_else(|| "-".to_string());
        print!(
            "[{:.1}] [{}] ({}) > ",
            start_time.elapsed().as_secs_f64(),
            selected,
            status
        );
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        start_time = Instant::now();

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command: Command = match line.parse() {
            Ok(command) => command,
            Err(e) => {
                status = e.to_string();
                continue;
            }
        };

        status = match &command {
            Command::Quit => break,
            Command::Help => {
                println!("{}", HELP);
                String::from("ok")
            }
            Command::Show => {
                show = true;
                String::from("ok")
            }
            Command::Export(path) => match export(&session, path) {
                Ok(message) => message,
                Err(e) => e.to_string(),
            },
            _ => match session.execute(&command) {
                Ok(message) => {
                    show = true;
                    message
                }
                Err(e) => {
                    warn!("{}: {}", line, e);
                    e.to_string()
                }
            },
        };
    }

    Ok(())
}
