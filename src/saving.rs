use bincode::{deserialize_from, serialize_into};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::Result;
use crate::spreadsheet::Spreadsheet;

/// Writes a gzip-compressed bincode snapshot of `spreadsheet` to `writer`.
pub fn write_snapshot<W: Write>(spreadsheet: &Spreadsheet, writer: W) -> Result<()> {
    let encoder = GzEncoder::new(writer, Compression::default());
    let mut writer = BufWriter::new(encoder);
    serialize_into(&mut writer, spreadsheet)?;
    let encoder = writer.into_inner().map_err(|e| e.into_error())?;
    encoder.finish()?;
    Ok(())
}

/// Reads a snapshot written by [`write_snapshot`] and checks its layout.
pub fn read_snapshot<R: Read>(reader: R) -> Result<Spreadsheet> {
    let decoder = GzDecoder::new(reader);
    let mut reader = BufReader::new(decoder);
    let spreadsheet: Spreadsheet = deserialize_from(&mut reader)?;
    spreadsheet.validate()?;
    Ok(spreadsheet)
}

pub fn to_bytes(spreadsheet: &Spreadsheet) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_snapshot(spreadsheet, &mut buffer)?;
    Ok(buffer)
}

pub fn from_bytes(bytes: &[u8]) -> Result<Spreadsheet> {
    read_snapshot(bytes)
}

pub fn save_spreadsheet(spreadsheet: &Spreadsheet, filename: impl AsRef<Path>) -> Result<()> {
    let path = filename.as_ref();
    write_snapshot(spreadsheet, File::create(path)?)?;
    info!(
        "saved {}x{} sheet to {}",
        spreadsheet.rows(),
        spreadsheet.cols(),
        path.display()
    );
    Ok(())
}

pub fn load_spreadsheet(filename: impl AsRef<Path>) -> Result<Spreadsheet> {
    let path = filename.as_ref();
    let spreadsheet = read_snapshot(File::open(path)?)?;
    info!(
        "loaded {}x{} sheet from {}",
        spreadsheet.rows(),
        spreadsheet.cols(),
        path.display()
    );
    Ok(spreadsheet)
}
