use std::io;
use std::path::Path;

use csv::{ReaderBuilder, Writer, WriterBuilder};

use crate::error::ExtractError;
use crate::flatten::{FLAT_COLUMNS, FlatListing, ScannedListing};
use crate::model::TypedTable;

fn write_typed<W: io::Write>(
    writer: &mut Writer<W>,
    table: &TypedTable,
) -> Result<(), ExtractError> {
    writer.write_record(table.schema.names())?;
    for row in &table.rows {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_csv(
    path: &Path,
    table: &TypedTable,
    delimiter: u8,
) -> Result<(), ExtractError> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    write_typed(&mut writer, table)
}

pub(crate) fn write_csv_to_string(
    table: &TypedTable,
    delimiter: u8,
) -> Result<String, ExtractError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::<u8>::new());
    write_typed(&mut writer, table)?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ExtractError::Csv(error.into_error().into()))?;
    String::from_utf8(bytes)
        .map_err(|error| ExtractError::InvalidOption(format!("invalid utf-8 csv output: {error}")))
}

/// Reads a scanned registry table; empty cells become `None`.
pub(crate) fn read_scanned<R: io::Read>(
    reader: R,
    delimiter: u8,
) -> Result<Vec<ScannedListing>, ExtractError> {
    let mut reader = ReaderBuilder::new().delimiter(delimiter).from_reader(reader);
    reader
        .deserialize::<ScannedListing>()
        .map(|row| row.map_err(ExtractError::from))
        .collect()
}

pub(crate) fn write_flat<W: io::Write>(
    writer: W,
    rows: &[FlatListing],
    delimiter: u8,
) -> Result<(), ExtractError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(FLAT_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
