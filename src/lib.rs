mod address;
mod coerce;
mod csv_out;
mod error;
mod flatten;
mod header;
mod model;
mod options;
mod pdf_reader;
mod table_parse;
mod warning;

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::coerce::coerce_table;
use crate::csv_out::{read_scanned, write_csv, write_csv_to_string, write_flat};
use crate::header::boundary_warning;
use crate::table_parse::parse_page;
use crate::warning::WarningCode;

pub use address::{DIRECTIONALS, STREET_TYPES, clean_street_name, fraction_building_number};
pub use coerce::parse_numeric;
pub use error::ExtractError;
pub use flatten::{FLAT_COLUMNS, FlatListing, ScannedListing, flatten_listings};
pub use header::detect_boundaries;
pub use model::{
    Boundaries, ColumnSchema, RENT_STABILIZED_COLUMNS, RENT_STABILIZED_NUMERIC, Record, Table,
    Token, TypedTable, Value,
};
pub use options::{PageSelection, ScanOptions, TokenOptions};
pub use pdf_reader::{Glyph, PdfDocument, PdfPage, TokenPage, glyphs_to_tokens};
pub use table_parse::assign_column;
pub use warning::{ExtractWarning, WarningCode as ExtractWarningCode};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionReport {
    pub row_count: usize,
    pub page_count: usize,
    pub rejected_rows: usize,
    pub boundaries: Vec<f64>,
    pub warnings: Vec<ExtractWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlattenReport {
    pub input_rows: usize,
    pub output_rows: usize,
}

/// Column boundaries from the configured header page, plus a diagnostic when
/// the header could not resolve every column.
fn document_boundaries<P: TokenPage>(
    pages: &[P],
    options: &ScanOptions,
    warnings: &mut Vec<ExtractWarning>,
) -> Boundaries {
    let header_index = usize::try_from(options.header_page - 1).unwrap_or(usize::MAX);
    let Some(page) = pages.get(header_index) else {
        warnings.push(
            ExtractWarning::new(
                WarningCode::HeaderPageMissing,
                format!(
                    "header page {} is not in the document; every token lands in the first column",
                    options.header_page
                ),
            )
            .with_page(options.header_page)
            .with_counts(0, options.schema.width()),
        );
        return Boundaries::default();
    };

    let tokens = page.tokens(&options.header_tokens);
    let boundaries = detect_boundaries(&tokens, &options.schema, options.header_tolerance);
    if let Some(warning) = boundary_warning(&boundaries, &options.schema, options.header_page) {
        warn!(
            detected = boundaries.len(),
            expected = options.schema.width(),
            "{}",
            warning.message
        );
        warnings.push(warning);
    }
    boundaries
}

/// Rebuilds the registry table from positioned tokens, one entry per page.
///
/// Boundaries come from the header page once and are shared by every page.
/// Records keep page order, then top-to-bottom order within a page.
pub fn scan_pages<P: TokenPage>(
    pages: &[P],
    options: &ScanOptions,
) -> Result<(TypedTable, ExtractionReport), ExtractError> {
    options.validate()?;

    let mut warnings = Vec::new();
    let boundaries = document_boundaries(pages, options, &mut warnings);

    let mut page_count = 0;
    let mut rejected_rows = 0;
    let mut page_buffers = Vec::new();
    for (index, page) in pages.iter().enumerate() {
        let number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        if options
            .pages
            .as_ref()
            .is_some_and(|selection| !selection.contains(number))
        {
            continue;
        }

        let tokens = page.tokens(&options.row_tokens);
        let (records, rejected) = parse_page(
            &tokens,
            &boundaries,
            &options.skip_tokens,
            options.row_granularity,
            options.schema.width(),
            options.zip_prefix_len,
        );
        debug!(
            page = number,
            tokens = tokens.len(),
            records = records.len(),
            rejected,
            "parsed page"
        );

        page_count += 1;
        rejected_rows += rejected;
        page_buffers.push(records);
    }

    if page_count == 0 {
        return Err(ExtractError::NoPagesSelected);
    }

    let table = Table {
        schema: options.schema.clone(),
        records: page_buffers.into_iter().flatten().collect(),
    };
    let typed = coerce_table(table);

    if typed.row_count() == 0 {
        warnings.push(ExtractWarning::new(
            WarningCode::NoRowsDetected,
            "no rows with a postal-code prefix were found",
        ));
    }
    info!(rows = typed.row_count(), pages = page_count, "scan complete");

    let report = ExtractionReport {
        row_count: typed.row_count(),
        page_count,
        rejected_rows,
        boundaries: boundaries.as_slice().to_vec(),
        warnings,
    };
    Ok((typed, report))
}

/// Scans a registry PDF and writes the table as CSV.
///
/// Nothing is written unless the whole document was processed.
pub fn extract_pdf_to_csv(
    input_pdf: &Path,
    output_csv: &Path,
    options: &ScanOptions,
) -> Result<ExtractionReport, ExtractError> {
    let document = PdfDocument::open(input_pdf)?;
    let (table, report) = scan_pages(document.pages(), options)?;
    write_csv(output_csv, &table, options.delimiter)?;
    Ok(report)
}

pub fn extract_pdf_bytes_to_csv_string(
    input_pdf: &[u8],
    options: &ScanOptions,
) -> Result<(String, ExtractionReport), ExtractError> {
    let document = PdfDocument::from_bytes(input_pdf)?;
    let (table, report) = scan_pages(document.pages(), options)?;
    let csv = write_csv_to_string(&table, options.delimiter)?;
    Ok((csv, report))
}

/// Flattens both address slots of a scanned CSV into one row per building.
///
/// `borough`, when given, overrides any `BOROUGH` column of the input.
pub fn flatten_csv_to_string(
    input_csv: &str,
    borough: Option<&str>,
    delimiter: u8,
) -> Result<(String, FlattenReport), ExtractError> {
    let listings = read_scanned(input_csv.as_bytes(), delimiter)?;
    let rows = flatten_listings(&listings, borough);

    let mut out = Vec::new();
    write_flat(&mut out, &rows, delimiter)?;
    let csv = String::from_utf8(out)
        .map_err(|error| ExtractError::InvalidOption(format!("invalid utf-8 csv output: {error}")))?;

    Ok((
        csv,
        FlattenReport {
            input_rows: listings.len(),
            output_rows: rows.len(),
        },
    ))
}

pub fn flatten_csv(
    input_csv: &Path,
    output_csv: &Path,
    borough: Option<&str>,
    delimiter: u8,
) -> Result<FlattenReport, ExtractError> {
    if !input_csv.is_file() {
        return Err(ExtractError::MissingSource(input_csv.to_path_buf()));
    }

    let input = fs::read_to_string(input_csv)?;
    let (csv, report) = flatten_csv_to_string(&input, borough, delimiter)?;
    fs::write(output_csv, csv)?;
    info!(
        input_rows = report.input_rows,
        output_rows = report.output_rows,
        "flatten complete"
    );
    Ok(report)
}
