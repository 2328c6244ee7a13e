use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("failed to extract positioned text: {0}")]
    PdfExtract(String),

    #[error("input not found: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("no pages available after applying selection")]
    NoPagesSelected,
}

impl From<pdf_extract::OutputError> for ExtractError {
    fn from(error: pdf_extract::OutputError) -> Self {
        match error {
            pdf_extract::OutputError::PdfError(error) => Self::PdfLoad(error),
            pdf_extract::OutputError::IoError(error) => Self::Io(error),
            pdf_extract::OutputError::FormatError(error) => Self::PdfExtract(error.to_string()),
        }
    }
}
