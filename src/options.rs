use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::ExtractError;
use crate::model::ColumnSchema;

/// How glyphs are merged into tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenOptions {
    /// Largest horizontal gap between two glyphs of one token.
    pub x_tolerance: f64,
    /// Largest vertical offset between two glyphs of one token.
    pub y_tolerance: f64,
    /// Keep blank glyphs inside tokens instead of splitting on them.
    pub keep_blank_chars: bool,
}

impl TokenOptions {
    /// Loose grouping used for data rows: multi-word cells stay one token.
    #[must_use]
    pub const fn rows() -> Self {
        Self {
            x_tolerance: 5.0,
            y_tolerance: 2.0,
            keep_blank_chars: true,
        }
    }
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
            keep_blank_chars: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pages: BTreeSet<u32>,
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut pages = BTreeSet::new();
        for token in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start: u32 = start
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range start: '{start}'"))?;
                let end: u32 = end
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range end: '{end}'"))?;
                if start == 0 || end == 0 {
                    return Err("pages are 1-based".to_string());
                }
                if end < start {
                    return Err(format!(
                        "invalid range '{token}': end is smaller than start"
                    ));
                }
                pages.extend(start..=end);
            } else {
                let page: u32 = token
                    .parse()
                    .map_err(|_| format!("invalid page number: '{token}'"))?;
                if page == 0 {
                    return Err("pages are 1-based".to_string());
                }
                pages.insert(page);
            }
        }

        if pages.is_empty() {
            return Err("page selection cannot be empty".to_string());
        }

        Ok(Self { pages })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub schema: ColumnSchema,
    /// 1-based page whose header row defines the column boundaries.
    pub header_page: u32,
    /// Header positions closer than this are one column.
    pub header_tolerance: f64,
    /// Vertical distance folded into one line key.
    pub row_granularity: f64,
    /// Tokens dropped before row grouping (running headers, titles, footers).
    pub skip_tokens: Vec<String>,
    /// Leading digits that mark a record as data.
    pub zip_prefix_len: usize,
    pub header_tokens: TokenOptions,
    pub row_tokens: TokenOptions,
    pub pages: Option<PageSelection>,
    pub delimiter: u8,
}

impl ScanOptions {
    pub(crate) fn validate(&self) -> Result<(), ExtractError> {
        if self.schema.width() == 0 {
            return Err(ExtractError::InvalidOption(
                "schema needs at least one column".to_string(),
            ));
        }
        if self.header_page == 0 {
            return Err(ExtractError::InvalidOption(
                "header_page is 1-based".to_string(),
            ));
        }
        if self.header_tolerance.is_nan() || self.header_tolerance < 0.0 {
            return Err(ExtractError::InvalidOption(format!(
                "header_tolerance must be a non-negative number, got {}",
                self.header_tolerance
            )));
        }
        if !self.row_granularity.is_finite() || self.row_granularity <= 0.0 {
            return Err(ExtractError::InvalidOption(format!(
                "row_granularity must be positive, got {}",
                self.row_granularity
            )));
        }
        for (name, tokens) in [("header", &self.header_tokens), ("row", &self.row_tokens)] {
            let invalid = |value: f64| value.is_nan() || value < 0.0;
            if invalid(tokens.x_tolerance) || invalid(tokens.y_tolerance) {
                return Err(ExtractError::InvalidOption(format!(
                    "{name} token tolerances must be non-negative"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            schema: ColumnSchema::rent_stabilized(),
            header_page: 1,
            header_tolerance: 2.0,
            row_granularity: 1.0,
            skip_tokens: vec!["ZIP".to_string(), "List".to_string(), "Source:".to_string()],
            zip_prefix_len: 5,
            header_tokens: TokenOptions::default(),
            row_tokens: TokenOptions::rows(),
            pages: None,
            delimiter: b',',
        }
    }
}
