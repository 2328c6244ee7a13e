use std::fmt;

/// Column names of the rent-stabilized building registry, left to right.
pub const RENT_STABILIZED_COLUMNS: [&str; 14] = [
    "ZIP", "BLDGNO1", "STREET1", "STSUFX1", "BLDGNO2", "STREET2", "STSUFX2", "COUNTY", "CITY",
    "STATUS1", "STATUS2", "STATUS3", "BLOCK", "LOT",
];

/// Registry columns holding numbers. Building numbers stay text: they carry
/// suffixes such as `.5` or letters.
pub const RENT_STABILIZED_NUMERIC: [&str; 3] = ["ZIP", "BLOCK", "LOT"];

/// A unit of extracted text and where it starts on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub x0: f64,
    pub top: f64,
}

impl Token {
    #[must_use]
    pub fn new(text: impl Into<String>, x0: f64, top: f64) -> Self {
        Self {
            text: text.into(),
            x0,
            top,
        }
    }
}

/// Fixed, ordered column names plus the columns coerced to numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    names: Vec<String>,
    numeric: Vec<usize>,
}

impl ColumnSchema {
    /// Builds a schema. Numeric names that are not columns are ignored.
    #[must_use]
    pub fn new<S: AsRef<str>>(names: &[S], numeric: &[S]) -> Self {
        let names = names
            .iter()
            .map(|name| name.as_ref().to_string())
            .collect::<Vec<_>>();
        let numeric = names
            .iter()
            .enumerate()
            .filter(|(_, name)| numeric.iter().any(|wanted| wanted.as_ref() == name.as_str()))
            .map(|(index, _)| index)
            .collect();
        Self { names, numeric }
    }

    #[must_use]
    pub fn rent_stabilized() -> Self {
        Self::new(&RENT_STABILIZED_COLUMNS, &RENT_STABILIZED_NUMERIC)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_header(&self, text: &str) -> bool {
        self.names.iter().any(|name| name == text)
    }

    #[must_use]
    pub fn is_numeric(&self, column: usize) -> bool {
        self.numeric.contains(&column)
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::rent_stabilized()
    }
}

/// Column start positions, strictly increasing, at most one per schema column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Boundaries(Vec<f64>);

impl Boundaries {
    /// Wraps positions that the caller guarantees are sorted and distinct.
    #[must_use]
    pub fn from_sorted(xs: Vec<f64>) -> Self {
        Self(xs)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One assembled row: exactly one cell per schema column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub cells: Vec<String>,
}

impl Record {
    #[must_use]
    pub fn first_cell(&self) -> &str {
        self.cells.first().map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub schema: ColumnSchema,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Number(Option<i64>),
}

impl Value {
    #[must_use]
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(value) => *value,
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Number(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Number(Some(value)) => write!(f, "{value}"),
            Self::Number(None) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedTable {
    pub schema: ColumnSchema,
    pub rows: Vec<Vec<Value>>,
}

impl TypedTable {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell of `row` in the column named `column`, if both exist.
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.schema.names().iter().position(|name| name == column)?;
        self.rows.get(row)?.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnSchema, Value};

    #[test]
    fn rent_stabilized_schema_marks_zip_block_lot_numeric() {
        let schema = ColumnSchema::rent_stabilized();
        assert_eq!(schema.width(), 14);
        assert!(schema.is_numeric(0));
        assert!(!schema.is_numeric(1));
        assert!(schema.is_numeric(12));
        assert!(schema.is_numeric(13));
        assert!(schema.is_header("STSUFX2"));
        assert!(!schema.is_header("List"));
    }

    #[test]
    fn missing_number_displays_as_empty() {
        assert_eq!(Value::Number(None).to_string(), "");
        assert_eq!(Value::Number(Some(10001)).to_string(), "10001");
        assert_eq!(Value::Text("142.5".into()).to_string(), "142.5");
    }
}
