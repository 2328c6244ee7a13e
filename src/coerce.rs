use crate::model::{Table, TypedTable, Value};

/// Best-effort integer parse. Decimal and exponent forms are accepted when
/// they denote a whole number (`12.0`, `1e3`); anything else is missing.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn parse_numeric(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if let Ok(value) = cell.parse::<i64>() {
        return Some(value);
    }

    let value = cell.parse::<f64>().ok()?;
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then(|| value as i64)
}

/// Converts the schema's numeric columns; every other cell stays raw text.
#[must_use]
pub fn coerce_table(table: Table) -> TypedTable {
    let Table { schema, records } = table;
    let rows = records
        .into_iter()
        .map(|record| {
            record
                .cells
                .into_iter()
                .enumerate()
                .map(|(index, cell)| {
                    if schema.is_numeric(index) {
                        Value::Number(parse_numeric(&cell))
                    } else {
                        Value::Text(cell)
                    }
                })
                .collect()
        })
        .collect();

    TypedTable { schema, rows }
}

#[cfg(test)]
mod tests {
    use super::{coerce_table, parse_numeric};
    use crate::model::{ColumnSchema, Record, Table, Value};

    #[test]
    fn parses_numbers_and_misses_noise() {
        assert_eq!(parse_numeric("10001"), Some(10001));
        assert_eq!(parse_numeric(" 2045 "), Some(2045));
        assert_eq!(parse_numeric("N/A"), None);
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("10001 extra"), None);
    }

    #[test]
    fn accepts_whole_numbers_in_float_notation() {
        assert_eq!(parse_numeric("12.0"), Some(12));
        assert_eq!(parse_numeric("1e3"), Some(1000));
        assert_eq!(parse_numeric("12.5"), None);
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric("NaN"), None);
    }

    #[test]
    fn leaves_text_columns_untouched() {
        let table = Table {
            schema: ColumnSchema::new(&["ZIP", "BLDGNO1", "LOT"], &["ZIP", "LOT"]),
            records: vec![Record {
                cells: vec!["10001".into(), "142.5".into(), "N/A".into()],
            }],
        };

        let typed = coerce_table(table);
        assert_eq!(
            typed.rows[0],
            vec![
                Value::Number(Some(10001)),
                Value::Text("142.5".into()),
                Value::Number(None),
            ]
        );
        assert_eq!(typed.get(0, "BLDGNO1").and_then(Value::as_text), Some("142.5"));
    }
}
