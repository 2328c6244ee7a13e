use std::collections::BTreeMap;

use crate::model::{Boundaries, Record, Token};

/// One token placed in a column, kept until its row is assembled.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlacedToken {
    pub column: usize,
    pub x0: f64,
    pub text: String,
}

/// Tokens of one page keyed by rounded vertical position. Page-local.
pub(crate) type PageRows = BTreeMap<i64, Vec<PlacedToken>>;

/// Halves round to even, so `100.5` and `99.5` both land on line 100.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn line_key(top: f64, granularity: f64) -> i64 {
    (top / granularity).round_ties_even() as i64
}

/// Index of the column whose boundary is the last one at or before `x0`.
///
/// Positions left of the first boundary fall into column 0 and positions
/// past the last boundary into the last column, so every `x0` maps to a
/// valid index.
#[must_use]
pub fn assign_column(x0: f64, boundaries: &Boundaries) -> usize {
    let starts = boundaries.as_slice();
    starts.partition_point(|start| *start <= x0).saturating_sub(1)
}

pub(crate) fn group_rows(
    tokens: &[Token],
    boundaries: &Boundaries,
    skip_tokens: &[String],
    granularity: f64,
) -> PageRows {
    let mut rows = PageRows::new();
    for token in tokens {
        if skip_tokens.iter().any(|skip| skip == &token.text) {
            continue;
        }

        rows.entry(line_key(token.top, granularity))
            .or_default()
            .push(PlacedToken {
                column: assign_column(token.x0, boundaries),
                x0: token.x0,
                text: token.text.clone(),
            });
    }
    rows
}

/// Joins the tokens of one row into `width` cells in left-to-right order.
pub(crate) fn assemble_record(mut items: Vec<PlacedToken>, width: usize) -> Record {
    items.sort_by(|left, right| {
        left.x0
            .total_cmp(&right.x0)
            .then_with(|| left.text.cmp(&right.text))
    });

    let mut cells = vec![String::new(); width];
    let last = width.saturating_sub(1);
    for item in items {
        let Some(cell) = cells.get_mut(item.column.min(last)) else {
            continue;
        };
        *cell = format!("{cell} {}", item.text).trim().to_string();
    }
    Record { cells }
}

/// True when the first cell is non-empty and its leading `prefix_len`
/// characters (or all of them, if shorter) are digits.
pub(crate) fn is_data_row(record: &Record, prefix_len: usize) -> bool {
    let prefix = record
        .first_cell()
        .chars()
        .take(prefix_len)
        .collect::<Vec<_>>();
    !prefix.is_empty() && prefix.iter().all(char::is_ascii_digit)
}

/// Records of one page that pass validation, top to bottom.
pub(crate) fn parse_page(
    tokens: &[Token],
    boundaries: &Boundaries,
    skip_tokens: &[String],
    granularity: f64,
    width: usize,
    prefix_len: usize,
) -> (Vec<Record>, usize) {
    let mut records = Vec::new();
    let mut rejected = 0;
    for items in group_rows(tokens, boundaries, skip_tokens, granularity).into_values() {
        let record = assemble_record(items, width);
        if is_data_row(&record, prefix_len) {
            records.push(record);
        } else {
            rejected += 1;
        }
    }
    (records, rejected)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{
        PlacedToken, assemble_record, assign_column, group_rows, is_data_row, line_key, parse_page,
    };
    use crate::model::{Boundaries, Record, Token};

    fn boundaries() -> Boundaries {
        Boundaries::from_sorted(vec![10.0, 50.0, 100.0, 150.0])
    }

    fn placed(column: usize, x0: f64, text: &str) -> PlacedToken {
        PlacedToken {
            column,
            x0,
            text: text.to_string(),
        }
    }

    fn record(first: &str) -> Record {
        Record {
            cells: vec![first.to_string(), String::new()],
        }
    }

    #[test]
    fn assigns_columns_by_half_open_ranges() {
        let b = boundaries();
        assert_eq!(assign_column(10.0, &b), 0);
        assert_eq!(assign_column(49.9, &b), 0);
        assert_eq!(assign_column(50.0, &b), 1);
        assert_eq!(assign_column(120.0, &b), 2);
        assert_eq!(assign_column(150.0, &b), 3);
        assert_eq!(assign_column(900.0, &b), 3);
        assert_eq!(assign_column(-4.0, &b), 0);
    }

    #[test]
    fn assigns_everything_to_first_column_without_boundaries() {
        assert_eq!(assign_column(300.0, &Boundaries::default()), 0);
        assert_eq!(assign_column(f64::NAN, &boundaries()), 0);
    }

    #[test]
    fn rounds_tops_into_line_keys() {
        assert_eq!(line_key(99.6, 1.0), 100);
        assert_eq!(line_key(100.4, 1.0), 100);
        assert_eq!(line_key(100.6, 1.0), 101);
        assert_eq!(line_key(103.0, 2.0), 52);
    }

    #[test]
    fn rounds_half_tops_to_even_line_keys() {
        assert_eq!(line_key(100.5, 1.0), 100);
        assert_eq!(line_key(101.5, 1.0), 102);
        assert_eq!(line_key(2.5, 1.0), 2);
    }

    #[test]
    fn keeps_half_top_token_on_its_printed_line() {
        let tokens = vec![
            Token::new("10001", 0.0, 100.5),
            Token::new("BAY ST", 60.0, 100.2),
        ];
        let (records, rejected) = parse_page(
            &tokens,
            &Boundaries::from_sorted(vec![0.0, 50.0]),
            &[],
            1.0,
            2,
            5,
        );
        assert_eq!(
            records,
            vec![Record {
                cells: vec!["10001".to_string(), "BAY ST".to_string()],
            }]
        );
        assert_eq!(rejected, 0);
    }

    #[test]
    fn groups_jittered_tokens_and_drops_skip_tokens() {
        let tokens = vec![
            Token::new("10001", 10.0, 100.2),
            Token::new("ZIP", 10.0, 40.0),
            Token::new("BAY ST", 60.0, 99.8),
            Token::new("10002", 10.0, 120.0),
        ];
        let skip = vec!["ZIP".to_string()];
        let rows = group_rows(&tokens, &boundaries(), &skip, 1.0);

        assert_eq!(rows.keys().copied().collect::<Vec<_>>(), vec![100, 120]);
        assert_eq!(rows[&100].len(), 2);
        assert_eq!(rows[&100][1].column, 1);
    }

    #[test]
    fn assembles_cells_in_x_order_regardless_of_arrival() {
        let items = vec![
            placed(1, 70.0, "AVE"),
            placed(0, 10.0, "10001"),
            placed(1, 52.0, "OCEAN"),
            placed(3, 160.0, "12"),
        ];
        let mut reversed = items.clone();
        reversed.reverse();

        let expected = Record {
            cells: vec![
                "10001".to_string(),
                "OCEAN AVE".to_string(),
                String::new(),
                "12".to_string(),
            ],
        };
        assert_eq!(assemble_record(items, 4), expected);
        assert_eq!(assemble_record(reversed, 4), expected);
    }

    #[test]
    fn trims_blank_padding_inside_tokens() {
        let items = vec![placed(0, 10.0, " 10001 "), placed(0, 30.0, "  ")];
        assert_eq!(assemble_record(items, 2).cells[0], "10001");
    }

    #[test]
    fn validates_postal_code_prefix() {
        assert!(is_data_row(&record("10001 extra"), 5));
        assert!(is_data_row(&record("11201"), 5));
        assert!(!is_data_row(&record("Page 3"), 5));
        assert!(!is_data_row(&record(""), 5));
        assert!(is_data_row(&record("1234"), 5));
        assert!(is_data_row(&record("123456"), 5));
        assert!(!is_data_row(&record("1234A"), 5));
        assert!(!is_data_row(&record("A1234"), 5));
    }
}
