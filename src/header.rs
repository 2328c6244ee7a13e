use crate::model::{Boundaries, ColumnSchema, Token};
use crate::warning::{ExtractWarning, WarningCode};

/// Sorts `xs` and merges values within `tolerance` of the last kept value.
/// The smallest value of every cluster is kept.
pub(crate) fn dedup_positions(xs: &[f64], tolerance: f64) -> Vec<f64> {
    let mut sorted = xs.iter().copied().filter(|x| x.is_finite()).collect::<Vec<_>>();
    sorted.sort_by(f64::total_cmp);

    let mut unique: Vec<f64> = Vec::with_capacity(sorted.len());
    for x in sorted {
        if unique.last().is_none_or(|last| (x - last).abs() > tolerance) {
            unique.push(x);
        }
    }
    unique
}

/// Column start positions from the header tokens of one reference page.
///
/// Only tokens whose text equals a schema column name count. Duplicate
/// renderings of a header (within `tolerance`) collapse into one boundary and
/// the result never exceeds the schema width. A garbled header yields fewer
/// boundaries; that is not an error.
#[must_use]
pub fn detect_boundaries(tokens: &[Token], schema: &ColumnSchema, tolerance: f64) -> Boundaries {
    let header_xs = tokens
        .iter()
        .filter(|token| schema.is_header(&token.text))
        .map(|token| token.x0)
        .collect::<Vec<_>>();

    let mut unique = dedup_positions(&header_xs, tolerance);
    unique.truncate(schema.width());
    Boundaries::from_sorted(unique)
}

/// Diagnostic for a boundary list that cannot resolve every column.
pub(crate) fn boundary_warning(
    boundaries: &Boundaries,
    schema: &ColumnSchema,
    header_page: u32,
) -> Option<ExtractWarning> {
    let expected = schema.width();
    let detected = boundaries.len();

    if detected == 0 {
        return Some(
            ExtractWarning::new(
                WarningCode::NoHeaderTokens,
                "no header labels found; every token lands in the first column",
            )
            .with_page(header_page)
            .with_counts(0, expected),
        );
    }

    (detected < expected).then(|| {
        ExtractWarning::new(
            WarningCode::ShortBoundaries,
            format!(
                "detected {detected} of {expected} column boundaries; trailing columns merge into column {detected}"
            ),
        )
        .with_page(header_page)
        .with_counts(detected, expected)
    })
}
