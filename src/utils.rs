//! Assorted helpers shared by the solvers and the input layer.

use crate::error::{Error, Result};

/// Memo key of a two-argument subproblem, `"a,b"`.
#[inline]
pub fn pair_key(a: i64, b: i64) -> String {
    format!("{a},{b}")
}

/// Parse a comma-separated list of integers such as `"1, 2,5"`.
///
/// Empty segments are skipped, so `""` and `"1,,2"` are accepted.
pub fn parse_int_list(field: &'static str, text: &str) -> Result<Vec<i64>> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_int(field, s))
        .collect()
}

pub fn parse_int(field: &'static str, text: &str) -> Result<i64> {
    text.trim().parse::<i64>().map_err(|_| Error::InvalidNumber {
        field,
        value: text.to_string(),
    })
}

/// Parse a non-negative integer, for sizes and capacities.
pub fn parse_count(field: &'static str, text: &str) -> Result<usize> {
    text.trim().parse::<usize>().map_err(|_| Error::InvalidNumber {
        field,
        value: text.to_string(),
    })
}
