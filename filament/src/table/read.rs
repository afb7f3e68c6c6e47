//! Readers for solver-exported table files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::table::TableError;

/// Format of a parameter-sweep export.
///
/// Samples appear in repeating three-row groups: a row of `name=value`
/// parameter assignments, a row of column labels, and a row of data. The
/// swept parameter is read from the first row of each group and the
/// dependent value from a fixed column of the third.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepFormat {
    /// Name of the swept parameter, e.g. `w`.
    pub parameter: String,
    /// Zero-based column of the dependent value within each data row.
    pub value_column: usize,
}

impl Default for SweepFormat {
    fn default() -> Self {
        Self {
            parameter: "w".to_string(),
            value_column: 1,
        }
    }
}

/// Format of a two-column file of `x y` rows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XyFormat {
    /// Number of leading header rows to skip.
    pub skip_rows: usize,
}

/// A table file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableFormat {
    /// Repeating three-row sweep groups.
    Sweep(SweepFormat),
    /// Two-column `x y` rows.
    Xy(XyFormat),
}

/// Reads `(x, y)` sample series from `path` in the given format.
///
/// Rows may be delimited by commas, whitespace, or both. Blank lines are
/// ignored. Malformed rows fail with a [`TableError`] carrying the
/// one-based line number of the offending row.
pub fn read_samples(
    path: impl AsRef<Path>,
    format: &TableFormat,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let data = fs::read_to_string(path)?;
    match format {
        TableFormat::Sweep(format) => parse_sweep(&data, format),
        TableFormat::Xy(format) => parse_xy(&data, format),
    }
}

pub(crate) fn parse_sweep(data: &str, format: &SweepFormat) -> Result<(Vec<f64>, Vec<f64>)> {
    let rows: Vec<(usize, &str)> = data
        .lines()
        .enumerate()
        .map(|(i, row)| (i + 1, row.trim()))
        .filter(|(_, row)| !row.is_empty())
        .collect();
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for group in rows.chunks(3) {
        if group.len() < 3 {
            return Err(TableError::TruncatedGroup { line: group[0].0 }.into());
        }
        let (param_line, params) = group[0];
        let (data_line, data_row) = group[2];
        xs.push(parameter_value(params, &format.parameter, param_line)?);
        ys.push(column_value(data_row, format.value_column, data_line)?);
    }
    Ok((xs, ys))
}

pub(crate) fn parse_xy(data: &str, format: &XyFormat) -> Result<(Vec<f64>, Vec<f64>)> {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (i, row) in data.lines().enumerate().skip(format.skip_rows) {
        let line = i + 1;
        let row = row.trim();
        if row.is_empty() {
            continue;
        }
        let mut tokens = row.split(',').flat_map(str::split_whitespace);
        let x = tokens.next().ok_or(TableError::MissingColumn { line, column: 0 })?;
        let y = tokens.next().ok_or(TableError::MissingColumn { line, column: 1 })?;
        xs.push(parse_number(x, line)?);
        ys.push(parse_number(y, line)?);
    }
    Ok((xs, ys))
}

/// Extracts the value of a standalone `name=value` assignment from a
/// parameter row.
fn parameter_value(row: &str, name: &str, line: usize) -> Result<f64> {
    let mut from = 0;
    while let Some(found) = row[from..].find(name) {
        let at = from + found;
        let end = at + name.len();
        let standalone =
            !row[..at].ends_with(|c: char| c.is_alphanumeric() || c == '_');
        if standalone {
            if let Some(rest) = row[end..].trim_start().strip_prefix('=') {
                let token: String = rest
                    .trim_start()
                    .chars()
                    .take_while(|c| !c.is_whitespace() && *c != ',' && *c != ';')
                    .collect();
                return parse_number(&token, line);
            }
        }
        from = end;
    }
    Err(TableError::MissingParameter {
        line,
        param: name.to_string(),
    }
    .into())
}

fn column_value(row: &str, column: usize, line: usize) -> Result<f64> {
    let token = row
        .split(',')
        .flat_map(str::split_whitespace)
        .nth(column)
        .ok_or(TableError::MissingColumn { line, column })?;
    parse_number(token, line)
}

fn parse_number(token: &str, line: usize) -> Result<f64> {
    Ok(token.parse().map_err(|_| TableError::InvalidNumber {
        line,
        token: token.to_string(),
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    static SWEEP: &str = "\
freq=1.0e9 w=0.2 eps=11.9
freq zline
1.0e9 612.5

freq=1.0e9 w=0.45 eps=11.9
freq zline
1.0e9, 433.125
";

    #[test]
    fn parses_sweep_groups() {
        let format = SweepFormat::default();
        let (w, z) = parse_sweep(SWEEP, &format).unwrap();
        assert_eq!(w, vec![0.2, 0.45]);
        assert_eq!(z, vec![612.5, 433.125]);
    }

    #[test]
    fn missing_parameter_is_loud() {
        let format = SweepFormat {
            parameter: "gap".to_string(),
            value_column: 1,
        };
        let err = parse_sweep(SWEEP, &format).unwrap_err();
        assert!(matches!(
            err,
            Error::Table(TableError::MissingParameter { line: 1, .. })
        ));
    }

    #[test]
    fn parameter_names_do_not_match_substrings() {
        // `w=` must not match the tail of `raw=`.
        let data = "raw=1.0 w=0.3\nlabels\n0.0 5.0\n";
        let (w, _) = parse_sweep(data, &SweepFormat::default()).unwrap();
        assert_eq!(w, vec![0.3]);
    }

    #[test]
    fn truncated_group_reports_line() {
        let data = "w=0.2\nfreq zline\n1.0 10.0\nw=0.3\nfreq zline\n";
        let err = parse_sweep(data, &SweepFormat::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Table(TableError::TruncatedGroup { line: 4 })
        ));
    }

    #[test]
    fn parses_two_column_files() {
        let data = "# width eps_eff\n0.2, 12.1\n0.4 11.8\n\n0.8\t11.5\n";
        let format = XyFormat { skip_rows: 1 };
        let (x, y) = parse_xy(data, &format).unwrap();
        assert_eq!(x, vec![0.2, 0.4, 0.8]);
        assert_eq!(y, vec![12.1, 11.8, 11.5]);
    }

    #[test]
    fn short_row_is_loud() {
        let err = parse_xy("1.0 2.0\n3.0\n", &XyFormat::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Table(TableError::MissingColumn { line: 2, column: 1 })
        ));
    }

    #[test]
    fn bad_number_reports_token() {
        let err = parse_xy("0.1 abc\n", &XyFormat::default()).unwrap_err();
        assert!(matches!(err, Error::Table(TableError::InvalidNumber { .. })));
    }
}
