// Primitives for reading CSV files.

use log::debug;
use snafu::prelude::*;

use crate::dashboard::*;

/// Reads all the rows of a CSV export, header included.
///
/// The rows may have different lengths: exports of a questionnaire that changed
/// over time are accepted as they are.
pub fn read_csv_rows(path: &str) -> DashboardResult<Vec<Vec<String>>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let mut res: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        // The index starts at 1 to respect most conventions in the excel world
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let row: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        debug!("read_csv_rows: lineno: {:?} row: {:?}", lineno, &row);
        res.push(row);
    }
    debug!("read_csv_rows: {}: {} rows", path, res.len());
    Ok(res)
}
