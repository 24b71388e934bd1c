// Row selection shared by all the providers.

use log::debug;

pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Drops the header row, the blank rows and the rows without a name.
///
/// The rows are returned in their original order.
pub fn select_respondent_rows(rows: &[Vec<String>], name_col: usize) -> Vec<Vec<String>> {
    let mut res: Vec<Vec<String>> = Vec::new();
    for (idx, row) in rows.iter().enumerate().skip(1) {
        // Line numbers as shown by a spreadsheet.
        let lineno = idx + 1;
        if is_blank_row(row) {
            debug!("select_respondent_rows: line {}: blank row", lineno);
            continue;
        }
        let name = row.get(name_col).map(|s| s.trim()).unwrap_or_default();
        if name.is_empty() {
            debug!("select_respondent_rows: line {}: no name, skipping", lineno);
            continue;
        }
        res.push(row.clone());
    }
    res
}

/// The number of rows that are too short to hold every configured column.
pub fn count_short_rows(rows: &[Vec<String>], min_len: usize) -> usize {
    rows.iter().filter(|r| r.len() < min_len).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(cells: &[&[&str]]) -> Vec<Vec<String>> {
        cells
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn header_blank_and_nameless_rows_are_dropped() {
        let input = rows(&[
            &["Horodateur", "Société", "Q1"],
            &["t1", "ACME", "Oui"],
            &["", " ", ""],
            &[],
            &["t2", "  ", "Oui"],
            &["t3"],
            &["t4", "Beta"],
        ]);
        let res = select_respondent_rows(&input, 1);
        assert_eq!(res, rows(&[&["t1", "ACME", "Oui"], &["t4", "Beta"]]));
    }

    #[test]
    fn header_only() {
        let input = rows(&[&["Horodateur", "Société", "Q1"]]);
        assert!(select_respondent_rows(&input, 1).is_empty());
        assert!(select_respondent_rows(&[], 1).is_empty());
    }

    #[test]
    fn short_rows() {
        let input = rows(&[&["a", "b", "c"], &["a"], &["a", "b"]]);
        assert_eq!(count_short_rows(&input, 3), 2);
        assert_eq!(count_short_rows(&input, 1), 0);
    }
}
