// Reading Excel exports of the questionnaires.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use chrono::{Duration, NaiveDate};
use log::debug;
use snafu::prelude::*;

use crate::dashboard::*;

/// Reads all the rows of a worksheet, header included. The cells are returned as text.
pub fn read_xlsx_rows(path: &str, worksheet: Option<&str>) -> DashboardResult<Vec<Vec<String>>> {
    let wrange = get_range(path, worksheet)?;
    let res: Vec<Vec<String>> = wrange
        .rows()
        .map(|row| row.iter().map(cell_to_text).collect())
        .collect();
    debug!("read_xlsx_rows: {}: {} rows", path, res.len());
    Ok(res)
}

fn get_range(path: &str, worksheet_name_o: Option<&str>) -> DashboardResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                worksheet_name,
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu { path }.fail(),
            [(worksheet_name, wrange)] => {
                debug!("get_range: path: {:?} worksheet: {:?}", &path, &worksheet_name);
                Ok(wrange.clone())
            }
            _ => AmbiguousWorksheetSnafu { path }.fail(),
        }
    }
}

/// The text of a cell, as it would appear in a CSV export.
///
/// Whole numbers lose their decimal part and dates are written as `YYYY-MM-DD HH:MM:SS`.
pub fn cell_to_text(cell: &DataType) -> String {
    match cell {
        DataType::Empty => String::new(),
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::DateTime(f) => excel_date_to_text(*f).unwrap_or_else(|| f.to_string()),
        // Error cells carry no answer.
        _ => String::new(),
    }
}

fn excel_date_to_text(serial: f64) -> Option<String> {
    let origin = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let dt = origin.checked_add_signed(Duration::milliseconds(millis))?;
    Some(dt.format("%Y-%m-%d %H:%M:%S").to_string())
}
