//! Spreadsheet export of scan records

use std::path::Path;

use umya_spreadsheet::Worksheet;

use crate::models::ScanRecord;
use crate::time::format_scan_time;
use crate::{Error, Result};

/// Worksheet holding exported scans
pub const SHEET_NAME: &str = "Scans";

/// Status written for every exported scan
pub const STATUS_PASSED: &str = "Passed";

/// Header and width of each exported column, left to right
pub const COLUMNS: [(&str, f64); 4] = [
    ("Scan target", 20.0),
    ("Barcode", 30.0),
    ("Test status", 20.0),
    ("Scanned at", 20.0),
];

const COLUMN_LETTERS: [&str; 4] = ["A", "B", "C", "D"];

/// Cell values of one exported row
pub fn export_row(record: &ScanRecord) -> [String; 4] {
    [
        record.target_name.clone(),
        record.code.clone(),
        STATUS_PASSED.to_string(),
        format_scan_time(record.timestamp),
    ]
}

/// Write `records` to a new workbook at `path`, replacing any existing file
///
/// Blocking; run it on a blocking thread from async code.
pub fn write_workbook(path: &Path, records: &[ScanRecord]) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_by_name_mut("Sheet1")
        .ok_or_else(|| Error::Export("new workbook has no default sheet".to_string()))?;
    sheet.set_name(SHEET_NAME);
    fill_sheet(sheet, records);

    umya_spreadsheet::writer::xlsx::write(&book, path)
        .map_err(|e| Error::Export(format!("write {} failed: {}", path.display(), e)))
}

fn fill_sheet(sheet: &mut Worksheet, records: &[ScanRecord]) {
    for (col, (header, width)) in COLUMN_LETTERS.iter().zip(COLUMNS.iter()) {
        sheet.get_cell_mut(format!("{}1", col).as_str()).set_value(*header);
        sheet.get_column_dimension_mut(col).set_width(*width);
    }

    for (idx, record) in records.iter().enumerate() {
        let row = idx + 2;
        for (col, value) in COLUMN_LETTERS.iter().zip(export_row(record)) {
            sheet.get_cell_mut(format!("{}{}", col, row).as_str()).set_value(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use tempfile::TempDir;

    fn record(code: &str) -> ScanRecord {
        let ts = Local
            .with_ymd_and_hms(2024, 3, 12, 14, 7, 9)
            .single()
            .unwrap()
            .timestamp_millis();
        ScanRecord::new("Air Valve", "air_valve", code, ts)
    }

    #[test]
    fn test_export_row_layout() {
        let row = export_row(&record("1234567W1234567890"));
        assert_eq!(
            row,
            [
                "Air Valve".to_string(),
                "1234567W1234567890".to_string(),
                "Passed".to_string(),
                "2024/03/12 14:07:09".to_string(),
            ]
        );
    }

    #[test]
    fn test_write_workbook_creates_file_and_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("downloads").join("Air Valve").join("2024-03-12.xlsx");
        write_workbook(&path, &[record("A"), record("B")]).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_written_workbook_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");
        write_workbook(&path, &[record("CODE-1")]).unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
        let sheet = book.get_sheet_by_name(SHEET_NAME).unwrap();
        assert_eq!(sheet.get_value("A1"), "Scan target");
        assert_eq!(sheet.get_value("B2"), "CODE-1");
        assert_eq!(sheet.get_value("C2"), "Passed");
    }
}
