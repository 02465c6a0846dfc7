//! Report file output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use commute_core::{Result, TrackerError};
use commute_data::report::ReportRow;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

const SHEET_NAME: &str = "Trips";

/// Output encodings, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Xlsx,
    Csv,
    Json,
}

impl ReportFormat {
    /// `.xlsx` selects a spreadsheet and `.json` JSON; anything else is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => ReportFormat::Xlsx,
            Some(ext) if ext.eq_ignore_ascii_case("json") => ReportFormat::Json,
            _ => ReportFormat::Csv,
        }
    }
}

fn write_error(path: &Path, message: impl ToString) -> TrackerError {
    TrackerError::ReportWrite {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Write `rows` to `path`, one row per qualifying day.
pub fn write_report(path: &Path, rows: &[ReportRow]) -> Result<ReportFormat> {
    let format = ReportFormat::from_path(path);
    match format {
        ReportFormat::Xlsx => write_xlsx(path, rows).map_err(|e| write_error(path, e))?,
        ReportFormat::Csv => write_csv(path, rows)?,
        ReportFormat::Json => write_json(path, rows)?,
    }
    Ok(format)
}

fn write_xlsx(path: &Path, rows: &[ReportRow]) -> std::result::Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let km = Format::new().set_num_format("0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    for (col, title) in (0u16..).zip(ReportRow::COLUMNS) {
        sheet.write_string_with_format(0, col, title, &header)?;
    }

    for (row, r) in (1u32..).zip(rows) {
        sheet.write_string(row, 0, r.date.to_string())?;
        sheet.write_string(row, 1, &r.work_query)?;
        sheet.write_string(row, 2, &r.work_resolved)?;
        sheet.write_number_with_format(row, 3, r.distance_to_work_km, &km)?;
        sheet.write_number_with_format(row, 4, r.distance_from_work_km, &km)?;
        sheet.write_number_with_format(row, 5, r.total_distance_km, &km)?;
        sheet.write_string(row, 6, &r.home_address)?;
        sheet.write_string(row, 7, &r.source_format)?;
    }
    sheet.autofit();

    workbook.save(path)
}

fn write_csv(path: &Path, rows: &[ReportRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| write_error(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| write_error(path, e))?;
    }
    writer.flush().map_err(|e| write_error(path, e))?;
    Ok(())
}

fn write_json(path: &Path, rows: &[ReportRow]) -> Result<()> {
    let file = File::create(path).map_err(|e| write_error(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, rows).map_err(|e| write_error(path, e))?;
    writer.flush().map_err(|e| write_error(path, e))?;
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
