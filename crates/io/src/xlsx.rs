// Spreadsheet import (calamine) and the analysis workbook export (rust_xlsxwriter)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde_json::{Number, Value};
use tracing::{debug, warn};

use formulary_recon::model::SOURCE_FIELD;
use formulary_recon::money::{dollars, percent};
use formulary_recon::{RawRecord, ReconResult, ReconSummary, SavingsRecord, TaggedRecord};

use crate::csv::SAVINGS_COLUMNS;
use crate::error::{IoError, Result};
use crate::header::HeaderRow;

pub const ALL_DRUGS_SHEET: &str = "All Drugs";
pub const SAVINGS_SHEET: &str = "Savings Analysis";
pub const SUMMARY_SHEET: &str = "Summary";

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Load records from the first worksheet, or from `sheet` when given.
///
/// Cell values remain as calamine extracted them: numbers stay numbers and
/// dates become their serial number.
pub fn load(path: &Path, sheet: Option<&str>) -> Result<Vec<RawRecord>> {
    let spreadsheet_err = |source| IoError::Spreadsheet { path: path.to_path_buf(), source };

    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(spreadsheet_err)?;
    let sheet_names = workbook.sheet_names();

    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|n| n.as_str() == name)
            .cloned()
            .ok_or_else(|| {
                IoError::shape(
                    path,
                    format!("no sheet named \"{name}\" (sheets: {})", sheet_names.join(", ")),
                )
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| IoError::shape(path, "workbook contains no sheets"))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(spreadsheet_err)?;

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(cells) => HeaderRow::new(cells.iter().map(header_text), path),
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    let mut wide_rows = 0usize;
    for cells in rows {
        let values: Vec<Option<Value>> = cells.iter().map(cell_value).collect();
        if values.iter().all(Option::is_none) {
            continue;
        }
        if values.iter().skip(header.len()).any(Option::is_some) {
            wide_rows += 1;
        }
        records.push(header.record(values));
    }

    if wide_rows > 0 {
        warn!(file = %path.display(), sheet = %sheet_name, rows = wide_rows, "rows wider than the header row, extra cells dropped");
    }
    debug!(file = %path.display(), sheet = %sheet_name, records = records.len(), "loaded worksheet");
    Ok(records)
}

fn header_text(cell: &Data) -> String {
    match cell_value(cell) {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// One cell as a JSON value; `None` for cells that are left out of the record.
fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Float(n) => float_value(*n),
        Data::Int(n) => Some(Value::from(*n)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => float_value(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
    }
}

/// Whole floats become integers so `100.0` reads back as `100`.
fn float_value(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Some(Value::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number)
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write the three-sheet analysis workbook: "All Drugs", "Savings Analysis"
/// (matched groups only) and "Summary".
pub fn export_workbook(result: &ReconResult, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let money = Format::new().set_num_format("0.00");

    write_all_drugs(workbook.add_worksheet(), &result.all_drugs, &header)?;
    let matched: Vec<&SavingsRecord> = result.matched().collect();
    write_savings(workbook.add_worksheet(), &matched, &header, &money)?;
    write_summary(workbook.add_worksheet(), &result.summary, &header)?;

    workbook.save(path)?;
    debug!(
        file = %path.display(),
        all_drugs = result.all_drugs.len(),
        matched = matched.len(),
        "exported workbook"
    );
    Ok(())
}

fn write_header(sheet: &mut Worksheet, columns: &[&str], bold: &Format) -> std::result::Result<(), XlsxError> {
    for (col, name) in columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, bold)?;
        sheet.set_column_width(col as u16, if col == 0 { 36 } else { 16 })?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

/// Write a raw input cell: numbers as numbers, anything else as text.
fn write_raw(sheet: &mut Worksheet, row: u32, col: u16, value: Option<&Value>) -> std::result::Result<(), XlsxError> {
    match value {
        None | Some(Value::Null) => {}
        Some(Value::Number(n)) => {
            if let Some(n) = n.as_f64() {
                sheet.write_number(row, col, n)?;
            }
        }
        Some(Value::String(s)) if s.is_empty() => {}
        Some(Value::String(s)) => {
            sheet.write_string(row, col, s)?;
        }
        Some(other) => {
            sheet.write_string(row, col, other.to_string())?;
        }
    }
    Ok(())
}

fn write_text_or_na(sheet: &mut Worksheet, row: u32, col: u16, value: Option<&str>) -> std::result::Result<(), XlsxError> {
    let text = value.filter(|s| !s.is_empty()).unwrap_or("N/A");
    sheet.write_string(row, col, text)?;
    Ok(())
}

fn write_all_drugs(sheet: &mut Worksheet, records: &[TaggedRecord], bold: &Format) -> Result<()> {
    const COLUMNS: [&str; 8] = [
        "Drug Name",
        "Generic Name",
        "NDC",
        SOURCE_FIELD,
        "Teamsters Cost",
        "Wellcentra Price",
        "AWP",
        "WAC Price",
    ];

    sheet.set_name(ALL_DRUGS_SHEET)?;
    write_header(sheet, &COLUMNS, bold)?;

    for (idx, record) in records.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, record.drug_name())?;
        sheet.write_string(row, 3, record.source().as_str())?;
        write_text_or_na(sheet, row, 2, record.ndc())?;
        if let Some(awp) = record.awp() {
            sheet.write_number(row, 6, awp)?;
        }
        match record {
            TaggedRecord::Teamsters(t) => {
                write_text_or_na(sheet, row, 1, t.generic_name.as_deref())?;
                sheet.write_number(row, 4, t.total_cost)?;
            }
            TaggedRecord::Wellcentra(w) => {
                let generic = w.fields.get("Generic Name").and_then(Value::as_str);
                write_text_or_na(sheet, row, 1, generic)?;
                sheet.write_number(row, 5, w.lowest_price)?;
                match w.wac_price {
                    Some(wac) => {
                        sheet.write_number(row, 7, wac)?;
                    }
                    None => write_raw(sheet, row, 7, w.fields.get("WAC Price"))?,
                }
            }
        }
    }
    Ok(())
}

fn write_savings(sheet: &mut Worksheet, records: &[&SavingsRecord], bold: &Format, money: &Format) -> Result<()> {
    sheet.set_name(SAVINGS_SHEET)?;
    write_header(sheet, &SAVINGS_COLUMNS, bold)?;

    for (idx, r) in records.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, &r.drug_name)?;
        sheet.write_number_with_format(row, 1, r.teamsters_cost, money)?;
        sheet.write_number_with_format(row, 2, r.wellcentra_price, money)?;
        sheet.write_number_with_format(row, 3, r.total_savings, money)?;
        sheet.write_string(row, 4, percent(r.savings_percent))?;
        sheet.write_number_with_format(row, 5, r.patient_savings, money)?;
        sheet.write_number_with_format(row, 6, r.plan_savings, money)?;
    }
    Ok(())
}

/// Metric/value rows of the "Summary" sheet, in display order.
pub fn summary_rows(summary: &ReconSummary) -> Vec<(&'static str, String)> {
    vec![
        ("Total unique drugs", summary.total_drugs.to_string()),
        ("Matched drugs", summary.matched_drugs.to_string()),
        ("Teamsters only drugs", summary.teamsters_only.to_string()),
        ("Wellcentra only drugs", summary.wellcentra_only.to_string()),
        ("Total Teamsters cost", dollars(summary.total_teamsters_cost)),
        ("Total Wellcentra price", dollars(summary.total_wellcentra_price)),
        ("Total potential savings", dollars(summary.total_savings)),
        ("Total patient savings", dollars(summary.total_patient_savings)),
        ("Total plan savings", dollars(summary.total_plan_savings)),
        ("Overall savings percentage", percent(summary.overall_savings_percent)),
    ]
}

fn write_summary(sheet: &mut Worksheet, summary: &ReconSummary, bold: &Format) -> Result<()> {
    sheet.set_name(SUMMARY_SHEET)?;
    write_header(sheet, &["Metric", "Value"], bold)?;

    // Counts stay numeric; money and percent rows are preformatted text
    let counts = [
        summary.total_drugs,
        summary.matched_drugs,
        summary.teamsters_only,
        summary.wellcentra_only,
    ];
    for (idx, (metric, value)) in summary_rows(summary).into_iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, metric)?;
        match counts.get(idx) {
            Some(&count) => {
                sheet.write_number(row, 1, count as f64)?;
            }
            None => {
                sheet.write_string(row, 1, value)?;
            }
        }
    }
    Ok(())
}
