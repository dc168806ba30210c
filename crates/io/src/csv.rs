// CSV/TSV loading and the view export

use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use formulary_recon::money::{fixed2, percent};
use formulary_recon::{RawRecord, SavingsRecord};

use crate::error::{IoError, Result};
use crate::header::HeaderRow;

/// Load a delimited file, sniffing the delimiter.
pub fn load(path: &Path) -> Result<Vec<RawRecord>> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    debug!(file = %path.display(), delimiter = ?(delimiter as char), "sniffed delimiter");
    records_from_str(&content, delimiter, path)
}

/// Load a tab-separated file.
pub fn load_tsv(path: &Path) -> Result<Vec<RawRecord>> {
    let content = read_file_as_utf8(path)?;
    records_from_str(&content, b'\t', path)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).take(10).collect();

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let Some(&target) = counts.first() else {
            return b',';
        };
        if target <= 1 {
            continue;
        }

        // Lines agreeing with the header width, weighted by width
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (Excel exports are often Windows-1252).
pub fn read_file_as_utf8(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::io(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::io(path, e))?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            warn!(file = %path.display(), "not valid UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// Parse delimited text: first row is the header, every other non-empty row
/// becomes a record of string values.
pub fn records_from_str(content: &str, delimiter: u8, path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let csv_err = |source| IoError::Csv { path: path.to_path_buf(), source };

    let mut rows = reader.records();
    let header = match rows.next() {
        Some(row) => {
            let row = row.map_err(csv_err)?;
            HeaderRow::new(row.iter(), path)
        }
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    let mut wide_rows = 0usize;
    for row in rows {
        let row = row.map_err(csv_err)?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if row.len() > header.len() {
            wide_rows += 1;
        }
        let cells = row
            .iter()
            .map(|cell| (!cell.is_empty()).then(|| Value::String(cell.to_string())));
        records.push(header.record(cells));
    }

    if wide_rows > 0 {
        warn!(file = %path.display(), rows = wide_rows, "rows wider than the header row, extra cells dropped");
    }
    debug!(file = %path.display(), records = records.len(), "loaded CSV");
    Ok(records)
}

/// Column headers shared by the view CSV and the "Savings Analysis" sheet.
pub const SAVINGS_COLUMNS: [&str; 7] = [
    "Drug Name",
    "Teamsters Cost",
    "Wellcentra Price",
    "Total Savings",
    "Savings %",
    "Patient Savings",
    "Plan Savings",
];

/// Write savings records (e.g. a filtered, sorted view) as CSV.
pub fn export_view(records: &[&SavingsRecord], path: &Path) -> Result<()> {
    let csv_err = |source| IoError::Csv { path: path.to_path_buf(), source };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;

    writer.write_record(SAVINGS_COLUMNS).map_err(csv_err)?;
    for r in records {
        writer
            .write_record([
                r.drug_name.clone(),
                fixed2(r.teamsters_cost),
                fixed2(r.wellcentra_price),
                fixed2(r.total_savings),
                percent(r.savings_percent),
                fixed2(r.patient_savings),
                fixed2(r.plan_savings),
            ])
            .map_err(csv_err)?;
    }

    writer.flush().map_err(|e| IoError::io(path, e))?;
    Ok(())
}
