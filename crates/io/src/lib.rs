// Formulary file I/O: CSV, spreadsheets, JSON in; workbook, JSON, CSV out

pub mod csv;
pub mod error;
mod header;
pub mod json;
pub mod xlsx;

use std::path::Path;

use formulary_recon::{RawRecord, SavingsRecord};

pub use error::{IoError, Result};
pub use json::{to_json_string, write_json};
pub use xlsx::export_workbook;

/// Input formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Tsv,
    Spreadsheet,
    Json,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Spreadsheet),
            "json" => Ok(Self::Json),
            _ => Err(IoError::UnsupportedExtension {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// Load one formulary file as loosely-typed records.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    load_sheet_records(path, None)
}

/// Like [`load_records`], reading the named worksheet of a spreadsheet.
/// `sheet` is ignored for other formats.
pub fn load_sheet_records(path: &Path, sheet: Option<&str>) -> Result<Vec<RawRecord>> {
    match InputFormat::from_path(path)? {
        InputFormat::Csv => csv::load(path),
        InputFormat::Tsv => csv::load_tsv(path),
        InputFormat::Spreadsheet => xlsx::load(path, sheet),
        InputFormat::Json => json::load(path),
    }
}

/// Write a list of savings records (typically a filtered view) as CSV.
pub fn export_view_csv(records: &[&SavingsRecord], path: &Path) -> Result<()> {
    csv::export_view(records, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("a.CSV")).unwrap(), InputFormat::Csv);
        assert_eq!(InputFormat::from_path(Path::new("a.txt")).unwrap(), InputFormat::Csv);
        assert_eq!(InputFormat::from_path(Path::new("a.tsv")).unwrap(), InputFormat::Tsv);
        assert_eq!(InputFormat::from_path(Path::new("a.xls")).unwrap(), InputFormat::Spreadsheet);
        assert_eq!(InputFormat::from_path(Path::new("a.ods")).unwrap(), InputFormat::Spreadsheet);
        assert_eq!(InputFormat::from_path(Path::new("a.json")).unwrap(), InputFormat::Json);

        let err = InputFormat::from_path(Path::new("a.pdf")).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedExtension { ref extension, .. } if extension == "pdf"));
        assert!(InputFormat::from_path(Path::new("noext")).is_err());
    }
}
