// Header row handling shared by the CSV and spreadsheet loaders.

use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;
use tracing::warn;

use formulary_recon::RawRecord;

/// Column names from the first row. `None` marks a column that is skipped
/// (blank header, or a repeat of an earlier header).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HeaderRow {
    columns: Vec<Option<String>>,
}

impl HeaderRow {
    pub(crate) fn new<I, S>(cells: I, path: &Path) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let columns = cells
            .into_iter()
            .enumerate()
            .map(|(idx, cell)| {
                let name: String = cell.into();
                if name.trim().is_empty() {
                    warn!(file = %path.display(), column = idx + 1, "blank header cell, column skipped");
                    return None;
                }
                if !seen.insert(name.clone()) {
                    warn!(file = %path.display(), column = idx + 1, header = %name, "duplicate header, first occurrence kept");
                    return None;
                }
                Some(name)
            })
            .collect();
        Self { columns }
    }

    pub(crate) fn len(&self) -> usize {
        self.columns.len()
    }

    /// Build a record from one data row. Cells mapped to `None` are left out;
    /// the record keeps header order.
    pub(crate) fn record<I>(&self, cells: I) -> RawRecord
    where
        I: IntoIterator<Item = Option<Value>>,
    {
        let mut record = RawRecord::new();
        for (name, cell) in self.columns.iter().zip(cells) {
            if let (Some(name), Some(value)) = (name, cell) {
                record.insert(name.clone(), value);
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duplicate_and_blank_headers_are_skipped() {
        let header = HeaderRow::new(["Drug Name", "", "NDC", "Drug Name"], Path::new("t.csv"));
        assert_eq!(header.len(), 4);

        let record = header.record([
            Some(json!("ENBREL")),
            Some(json!("lost")),
            Some(json!("58406-0435-04")),
            Some(json!("ignored")),
        ]);
        assert_eq!(record.len(), 2);
        assert_eq!(record["Drug Name"], "ENBREL");
        assert_eq!(record["NDC"], "58406-0435-04");
    }

    #[test]
    fn missing_cells_are_omitted() {
        let header = HeaderRow::new(["A", "B", "C"], Path::new("t.csv"));
        let record = header.record([Some(json!(1)), None]);
        let keys: Vec<_> = record.keys().cloned().collect();
        assert_eq!(keys, ["A"]);
    }
}
