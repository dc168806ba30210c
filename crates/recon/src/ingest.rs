use serde_json::Value;
use tracing::debug;

use crate::config::{PriceFormat, ReconConfig, TeamstersColumns, WellcentraColumns};
use crate::model::{RawRecord, TaggedRecord, TeamstersRecord, WellcentraRecord};

/// Both sources after filtering and tagging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ingested {
    pub teamsters: Vec<TeamstersRecord>,
    pub wellcentra: Vec<WellcentraRecord>,
}

impl Ingested {
    /// Teamsters first, then Wellcentra, each in input order.
    pub fn into_tagged(self) -> Vec<TaggedRecord> {
        self.teamsters
            .into_iter()
            .map(TaggedRecord::Teamsters)
            .chain(self.wellcentra.into_iter().map(TaggedRecord::Wellcentra))
            .collect()
    }
}

/// Filter and tag both sources using the configured columns.
pub fn ingest(teamsters: &[RawRecord], wellcentra: &[RawRecord], config: &ReconConfig) -> Ingested {
    Ingested {
        teamsters: tag_teamsters(teamsters, &config.teamsters),
        wellcentra: tag_wellcentra(wellcentra, &config.wellcentra),
    }
}

/// Keep rows with a drug name and a TOTAL COST > 0. Everything else is
/// dropped without error.
pub fn tag_teamsters(records: &[RawRecord], columns: &TeamstersColumns) -> Vec<TeamstersRecord> {
    let mut kept = Vec::with_capacity(records.len());
    let mut no_price = 0usize;
    let mut no_name = 0usize;

    for row in records {
        let Some(total_cost) = positive_price(row.get(&columns.price), columns.price_format) else {
            no_price += 1;
            continue;
        };
        let Some(drug_name) = drug_name(row.get(&columns.drug_name)) else {
            no_name += 1;
            continue;
        };
        kept.push(TeamstersRecord {
            drug_name,
            total_cost,
            generic_name: text(row.get(&columns.generic_name)),
            ndc: text(row.get(&columns.ndc)),
            awp: positive_price(row.get(&columns.awp), columns.price_format),
            fields: row.clone(),
        });
    }

    debug!(
        source = "Teamsters",
        rows = records.len(),
        kept = kept.len(),
        no_price,
        no_name,
        "filtered records"
    );
    kept
}

/// Keep rows with a drug name and a Lowest Price > 0. Everything else is
/// dropped without error.
pub fn tag_wellcentra(records: &[RawRecord], columns: &WellcentraColumns) -> Vec<WellcentraRecord> {
    let mut kept = Vec::with_capacity(records.len());
    let mut no_price = 0usize;
    let mut no_name = 0usize;

    for row in records {
        let Some(lowest_price) = positive_price(row.get(&columns.price), columns.price_format) else {
            no_price += 1;
            continue;
        };
        let Some(drug_name) = drug_name(row.get(&columns.drug_name)) else {
            no_name += 1;
            continue;
        };
        kept.push(WellcentraRecord {
            drug_name,
            lowest_price,
            ndc: text(row.get(&columns.ndc)),
            wac_price: positive_price(row.get(&columns.wac), columns.price_format),
            awp: positive_price(row.get(&columns.awp), columns.price_format),
            source_country: text(row.get(&columns.source_country)),
            fields: row.clone(),
        });
    }

    debug!(
        source = "Wellcentra",
        rows = records.len(),
        kept = kept.len(),
        no_price,
        no_name,
        "filtered records"
    );
    kept
}

/// Parse a price cell the lenient-float way: numbers pass through, strings
/// yield their leading decimal number (`"12abc"` is 12, `"1,234.50"` is 1)
/// and anything without one (`"$100"`, `"n/a"`) is `None`. Non-finite results
/// are `None` as well.
pub fn parse_price(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Parse a price cell written as currency: a leading `$` and `,` thousands
/// separators are allowed, and the rest of the cell must be a number.
pub fn parse_currency(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            let s = s.strip_prefix('$').unwrap_or(s).trim_start();
            let cleaned: String = s.chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                None
            } else {
                cleaned.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Longest prefix (after leading whitespace) of the form
/// `[sign] digits [. digits] [e [sign] digits]`, with at least one digit
/// in the mantissa.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut at: usize| {
        while at < bytes.len() && bytes[at].is_ascii_digit() {
            at += 1;
        }
        at
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        let frac_digits = frac_end - (end + 1);
        if mantissa_digits + frac_digits > 0 {
            mantissa_digits += frac_digits;
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_start = end + 1 + sign;
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

fn positive_price(value: Option<&Value>, format: PriceFormat) -> Option<f64> {
    let parse = match format {
        PriceFormat::Plain => parse_price,
        PriceFormat::Currency => parse_currency,
    };
    value.and_then(parse).filter(|v| *v > 0.0)
}

/// Grouping key as-is: no trimming or case folding. Empty strings, numeric
/// zero and non-scalar values have no name. Other numbers become their text,
/// so a numeric spreadsheet cell groups with the same name read from CSV.
fn drug_name(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Display text for optional attributes; blank strings count as absent.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
