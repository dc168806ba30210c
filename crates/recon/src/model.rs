use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::money::serialize_fixed2;

/// One loosely-typed input row: header name -> cell value.
pub type RawRecord = Map<String, Value>;

/// Field name of the tag added to every retained record.
pub const SOURCE_FIELD: &str = "Source";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Source {
    Teamsters,
    Wellcentra,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teamsters => "Teamsters",
            Self::Wellcentra => "Wellcentra",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A retained Teamsters ledger row. `total_cost` is always positive.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamstersRecord {
    pub drug_name: String,
    pub total_cost: f64,
    pub generic_name: Option<String>,
    pub ndc: Option<String>,
    pub awp: Option<f64>,
    /// The original row, unmodified.
    pub fields: RawRecord,
}

/// A retained Wellcentra price-list row. `lowest_price` is always positive.
#[derive(Debug, Clone, PartialEq)]
pub struct WellcentraRecord {
    pub drug_name: String,
    pub lowest_price: f64,
    pub ndc: Option<String>,
    pub wac_price: Option<f64>,
    pub awp: Option<f64>,
    pub source_country: Option<String>,
    /// The original row, unmodified.
    pub fields: RawRecord,
}

/// A retained row from either source.
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedRecord {
    Teamsters(TeamstersRecord),
    Wellcentra(WellcentraRecord),
}

impl TaggedRecord {
    pub fn source(&self) -> Source {
        match self {
            Self::Teamsters(_) => Source::Teamsters,
            Self::Wellcentra(_) => Source::Wellcentra,
        }
    }

    pub fn drug_name(&self) -> &str {
        match self {
            Self::Teamsters(r) => &r.drug_name,
            Self::Wellcentra(r) => &r.drug_name,
        }
    }

    /// The canonical price: TOTAL COST or Lowest Price.
    pub fn price(&self) -> f64 {
        match self {
            Self::Teamsters(r) => r.total_cost,
            Self::Wellcentra(r) => r.lowest_price,
        }
    }

    pub fn ndc(&self) -> Option<&str> {
        match self {
            Self::Teamsters(r) => r.ndc.as_deref(),
            Self::Wellcentra(r) => r.ndc.as_deref(),
        }
    }

    pub fn awp(&self) -> Option<f64> {
        match self {
            Self::Teamsters(r) => r.awp,
            Self::Wellcentra(r) => r.awp,
        }
    }

    pub fn fields(&self) -> &RawRecord {
        match self {
            Self::Teamsters(r) => &r.fields,
            Self::Wellcentra(r) => &r.fields,
        }
    }
}

/// Emit the original fields plus the `Source` tag. An incoming `Source`
/// column is overwritten in place; otherwise the tag goes last.
fn serialize_tagged<S: Serializer>(
    fields: &RawRecord,
    source: Source,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let has_source = fields.contains_key(SOURCE_FIELD);
    let len = if has_source { fields.len() } else { fields.len() + 1 };
    let mut map = serializer.serialize_map(Some(len))?;
    for (key, value) in fields {
        if key == SOURCE_FIELD {
            map.serialize_entry(key, source.as_str())?;
        } else {
            map.serialize_entry(key, value)?;
        }
    }
    if !has_source {
        map.serialize_entry(SOURCE_FIELD, source.as_str())?;
    }
    map.end()
}

impl Serialize for TeamstersRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_tagged(&self.fields, Source::Teamsters, serializer)
    }
}

impl Serialize for WellcentraRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_tagged(&self.fields, Source::Wellcentra, serializer)
    }
}

impl Serialize for TaggedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Teamsters(r) => r.serialize(serializer),
            Self::Wellcentra(r) => r.serialize(serializer),
        }
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// All variants sharing one exact drug name, split by source.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugGroup {
    pub drug_name: String,
    pub teamsters: Vec<TeamstersRecord>,
    pub wellcentra: Vec<WellcentraRecord>,
}

impl DrugGroup {
    pub fn new(drug_name: impl Into<String>) -> Self {
        Self {
            drug_name: drug_name.into(),
            teamsters: Vec::new(),
            wellcentra: Vec::new(),
        }
    }

    pub fn is_matched(&self) -> bool {
        !self.teamsters.is_empty() && !self.wellcentra.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Savings
// ---------------------------------------------------------------------------

/// Per-drug comparison. Money and percent fields serialize as two-decimal
/// strings; they are `0.0` for single-source groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsRecord {
    pub drug_name: String,
    pub teamsters: Vec<TeamstersRecord>,
    pub wellcentra: Vec<WellcentraRecord>,
    pub has_match: bool,
    #[serde(serialize_with = "serialize_fixed2")]
    pub teamsters_cost: f64,
    #[serde(serialize_with = "serialize_fixed2")]
    pub wellcentra_price: f64,
    #[serde(serialize_with = "serialize_fixed2")]
    pub total_savings: f64,
    #[serde(serialize_with = "serialize_fixed2")]
    pub savings_percent: f64,
    #[serde(serialize_with = "serialize_fixed2")]
    pub patient_savings: f64,
    #[serde(serialize_with = "serialize_fixed2")]
    pub plan_savings: f64,
    #[serde(serialize_with = "serialize_fixed2")]
    pub patient_savings_percent: f64,
    #[serde(serialize_with = "serialize_fixed2")]
    pub plan_savings_percent: f64,
}

impl SavingsRecord {
    pub fn is_teamsters_only(&self) -> bool {
        !self.teamsters.is_empty() && self.wellcentra.is_empty()
    }

    pub fn is_wellcentra_only(&self) -> bool {
        self.teamsters.is_empty() && !self.wellcentra.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

/// Counts over all groups; money sums over matched groups only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconSummary {
    pub total_drugs: usize,
    pub matched_drugs: usize,
    pub teamsters_only: usize,
    pub wellcentra_only: usize,
    pub total_teamsters_cost: f64,
    pub total_wellcentra_price: f64,
    pub total_savings: f64,
    pub total_patient_savings: f64,
    pub total_plan_savings: f64,
    pub overall_savings_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub teamsters_rows: usize,
    pub teamsters_retained: usize,
    pub wellcentra_rows: usize,
    pub wellcentra_retained: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconResult {
    pub meta: ReconMeta,
    /// Filtered, tagged records: Teamsters first, then Wellcentra.
    pub all_drugs: Vec<TaggedRecord>,
    /// One entry per distinct drug name, in first-seen order.
    pub drugs_with_savings: Vec<SavingsRecord>,
    pub summary: ReconSummary,
}

impl ReconResult {
    pub fn matched(&self) -> impl Iterator<Item = &SavingsRecord> {
        self.drugs_with_savings.iter().filter(|r| r.has_match)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn tag_is_appended_after_original_fields() {
        let record = TeamstersRecord {
            drug_name: "ENBREL".into(),
            total_cost: 5890.5,
            generic_name: None,
            ndc: None,
            awp: None,
            fields: fields(json!({"Drug Name": "ENBREL", "TOTAL COST": 5890.5})),
        };
        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text, r#"{"Drug Name":"ENBREL","TOTAL COST":5890.5,"Source":"Teamsters"}"#);
    }

    #[test]
    fn existing_source_column_is_overwritten_in_place() {
        let record = WellcentraRecord {
            drug_name: "BENLYSTA".into(),
            lowest_price: 1116.48,
            ndc: None,
            wac_price: None,
            awp: None,
            source_country: None,
            fields: fields(json!({"Source": "sheet2", "Drug Name": "BENLYSTA"})),
        };
        let text = serde_json::to_string(&TaggedRecord::Wellcentra(record)).unwrap();
        assert_eq!(text, r#"{"Source":"Wellcentra","Drug Name":"BENLYSTA"}"#);
    }

    #[test]
    fn savings_money_serializes_as_fixed_strings() {
        let record = SavingsRecord {
            drug_name: "A".into(),
            teamsters: Vec::new(),
            wellcentra: Vec::new(),
            has_match: false,
            teamsters_cost: 0.0,
            wellcentra_price: 0.0,
            total_savings: 0.0,
            savings_percent: 0.0,
            patient_savings: 0.0,
            plan_savings: 0.0,
            patient_savings_percent: 0.0,
            plan_savings_percent: 0.0,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["drugName"], "A");
        assert_eq!(value["hasMatch"], false);
        assert_eq!(value["teamstersCost"], "0.00");
        assert_eq!(value["planSavingsPercent"], "0.00");
    }
}
