//! Exploratory comparisons layered on top of a finished reconciliation.
//!
//! Nothing here feeds back into the engine: drug groups stay keyed by exact
//! name. These helpers only report on NDC overlap, loose base-name overlap,
//! and Wellcentra WAC vs AWP spreads.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::model::{ReconResult, SavingsRecord, Source, TaggedRecord};
use crate::savings::percent_of;

/// Placeholder NDC used by price lists that do not carry one.
const NDC_PLACEHOLDER: &str = "N/A";

// ---------------------------------------------------------------------------
// NDC
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NdcMatch {
    pub ndc: String,
    pub teamsters_drug_name: String,
    pub wellcentra_drug_name: String,
}

fn usable_ndc(ndc: Option<&str>) -> Option<&str> {
    ndc.map(str::trim)
        .filter(|n| !n.is_empty() && !n.eq_ignore_ascii_case(NDC_PLACEHOLDER))
}

/// NDCs present in both sources, each reported once, in the order the
/// second side was first seen.
pub fn ndc_matches(records: &[TaggedRecord]) -> Vec<NdcMatch> {
    let mut teamsters: HashMap<&str, &str> = HashMap::new();
    let mut wellcentra: HashMap<&str, &str> = HashMap::new();
    let mut reported: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();

    for record in records {
        let Some(ndc) = usable_ndc(record.ndc()) else {
            continue;
        };
        let side = match record.source() {
            Source::Teamsters => &mut teamsters,
            Source::Wellcentra => &mut wellcentra,
        };
        side.entry(ndc).or_insert(record.drug_name());

        if reported.contains(ndc) {
            continue;
        }
        if let (Some(t), Some(w)) = (teamsters.get(ndc), wellcentra.get(ndc)) {
            out.push(NdcMatch {
                ndc: ndc.to_string(),
                teamsters_drug_name: t.to_string(),
                wellcentra_drug_name: w.to_string(),
            });
            reported.insert(ndc);
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Base names
// ---------------------------------------------------------------------------

/// Leading word of a drug name, cut at the first whitespace, `(` or digit,
/// upper-cased. `"HUMIRA(CF) PEN"` -> `"HUMIRA"`.
pub fn base_name(drug_name: &str) -> String {
    drug_name
        .split(|c: char| c.is_whitespace() || c == '(' || c.is_ascii_digit())
        .next()
        .unwrap_or("")
        .trim()
        .to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseNameMatch {
    pub base_name: String,
    pub teamsters_names: Vec<String>,
    pub wellcentra_names: Vec<String>,
    /// Price of the first Teamsters variant seen under this base name.
    pub teamsters_price: f64,
    /// Price of the first Wellcentra variant seen under this base name.
    pub wellcentra_price: f64,
    pub savings: f64,
    pub savings_percent: f64,
}

#[derive(Default)]
struct BaseNameBucket<'a> {
    teamsters_names: Vec<&'a str>,
    wellcentra_names: Vec<&'a str>,
    teamsters_price: Option<f64>,
    wellcentra_price: Option<f64>,
}

/// Base names seen in both sources, in first-seen order.
pub fn base_name_matches(records: &[TaggedRecord]) -> Vec<BaseNameMatch> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, BaseNameBucket<'_>> = HashMap::new();

    for record in records {
        let base = base_name(record.drug_name());
        if base.is_empty() {
            continue;
        }
        let bucket = buckets.entry(base.clone()).or_insert_with(|| {
            order.push(base);
            BaseNameBucket::default()
        });
        let (names, price) = match record.source() {
            Source::Teamsters => (&mut bucket.teamsters_names, &mut bucket.teamsters_price),
            Source::Wellcentra => (&mut bucket.wellcentra_names, &mut bucket.wellcentra_price),
        };
        if !names.contains(&record.drug_name()) {
            names.push(record.drug_name());
        }
        price.get_or_insert(record.price());
    }

    order
        .into_iter()
        .filter_map(|base| {
            let bucket = buckets.remove(&base)?;
            let teamsters_price = bucket.teamsters_price?;
            let wellcentra_price = bucket.wellcentra_price?;
            let savings = teamsters_price - wellcentra_price;
            Some(BaseNameMatch {
                base_name: base,
                teamsters_names: bucket.teamsters_names.iter().map(|s| s.to_string()).collect(),
                wellcentra_names: bucket.wellcentra_names.iter().map(|s| s.to_string()).collect(),
                teamsters_price,
                wellcentra_price,
                savings,
                savings_percent: percent_of(savings, teamsters_price),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Per-drug comparisons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WacAwpRow {
    pub drug_name: String,
    pub wac_price: f64,
    pub awp: f64,
    /// WAC - AWP.
    pub difference: f64,
    /// Difference as a percent of WAC.
    pub difference_percent: f64,
}

/// WAC vs AWP for matched drugs whose representative Wellcentra variant
/// carries both prices, largest absolute spread first.
pub fn wac_awp_analysis(records: &[SavingsRecord]) -> Vec<WacAwpRow> {
    let mut rows: Vec<WacAwpRow> = records
        .iter()
        .filter(|r| r.has_match)
        .filter_map(|r| {
            let w = r.wellcentra.first()?;
            let wac_price = w.wac_price?;
            let awp = w.awp?;
            let difference = wac_price - awp;
            Some(WacAwpRow {
                drug_name: r.drug_name.clone(),
                wac_price,
                awp,
                difference,
                difference_percent: percent_of(difference, wac_price),
            })
        })
        .collect();
    rows.sort_by(|a, b| b.difference_percent.abs().total_cmp(&a.difference_percent.abs()));
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostComparison {
    pub drug_name: String,
    pub generic_name: Option<String>,
    /// Representative variants share a real NDC.
    pub ndc_match: bool,
    pub teamsters_cost: f64,
    pub wellcentra_price: f64,
    pub savings: f64,
    pub savings_percent: f64,
    pub source_country: Option<String>,
}

pub fn cost_comparisons(records: &[SavingsRecord]) -> Vec<CostComparison> {
    records
        .iter()
        .filter(|r| r.has_match)
        .filter_map(|r| {
            let t = r.teamsters.first()?;
            let w = r.wellcentra.first()?;
            let ndc_match = match (usable_ndc(t.ndc.as_deref()), usable_ndc(w.ndc.as_deref())) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            };
            Some(CostComparison {
                drug_name: r.drug_name.clone(),
                generic_name: t.generic_name.clone(),
                ndc_match,
                teamsters_cost: r.teamsters_cost,
                wellcentra_price: r.wellcentra_price,
                savings: r.total_savings,
                savings_percent: r.savings_percent,
                source_country: w.source_country.clone(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub cost_comparisons: Vec<CostComparison>,
    pub ndc_matches: Vec<NdcMatch>,
    pub base_name_matches: Vec<BaseNameMatch>,
    pub wac_awp: Vec<WacAwpRow>,
    /// Distinct sourcing countries of matched Wellcentra variants, sorted.
    pub source_countries: Vec<String>,
    /// Matched drugs as a percent of all distinct drug names.
    pub coverage_percent: f64,
    /// Unweighted mean of per-drug savings percents over matched drugs.
    pub average_savings_percent: f64,
}

impl AnalyticsReport {
    /// Matched drugs with the largest absolute savings, biggest first.
    pub fn top_savings(&self, n: usize) -> Vec<&CostComparison> {
        let mut rows: Vec<&CostComparison> = self.cost_comparisons.iter().collect();
        rows.sort_by(|a, b| b.savings.total_cmp(&a.savings));
        rows.truncate(n);
        rows
    }

    pub fn average_wac_awp_percent(&self) -> f64 {
        if self.wac_awp.is_empty() {
            return 0.0;
        }
        self.wac_awp.iter().map(|r| r.difference_percent).sum::<f64>() / self.wac_awp.len() as f64
    }
}

pub fn analyze(result: &ReconResult) -> AnalyticsReport {
    let cost_comparisons = cost_comparisons(&result.drugs_with_savings);

    let source_countries: BTreeSet<String> = cost_comparisons
        .iter()
        .filter_map(|c| c.source_country.clone())
        .collect();

    let average_savings_percent = if cost_comparisons.is_empty() {
        0.0
    } else {
        cost_comparisons.iter().map(|c| c.savings_percent).sum::<f64>() / cost_comparisons.len() as f64
    };

    AnalyticsReport {
        ndc_matches: ndc_matches(&result.all_drugs),
        base_name_matches: base_name_matches(&result.all_drugs),
        wac_awp: wac_awp_analysis(&result.drugs_with_savings),
        source_countries: source_countries.into_iter().collect(),
        coverage_percent: percent_of(
            result.summary.matched_drugs as f64,
            result.summary.total_drugs as f64,
        ),
        average_savings_percent,
        cost_comparisons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reconcile;
    use crate::model::RawRecord;
    use serde_json::{json, Value};

    fn rows(value: Value) -> Vec<RawRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> ReconResult {
        reconcile(
            &rows(json!([
                {"Drug Name": "TALTZ AUTOINJECTOR", "Generic Name": "TALTZ 80 MG/ML",
                 "NDC": "00002-7339-11", "TOTAL COST": 6800.25},
                {"Drug Name": "HUMIRA(CF) PEN", "NDC": "00074-2540-02", "TOTAL COST": 5950.75},
                {"Drug Name": "BENLYSTA", "NDC": "49401-088-01", "TOTAL COST": 4950.25},
                {"Drug Name": "Actemra ACTPEN", "NDC": "50242-143-01", "TOTAL COST": 4000},
            ])),
            &rows(json!([
                {"Drug Name": "TALTZ AUTOINJECTOR", "NDC": "00002-7339-11", "WAC Price": 6235.50,
                 "Lowest Price": 2179.32, "Source Column": "GERMANY", "AWP": 7482.60},
                {"Drug Name": "HUMIRA(CF) PEN", "NDC": "00074-2540-02", "WAC Price": 5864.80,
                 "Lowest Price": 3128.33, "Source Column": "CANADA", "AWP": 7037.76},
                {"Drug Name": "BENLYSTA", "NDC": "N/A", "WAC Price": 4842.5,
                 "Lowest Price": 1116.48, "Source Column": "DENMARK"},
                {"Drug Name": "Actemra (tocilizumab)", "NDC": "N/A", "WAC Price": null,
                 "Lowest Price": 544.23, "Source Column": "Australia"},
            ])),
        )
    }

    #[test]
    fn base_name_cuts_at_space_paren_digit() {
        assert_eq!(base_name("HUMIRA(CF) PEN"), "HUMIRA");
        assert_eq!(base_name("Actemra (tocilizumab) 162 x 4"), "ACTEMRA");
        assert_eq!(base_name("ABIRATERONE ACETATE 250 MG TAB"), "ABIRATERONE");
        assert_eq!(base_name("Xarelto2.5"), "XARELTO");
        assert_eq!(base_name("5-FU"), "");
    }

    #[test]
    fn ndc_matches_skip_placeholders() {
        let result = sample();
        let matches = ndc_matches(&result.all_drugs);
        let ndcs: Vec<_> = matches.iter().map(|m| m.ndc.as_str()).collect();
        assert_eq!(ndcs, ["00002-7339-11", "00074-2540-02"]);
        assert_eq!(matches[0].teamsters_drug_name, "TALTZ AUTOINJECTOR");
    }

    #[test]
    fn base_name_matches_cross_exact_names() {
        let result = sample();
        let matches = base_name_matches(&result.all_drugs);
        let actemra = matches.iter().find(|m| m.base_name == "ACTEMRA").unwrap();
        assert_eq!(actemra.teamsters_names, ["Actemra ACTPEN"]);
        assert_eq!(actemra.wellcentra_names, ["Actemra (tocilizumab)"]);
        assert!((actemra.savings - (4000.0 - 544.23)).abs() < 1e-9);
        // The engine itself still treats them as separate drugs.
        assert_eq!(result.summary.matched_drugs, 3);
    }

    #[test]
    fn wac_awp_needs_both_prices() {
        let result = sample();
        let rows = wac_awp_analysis(&result.drugs_with_savings);
        let names: Vec<_> = rows.iter().map(|r| r.drug_name.as_str()).collect();
        // TALTZ: (6235.50 - 7482.60) / 6235.50 = -20.0%; HUMIRA: -20.0%; BENLYSTA has no AWP.
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"TALTZ AUTOINJECTOR"));
        assert!(rows.iter().all(|r| r.difference < 0.0));
    }

    #[test]
    fn report_rollup() {
        let result = sample();
        let report = analyze(&result);
        assert_eq!(report.cost_comparisons.len(), 3);
        assert!(report.cost_comparisons[0].ndc_match);
        assert!(!report.cost_comparisons[2].ndc_match);
        assert_eq!(report.source_countries, ["CANADA", "DENMARK", "GERMANY"]);
        // 3 matched of 5 distinct names.
        assert!((report.coverage_percent - 60.0).abs() < 1e-9);
        let top = report.top_savings(1);
        assert_eq!(top[0].drug_name, "TALTZ AUTOINJECTOR");
    }

    #[test]
    fn empty_report_is_zeroed() {
        let result = reconcile(&[], &[]);
        let report = analyze(&result);
        assert!(report.cost_comparisons.is_empty());
        assert_eq!(report.coverage_percent, 0.0);
        assert_eq!(report.average_savings_percent, 0.0);
        assert_eq!(report.average_wac_awp_percent(), 0.0);
    }
}
