use tracing::info;

use crate::aggregate::group_by_drug_name;
use crate::config::ReconConfig;
use crate::ingest::ingest;
use crate::model::{RawRecord, ReconMeta, ReconResult, SavingsRecord};
use crate::savings::derive_savings;
use crate::summary::compute_summary;

/// Reconcile with the stock column names.
pub fn reconcile(teamsters: &[RawRecord], wellcentra: &[RawRecord]) -> ReconResult {
    reconcile_with(&ReconConfig::default(), teamsters, wellcentra)
}

/// Filter, group, derive savings and summarize in one pass.
///
/// Pure and deterministic: identical inputs give identical output.
pub fn reconcile_with(
    config: &ReconConfig,
    teamsters: &[RawRecord],
    wellcentra: &[RawRecord],
) -> ReconResult {
    let ingested = ingest(teamsters, wellcentra, config);
    let teamsters_retained = ingested.teamsters.len();
    let wellcentra_retained = ingested.wellcentra.len();

    let all_drugs = ingested.into_tagged();
    let drugs_with_savings: Vec<SavingsRecord> = group_by_drug_name(&all_drugs)
        .into_iter()
        .map(derive_savings)
        .collect();
    let summary = compute_summary(&drugs_with_savings);

    info!(
        total_drugs = summary.total_drugs,
        matched = summary.matched_drugs,
        teamsters_only = summary.teamsters_only,
        wellcentra_only = summary.wellcentra_only,
        "reconciliation complete"
    );

    ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            teamsters_rows: teamsters.len(),
            teamsters_retained,
            wellcentra_rows: wellcentra.len(),
            wellcentra_retained,
        },
        all_drugs,
        drugs_with_savings,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::fixed2;
    use serde_json::{json, Value};

    fn rows(value: Value) -> Vec<RawRecord> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|v| match v {
                    Value::Object(map) => map,
                    _ => panic!("expected object"),
                })
                .collect(),
            _ => panic!("expected array"),
        }
    }

    #[test]
    fn meta_counts_rows_and_retained() {
        let result = reconcile(
            &rows(json!([
                {"Drug Name": "A", "TOTAL COST": 100},
                {"Drug Name": "B", "TOTAL COST": 0},
            ])),
            &rows(json!([{"Drug Name": "A", "Lowest Price": 60}])),
        );
        assert_eq!(result.meta.teamsters_rows, 2);
        assert_eq!(result.meta.teamsters_retained, 1);
        assert_eq!(result.meta.wellcentra_rows, 1);
        assert_eq!(result.meta.wellcentra_retained, 1);
        assert_eq!(result.all_drugs.len(), 2);
    }

    #[test]
    fn output_shape_matches_consumer_contract() {
        let result = reconcile(
            &rows(json!([{"Drug Name": "A", "TOTAL COST": 100}])),
            &rows(json!([{"Drug Name": "A", "Lowest Price": 60}])),
        );
        let value = serde_json::to_value(&result).unwrap();
        assert!(value["allDrugs"].is_array());
        assert_eq!(value["allDrugs"][0]["Source"], "Teamsters");
        assert_eq!(value["allDrugs"][1]["Source"], "Wellcentra");
        let drug = &value["drugsWithSavings"][0];
        assert_eq!(drug["drugName"], "A");
        assert_eq!(drug["hasMatch"], true);
        assert_eq!(drug["totalSavings"], "40.00");
        assert_eq!(drug["teamsters"][0]["TOTAL COST"], 100);
        assert_eq!(value["summary"]["matchedDrugs"], 1);
        assert_eq!(value["summary"]["totalSavings"], 40.0);
    }

    #[test]
    fn config_columns_flow_through() {
        let config = ReconConfig::from_toml(
            "[teamsters]\nprice = \"Cost\"\n[wellcentra]\nprice = \"Best\"\n",
        )
        .unwrap();
        let result = reconcile_with(
            &config,
            &rows(json!([{"Drug Name": "A", "Cost": "10"}])),
            &rows(json!([{"Drug Name": "A", "Best": "4"}])),
        );
        assert_eq!(result.summary.matched_drugs, 1);
        assert_eq!(fixed2(result.drugs_with_savings[0].total_savings), "6.00");
    }

    #[test]
    fn numeric_and_text_names_share_a_group() {
        let result = reconcile(
            &rows(json!([{"Drug Name": 12345, "TOTAL COST": 10}])),
            &rows(json!([{"Drug Name": "12345", "Lowest Price": 4}])),
        );
        assert_eq!(result.summary.total_drugs, 1);
        assert_eq!(result.summary.matched_drugs, 1);
        // The original cell keeps its type
        assert_eq!(result.all_drugs[0].fields()["Drug Name"], 12345);
    }

    #[test]
    fn savings_strings_round_halves_up() {
        let result = reconcile(
            &rows(json!([
                {"Drug Name": "A", "TOTAL COST": 800},
                {"Drug Name": "B", "TOTAL COST": 100.125},
            ])),
            &rows(json!([
                {"Drug Name": "A", "Lowest Price": 703},
                {"Drug Name": "B", "Lowest Price": 100},
            ])),
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["drugsWithSavings"][0]["savingsPercent"], "12.13");
        assert_eq!(value["drugsWithSavings"][1]["totalSavings"], "0.13");
    }
}
