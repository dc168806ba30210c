use crate::model::{ReconSummary, SavingsRecord};
use crate::savings::percent_of;

/// Compute summary statistics from savings records.
///
/// Counts cover every group; money sums cover matched groups only, from the
/// unrounded per-drug values.
pub fn compute_summary(records: &[SavingsRecord]) -> ReconSummary {
    let mut summary = ReconSummary {
        total_drugs: records.len(),
        ..ReconSummary::default()
    };

    for r in records {
        if r.has_match {
            summary.matched_drugs += 1;
            summary.total_teamsters_cost += r.teamsters_cost;
            summary.total_wellcentra_price += r.wellcentra_price;
            summary.total_savings += r.total_savings;
            summary.total_patient_savings += r.patient_savings;
            summary.total_plan_savings += r.plan_savings;
        } else if r.is_teamsters_only() {
            summary.teamsters_only += 1;
        } else if r.is_wellcentra_only() {
            summary.wellcentra_only += 1;
        }
    }

    summary.overall_savings_percent = percent_of(summary.total_savings, summary.total_teamsters_cost);
    summary
}
