use crate::model::{DrugGroup, SavingsRecord};

/// Share of savings credited to the patient.
pub const PATIENT_SHARE: f64 = 0.2;
/// Share of savings credited to the plan.
pub const PLAN_SHARE: f64 = 0.8;

/// `numerator / denominator * 100`, or 0 when the denominator is 0.
pub fn percent_of(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

/// Derive the savings record for one group.
///
/// Only matched groups get numbers. The first variant on each side is the
/// representative price; later variants are carried for inspection only.
pub fn derive_savings(group: DrugGroup) -> SavingsRecord {
    let has_match = group.is_matched();
    let (teamsters_cost, wellcentra_price) = match (group.teamsters.first(), group.wellcentra.first()) {
        (Some(t), Some(w)) => (t.total_cost, w.lowest_price),
        _ => (0.0, 0.0),
    };
    let total_savings = teamsters_cost - wellcentra_price;
    let savings_percent = percent_of(total_savings, teamsters_cost);

    SavingsRecord {
        drug_name: group.drug_name,
        teamsters: group.teamsters,
        wellcentra: group.wellcentra,
        has_match,
        teamsters_cost,
        wellcentra_price,
        total_savings,
        savings_percent,
        patient_savings: total_savings * PATIENT_SHARE,
        plan_savings: total_savings * PLAN_SHARE,
        patient_savings_percent: savings_percent * PATIENT_SHARE,
        plan_savings_percent: savings_percent * PLAN_SHARE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawRecord, TeamstersRecord, WellcentraRecord};

    fn teamsters(cost: f64) -> TeamstersRecord {
        TeamstersRecord {
            drug_name: "X".into(),
            total_cost: cost,
            generic_name: None,
            ndc: None,
            awp: None,
            fields: RawRecord::new(),
        }
    }

    fn wellcentra(price: f64) -> WellcentraRecord {
        WellcentraRecord {
            drug_name: "X".into(),
            lowest_price: price,
            ndc: None,
            wac_price: None,
            awp: None,
            source_country: None,
            fields: RawRecord::new(),
        }
    }

    fn group(t: &[f64], w: &[f64]) -> DrugGroup {
        DrugGroup {
            drug_name: "X".into(),
            teamsters: t.iter().copied().map(teamsters).collect(),
            wellcentra: w.iter().copied().map(wellcentra).collect(),
        }
    }

    #[test]
    fn matched_group_splits_savings() {
        let r = derive_savings(group(&[100.0], &[60.0]));
        assert!(r.has_match);
        assert_eq!(r.teamsters_cost, 100.0);
        assert_eq!(r.wellcentra_price, 60.0);
        assert_eq!(r.total_savings, 40.0);
        assert_eq!(r.savings_percent, 40.0);
        assert!((r.patient_savings - 8.0).abs() < 1e-9);
        assert!((r.plan_savings - 32.0).abs() < 1e-9);
        assert!((r.patient_savings_percent - 8.0).abs() < 1e-9);
        assert!((r.plan_savings_percent - 32.0).abs() < 1e-9);
    }

    #[test]
    fn negative_savings_is_valid() {
        let r = derive_savings(group(&[50.0], &[80.0]));
        assert!(r.has_match);
        assert_eq!(r.total_savings, -30.0);
        assert_eq!(r.savings_percent, -60.0);
        assert!(r.plan_savings < 0.0);
    }

    #[test]
    fn first_variant_is_representative() {
        let r = derive_savings(group(&[200.0, 10.0], &[150.0, 1.0]));
        assert_eq!(r.teamsters_cost, 200.0);
        assert_eq!(r.wellcentra_price, 150.0);
        assert_eq!(r.teamsters.len(), 2);
        assert_eq!(r.wellcentra.len(), 2);
    }

    #[test]
    fn single_source_defaults_to_zero() {
        let r = derive_savings(group(&[], &[50.0]));
        assert!(!r.has_match);
        assert_eq!(r.teamsters_cost, 0.0);
        assert_eq!(r.wellcentra_price, 0.0);
        assert_eq!(r.total_savings, 0.0);
        assert_eq!(r.savings_percent, 0.0);
        assert!(r.is_wellcentra_only());

        let r = derive_savings(group(&[75.0], &[]));
        assert!(!r.has_match);
        assert_eq!(r.teamsters_cost, 0.0);
        assert!(r.is_teamsters_only());
    }

    #[test]
    fn percent_of_zero_denominator() {
        assert_eq!(percent_of(10.0, 0.0), 0.0);
        assert_eq!(percent_of(0.0, 0.0), 0.0);
        assert_eq!(percent_of(25.0, 50.0), 50.0);
    }
}
