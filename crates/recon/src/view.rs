//! Exploration over savings records: tab filter, zero-price filter, name
//! search, numeric-aware sort, pagination.

use std::cmp::{Ordering, Reverse};
use std::str::FromStr;

use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::ReconError;
use crate::model::SavingsRecord;
use crate::money::fixed2;

// ---------------------------------------------------------------------------
// Query parts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    All,
    /// Groups with variants on both sides.
    Matches,
    /// Groups with at least one Teamsters variant (matched ones included).
    Teamsters,
    /// Groups with at least one Wellcentra variant (matched ones included).
    Wellcentra,
}

impl Tab {
    pub fn keeps(&self, record: &SavingsRecord) -> bool {
        match self {
            Self::All => true,
            Self::Matches => record.has_match,
            Self::Teamsters => !record.teamsters.is_empty(),
            Self::Wellcentra => !record.wellcentra.is_empty(),
        }
    }
}

impl FromStr for Tab {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "matches" => Ok(Self::Matches),
            "teamsters" => Ok(Self::Teamsters),
            "wellcentra" => Ok(Self::Wellcentra),
            other => Err(ReconError::InvalidQuery(format!(
                "unknown tab \"{other}\" (expected all, matches, teamsters or wellcentra)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    DrugName,
    TeamstersCost,
    WellcentraPrice,
    TotalSavings,
    SavingsPercent,
    PatientSavings,
    PlanSavings,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        Self::DrugName,
        Self::TeamstersCost,
        Self::WellcentraPrice,
        Self::TotalSavings,
        Self::SavingsPercent,
        Self::PatientSavings,
        Self::PlanSavings,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::DrugName => "drugName",
            Self::TeamstersCost => "teamstersCost",
            Self::WellcentraPrice => "wellcentraPrice",
            Self::TotalSavings => "totalSavings",
            Self::SavingsPercent => "savingsPercent",
            Self::PatientSavings => "patientSavings",
            Self::PlanSavings => "planSavings",
        }
    }

    /// The value as a consumer sees it: the name, or the two-decimal string.
    fn display_value(&self, record: &SavingsRecord) -> String {
        match self {
            Self::DrugName => record.drug_name.clone(),
            Self::TeamstersCost => fixed2(record.teamsters_cost),
            Self::WellcentraPrice => fixed2(record.wellcentra_price),
            Self::TotalSavings => fixed2(record.total_savings),
            Self::SavingsPercent => fixed2(record.savings_percent),
            Self::PatientSavings => fixed2(record.patient_savings),
            Self::PlanSavings => fixed2(record.plan_savings),
        }
    }
}

impl FromStr for SortKey {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| *c != '_' && *c != '-').collect();
        Self::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|k| k.name()).collect();
                ReconError::InvalidQuery(format!(
                    "unknown sort key \"{s}\" (expected one of {})",
                    names.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Sort key for one displayed value.
///
/// Numbers compare numerically, text compares case-insensitively, and a
/// number sorts before any text so the order stays total.
#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    fn of(value: &str) -> Self {
        match value.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::Text(value.to_lowercase()),
        }
    }
}

impl Eq for SortValue {}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    pub tab: Tab,
    pub hide_zero_prices: bool,
    pub search: Option<String>,
    pub sort: Option<(SortKey, SortDirection)>,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            tab: Tab::All,
            hide_zero_prices: false,
            search: None,
            sort: Some((SortKey::DrugName, SortDirection::Asc)),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a filtered, sorted view.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub items: Vec<&'a SavingsRecord>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Drop records whose present side carries a non-positive representative
/// price. Single-source groups always do, so only matches survive.
fn has_nonzero_prices(record: &SavingsRecord) -> bool {
    if !record.teamsters.is_empty() && record.teamsters_cost <= 0.0 {
        return false;
    }
    if !record.wellcentra.is_empty() && record.wellcentra_price <= 0.0 {
        return false;
    }
    true
}

impl ViewQuery {
    /// Filter and sort; the input order is kept for ties.
    pub fn apply<'a>(&self, records: &'a [SavingsRecord]) -> Vec<&'a SavingsRecord> {
        let needle = self
            .search
            .as_deref()
            .map(str::to_lowercase)
            .filter(|s| !s.is_empty());

        let mut rows: Vec<&SavingsRecord> = records
            .iter()
            .filter(|r| self.tab.keeps(r))
            .filter(|r| !self.hide_zero_prices || has_nonzero_prices(r))
            .filter(|r| match &needle {
                Some(needle) => r.drug_name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .collect();

        if let Some((key, direction)) = self.sort {
            match direction {
                SortDirection::Asc => rows.sort_by_cached_key(|r| SortValue::of(&key.display_value(r))),
                SortDirection::Desc => {
                    rows.sort_by_cached_key(|r| Reverse(SortValue::of(&key.display_value(r))))
                }
            }
        }

        rows
    }

    /// Filter, sort and cut out `self.page`. A page past the end is empty.
    pub fn page<'a>(&self, records: &'a [SavingsRecord]) -> Result<Page<'a>, ReconError> {
        if self.page_size == 0 {
            return Err(ReconError::InvalidQuery("page size must be at least 1".into()));
        }
        if self.page == 0 {
            return Err(ReconError::InvalidQuery("pages are numbered from 1".into()));
        }

        let rows = self.apply(records);
        let total_items = rows.len();
        let total_pages = total_items.div_ceil(self.page_size);
        let start = (self.page - 1).saturating_mul(self.page_size);
        let items = rows.into_iter().skip(start).take(self.page_size).collect();

        Ok(Page {
            items,
            page: self.page,
            page_size: self.page_size,
            total_items,
            total_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reconcile;
    use crate::model::RawRecord;
    use serde_json::{json, Value};

    fn rows(value: Value) -> Vec<RawRecord> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn sample() -> Vec<SavingsRecord> {
        reconcile(
            &rows(json!([
                {"Drug Name": "enbrel", "TOTAL COST": 5890.50},
                {"Drug Name": "HUMIRA(CF) PEN", "TOTAL COST": 5950.75},
                {"Drug Name": "BENLYSTA", "TOTAL COST": 4950.25},
                {"Drug Name": "TALTZ", "TOTAL COST": 900},
            ])),
            &rows(json!([
                {"Drug Name": "enbrel", "Lowest Price": 2167.84},
                {"Drug Name": "HUMIRA(CF) PEN", "Lowest Price": 3128.33},
                {"Drug Name": "BENLYSTA", "Lowest Price": 5500},
                {"Drug Name": "ABIRATERONE", "Lowest Price": 144.64},
            ])),
        )
        .drugs_with_savings
    }

    fn names(rows: &[&SavingsRecord]) -> Vec<String> {
        rows.iter().map(|r| r.drug_name.clone()).collect()
    }

    #[test]
    fn tabs() {
        let records = sample();
        let all = ViewQuery { sort: None, ..ViewQuery::default() };
        assert_eq!(all.apply(&records).len(), 5);

        let matches = ViewQuery { tab: Tab::Matches, sort: None, ..ViewQuery::default() };
        assert_eq!(names(&matches.apply(&records)), ["enbrel", "HUMIRA(CF) PEN", "BENLYSTA"]);

        let teamsters = ViewQuery { tab: Tab::Teamsters, sort: None, ..ViewQuery::default() };
        assert_eq!(teamsters.apply(&records).len(), 4);

        let wellcentra = ViewQuery { tab: Tab::Wellcentra, sort: None, ..ViewQuery::default() };
        assert_eq!(
            names(&wellcentra.apply(&records)),
            ["enbrel", "HUMIRA(CF) PEN", "BENLYSTA", "ABIRATERONE"]
        );
    }

    #[test]
    fn hide_zero_prices_leaves_matches() {
        let records = sample();
        let query = ViewQuery { hide_zero_prices: true, sort: None, ..ViewQuery::default() };
        assert_eq!(names(&query.apply(&records)), ["enbrel", "HUMIRA(CF) PEN", "BENLYSTA"]);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let records = sample();
        let query = ViewQuery { search: Some("Humira".into()), ..ViewQuery::default() };
        assert_eq!(names(&query.apply(&records)), ["HUMIRA(CF) PEN"]);

        let blank = ViewQuery { search: Some(String::new()), ..ViewQuery::default() };
        assert_eq!(blank.apply(&records).len(), 5);
    }

    #[test]
    fn default_sort_is_name_ascending_case_insensitive() {
        let records = sample();
        let sorted = ViewQuery::default().apply(&records);
        assert_eq!(
            names(&sorted),
            ["ABIRATERONE", "BENLYSTA", "enbrel", "HUMIRA(CF) PEN", "TALTZ"]
        );
    }

    #[test]
    fn numeric_sort_descending() {
        let records = sample();
        let query = ViewQuery {
            tab: Tab::Matches,
            sort: Some((SortKey::TotalSavings, SortDirection::Desc)),
            ..ViewQuery::default()
        };
        // 3722.66, 2822.42, -549.75
        assert_eq!(names(&query.apply(&records)), ["enbrel", "HUMIRA(CF) PEN", "BENLYSTA"]);
    }

    fn compare_values(a: &str, b: &str) -> Ordering {
        SortValue::of(a).cmp(&SortValue::of(b))
    }

    #[test]
    fn compare_values_numeric_vs_text() {
        assert_eq!(compare_values("9.00", "10.00"), Ordering::Less);
        assert_eq!(compare_values("-30.00", "0.00"), Ordering::Less);
        assert_eq!(compare_values("abc", "ABD"), Ordering::Less);
        assert_eq!(compare_values("abc", "ABC"), Ordering::Equal);
        // Mixed: numbers rank before text.
        assert_eq!(compare_values("10", "9a"), Ordering::Less);
        assert_eq!(compare_values("zz", "5"), Ordering::Greater);
    }

    #[test]
    fn pagination() {
        let records = sample();
        let query = ViewQuery { page_size: 2, page: 1, ..ViewQuery::default() };
        let page = query.page(&records).unwrap();
        assert_eq!(page.total_items, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(names(&page.items), ["ABIRATERONE", "BENLYSTA"]);

        let last = ViewQuery { page: 3, ..query.clone() }.page(&records).unwrap();
        assert_eq!(names(&last.items), ["TALTZ"]);

        let past = ViewQuery { page: 4, ..query.clone() }.page(&records).unwrap();
        assert!(past.items.is_empty());
        assert_eq!(past.total_pages, 3);
    }

    #[test]
    fn invalid_pages_rejected() {
        let records = sample();
        let zero_size = ViewQuery { page_size: 0, ..ViewQuery::default() };
        assert!(matches!(zero_size.page(&records), Err(ReconError::InvalidQuery(_))));
        let zero_page = ViewQuery { page: 0, ..ViewQuery::default() };
        assert!(zero_page.page(&records).is_err());
    }

    #[test]
    fn empty_view_has_zero_pages() {
        let page = ViewQuery::default().page(&[]).unwrap();
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn parse_tab_and_sort_key() {
        assert_eq!("Matches".parse::<Tab>().unwrap(), Tab::Matches);
        assert!("nope".parse::<Tab>().is_err());
        assert_eq!("totalSavings".parse::<SortKey>().unwrap(), SortKey::TotalSavings);
        assert_eq!("total_savings".parse::<SortKey>().unwrap(), SortKey::TotalSavings);
        assert_eq!("drug-name".parse::<SortKey>().unwrap(), SortKey::DrugName);
        let err = "price".parse::<SortKey>().unwrap_err();
        assert!(err.to_string().contains("wellcentraPrice"));
    }
}
