use crate::data::{ComplaintRecord, ReasonCount, MONTHS};
use crate::sort::{self, SortOrder};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Sentinel used by the dropdowns for "no filter".
pub const ALL: &str = "all";

/// Neighborhood placeholder that counts toward "all" but is never offered as a filter.
pub const UNKNOWN_NEIGHBORHOOD: &str = "Unknown";

/// One aggregated (category, value) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub category: String,
    pub value: u64,
}

impl SummaryEntry {
    pub fn new(category: impl Into<String>, value: u64) -> Self {
        Self { category: category.into(), value }
    }
}

/// A dropdown selection: either the "all" sentinel or one concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value == ALL {
            Selection::All
        } else {
            Selection::Only(value.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(v) => v == value,
        }
    }

    /// The dropdown value this selection corresponds to.
    pub fn as_value(&self) -> &str {
        match self {
            Selection::All => ALL,
            Selection::Only(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filter {
    pub reason: Selection,
    pub neighborhood: Selection,
}

impl Filter {
    pub fn matches(&self, record: &ComplaintRecord) -> bool {
        self.reason.matches(&record.reason) && self.neighborhood.matches(&record.neighborhood)
    }
}

/// Sum counts per month for the records passing `filter`. Always returns
/// the twelve months in calendar order; months without records hold 0.
pub fn monthly_summary(records: &[ComplaintRecord], filter: &Filter) -> Vec<SummaryEntry> {
    let mut totals: HashMap<&str, u64> = HashMap::new();
    for record in records.iter().filter(|r| filter.matches(r)) {
        *totals.entry(record.month_name.as_str()).or_default() += record.count;
    }

    MONTHS
        .iter()
        .map(|month| SummaryEntry::new(*month, totals.get(month).copied().unwrap_or(0)))
        .collect()
}

/// One entry per record, ordered by descending count (stable on ties).
pub fn rank(records: &[ReasonCount]) -> Vec<SummaryEntry> {
    let entries: Vec<SummaryEntry> = records
        .iter()
        .map(|r| SummaryEntry::new(r.reason.clone(), r.count))
        .collect();
    sort::apply(&entries, SortOrder::Value)
}

/// The slice of a ranked collection shown by the top-N chart, reversed so the
/// largest value is last (drawn at the top of the categorical axis).
pub fn top_n_view(ranked: &[SummaryEntry], show_all: bool, limit: usize) -> Vec<SummaryEntry> {
    let shown = if show_all { ranked.len() } else { limit.min(ranked.len()) };
    ranked[..shown].iter().rev().cloned().collect()
}

/// Distinct dropdown values found in the data, alphabetically ordered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterOptions {
    pub reasons: Vec<String>,
    pub neighborhoods: Vec<String>,
}

pub fn filter_options(records: &[ComplaintRecord]) -> FilterOptions {
    let reasons: BTreeSet<&str> = records
        .iter()
        .map(|r| r.reason.as_str())
        .filter(|r| !r.is_empty())
        .collect();
    let neighborhoods: BTreeSet<&str> = records
        .iter()
        .map(|r| r.neighborhood.as_str())
        .filter(|n| !n.is_empty() && *n != UNKNOWN_NEIGHBORHOOD)
        .collect();

    FilterOptions {
        reasons: reasons.into_iter().map(String::from).collect(),
        neighborhoods: neighborhoods.into_iter().map(String::from).collect(),
    }
}
