use crate::aggregate::SummaryEntry;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Ordering applied to a summary collection before it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Keep the collection's fixed category order (calendar months).
    #[default]
    Natural,
    /// Descending by value; equal values keep their natural relative order.
    Value,
}

impl SortOrder {
    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Natural => "Sort by Month",
            SortOrder::Value => "Sort by Count",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Natural => write!(f, "month"),
            SortOrder::Value => write!(f, "count"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort order '{0}' (expected month or count)")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" | "natural" => Ok(SortOrder::Natural),
            "count" | "value" => Ok(SortOrder::Value),
            other => Err(UnknownSortOrder(other.to_string())),
        }
    }
}

/// Return a reordered copy of `entries`. `Vec::sort_by` is stable, so ties
/// stay in their incoming order.
pub fn apply(entries: &[SummaryEntry], order: SortOrder) -> Vec<SummaryEntry> {
    let mut sorted = entries.to_vec();
    if order == SortOrder::Value {
        sorted.sort_by(|a, b| b.value.cmp(&a.value));
    }
    sorted
}
