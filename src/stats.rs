use crate::aggregate::SummaryEntry;
use serde::Serialize;

/// Months the average is taken over, regardless of how many hold data.
pub const MONTHS_IN_YEAR: f64 = 12.0;

/// Headline numbers for the dashboard, derived only from the current summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: u64,
    pub average: u64,
    pub peak: String,
    pub low: String,
}

impl Stats {
    /// Peak and low are the first entries (in summary order) attaining the
    /// maximum and minimum; `"-"` when the summary is empty.
    pub fn from_summary(summary: &[SummaryEntry]) -> Self {
        let total: u64 = summary.iter().map(|e| e.value).sum();
        let average = (total as f64 / MONTHS_IN_YEAR).round() as u64;

        let max = summary.iter().map(|e| e.value).max();
        let min = summary.iter().map(|e| e.value).min();
        let first_with = |target: Option<u64>| {
            summary
                .iter()
                .find(|e| Some(e.value) == target)
                .map(|e| e.category.clone())
                .unwrap_or_else(|| "-".to_string())
        };

        Self {
            total,
            average,
            peak: first_with(max),
            low: first_with(min),
        }
    }
}

/// Stats panel text as displayed at one instant (counters may be mid-animation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsDisplay {
    pub total: String,
    pub average: String,
    pub peak: String,
    pub low: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MONTHS;

    fn make_summary(values: &[u64]) -> Vec<SummaryEntry> {
        MONTHS.iter().zip(values).map(|(m, v)| SummaryEntry::new(*m, *v)).collect()
    }

    #[test]
    fn test_single_month() {
        let stats = Stats::from_summary(&make_summary(&[12, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]));
        assert_eq!(stats.total, 12);
        assert_eq!(stats.average, 1);
        assert_eq!(stats.peak, "Jan");
        assert_eq!(stats.low, "Feb");
    }

    #[test]
    fn test_average_rounds() {
        // 18 / 12 = 1.5 rounds up
        let stats = Stats::from_summary(&make_summary(&[18, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]));
        assert_eq!(stats.average, 2);
        // 17 / 12 = 1.41 rounds down
        let stats = Stats::from_summary(&make_summary(&[17, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]));
        assert_eq!(stats.average, 1);
    }

    #[test]
    fn test_peak_follows_summary_order() {
        let mut summary = make_summary(&[5, 9, 1, 9, 1, 3, 3, 3, 3, 3, 3, 3]);
        assert_eq!(Stats::from_summary(&summary).peak, "Feb");
        assert_eq!(Stats::from_summary(&summary).low, "Mar");

        summary.swap(1, 3);
        assert_eq!(Stats::from_summary(&summary).peak, "Apr");
    }

    #[test]
    fn test_all_zero_and_empty() {
        let stats = Stats::from_summary(&make_summary(&[0; 12]));
        assert_eq!(stats.total, 0);
        assert_eq!(stats.peak, "Jan");
        assert_eq!(stats.low, "Jan");

        let empty = Stats::from_summary(&[]);
        assert_eq!(empty.peak, "-");
        assert_eq!(empty.low, "-");
    }
}
