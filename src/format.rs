use num_format::{Locale, ToFormattedString};

/// Thousands-separated count, e.g. `12,345`.
pub fn thousands(n: u64) -> String {
    n.to_formatted_string(&Locale::en)
}

/// Signed variant used by animated counters.
pub fn thousands_signed(n: i64) -> String {
    n.to_formatted_string(&Locale::en)
}

/// Numeric axis tick label. Values of 1000 and above collapse to whole
/// thousands with a `K` suffix (truncated, so 2500 reads `2K`).
pub fn tick_label(value: f64) -> String {
    if value >= 1000.0 {
        format!("{}K", (value / 1000.0).trunc() as i64)
    } else {
        format!("{}", value)
    }
}
