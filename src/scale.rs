use crate::aggregate::SummaryEntry;
use crate::palette;
use plotters::style::RGBColor;

/// Continuous value → pixel mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    /// A collapsed or non-finite domain is widened to a width of 1 so that
    /// mapping never divides by zero.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let (lo, hi) = domain;
        let lo = if lo.is_finite() { lo } else { 0.0 };
        let hi = if hi.is_finite() && hi != lo { hi } else { lo + 1.0 };
        Self { domain: (lo, hi), range }
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = (value - d0) / (d1 - d0);
        r0 + (r1 - r0) * t
    }

    /// Evenly spaced "nice" tick values (1, 2 or 5 × 10^k apart) covering the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (start, stop) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        if count == 0 || start == stop {
            return vec![start];
        }

        let step = (stop - start) / count as f64;
        let power = step.log10().floor();
        let error = step / 10f64.powf(power);
        let factor = if error >= 50f64.sqrt() {
            10.0
        } else if error >= 10f64.sqrt() {
            5.0
        } else if error >= 2f64.sqrt() {
            2.0
        } else {
            1.0
        };

        // Negative powers divide by an integer inverse to keep values like 0.3 exact.
        if power >= 0.0 {
            let inc = factor * 10f64.powf(power);
            let first = (start / inc).ceil() as i64;
            let last = (stop / inc).floor() as i64;
            (first..=last).map(|i| i as f64 * inc).collect()
        } else {
            let inv = 10f64.powf(-power) / factor;
            let first = (start * inv).ceil() as i64;
            let last = (stop * inv).floor() as i64;
            (first..=last).map(|i| i as f64 / inv).collect()
        }
    }
}

/// Category → pixel band mapping with equal inner and outer padding.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    pub categories: Vec<String>,
    pub range: (f64, f64),
    pub padding: f64,
    step: f64,
    bandwidth: f64,
    starts: Vec<f64>,
}

impl BandScale {
    /// A range given high-to-low places the first category at the high end.
    pub fn new(categories: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        let n = categories.len() as f64;
        let reverse = range.1 < range.0;
        let (start, stop) = if reverse { (range.1, range.0) } else { range };

        let step = (stop - start) / (n - padding + padding * 2.0).max(1.0);
        let offset = start + (stop - start - step * (n - padding)) * 0.5;
        let bandwidth = step * (1.0 - padding);

        let mut starts: Vec<f64> = (0..categories.len())
            .map(|i| offset + step * i as f64)
            .collect();
        if reverse {
            starts.reverse();
        }

        Self { categories, range, padding, step, bandwidth, starts }
    }

    pub fn position(&self, category: &str) -> Option<f64> {
        self.categories
            .iter()
            .position(|c| c == category)
            .map(|i| self.starts[i])
    }

    pub fn center(&self, category: &str) -> Option<f64> {
        self.position(category).map(|p| p + self.bandwidth / 2.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

/// Two-point interpolated color gradient over a value domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub scale: LinearScale,
    pub low: RGBColor,
    pub high: RGBColor,
}

impl ColorScale {
    pub fn new(domain: (f64, f64), low: RGBColor, high: RGBColor) -> Self {
        Self { scale: LinearScale::new(domain, (0.0, 1.0)), low, high }
    }

    pub fn color(&self, value: f64) -> RGBColor {
        palette::interpolate(self.low, self.high, self.scale.map(value))
    }
}

/// Largest and smallest values of a summary collection, `(0, 0)` when empty.
pub fn value_extent(entries: &[SummaryEntry]) -> (f64, f64) {
    let max = entries.iter().map(|e| e.value).max().unwrap_or(0);
    let min = entries.iter().map(|e| e.value).min().unwrap_or(0);
    (min as f64, max as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_linear_map() {
        let scale = LinearScale::new((0.0, 100.0), (0.0, 500.0));
        assert_eq!(scale.map(0.0), 0.0);
        assert_eq!(scale.map(50.0), 250.0);
        assert_eq!(scale.map(100.0), 500.0);

        let inverted = LinearScale::new((0.0, 10.0), (350.0, 0.0));
        assert_eq!(inverted.map(0.0), 350.0);
        assert_eq!(inverted.map(10.0), 0.0);
    }

    #[test]
    fn test_zero_width_domain() {
        let scale = LinearScale::new((0.0, 0.0), (0.0, 540.0));
        assert_eq!(scale.domain, (0.0, 1.0));
        let x = scale.map(0.0);
        assert!(x.is_finite() && x >= 0.0);

        let nan = LinearScale::new((0.0, f64::NAN), (0.0, 10.0));
        assert!(nan.map(0.0).is_finite());
    }

    #[test]
    fn test_ticks() {
        assert_eq!(
            LinearScale::new((0.0, 200.0), (0.0, 1.0)).ticks(6),
            vec![0.0, 50.0, 100.0, 150.0, 200.0]
        );
        assert_eq!(
            LinearScale::new((0.0, 13.8), (0.0, 1.0)).ticks(6),
            vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0]
        );
        assert_eq!(
            LinearScale::new((0.0, 1.15), (0.0, 1.0)).ticks(6),
            vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]
        );
    }

    #[test]
    fn test_band_layout() {
        let band = BandScale::new(cats(&["a", "b"]), (0.0, 100.0), 0.2);
        // step = 100 / (2 - 0.2 + 0.4) = 45.4545...
        let step = 100.0 / 2.2;
        assert!((band.step() - step).abs() < 1e-9);
        assert!((band.bandwidth() - step * 0.8).abs() < 1e-9);
        assert!((band.position("a").unwrap() - step * 0.2).abs() < 1e-9);
        assert!(band.position("b").unwrap() > band.position("a").unwrap());
        assert!(band.position("zzz").is_none());
    }

    #[test]
    fn test_band_reversed_range() {
        let band = BandScale::new(cats(&["small", "large"]), (400.0, 0.0), 0.25);
        // First category sits at the bottom (high pixel value)
        assert!(band.position("small").unwrap() > band.position("large").unwrap());
        assert!(band.position("large").unwrap() >= 0.0);
        assert!(band.position("small").unwrap() + band.bandwidth() <= 400.0 + 1e-9);
    }

    #[test]
    fn test_band_single_and_empty() {
        let single = BandScale::new(cats(&["only"]), (0.0, 100.0), 0.2);
        assert!(single.bandwidth() > 0.0);
        let empty = BandScale::new(vec![], (0.0, 100.0), 0.2);
        assert!(empty.position("x").is_none());
    }

    #[test]
    fn test_color_scale() {
        let scale = ColorScale::new((0.0, 10.0), RGBColor(0, 0, 0), RGBColor(100, 100, 100));
        assert_eq!(scale.color(0.0), RGBColor(0, 0, 0));
        assert_eq!(scale.color(10.0), RGBColor(100, 100, 100));
        assert_eq!(scale.color(5.0), RGBColor(50, 50, 50));

        let flat = ColorScale::new((7.0, 7.0), RGBColor(0, 0, 0), RGBColor(100, 100, 100));
        assert_eq!(flat.color(7.0), RGBColor(0, 0, 0));
    }

    #[test]
    fn test_value_extent() {
        let entries = vec![SummaryEntry::new("a", 3), SummaryEntry::new("b", 9)];
        assert_eq!(value_extent(&entries), (3.0, 9.0));
        assert_eq!(value_extent(&[]), (0.0, 0.0));
    }
}
