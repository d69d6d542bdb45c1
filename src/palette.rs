//! Chart colors: named/hex parsing and two-point gradient interpolation.

use plotters::style::RGBColor;
use tracing::warn;

// Top-N chart
pub const REASON_LOW: RGBColor = RGBColor(0xa2, 0x9b, 0xfe);
pub const REASON_HIGH: RGBColor = RGBColor(0x6c, 0x5c, 0xe7);
pub const REASON_HIGHLIGHT: RGBColor = RGBColor(0xfd, 0x79, 0xa8);
pub const REASON_GRID: RGBColor = RGBColor(0xe0, 0xe0, 0xe0);

// Dashboard chart
pub const MONTH_LOW: RGBColor = RGBColor(0x74, 0xb9, 0xff);
pub const MONTH_HIGH: RGBColor = RGBColor(0x09, 0x84, 0xe3);
pub const MONTH_HIGHLIGHT: RGBColor = RGBColor(0xfd, 0xcb, 0x6e);
pub const MONTH_GRID: RGBColor = RGBColor(0xe9, 0xec, 0xef);

pub const FLASH: RGBColor = RGBColor(255, 255, 255);
pub const TEXT: RGBColor = RGBColor(0x2d, 0x34, 0x36);
pub const AXIS: RGBColor = RGBColor(0x63, 0x6e, 0x72);
pub const TOOLTIP_BG: RGBColor = RGBColor(0x2d, 0x34, 0x36);
pub const ERROR: RGBColor = RGBColor(255, 0, 0);
pub const WHITE: RGBColor = RGBColor(255, 255, 255);

/// Parse a color string into RGBColor, supporting hex (#RRGGBB, #RGB) and named colors
pub fn parse_color(color_str: &str) -> Option<RGBColor> {
    let color_str = color_str.trim();

    if color_str.starts_with('#') {
        return parse_hex_color(color_str);
    }

    match color_str.to_lowercase().as_str() {
        "white" => Some(RGBColor(255, 255, 255)),
        "black" => Some(RGBColor(0, 0, 0)),
        "red" => Some(RGBColor(255, 0, 0)),
        "green" => Some(RGBColor(0, 128, 0)),
        "blue" => Some(RGBColor(0, 0, 255)),
        "yellow" => Some(RGBColor(255, 255, 0)),
        "orange" => Some(RGBColor(255, 165, 0)),
        "purple" => Some(RGBColor(128, 0, 128)),
        "pink" => Some(RGBColor(255, 192, 203)),
        "gray" | "grey" => Some(RGBColor(128, 128, 128)),
        "steelblue" => Some(RGBColor(70, 130, 180)),
        "gold" => Some(RGBColor(255, 215, 0)),
        _ => None,
    }
}

/// Parse hex color (#RRGGBB or #RGB)
fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(RGBColor(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(RGBColor(r, g, b))
        }
        _ => None,
    }
}

/// Resolve an optional user override, falling back (with a warning) when it does not parse.
pub fn color_or(value: Option<&str>, fallback: RGBColor) -> RGBColor {
    match value {
        None => fallback,
        Some(s) => parse_color(s).unwrap_or_else(|| {
            warn!(color = s, "unrecognised color, using default");
            fallback
        }),
    }
}

/// Linear RGB interpolation; `t` is clamped to [0, 1].
pub fn interpolate(from: RGBColor, to: RGBColor, t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(channel(from.0, to.0), channel(from.1, to.1), channel(from.2, to.2))
}
