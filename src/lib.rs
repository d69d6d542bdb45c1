// Library exports for complaintchart

pub mod aggregate;
pub mod animate;
pub mod compiler;
pub mod data;
pub mod format;
pub mod graph;
pub mod interaction;
pub mod ir;
pub mod palette;
pub mod parser;
pub mod scale;
pub mod session;
pub mod sort;
pub mod stats;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "svg")]
    #[default]
    Svg,
}

/// Color overrides for the bar gradient and the hover highlight.
/// Values are hex (`#RRGGBB`, `#RGB`) or named colors.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ColorOverrides {
    #[serde(default)]
    pub low: Option<String>,
    #[serde(default)]
    pub high: Option<String>,
    #[serde(default)]
    pub highlight: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartOptions {
    #[serde(default, rename = "type", alias = "format")]
    pub format: OutputFormat,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_year_label")]
    pub year_label: String,
    #[serde(default)]
    pub colors: ColorOverrides,
}

fn default_top_n() -> usize { 10 }
fn default_year_label() -> String { "2025".to_string() }

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Svg,
            top_n: default_top_n(),
            year_label: default_year_label(),
            colors: ColorOverrides::default(),
        }
    }
}

impl ChartOptions {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid chart options JSON")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file '{}'", path.display()))?;
        Self::from_json_str(&text)
    }
}
