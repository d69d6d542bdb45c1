//! Control wiring as pure state transitions.
//!
//! Each chart state is a plain value. `apply` maps (state, event) to the next
//! state plus an [`Effect`] naming how much of the pipeline has to rerun.
//! Hover highlighting is derived from the state with [`bar_appearance`]
//! instead of being written onto sibling bars.

use crate::aggregate::{Filter, Selection, SummaryEntry, ALL};
use crate::format;
use crate::sort::SortOrder;
use plotters::style::RGBColor;
use serde::Serialize;

pub type Point = (f64, f64);

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Top-N toggle button
    ToggleView,
    SelectReason(Selection),
    SelectNeighborhood(Selection),
    SortBy(SortOrder),
    /// Pointer entered the bar for `category`; `None` means "at the bar center".
    Hover { category: String, pointer: Option<Point> },
    PointerMove(Point),
    Leave,
    /// Dashboard only
    Click(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Recompute summary, sort, scales and scene; replay entrances.
    Redraw,
    /// Same data; only hover-dependent styling changed.
    Restyle,
    MoveTooltip,
    Flash(String),
    Ignored,
}

fn is_visible(visible: &[SummaryEntry], category: &str) -> bool {
    visible.iter().any(|e| e.category == category)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopNState {
    pub show_all: bool,
    pub hover: Option<String>,
}

impl TopNState {
    pub fn apply(&self, event: &Event, visible: &[SummaryEntry]) -> (TopNState, Effect) {
        match event {
            Event::ToggleView => (
                TopNState { show_all: !self.show_all, hover: None },
                Effect::Redraw,
            ),
            Event::Hover { category, .. } if is_visible(visible, category) => (
                TopNState { hover: Some(category.clone()), ..self.clone() },
                Effect::Restyle,
            ),
            Event::PointerMove(_) if self.hover.is_some() => (self.clone(), Effect::MoveTooltip),
            Event::Leave if self.hover.is_some() => (
                TopNState { hover: None, ..self.clone() },
                Effect::Restyle,
            ),
            _ => (self.clone(), Effect::Ignored),
        }
    }

    /// The toggle button names the action it would perform next.
    pub fn toggle_label(&self, limit: usize) -> String {
        if self.show_all {
            format!("Show Top {} Only", limit)
        } else {
            "Show All Reasons".to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardState {
    pub filter: Filter,
    pub sort: SortOrder,
    pub hover: Option<String>,
}

impl DashboardState {
    pub fn apply(&self, event: &Event, visible: &[SummaryEntry]) -> (DashboardState, Effect) {
        match event {
            Event::SelectReason(selection) => (
                DashboardState {
                    filter: Filter { reason: selection.clone(), ..self.filter.clone() },
                    hover: None,
                    ..self.clone()
                },
                Effect::Redraw,
            ),
            Event::SelectNeighborhood(selection) => (
                DashboardState {
                    filter: Filter { neighborhood: selection.clone(), ..self.filter.clone() },
                    hover: None,
                    ..self.clone()
                },
                Effect::Redraw,
            ),
            Event::SortBy(order) => (
                DashboardState { sort: *order, hover: None, ..self.clone() },
                Effect::Redraw,
            ),
            Event::Hover { category, .. } if is_visible(visible, category) => (
                DashboardState { hover: Some(category.clone()), ..self.clone() },
                Effect::Restyle,
            ),
            Event::PointerMove(_) if self.hover.is_some() => (self.clone(), Effect::MoveTooltip),
            Event::Leave if self.hover.is_some() => (
                DashboardState { hover: None, ..self.clone() },
                Effect::Restyle,
            ),
            // A click lands on the bar under the pointer, so it also hovers it.
            Event::Click(category) if is_visible(visible, category) => (
                DashboardState { hover: Some(category.clone()), ..self.clone() },
                Effect::Flash(category.clone()),
            ),
            _ => (self.clone(), Effect::Ignored),
        }
    }

    /// The two sort buttons; exactly one is active.
    pub fn sort_buttons(&self) -> Vec<SortButton> {
        [SortOrder::Natural, SortOrder::Value]
            .into_iter()
            .map(|order| SortButton {
                label: order.label().to_string(),
                order,
                active: order == self.sort,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortButton {
    pub label: String,
    pub order: SortOrder,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverStyle {
    pub highlight: RGBColor,
    pub dim_opacity: f64,
    /// Upward shift of the hovered bar in pixels
    pub lift: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarAppearance {
    pub fill: RGBColor,
    pub opacity: f64,
    pub lift: f64,
}

pub fn bar_appearance(category: &str, hover: Option<&str>, base_fill: RGBColor, style: &HoverStyle) -> BarAppearance {
    match hover {
        None => BarAppearance { fill: base_fill, opacity: 1.0, lift: 0.0 },
        Some(h) if h == category => BarAppearance { fill: style.highlight, opacity: 1.0, lift: style.lift },
        Some(_) => BarAppearance { fill: base_fill, opacity: style.dim_opacity, lift: 0.0 },
    }
}

pub fn top_n_tooltip(entry: &SummaryEntry) -> Vec<String> {
    vec![entry.category.clone(), format!("Calls: {}", format::thousands(entry.value))]
}

pub fn dashboard_tooltip(entry: &SummaryEntry, filter: &Filter, year_label: &str) -> Vec<String> {
    let reason = match &filter.reason {
        Selection::All => "All Types",
        Selection::Only(r) => r.as_str(),
    };
    let area = match &filter.neighborhood {
        Selection::All => "All Neighborhoods",
        Selection::Only(n) => n.as_str(),
    };
    vec![
        format!("{} {}", entry.category, year_label),
        format!("Type: {}", reason),
        format!("Area: {}", area),
        format!("Count: {}", format::thousands(entry.value)),
    ]
}

/// Dropdown contents: the "all" sentinel followed by the data's values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dropdown {
    pub selected: String,
    pub options: Vec<String>,
}

impl Dropdown {
    pub fn new(selection: &Selection, values: &[String]) -> Self {
        let mut options = Vec::with_capacity(values.len() + 1);
        options.push(ALL.to_string());
        options.extend(values.iter().cloned());
        Self { selected: selection.as_value().to_string(), options }
    }
}
