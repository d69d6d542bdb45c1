//! Chart sessions: the state a loaded chart keeps between events.
//!
//! A session owns the immutable records, the current controller state, the
//! target scene and the animation tracks. Time is passed in by the caller;
//! `frame(now)` is the chart as displayed at that instant.

use crate::aggregate::{self, FilterOptions, SummaryEntry};
use crate::animate::{Animator, Counter, Easing, Tween, FLASH_STEP_MS, HOVER_MS, RESIZE_MS, TOOLTIP_OUT_MS};
use crate::compiler::{self, bar_key, ChartStyle};
use crate::data::{self, ComplaintRecord, LoadError, ReasonCount};
use crate::format;
use crate::interaction::{self, DashboardState, Dropdown, Effect, Event, Point, SortButton, TopNState};
use crate::ir::SceneGraph;
use crate::palette;
use crate::sort;
use crate::stats::{Stats, StatsDisplay};
use crate::ChartOptions;
use serde::Serialize;
use tracing::{debug, info};

pub trait Chart {
    fn handle(&mut self, event: &Event, now_ms: f64);
    fn frame(&self, now_ms: f64) -> SceneGraph;
    fn controls(&self, now_ms: f64) -> Controls;
    /// Time at which every running transition has finished.
    fn settled_at(&self) -> f64;
}

/// Snapshot of the interactive controls next to a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "chart", rename_all = "snake_case")]
pub enum Controls {
    TopN {
        toggle_label: String,
        bars: usize,
        show_all: bool,
    },
    Dashboard {
        reason: Dropdown,
        neighborhood: Dropdown,
        sort_buttons: Vec<SortButton>,
        stats: StatsDisplay,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ChartKind {
    /// Horizontal bars of the busiest complaint reasons
    TopN,
    /// Monthly bars with filters, sorting and a stats row
    Dashboard,
}

/// Load the data for `kind` and start a session at time zero.
pub fn load_chart(kind: ChartKind, path: &str, options: &ChartOptions) -> Result<Box<dyn Chart>, LoadError> {
    let chart: Box<dyn Chart> = match kind {
        ChartKind::TopN => Box::new(TopNChart::new(data::load_reason_counts(path)?, options)),
        ChartKind::Dashboard => Box::new(Dashboard::new(data::load_complaints(path)?, options)),
    };
    Ok(chart)
}

/// Pointer of a hover event, or the center of the hovered bar.
fn hover_point(event: &Event, scene: &SceneGraph, category: &str) -> Point {
    if let Event::Hover { pointer: Some(p), .. } = event {
        return *p;
    }
    scene
        .get(&bar_key(category))
        .and_then(|e| e.command.center())
        .unwrap_or((0.0, 0.0))
}

// =============================================================================
// Tooltip
// =============================================================================

#[derive(Debug, Clone)]
struct Tooltip {
    lines: Vec<String>,
    anchor: Point,
    offset: Point,
    visible_opacity: f64,
    opacity: Tween,
}

impl Tooltip {
    fn new(style: &ChartStyle) -> Self {
        Self {
            lines: Vec::new(),
            anchor: (0.0, 0.0),
            offset: style.tooltip_offset,
            visible_opacity: style.tooltip_opacity,
            opacity: Tween::settled(0.0),
        }
    }

    fn show(&mut self, lines: Vec<String>, pointer: Point, now_ms: f64) {
        self.lines = lines;
        self.move_to(pointer);
        self.opacity.retarget(self.visible_opacity, now_ms, HOVER_MS, Easing::CubicInOut);
    }

    fn move_to(&mut self, pointer: Point) {
        self.anchor = (pointer.0 + self.offset.0, pointer.1 + self.offset.1);
    }

    fn hide(&mut self, now_ms: f64) {
        if self.opacity.target() > 0.0 {
            self.opacity.retarget(0.0, now_ms, TOOLTIP_OUT_MS, Easing::CubicInOut);
        }
    }

    fn draw(&self, scene: &mut SceneGraph, now_ms: f64) {
        compiler::tooltip_elements(scene, &self.lines, self.anchor, self.opacity.value_at(now_ms));
    }

    fn end_ms(&self) -> f64 {
        self.opacity.end_ms()
    }
}

// =============================================================================
// Top-N chart
// =============================================================================

pub struct TopNChart {
    ranked: Vec<SummaryEntry>,
    limit: usize,
    style: ChartStyle,
    state: TopNState,
    view: Vec<SummaryEntry>,
    scene: SceneGraph,
    animator: Animator,
    tooltip: Tooltip,
    height: Tween,
}

impl TopNChart {
    pub fn new(records: Vec<ReasonCount>, options: &ChartOptions) -> Self {
        let style = ChartStyle::top_n(&options.colors);
        let ranked = aggregate::rank(&records);
        let state = TopNState::default();
        let view = aggregate::top_n_view(&ranked, state.show_all, options.top_n);
        let scene = compiler::compile_top_n(&view, &style, None);

        let mut animator = Animator::new();
        animator.redraw(&scene, 0.0);
        info!(reasons = ranked.len(), shown = view.len(), "top-n chart ready");

        Self {
            height: Tween::settled(scene.height as f64),
            tooltip: Tooltip::new(&style),
            ranked,
            limit: options.top_n,
            style,
            state,
            view,
            scene,
            animator,
        }
    }

    fn redraw(&mut self, now_ms: f64) {
        self.view = aggregate::top_n_view(&self.ranked, self.state.show_all, self.limit);
        self.scene = compiler::compile_top_n(&self.view, &self.style, None);
        self.animator.redraw(&self.scene, now_ms);
        self.height.retarget(self.scene.height as f64, now_ms, RESIZE_MS, Easing::CubicInOut);
        self.tooltip.hide(now_ms);
        debug!(bars = self.view.len(), height = self.scene.height, "top-n redraw");
    }

    fn restyle(&mut self, event: &Event, now_ms: f64) {
        let next = compiler::compile_top_n(&self.view, &self.style, self.state.hover.as_deref());
        self.animator.restyle(&self.scene, &next, now_ms, HOVER_MS);
        self.scene = next;

        let hovered = self
            .state
            .hover
            .as_deref()
            .and_then(|h| self.view.iter().find(|e| e.category == h));
        match hovered {
            Some(entry) => {
                let pointer = hover_point(event, &self.scene, &entry.category);
                self.tooltip.show(interaction::top_n_tooltip(entry), pointer, now_ms);
            }
            None => self.tooltip.hide(now_ms),
        }
    }
}

impl Chart for TopNChart {
    fn handle(&mut self, event: &Event, now_ms: f64) {
        let (next, effect) = self.state.apply(event, &self.view);
        self.state = next;
        debug!(?event, ?effect, now_ms, "top-n event");

        match effect {
            Effect::Redraw => self.redraw(now_ms),
            Effect::Restyle => self.restyle(event, now_ms),
            Effect::MoveTooltip => {
                if let Event::PointerMove(p) = event {
                    self.tooltip.move_to(*p);
                }
            }
            Effect::Flash(_) | Effect::Ignored => {}
        }
    }

    fn frame(&self, now_ms: f64) -> SceneGraph {
        let mut frame = self.animator.frame(&self.scene, now_ms);
        frame.height = self.height.value_at(now_ms).round() as u32;
        self.tooltip.draw(&mut frame, now_ms);
        frame
    }

    fn controls(&self, _now_ms: f64) -> Controls {
        Controls::TopN {
            toggle_label: self.state.toggle_label(self.limit),
            bars: self.view.len(),
            show_all: self.state.show_all,
        }
    }

    fn settled_at(&self) -> f64 {
        self.animator
            .settled_at()
            .max(self.height.end_ms())
            .max(self.tooltip.end_ms())
    }
}

// =============================================================================
// Monthly dashboard
// =============================================================================

pub struct Dashboard {
    records: Vec<ComplaintRecord>,
    options: FilterOptions,
    year_label: String,
    style: ChartStyle,
    state: DashboardState,
    summary: Vec<SummaryEntry>,
    stats: Stats,
    total: Counter,
    average: Counter,
    scene: SceneGraph,
    animator: Animator,
    tooltip: Tooltip,
}

impl Dashboard {
    pub fn new(records: Vec<ComplaintRecord>, options: &ChartOptions) -> Self {
        let style = ChartStyle::dashboard(&options.colors);
        let mut dashboard = Self {
            options: aggregate::filter_options(&records),
            records,
            year_label: options.year_label.clone(),
            tooltip: Tooltip::new(&style),
            style,
            state: DashboardState::default(),
            summary: Vec::new(),
            stats: Stats::from_summary(&[]),
            total: Counter::new(0),
            average: Counter::new(0),
            scene: SceneGraph::new(0, 0),
            animator: Animator::new(),
        };
        dashboard.redraw(0.0);
        info!(
            records = dashboard.records.len(),
            reasons = dashboard.options.reasons.len(),
            neighborhoods = dashboard.options.neighborhoods.len(),
            "dashboard ready"
        );
        dashboard
    }

    /// Filter, aggregate, sort and rebuild the scene from scratch.
    fn redraw(&mut self, now_ms: f64) {
        let summary = aggregate::monthly_summary(&self.records, &self.state.filter);
        self.summary = sort::apply(&summary, self.state.sort);
        self.stats = Stats::from_summary(&self.summary);
        self.total.set(self.stats.total, now_ms);
        self.average.set(self.stats.average, now_ms);

        self.scene = compiler::compile_dashboard(&self.summary, &self.style, None);
        self.animator.redraw(&self.scene, now_ms);
        self.tooltip.hide(now_ms);
        debug!(
            total = self.stats.total,
            peak = %self.stats.peak,
            sort = %self.state.sort,
            "dashboard redraw"
        );
    }

    fn restyle(&mut self, event: &Event, now_ms: f64) {
        let next = compiler::compile_dashboard(&self.summary, &self.style, self.state.hover.as_deref());
        self.animator.restyle(&self.scene, &next, now_ms, HOVER_MS);
        self.scene = next;

        let hovered = self
            .state
            .hover
            .as_deref()
            .and_then(|h| self.summary.iter().find(|e| e.category == h));
        match hovered {
            Some(entry) => {
                let pointer = hover_point(event, &self.scene, &entry.category);
                let lines = interaction::dashboard_tooltip(entry, &self.state.filter, &self.year_label);
                self.tooltip.show(lines, pointer, now_ms);
            }
            None => self.tooltip.hide(now_ms),
        }
    }

    /// Two quick color steps on the clicked bar: flash white, settle on the highlight.
    fn flash(&mut self, event: &Event, category: &str, now_ms: f64) {
        self.restyle(event, now_ms);
        let key = bar_key(category);
        if let Some(bar) = self.scene.get(&key).map(|e| e.command.clone()) {
            let steps = [
                (bar.with_fill(palette::FLASH), FLASH_STEP_MS),
                (bar.clone(), FLASH_STEP_MS),
            ];
            self.animator.sequence(&key, &bar, &steps, now_ms);
        }
    }

    fn stats_display(&self, now_ms: f64) -> StatsDisplay {
        StatsDisplay {
            total: format::thousands_signed(self.total.displayed(now_ms)),
            average: format::thousands_signed(self.average.displayed(now_ms)),
            peak: self.stats.peak.clone(),
            low: self.stats.low.clone(),
        }
    }
}

impl Chart for Dashboard {
    fn handle(&mut self, event: &Event, now_ms: f64) {
        let (next, effect) = self.state.apply(event, &self.summary);
        self.state = next;
        debug!(?event, ?effect, now_ms, "dashboard event");

        match effect {
            Effect::Redraw => self.redraw(now_ms),
            Effect::Restyle => self.restyle(event, now_ms),
            Effect::MoveTooltip => {
                if let Event::PointerMove(p) = event {
                    self.tooltip.move_to(*p);
                }
            }
            Effect::Flash(category) => self.flash(event, &category, now_ms),
            Effect::Ignored => {}
        }
    }

    fn frame(&self, now_ms: f64) -> SceneGraph {
        let mut frame = self.animator.frame(&self.scene, now_ms);
        compiler::stats_elements(&mut frame, &self.stats_display(now_ms), &self.style);
        self.tooltip.draw(&mut frame, now_ms);
        frame
    }

    fn controls(&self, now_ms: f64) -> Controls {
        Controls::Dashboard {
            reason: Dropdown::new(&self.state.filter.reason, &self.options.reasons),
            neighborhood: Dropdown::new(&self.state.filter.neighborhood, &self.options.neighborhoods),
            sort_buttons: self.state.sort_buttons(),
            stats: self.stats_display(now_ms),
        }
    }

    fn settled_at(&self) -> f64 {
        self.animator
            .settled_at()
            .max(self.tooltip.end_ms())
            .max(self.total.end_ms())
            .max(self.average.end_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Selection;
    use crate::ir::DrawCommand;
    use crate::sort::SortOrder;

    fn make_reasons(n: usize) -> Vec<ReasonCount> {
        (0..n).map(|i| ReasonCount::new(format!("Reason {}", i), (i as u64 + 1) * 100)).collect()
    }

    fn record(reason: &str, neighborhood: &str, month: u8, count: u64) -> ComplaintRecord {
        ComplaintRecord {
            reason: reason.to_string(),
            neighborhood: neighborhood.to_string(),
            month,
            month_name: data::MONTHS[month as usize - 1].to_string(),
            count,
        }
    }

    fn make_records() -> Vec<ComplaintRecord> {
        vec![
            record("Noise", "Back Bay", 1, 10),
            record("Noise", "Roxbury", 3, 30),
            record("Trash", "Back Bay", 3, 5),
            record("Trash", "Unknown", 7, 7),
        ]
    }

    fn bars(scene: &SceneGraph) -> Vec<DrawCommand> {
        scene.with_prefix("bar:").map(|e| e.command.clone()).collect()
    }

    fn stats_of(controls: Controls) -> StatsDisplay {
        match controls {
            Controls::Dashboard { stats, .. } => stats,
            other => panic!("Expected dashboard controls, got {:?}", other),
        }
    }

    #[test]
    fn test_toggle_shows_all_then_top_n() {
        let mut chart = TopNChart::new(make_reasons(15), &ChartOptions::default());
        assert_eq!(chart.controls(0.0), Controls::TopN { toggle_label: "Show All Reasons".into(), bars: 10, show_all: false });

        chart.handle(&Event::ToggleView, 1000.0);
        let controls = chart.controls(1000.0);
        assert_eq!(controls, Controls::TopN { toggle_label: "Show Top 10 Only".into(), bars: 15, show_all: true });

        chart.handle(&Event::ToggleView, 2000.0);
        let settled = chart.frame(chart.settled_at());
        assert_eq!(settled.with_prefix("bar:").count(), 10);
        assert!(settled.get("bar:Reason 14").is_some());
        assert!(settled.get("bar:Reason 4").is_none());
    }

    #[test]
    fn test_fewer_records_than_limit() {
        let chart = TopNChart::new(make_reasons(3), &ChartOptions::default());
        assert_eq!(chart.frame(chart.settled_at()).with_prefix("bar:").count(), 3);
    }

    #[test]
    fn test_settled_frame_matches_target() {
        let chart = TopNChart::new(make_reasons(12), &ChartOptions::default());
        let target = compiler::compile_top_n(&chart.view, &chart.style, None);
        assert_eq!(bars(&chart.frame(chart.settled_at())), bars(&target));

        // Mid-entrance the first bar is still growing
        let early = chart.frame(100.0);
        match &early.get("bar:Reason 11").unwrap().command {
            DrawCommand::Rect { width, .. } => assert!(*width < chart.style.plot_width()),
            _ => panic!("Expected Rect"),
        }
    }

    #[test]
    fn test_canvas_height_animates() {
        let mut chart = TopNChart::new(make_reasons(20), &ChartOptions::default());
        assert_eq!(chart.frame(0.0).height, 490);
        chart.handle(&Event::ToggleView, 1000.0);
        let mid = chart.frame(1250.0).height;
        assert!(mid > 490 && mid < 790);
        assert_eq!(chart.frame(1500.0).height, 790);
    }

    #[test]
    fn test_hover_tooltip_fades() {
        let mut chart = TopNChart::new(make_reasons(5), &ChartOptions::default());
        let hover = Event::Hover { category: "Reason 4".into(), pointer: Some((300.0, 100.0)) };
        chart.handle(&hover, 5000.0);

        let frame = chart.frame(5000.0 + HOVER_MS);
        let tooltip = frame.get("tooltip:box").unwrap();
        assert_eq!(tooltip.command.opacity(), 0.9);
        match &frame.get("tooltip:line:1").unwrap().command {
            DrawCommand::Text { content, .. } => assert_eq!(content, "Calls: 500"),
            _ => panic!("Expected Text"),
        }
        assert_eq!(frame.get("bar:Reason 4").unwrap().command.fill(), Some(palette::REASON_HIGHLIGHT));
        assert_eq!(frame.get("bar:Reason 0").unwrap().command.opacity(), 0.4);

        chart.handle(&Event::Leave, 6000.0);
        let gone = chart.frame(6000.0 + TOOLTIP_OUT_MS);
        assert!(gone.get("tooltip:box").is_none());
        assert_eq!(gone.get("bar:Reason 0").unwrap().command.opacity(), 1.0);
    }

    fn tooltip_origin(scene: &SceneGraph) -> (f64, f64) {
        match &scene.get("tooltip:box").unwrap().command {
            DrawCommand::Rect { x, y, .. } => (*x, *y),
            other => panic!("Expected Rect, got {:?}", other),
        }
    }

    #[test]
    fn test_tooltip_follows_pointer() {
        let mut chart = TopNChart::new(make_reasons(5), &ChartOptions::default());
        let hover = Event::Hover { category: "Reason 2".into(), pointer: Some((300.0, 100.0)) };
        chart.handle(&hover, 5000.0);
        assert_eq!(tooltip_origin(&chart.frame(5300.0)), (310.0, 72.0));

        chart.handle(&Event::PointerMove((320.0, 140.0)), 5300.0);
        assert_eq!(tooltip_origin(&chart.frame(5300.0)), (330.0, 112.0));
        chart.handle(&Event::PointerMove((12.0, 50.0)), 5400.0);
        assert_eq!(tooltip_origin(&chart.frame(5400.0)), (22.0, 22.0));

        let mut dashboard = Dashboard::new(make_records(), &ChartOptions::default());
        let hover = Event::Hover { category: "Mar".into(), pointer: Some((200.0, 150.0)) };
        dashboard.handle(&hover, 5000.0);
        assert_eq!(tooltip_origin(&dashboard.frame(5300.0)), (215.0, 110.0));

        dashboard.handle(&Event::PointerMove((400.0, 200.0)), 5300.0);
        assert_eq!(tooltip_origin(&dashboard.frame(5300.0)), (415.0, 160.0));
    }

    #[test]
    fn test_dashboard_filters_update_summary_and_stats() {
        let mut dashboard = Dashboard::new(make_records(), &ChartOptions::default());
        let stats = stats_of(dashboard.controls(dashboard.settled_at()));
        assert_eq!(stats.total, "52");
        assert_eq!(stats.average, "4");
        assert_eq!(stats.peak, "Mar");

        dashboard.handle(&Event::SelectReason(Selection::parse("Noise")), 2000.0);
        dashboard.handle(&Event::SelectNeighborhood(Selection::parse("Back Bay")), 2000.0);
        let stats = stats_of(dashboard.controls(dashboard.settled_at()));
        assert_eq!(stats.total, "10");
        assert_eq!(stats.peak, "Jan");

        dashboard.handle(&Event::SelectNeighborhood(Selection::parse("Fenway")), 4000.0);
        let stats = stats_of(dashboard.controls(dashboard.settled_at()));
        assert_eq!(stats.total, "0");
        assert_eq!(stats.peak, "Jan");
    }

    #[test]
    fn test_dashboard_counter_mid_animation() {
        let mut dashboard = Dashboard::new(make_records(), &ChartOptions::default());
        dashboard.handle(&Event::SelectReason(Selection::parse("Trash")), 1000.0);
        let mid: i64 = stats_of(dashboard.controls(1250.0)).total.parse().unwrap();
        assert!(mid > 12 && mid < 52);
    }

    #[test]
    fn test_dashboard_dropdowns_exclude_unknown() {
        let dashboard = Dashboard::new(make_records(), &ChartOptions::default());
        match dashboard.controls(0.0) {
            Controls::Dashboard { reason, neighborhood, sort_buttons, .. } => {
                assert_eq!(reason.options, vec!["all", "Noise", "Trash"]);
                assert_eq!(neighborhood.options, vec!["all", "Back Bay", "Roxbury"]);
                assert!(sort_buttons[0].active);
            }
            other => panic!("Expected dashboard controls, got {:?}", other),
        }
    }

    #[test]
    fn test_dashboard_sort_by_count() {
        let mut dashboard = Dashboard::new(make_records(), &ChartOptions::default());
        dashboard.handle(&Event::SortBy(SortOrder::Value), 1000.0);
        let categories: Vec<&str> = dashboard.summary.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(&categories[..4], &["Mar", "Jan", "Jul", "Feb"]);

        let frame = dashboard.frame(dashboard.settled_at());
        let x_of = |key: &str| match &frame.get(key).unwrap().command {
            DrawCommand::Rect { x, .. } => *x,
            _ => panic!("Expected Rect"),
        };
        assert!(x_of("bar:Mar") < x_of("bar:Jan"));
    }

    #[test]
    fn test_click_flashes_then_highlights() {
        let mut dashboard = Dashboard::new(make_records(), &ChartOptions::default());
        dashboard.handle(&Event::Click("Mar".into()), 5000.0);

        let fill_at = |now: f64| dashboard.frame(now).get("bar:Mar").and_then(|e| e.command.fill());
        assert_eq!(fill_at(5000.0 + FLASH_STEP_MS), Some(palette::FLASH));
        assert_eq!(fill_at(dashboard.settled_at()), Some(palette::MONTH_HIGHLIGHT));
    }

    #[test]
    fn test_all_zero_dashboard_is_finite() {
        let records = vec![record("Noise", "Back Bay", 1, 0)];
        let dashboard = Dashboard::new(records, &ChartOptions::default());
        for now in [0.0, 300.0, dashboard.settled_at()] {
            for element in dashboard.frame(now).with_prefix("bar:") {
                if let DrawCommand::Rect { x, y, width, height, .. } = element.command {
                    assert!([x, y, width, height].iter().all(|v| v.is_finite()));
                }
            }
        }
    }
}
