use crate::aggregate::SummaryEntry;
use crate::animate::{ENTRANCE_MS, LABEL_DELAY_MS};
use crate::format;
use crate::interaction::{bar_appearance, HoverStyle};
use crate::ir::{Baseline, DrawCommand, Entrance, SceneGraph, TextAnchor};
use crate::palette;
use crate::scale::{value_extent, BandScale, ColorScale, LinearScale};
use crate::stats::StatsDisplay;
use crate::ColorOverrides;
use plotters::style::RGBColor;

pub const TICK_COUNT: usize = 6;
pub const CORNER_RADIUS: f64 = 4.0;
const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;
const AXIS_FONT: f64 = 11.0;
const LABEL_FONT: f64 = 12.0;
const TITLE_FONT: f64 = 13.0;
const GRID_DASH: (f64, f64) = (3.0, 3.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Layout and colors for one chart kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub width: f64,
    /// Total canvas height for fixed-height charts
    pub height: f64,
    pub margin: Margin,
    pub band_padding: f64,
    pub low: RGBColor,
    pub high: RGBColor,
    pub grid: RGBColor,
    pub hover: HoverStyle,
    pub stagger_ms: f64,
    pub tooltip_offset: (f64, f64),
    pub tooltip_opacity: f64,
    /// Top-N only: pixels per bar row and the plot-height floor
    pub row_height: f64,
    pub min_plot_height: f64,
}

impl ChartStyle {
    pub fn top_n(colors: &ColorOverrides) -> Self {
        Self {
            width: 900.0,
            height: 500.0,
            margin: Margin { top: 30.0, right: 100.0, bottom: 60.0, left: 260.0 },
            band_padding: 0.25,
            low: palette::color_or(colors.low.as_deref(), palette::REASON_LOW),
            high: palette::color_or(colors.high.as_deref(), palette::REASON_HIGH),
            grid: palette::REASON_GRID,
            hover: HoverStyle {
                highlight: palette::color_or(
                    colors.highlight.as_deref(),
                    palette::REASON_HIGHLIGHT,
                ),
                dim_opacity: 0.4,
                lift: 0.0,
            },
            stagger_ms: 30.0,
            tooltip_offset: (10.0, -28.0),
            tooltip_opacity: 0.9,
            row_height: 35.0,
            min_plot_height: 400.0,
        }
    }

    pub fn dashboard(colors: &ColorOverrides) -> Self {
        Self {
            width: 860.0,
            height: 450.0,
            margin: Margin { top: 40.0, right: 30.0, bottom: 60.0, left: 70.0 },
            band_padding: 0.2,
            low: palette::color_or(colors.low.as_deref(), palette::MONTH_LOW),
            high: palette::color_or(colors.high.as_deref(), palette::MONTH_HIGH),
            grid: palette::MONTH_GRID,
            hover: HoverStyle {
                highlight: palette::color_or(colors.highlight.as_deref(), palette::MONTH_HIGHLIGHT),
                dim_opacity: 0.4,
                lift: 5.0,
            },
            stagger_ms: 40.0,
            tooltip_offset: (15.0, -40.0),
            tooltip_opacity: 0.95,
            row_height: 0.0,
            min_plot_height: 0.0,
        }
    }

    pub fn plot_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    /// Plot height for a top-N view: constant row density above a floor.
    pub fn rows_plot_height(&self, rows: usize) -> f64 {
        (rows as f64 * self.row_height).max(self.min_plot_height)
    }
}

pub fn bar_key(category: &str) -> String {
    format!("bar:{}", category)
}

fn label_key(category: &str) -> String {
    format!("label:{}", category)
}

/// Dashed grid lines and the numeric axis (ticks + labels) of a linear scale.
/// `horizontal` selects a numeric x axis (top-N) versus a numeric y axis (dashboard).
fn numeric_axis(
    scene: &mut SceneGraph,
    scale: &LinearScale,
    origin: (f64, f64),
    plot: (f64, f64),
    grid: RGBColor,
    horizontal: bool,
) {
    let (ox, oy) = origin;
    let (w, h) = plot;
    let ticks = scale.ticks(TICK_COUNT);

    for (i, tick) in ticks.iter().enumerate() {
        let p = scale.map(*tick);
        let (from, to) = if horizontal {
            ((ox + p, oy), (ox + p, oy + h))
        } else {
            ((ox, oy + p), (ox + w, oy + p))
        };
        scene.push(
            format!("grid:{}", i),
            DrawCommand::Line { from, to, color: grid, width: 1.0, dash: Some(GRID_DASH) },
        );
    }

    let axis = if horizontal {
        DrawCommand::line((ox, oy + h), (ox + w, oy + h), palette::AXIS)
    } else {
        DrawCommand::line((ox, oy), (ox, oy + h), palette::AXIS)
    };
    scene.push(if horizontal { "axis:x" } else { "axis:y" }, axis);

    for (i, tick) in ticks.iter().enumerate() {
        let p = scale.map(*tick);
        let label = format::tick_label(*tick);
        if horizontal {
            let x = ox + p;
            scene.push(
                format!("tick:x:{}", i),
                DrawCommand::line((x, oy + h), (x, oy + h + TICK_SIZE), palette::AXIS),
            );
            scene.push(
                format!("tick-label:x:{}", i),
                DrawCommand::text(
                    (x, oy + h + TICK_SIZE + TICK_PADDING),
                    label,
                    AXIS_FONT,
                    palette::TEXT,
                    TextAnchor::Middle,
                    Baseline::Top,
                ),
            );
        } else {
            let y = oy + p;
            scene.push(
                format!("tick:y:{}", i),
                DrawCommand::line((ox - TICK_SIZE, y), (ox, y), palette::AXIS),
            );
            scene.push(
                format!("tick-label:y:{}", i),
                DrawCommand::text(
                    (ox - TICK_SIZE - TICK_PADDING, y),
                    label,
                    AXIS_FONT,
                    palette::TEXT,
                    TextAnchor::End,
                    Baseline::Middle,
                ),
            );
        }
    }
}

/// Horizontal bar chart of a top-N view. `view` is already in drawing order
/// (smallest first), so the largest bar ends up at the top.
pub fn compile_top_n(view: &[SummaryEntry], style: &ChartStyle, hover: Option<&str>) -> SceneGraph {
    let m = style.margin;
    let w = style.plot_width();
    let h = style.rows_plot_height(view.len());
    let origin = (m.left, m.top);
    let (min, max) = value_extent(view);

    let x = LinearScale::new((0.0, max), (0.0, w));
    let categories = view.iter().map(|e| e.category.clone()).collect();
    let y = BandScale::new(categories, (h, 0.0), style.band_padding);
    let color = ColorScale::new((min, max), style.low, style.high);

    let mut scene = SceneGraph::new(style.width as u32, (h + m.top + m.bottom).round() as u32);

    numeric_axis(&mut scene, &x, origin, (w, h), style.grid, true);
    scene.push(
        "title:x",
        DrawCommand::text(
            (m.left + w / 2.0, m.top + h + 45.0),
            "Number of Calls",
            TITLE_FONT,
            palette::TEXT,
            TextAnchor::Middle,
            Baseline::Middle,
        ),
    );

    // Categorical y axis
    scene.push("axis:y", DrawCommand::line((m.left, m.top), (m.left, m.top + h), palette::AXIS));
    for entry in view {
        if let Some(cy) = y.center(&entry.category) {
            let cy = m.top + cy;
            scene.push(
                format!("tick:y:{}", entry.category),
                DrawCommand::line((m.left - TICK_SIZE, cy), (m.left, cy), palette::AXIS),
            );
            scene.push(
                format!("tick-label:y:{}", entry.category),
                DrawCommand::text(
                    (m.left - TICK_SIZE - TICK_PADDING, cy),
                    entry.category.clone(),
                    AXIS_FONT,
                    palette::TEXT,
                    TextAnchor::End,
                    Baseline::Middle,
                ),
            );
        }
    }

    for (i, entry) in view.iter().enumerate() {
        let Some(top) = y.position(&entry.category) else { continue };
        let value = entry.value as f64;
        let base_fill = color.color(value);
        let look = bar_appearance(&entry.category, hover, base_fill, &style.hover);
        let delay = i as f64 * style.stagger_ms;

        let bar = DrawCommand::Rect {
            x: m.left,
            y: m.top + top - look.lift,
            width: x.map(value),
            height: y.bandwidth(),
            radius: CORNER_RADIUS,
            fill: look.fill,
            opacity: look.opacity,
        };
        let collapsed = DrawCommand::Rect {
            x: m.left,
            y: m.top + top,
            width: 0.0,
            height: y.bandwidth(),
            radius: CORNER_RADIUS,
            fill: base_fill,
            opacity: 1.0,
        };
        let entrance = Entrance { from: collapsed, delay_ms: delay, duration_ms: ENTRANCE_MS };
        scene.push_animated(bar_key(&entry.category), bar, entrance);

        let label = DrawCommand::text(
            (m.left + x.map(value) + 5.0, m.top + top + y.bandwidth() / 2.0),
            format::thousands(entry.value),
            LABEL_FONT,
            palette::TEXT,
            TextAnchor::Start,
            Baseline::Middle,
        );
        scene.push_animated(
            label_key(&entry.category),
            label.clone(),
            Entrance {
                from: label.with_opacity(0.0),
                delay_ms: delay + LABEL_DELAY_MS,
                duration_ms: ENTRANCE_MS,
            },
        );
    }

    scene
}

/// Vertical bar chart over the (sorted) twelve-month summary.
pub fn compile_dashboard(
    summary: &[SummaryEntry],
    style: &ChartStyle,
    hover: Option<&str>,
) -> SceneGraph {
    let m = style.margin;
    let w = style.plot_width();
    let h = style.height - m.top - m.bottom;
    let origin = (m.left, m.top);

    let (_, max) = value_extent(summary);
    let max = if max > 0.0 { max } else { 1.0 };

    let categories = summary.iter().map(|e| e.category.clone()).collect();
    let x = BandScale::new(categories, (0.0, w), style.band_padding);
    let y = LinearScale::new((0.0, max * 1.15), (h, 0.0));
    let color = ColorScale::new((0.0, max), style.low, style.high);

    let mut scene = SceneGraph::new(style.width as u32, style.height as u32);

    numeric_axis(&mut scene, &y, origin, (w, h), style.grid, false);

    // Categorical x axis
    scene.push(
        "axis:x",
        DrawCommand::line((m.left, m.top + h), (m.left + w, m.top + h), palette::AXIS),
    );
    for entry in summary {
        if let Some(cx) = x.center(&entry.category) {
            let cx = m.left + cx;
            scene.push(
                format!("tick:x:{}", entry.category),
                DrawCommand::line((cx, m.top + h), (cx, m.top + h + TICK_SIZE), palette::AXIS),
            );
            let mut label = DrawCommand::text(
                (cx, m.top + h + TICK_SIZE + TICK_PADDING),
                entry.category.clone(),
                AXIS_FONT,
                palette::TEXT,
                TextAnchor::Middle,
                Baseline::Top,
            );
            if let DrawCommand::Text { bold, .. } = &mut label {
                *bold = true;
            }
            scene.push(format!("tick-label:x:{}", entry.category), label);
        }
    }

    let mut title = DrawCommand::text(
        (m.left - 50.0, m.top + h / 2.0),
        "Number of Complaints",
        TITLE_FONT,
        palette::TEXT,
        TextAnchor::Middle,
        Baseline::Middle,
    );
    if let DrawCommand::Text { vertical, .. } = &mut title {
        *vertical = true;
    }
    scene.push("title:y", title);

    for (i, entry) in summary.iter().enumerate() {
        let Some(left) = x.position(&entry.category) else { continue };
        let value = entry.value as f64;
        let top = y.map(value);
        let base_fill = color.color(value);
        let look = bar_appearance(&entry.category, hover, base_fill, &style.hover);
        let delay = i as f64 * style.stagger_ms;

        let bar = DrawCommand::Rect {
            x: m.left + left,
            y: m.top + top - look.lift,
            width: x.bandwidth(),
            height: h - top,
            radius: CORNER_RADIUS,
            fill: look.fill,
            opacity: look.opacity,
        };
        let collapsed = DrawCommand::Rect {
            x: m.left + left,
            y: m.top + h,
            width: x.bandwidth(),
            height: 0.0,
            radius: CORNER_RADIUS,
            fill: base_fill,
            opacity: 1.0,
        };
        let entrance = Entrance { from: collapsed, delay_ms: delay, duration_ms: ENTRANCE_MS };
        scene.push_animated(bar_key(&entry.category), bar, entrance);

        let text = if entry.value > 0 { format::thousands(entry.value) } else { String::new() };
        let label = DrawCommand::text(
            (m.left + left + x.bandwidth() / 2.0, m.top + top - 8.0),
            text,
            LABEL_FONT,
            palette::TEXT,
            TextAnchor::Middle,
            Baseline::Bottom,
        );
        scene.push_animated(
            label_key(&entry.category),
            label.clone(),
            Entrance {
                from: label.with_opacity(0.0),
                delay_ms: delay + LABEL_DELAY_MS,
                duration_ms: ENTRANCE_MS,
            },
        );
    }

    scene
}

/// The statistics row drawn in the dashboard's top margin.
pub fn stats_elements(scene: &mut SceneGraph, stats: &StatsDisplay, style: &ChartStyle) {
    let y = style.margin.top / 2.0;
    let slot = style.width / 4.0;
    let items = [
        ("stat:total", "Total", &stats.total),
        ("stat:average", "Monthly Avg", &stats.average),
        ("stat:peak", "Peak", &stats.peak),
        ("stat:low", "Lowest", &stats.low),
    ];
    for (i, (key, name, value)) in items.iter().enumerate() {
        let mut text = DrawCommand::text(
            (slot * i as f64 + slot / 2.0, y),
            format!("{}: {}", name, value),
            LABEL_FONT,
            palette::TEXT,
            TextAnchor::Middle,
            Baseline::Middle,
        );
        if let DrawCommand::Text { bold, .. } = &mut text {
            *bold = true;
        }
        scene.push(*key, text);
    }
}

/// Tooltip box with one text line per entry of `lines`; first line bold.
pub fn tooltip_elements(
    scene: &mut SceneGraph,
    lines: &[String],
    anchor: (f64, f64),
    opacity: f64,
) {
    if opacity <= 0.0 || lines.is_empty() {
        return;
    }
    let line_height = 16.0;
    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
    let width = widest * 7.0 + 16.0;
    let height = lines.len() as f64 * line_height + 10.0;
    let (x, y) = anchor;

    scene.push(
        "tooltip:box",
        DrawCommand::Rect {
            x,
            y,
            width,
            height,
            radius: CORNER_RADIUS,
            fill: palette::TOOLTIP_BG,
            opacity,
        },
    );
    for (i, line) in lines.iter().enumerate() {
        let mut text = DrawCommand::text(
            (x + 8.0, y + 5.0 + line_height * i as f64 + line_height / 2.0),
            line.clone(),
            LABEL_FONT,
            palette::WHITE,
            TextAnchor::Start,
            Baseline::Middle,
        )
        .with_opacity(opacity);
        if let DrawCommand::Text { bold, .. } = &mut text {
            *bold = i == 0;
        }
        scene.push(format!("tooltip:line:{}", i), text);
    }
}

/// The single inline error message shown in place of a chart.
pub fn compile_error(message: &str, width: u32, height: u32) -> SceneGraph {
    let mut scene = SceneGraph::new(width, height);
    scene.push(
        "error",
        DrawCommand::text(
            (width as f64 / 2.0, height as f64 / 2.0),
            message,
            14.0,
            palette::ERROR,
            TextAnchor::Middle,
            Baseline::Middle,
        ),
    );
    scene
}
