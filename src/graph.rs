use crate::ir::{Baseline, DrawCommand, SceneGraph, TextAnchor};
use crate::OutputFormat;
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

/// Segments per rounded corner
const CORNER_STEPS: usize = 4;

/// Encode a frame in the requested output format.
pub fn render_scene(scene: &SceneGraph, format: OutputFormat) -> Result<Vec<u8>> {
    if scene.width == 0 || scene.height == 0 {
        anyhow::bail!("Cannot render a {}x{} canvas", scene.width, scene.height);
    }
    match format {
        OutputFormat::Svg => render_svg(scene).map(String::into_bytes),
        OutputFormat::Png => render_png(scene),
    }
}

pub fn render_svg(scene: &SceneGraph) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (scene.width, scene.height)).into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg)
}

pub fn render_png(scene: &SceneGraph) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; scene.width as usize * scene.height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (scene.width, scene.height)).into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, scene.width, scene.height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

/// Paint the background then every element in order.
pub fn draw_scene<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, scene: &SceneGraph) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&scene.background).context("Failed to fill background")?;
    for element in &scene.elements {
        draw_command(root, &element.command)
            .with_context(|| format!("Failed to draw element '{}'", element.key))?;
    }
    Ok(())
}

fn is_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

fn px(point: (f64, f64)) -> (i32, i32) {
    (point.0.round() as i32, point.1.round() as i32)
}

pub fn draw_command<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, command: &DrawCommand) -> Result<()>
where
    DB::ErrorType: 'static,
{
    match command {
        DrawCommand::Rect { x, y, width, height, radius, fill, opacity } => {
            if *width <= 0.0 || *height <= 0.0 || *opacity <= 0.0 || !is_finite(&[*x, *y, *width, *height]) {
                return Ok(());
            }
            let style = fill.mix(opacity.min(1.0)).filled();
            if *radius > 0.0 {
                let points = rounded_rect(*x, *y, *width, *height, *radius);
                root.draw(&Polygon::new(points, style))?;
            } else {
                root.draw(&Rectangle::new([px((*x, *y)), px((x + width, y + height))], style))?;
            }
        }
        DrawCommand::Line { from, to, color, width, dash } => {
            if !is_finite(&[from.0, from.1, to.0, to.1]) {
                return Ok(());
            }
            let style = color.stroke_width(width.round().max(1.0) as u32);
            match dash {
                Some((on, off)) => {
                    for (a, b) in dash_segments(*from, *to, *on, *off) {
                        root.draw(&PathElement::new(vec![px(a), px(b)], style))?;
                    }
                }
                None => {
                    root.draw(&PathElement::new(vec![px(*from), px(*to)], style))?;
                }
            }
        }
        DrawCommand::Text { position, content, size, color, anchor, baseline, bold, vertical, opacity } => {
            if content.is_empty() || *opacity <= 0.0 || !is_finite(&[position.0, position.1]) {
                return Ok(());
            }
            let weight = if *bold { FontStyle::Bold } else { FontStyle::Normal };
            let mut font = FontDesc::new(FontFamily::SansSerif, *size, weight);
            if *vertical {
                font = font.transform(FontTransform::Rotate270);
            }
            let mixed = color.mix(opacity.min(1.0));
            let style = TextStyle::from(font)
                .color(&mixed)
                .pos(Pos::new(h_pos(*anchor), v_pos(*baseline)));
            root.draw(&Text::new(content.clone(), px(*position), style))?;
        }
    }
    Ok(())
}

fn h_pos(anchor: TextAnchor) -> HPos {
    match anchor {
        TextAnchor::Start => HPos::Left,
        TextAnchor::Middle => HPos::Center,
        TextAnchor::End => HPos::Right,
    }
}

fn v_pos(baseline: Baseline) -> VPos {
    match baseline {
        Baseline::Top => VPos::Top,
        Baseline::Middle => VPos::Center,
        Baseline::Bottom => VPos::Bottom,
    }
}

/// Outline of a rounded rectangle; the radius is clamped to half the short side.
fn rounded_rect(x: f64, y: f64, width: f64, height: f64, radius: f64) -> Vec<(i32, i32)> {
    let r = radius.min(width / 2.0).min(height / 2.0);
    // (corner center, starting angle) clockwise from top-right in screen space
    let corners = [
        ((x + width - r, y + r), -std::f64::consts::FRAC_PI_2),
        ((x + width - r, y + height - r), 0.0),
        ((x + r, y + height - r), std::f64::consts::FRAC_PI_2),
        ((x + r, y + r), std::f64::consts::PI),
    ];

    let mut points = Vec::with_capacity(corners.len() * (CORNER_STEPS + 1));
    for ((cx, cy), start) in corners {
        for step in 0..=CORNER_STEPS {
            let angle = start + std::f64::consts::FRAC_PI_2 * step as f64 / CORNER_STEPS as f64;
            points.push(px((cx + r * angle.cos(), cy + r * angle.sin())));
        }
    }
    points
}

/// Split a line into its visible dash pieces.
fn dash_segments(from: (f64, f64), to: (f64, f64), on: f64, off: f64) -> Vec<((f64, f64), (f64, f64))> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 || on <= 0.0 {
        return vec![(from, to)];
    }

    let at = |d: f64| (from.0 + dx * d / length, from.1 + dy * d / length);
    let mut segments = Vec::new();
    let mut start = 0.0;
    while start < length {
        let end = (start + on).min(length);
        segments.push((at(start), at(end)));
        start += on + off.max(0.0);
    }
    segments
}
