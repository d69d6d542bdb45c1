//! Time-driven transitions. Nothing here touches data: a track only decides
//! how an element travels from its displayed command to its target command.

use crate::ir::{DrawCommand, SceneGraph};
use crate::palette;
use std::collections::HashMap;

pub const ENTRANCE_MS: f64 = 600.0;
pub const LABEL_DELAY_MS: f64 = 300.0;
pub const HOVER_MS: f64 = 200.0;
pub const TOOLTIP_OUT_MS: f64 = 500.0;
pub const FLASH_STEP_MS: f64 = 100.0;
pub const COUNTER_MS: f64 = 500.0;
pub const RESIZE_MS: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    CubicInOut,
    CubicOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicInOut => {
                let t2 = t * 2.0;
                if t2 <= 1.0 {
                    t2 * t2 * t2 / 2.0
                } else {
                    let u = t2 - 2.0;
                    (u * u * u + 2.0) / 2.0
                }
            }
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_point(a: (f64, f64), b: (f64, f64), t: f64) -> (f64, f64) {
    (lerp(a.0, b.0, t), lerp(a.1, b.1, t))
}

/// Blend two commands at eased progress `t`. Text content and non-numeric
/// attributes switch to the target immediately; mismatched kinds snap at the end.
pub fn interpolate(from: &DrawCommand, to: &DrawCommand, t: f64) -> DrawCommand {
    if t >= 1.0 {
        return to.clone();
    }
    match (from, to) {
        (
            DrawCommand::Rect { x: x0, y: y0, width: w0, height: h0, radius: r0, fill: f0, opacity: o0 },
            DrawCommand::Rect { x: x1, y: y1, width: w1, height: h1, radius: r1, fill: f1, opacity: o1 },
        ) => DrawCommand::Rect {
            x: lerp(*x0, *x1, t),
            y: lerp(*y0, *y1, t),
            width: lerp(*w0, *w1, t),
            height: lerp(*h0, *h1, t),
            radius: lerp(*r0, *r1, t),
            fill: palette::interpolate(*f0, *f1, t),
            opacity: lerp(*o0, *o1, t),
        },
        (
            DrawCommand::Line { from: a0, to: b0, color: c0, width: w0, .. },
            DrawCommand::Line { from: a1, to: b1, color: c1, width: w1, dash },
        ) => DrawCommand::Line {
            from: lerp_point(*a0, *a1, t),
            to: lerp_point(*b0, *b1, t),
            color: palette::interpolate(*c0, *c1, t),
            width: lerp(*w0, *w1, t),
            dash: *dash,
        },
        (
            DrawCommand::Text { position: p0, size: s0, color: c0, opacity: o0, .. },
            DrawCommand::Text { position: p1, content, size: s1, color: c1, anchor, baseline, bold, vertical, opacity: o1 },
        ) => DrawCommand::Text {
            position: lerp_point(*p0, *p1, t),
            content: content.clone(),
            size: lerp(*s0, *s1, t),
            color: palette::interpolate(*c0, *c1, t),
            anchor: *anchor,
            baseline: *baseline,
            bold: *bold,
            vertical: *vertical,
            opacity: lerp(*o0, *o1, t),
        },
        _ => from.clone(),
    }
}

// =============================================================================
// Scalar tweens (counters, tooltip opacity, canvas height)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub easing: Easing,
}

impl Tween {
    pub fn settled(value: f64) -> Self {
        Self { from: value, to: value, start_ms: 0.0, duration_ms: 0.0, easing: Easing::Linear }
    }

    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return if now_ms >= self.start_ms { 1.0 } else { 0.0 };
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, now_ms: f64) -> f64 {
        lerp(self.from, self.to, self.easing.apply(self.progress(now_ms)))
    }

    /// Head for `to`, starting from wherever the tween currently is.
    pub fn retarget(&mut self, to: f64, now_ms: f64, duration_ms: f64, easing: Easing) {
        self.from = self.value_at(now_ms);
        self.to = to;
        self.start_ms = now_ms;
        self.duration_ms = duration_ms;
        self.easing = easing;
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn end_ms(&self) -> f64 {
        self.start_ms + self.duration_ms
    }
}

/// An integer readout that counts toward a new value with an ease-out curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Counter {
    tween: Tween,
}

impl Counter {
    pub fn new(value: u64) -> Self {
        Self { tween: Tween::settled(value as f64) }
    }

    /// Start counting from the currently displayed value toward `value`.
    pub fn set(&mut self, value: u64, now_ms: f64) {
        let shown = self.displayed(now_ms) as f64;
        self.tween = Tween {
            from: shown,
            to: value as f64,
            start_ms: now_ms,
            duration_ms: COUNTER_MS,
            easing: Easing::CubicOut,
        };
    }

    pub fn displayed(&self, now_ms: f64) -> i64 {
        self.tween.value_at(now_ms).round() as i64
    }

    pub fn target(&self) -> u64 {
        self.tween.target() as u64
    }

    pub fn end_ms(&self) -> f64 {
        self.tween.end_ms()
    }
}

// =============================================================================
// Keyed element tracks
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Segment {
    from: DrawCommand,
    to: DrawCommand,
    start_ms: f64,
    duration_ms: f64,
    easing: Easing,
}

impl Segment {
    fn value_at(&self, now_ms: f64) -> DrawCommand {
        let t = if self.duration_ms <= 0.0 {
            1.0
        } else {
            ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
        };
        interpolate(&self.from, &self.to, self.easing.apply(t))
    }

    fn end_ms(&self) -> f64 {
        self.start_ms + self.duration_ms
    }
}

/// A chain of segments for one element; each segment starts where the previous ends.
#[derive(Debug, Clone, PartialEq, Default)]
struct Track {
    segments: Vec<Segment>,
}

impl Track {
    fn value_at(&self, now_ms: f64) -> Option<DrawCommand> {
        let first = self.segments.first()?;
        if now_ms < first.start_ms {
            return Some(first.from.clone());
        }
        self.segments
            .iter()
            .rev()
            .find(|s| s.start_ms <= now_ms)
            .map(|s| s.value_at(now_ms))
    }

    fn target(&self) -> Option<&DrawCommand> {
        self.segments.last().map(|s| &s.to)
    }

    fn end_ms(&self) -> f64 {
        self.segments.iter().map(Segment::end_ms).fold(0.0, f64::max)
    }
}

/// In-flight transitions keyed by element key. A new target for a key
/// supersedes whatever was in flight for it; no explicit cancellation.
#[derive(Debug, Clone, Default)]
pub struct Animator {
    tracks: HashMap<String, Track>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full replace: drop every track and play the entrances of `scene`.
    pub fn redraw(&mut self, scene: &SceneGraph, now_ms: f64) {
        self.tracks.clear();
        for element in &scene.elements {
            if let Some(entrance) = &element.entrance {
                self.tracks.insert(
                    element.key.clone(),
                    Track {
                        segments: vec![Segment {
                            from: entrance.from.clone(),
                            to: element.command.clone(),
                            start_ms: now_ms + entrance.delay_ms,
                            duration_ms: entrance.duration_ms,
                            easing: Easing::CubicInOut,
                        }],
                    },
                );
            }
        }
    }

    /// Move every element of `next` from its displayed state to its new target.
    /// Elements with no displayed state fall back to their `previous` target.
    pub fn restyle(&mut self, previous: &SceneGraph, next: &SceneGraph, now_ms: f64, duration_ms: f64) {
        let mut tracks = HashMap::with_capacity(next.elements.len());
        for element in &next.elements {
            if let Some(track) = self.tracks.get(&element.key) {
                if track.target() == Some(&element.command) {
                    tracks.insert(element.key.clone(), track.clone());
                    continue;
                }
            }

            let current = self
                .value_at(&element.key, now_ms)
                .or_else(|| previous.get(&element.key).map(|e| e.command.clone()));

            if let Some(current) = current {
                if current != element.command {
                    tracks.insert(
                        element.key.clone(),
                        Track {
                            segments: vec![Segment {
                                from: current,
                                to: element.command.clone(),
                                start_ms: now_ms,
                                duration_ms,
                                easing: Easing::CubicInOut,
                            }],
                        },
                    );
                }
            }
        }
        self.tracks = tracks;
    }

    /// Chain `steps` (target, duration) for one element, starting from its displayed state.
    pub fn sequence(&mut self, key: &str, base: &DrawCommand, steps: &[(DrawCommand, f64)], now_ms: f64) {
        let mut from = self.value_at(key, now_ms).unwrap_or_else(|| base.clone());
        let mut start_ms = now_ms;
        let mut segments = Vec::with_capacity(steps.len());
        for (to, duration_ms) in steps {
            segments.push(Segment {
                from: from.clone(),
                to: to.clone(),
                start_ms,
                duration_ms: *duration_ms,
                easing: Easing::CubicInOut,
            });
            from = to.clone();
            start_ms += duration_ms;
        }
        self.tracks.insert(key.to_string(), Track { segments });
    }

    pub fn value_at(&self, key: &str, now_ms: f64) -> Option<DrawCommand> {
        self.tracks.get(key).and_then(|t| t.value_at(now_ms))
    }

    /// The scene as displayed at `now_ms`.
    pub fn frame(&self, scene: &SceneGraph, now_ms: f64) -> SceneGraph {
        let mut frame = scene.clone();
        for element in &mut frame.elements {
            if let Some(command) = self.value_at(&element.key, now_ms) {
                element.command = command;
            }
        }
        frame
    }

    /// Time at which every track has reached its target.
    pub fn settled_at(&self) -> f64 {
        self.tracks.values().map(Track::end_ms).fold(0.0, f64::max)
    }
}
