use plotters::style::RGBColor;

// =============================================================================
// Scene graph: the renderer's output and the animator's input
// =============================================================================

/// A full frame of keyed drawing commands in absolute canvas pixels.
/// The backend draws elements in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub elements: Vec<Element>,
}

impl SceneGraph {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: RGBColor(255, 255, 255),
            elements: Vec::new(),
        }
    }

    pub fn push(&mut self, key: impl Into<String>, command: DrawCommand) {
        self.elements.push(Element { key: key.into(), command, entrance: None });
    }

    pub fn push_animated(&mut self, key: impl Into<String>, command: DrawCommand, entrance: Entrance) {
        self.elements.push(Element { key: key.into(), command, entrance: Some(entrance) });
    }

    pub fn get(&self, key: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.key == key)
    }

    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |e| e.key.starts_with(prefix))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub key: String,
    pub command: DrawCommand,
    pub entrance: Option<Entrance>,
}

/// How an element first appears after a redraw: it starts as `from` and
/// moves to its target command once `delay_ms` has passed.
#[derive(Debug, Clone, PartialEq)]
pub struct Entrance {
    pub from: DrawCommand,
    pub delay_ms: f64,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: RGBColor,
        opacity: f64,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        color: RGBColor,
        width: f64,
        /// (dash, gap) lengths for dashed strokes
        dash: Option<(f64, f64)>,
    },
    Text {
        position: (f64, f64),
        content: String,
        size: f64,
        color: RGBColor,
        anchor: TextAnchor,
        baseline: Baseline,
        bold: bool,
        /// Rotated a quarter turn counter-clockwise (vertical axis titles)
        vertical: bool,
        opacity: f64,
    },
}

impl DrawCommand {
    /// Plain text with no rotation, full opacity and normal weight.
    pub fn text(
        position: (f64, f64),
        content: impl Into<String>,
        size: f64,
        color: RGBColor,
        anchor: TextAnchor,
        baseline: Baseline,
    ) -> Self {
        DrawCommand::Text {
            position,
            content: content.into(),
            size,
            color,
            anchor,
            baseline,
            bold: false,
            vertical: false,
            opacity: 1.0,
        }
    }

    pub fn line(from: (f64, f64), to: (f64, f64), color: RGBColor) -> Self {
        DrawCommand::Line { from, to, color, width: 1.0, dash: None }
    }

    /// Copy with a different fill (rects) or color (lines, text).
    pub fn with_fill(&self, color: RGBColor) -> Self {
        let mut next = self.clone();
        match &mut next {
            DrawCommand::Rect { fill, .. } => *fill = color,
            DrawCommand::Line { color: c, .. } | DrawCommand::Text { color: c, .. } => *c = color,
        }
        next
    }

    pub fn with_opacity(&self, value: f64) -> Self {
        let mut next = self.clone();
        match &mut next {
            DrawCommand::Rect { opacity, .. } | DrawCommand::Text { opacity, .. } => *opacity = value,
            DrawCommand::Line { .. } => {}
        }
        next
    }

    pub fn fill(&self) -> Option<RGBColor> {
        match self {
            DrawCommand::Rect { fill, .. } => Some(*fill),
            _ => None,
        }
    }

    pub fn opacity(&self) -> f64 {
        match self {
            DrawCommand::Rect { opacity, .. } | DrawCommand::Text { opacity, .. } => *opacity,
            DrawCommand::Line { .. } => 1.0,
        }
    }

    /// Center point of a rect, used as the default pointer position.
    pub fn center(&self) -> Option<(f64, f64)> {
        match self {
            DrawCommand::Rect { x, y, width, height, .. } => Some((x + width / 2.0, y + height / 2.0)),
            _ => None,
        }
    }
}
