use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: (hex >> 16) as u8,
            g: (hex >> 8) as u8,
            b: hex as u8,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub color: Rgb,
}

/// Target of a flowchart render.
///
/// `reset` must drop everything drawn so far; renders call it before any
/// other drawing. Text is positioned by its horizontal center and baseline.
pub trait DrawingSurface {
    fn width(&self) -> f32;
    fn reset(&mut self, height: f32);
    fn fill_rect(&mut self, rect: Rect, color: Rgb);
    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);
    fn polyline(&mut self, points: &[Point], stroke: Stroke);
    fn text(&mut self, anchor: Point, text: &str, style: TextStyle);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        rect: Rect,
        color: Rgb,
    },
    StrokeRect {
        rect: Rect,
        stroke: Stroke,
    },
    Polyline {
        points: Vec<Point>,
        stroke: Stroke,
    },
    Text {
        anchor: Point,
        text: String,
        style: TextStyle,
    },
}

impl fmt::Display for DrawOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawOp::FillRect { rect, color } => write!(
                f,
                "fill   {:>6.1},{:>6.1} {}x{} {color}",
                rect.x, rect.y, rect.width, rect.height
            ),
            DrawOp::StrokeRect { rect, stroke } => write!(
                f,
                "stroke {:>6.1},{:>6.1} {}x{} {}",
                rect.x, rect.y, rect.width, rect.height, stroke.color
            ),
            DrawOp::Polyline { points, .. } => {
                f.write_str("line  ")?;
                for point in points {
                    write!(f, " {:.1},{:.1}", point.x, point.y)?;
                }
                Ok(())
            }
            DrawOp::Text { anchor, text, .. } => {
                write!(f, "text   {:>6.1},{:>6.1} {text:?}", anchor.x, anchor.y)
            }
        }
    }
}

/// In-memory surface that records draw operations for a painter to replay.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    width: f32,
    height: f32,
    ops: Vec<DrawOp>,
}

impl DisplayList {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            height: 0.0,
            ops: Vec::new(),
        }
    }

    /// Resizes horizontally. Content is kept until the next render.
    pub fn set_width(&mut self, width: f32) {
        self.width = width;
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn rect_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillRect { .. }))
            .count()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawingSurface for DisplayList {
    fn width(&self) -> f32 {
        self.width
    }

    fn reset(&mut self, height: f32) {
        self.height = height;
        self.ops.clear();
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.ops.push(DrawOp::StrokeRect { rect, stroke });
    }

    fn polyline(&mut self, points: &[Point], stroke: Stroke) {
        self.ops.push(DrawOp::Polyline {
            points: points.to_vec(),
            stroke,
        });
    }

    fn text(&mut self, anchor: Point, text: &str, style: TextStyle) {
        self.ops.push(DrawOp::Text {
            anchor,
            text: text.to_string(),
            style,
        });
    }
}
