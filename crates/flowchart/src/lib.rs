//! Vertical flowchart layout and drawing.

pub mod layout;
pub mod render;
pub mod surface;

pub use render::{render_flowchart, FlowchartRenderer, RenderSummary, EMPTY_MESSAGE};
pub use surface::{DisplayList, DrawOp, DrawingSurface, Point, Rect, Rgb, Stroke, TextStyle};
