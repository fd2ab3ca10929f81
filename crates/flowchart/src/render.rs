use serde_json::Value;
use shared::domain::FlowStep;
use tracing::warn;

use crate::{
    layout::{
        connector_into, slot_rect, surface_height, ACTION_BASELINE, MIN_HEIGHT, ROLE_BASELINE,
        WARNING_BASELINE,
    },
    surface::{DrawingSurface, Point, Rgb, Stroke, TextStyle},
};

pub const EMPTY_MESSAGE: &str = "No flowchart was found or it could not be drawn.";

const BORDER: Stroke = Stroke {
    width: 2.0,
    color: Rgb::from_hex(0x0078D7),
};
const BOX_FILL: Rgb = Rgb::from_hex(0xE3F2FD);
const ROLE_STYLE: TextStyle = TextStyle {
    size: 13.0,
    bold: true,
    color: Rgb::from_hex(0x005A9E),
};
const ACTION_STYLE: TextStyle = TextStyle {
    size: 12.0,
    bold: false,
    color: Rgb::from_hex(0x333333),
};
const WARNING_STYLE: TextStyle = TextStyle {
    size: 16.0,
    bold: false,
    color: Rgb::from_hex(0xD32F2F),
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSummary {
    pub height: f32,
    pub boxes: usize,
    pub connectors: usize,
    /// Positions of entries that were not drawable; their slots stay blank.
    pub skipped: Vec<usize>,
}

/// Clears `surface` and draws `steps` as a top-down chain of boxes.
///
/// Anything other than a non-empty array renders the warning state at the
/// minimum height. Every entry, drawable or not, owns one slot, so boxes and
/// connectors keep the position of their entry in `steps`.
pub fn render_flowchart<S>(surface: &mut S, steps: Option<&Value>) -> RenderSummary
where
    S: DrawingSurface + ?Sized,
{
    let entries = match steps.and_then(Value::as_array) {
        Some(entries) if !entries.is_empty() => entries,
        _ => return render_empty(surface),
    };

    let mut summary = RenderSummary {
        height: surface_height(entries.len()),
        ..RenderSummary::default()
    };
    surface.reset(summary.height);
    let width = surface.width();

    for (index, raw) in entries.iter().enumerate() {
        let step = match FlowStep::from_raw(raw) {
            Ok(step) => step,
            Err(err) => {
                warn!(index, "skipping flowchart step: {err}");
                summary.skipped.push(index);
                continue;
            }
        };
        let rect = slot_rect(width, index);

        if index > 0 {
            let connector = connector_into(rect);
            surface.polyline(&connector.shaft, BORDER);
            surface.polyline(&connector.head, BORDER);
            summary.connectors += 1;
        }

        surface.fill_rect(rect, BOX_FILL);
        surface.stroke_rect(rect, BORDER);
        let x = rect.center_x();
        surface.text(Point::new(x, rect.y + ROLE_BASELINE), &step.role, ROLE_STYLE);
        surface.text(
            Point::new(x, rect.y + ACTION_BASELINE),
            &format!("({})", step.action),
            ACTION_STYLE,
        );
        summary.boxes += 1;
    }

    summary
}

fn render_empty<S>(surface: &mut S) -> RenderSummary
where
    S: DrawingSurface + ?Sized,
{
    surface.reset(MIN_HEIGHT);
    let anchor = Point::new(surface.width() / 2.0, WARNING_BASELINE);
    surface.text(anchor, EMPTY_MESSAGE, WARNING_STYLE);
    RenderSummary {
        height: MIN_HEIGHT,
        ..RenderSummary::default()
    }
}

/// Owns a surface and redraws it from scratch on every call.
#[derive(Debug, Clone)]
pub struct FlowchartRenderer<S> {
    surface: S,
}

impl<S: DrawingSurface> FlowchartRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    pub fn render(&mut self, steps: Option<&Value>) -> RenderSummary {
        render_flowchart(&mut self.surface, steps)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
