//! Geometry of the stacked-box diagram, in surface units.

use crate::surface::{Point, Rect};

pub const BOX_WIDTH: f32 = 150.0;
pub const BOX_HEIGHT: f32 = 60.0;
pub const VERTICAL_SPACING: f32 = 40.0;
pub const TOP_MARGIN: f32 = 40.0;
pub const MIN_HEIGHT: f32 = 100.0;
pub const ARROW_HEAD: f32 = 5.0;
pub const ROLE_BASELINE: f32 = 25.0;
pub const ACTION_BASELINE: f32 = 45.0;
pub const WARNING_BASELINE: f32 = 50.0;

/// Height needed for `slots` boxes; an empty diagram gets the minimum.
pub fn surface_height(slots: usize) -> f32 {
    if slots == 0 {
        return MIN_HEIGHT;
    }
    TOP_MARGIN + slots as f32 * (BOX_HEIGHT + VERTICAL_SPACING)
}

/// Box for the `index`-th slot, centered on `surface_width`.
pub fn slot_rect(surface_width: f32, index: usize) -> Rect {
    Rect {
        x: (surface_width - BOX_WIDTH) / 2.0,
        y: TOP_MARGIN + index as f32 * (BOX_HEIGHT + VERTICAL_SPACING),
        width: BOX_WIDTH,
        height: BOX_HEIGHT,
    }
}

/// Connector into `target` from the slot above it: a shaft spanning the gap
/// and a head whose tip touches the top edge of `target`.
pub struct Connector {
    pub shaft: [Point; 2],
    pub head: [Point; 3],
}

pub fn connector_into(target: Rect) -> Connector {
    let x = target.center_x();
    let tip = Point::new(x, target.y);
    Connector {
        shaft: [Point::new(x, target.y - VERTICAL_SPACING), tip],
        head: [
            Point::new(x - ARROW_HEAD, target.y - ARROW_HEAD),
            tip,
            Point::new(x + ARROW_HEAD, target.y - ARROW_HEAD),
        ],
    }
}
