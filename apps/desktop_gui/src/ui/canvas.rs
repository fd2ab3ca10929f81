//! Replays a flowchart display list onto an egui painter.

use eframe::egui;
use flowchart::{DisplayList, DrawOp, Point, Rect, Rgb, Stroke};

const CANVAS_BG: egui::Color32 = egui::Color32::WHITE;
/// Horizontal offset of the second pass that thickens bold text.
const FAUX_BOLD_OFFSET: f32 = 0.6;

fn color32(color: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(color.r, color.g, color.b)
}

fn pos(origin: egui::Pos2, point: Point) -> egui::Pos2 {
    egui::pos2(origin.x + point.x, origin.y + point.y)
}

fn rect(origin: egui::Pos2, rect: Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::pos2(origin.x + rect.x, origin.y + rect.y),
        egui::vec2(rect.width, rect.height),
    )
}

fn stroke(stroke: Stroke) -> egui::Stroke {
    egui::Stroke::new(stroke.width, color32(stroke.color))
}

/// Allocates the list's full height at the current width and paints it.
pub fn paint_display_list(ui: &mut egui::Ui, list: &DisplayList) {
    let size = egui::vec2(ui.available_width(), list.height());
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let origin = response.rect.min;
    painter.rect_filled(response.rect, egui::CornerRadius::ZERO, CANVAS_BG);

    for op in list.ops() {
        match op {
            DrawOp::FillRect { rect: r, color } => {
                painter.rect_filled(rect(origin, *r), egui::CornerRadius::ZERO, color32(*color));
            }
            DrawOp::StrokeRect { rect: r, stroke: s } => {
                painter.rect_stroke(
                    rect(origin, *r),
                    egui::CornerRadius::ZERO,
                    stroke(*s),
                    egui::StrokeKind::Middle,
                );
            }
            DrawOp::Polyline { points, stroke: s } => {
                let points = points.iter().map(|point| pos(origin, *point)).collect();
                painter.add(egui::Shape::line(points, stroke(*s)));
            }
            DrawOp::Text {
                anchor,
                text,
                style,
            } => {
                let at = pos(origin, *anchor);
                let font = egui::FontId::proportional(style.size);
                let color = color32(style.color);
                painter.text(at, egui::Align2::CENTER_BOTTOM, text, font.clone(), color);
                if style.bold {
                    let at = at + egui::vec2(FAUX_BOLD_OFFSET, 0.0);
                    painter.text(at, egui::Align2::CENTER_BOTTOM, text, font, color);
                }
            }
        }
    }
}
