//! Chart View Widget
//! Paints a scene with egui and turns pointer input into chart input.

use crate::charts::interaction::Tooltip;
use crate::charts::scene::{fit_text, Anchor, MarkId, Point, Primitive, Rect, Scene, Shape};
use egui::epaint::{CubicBezierShape, Mesh};
use egui::{Align2, Color32, FontId, Pos2, Sense, Stroke, Vec2};

const TOOLTIP_PADDING: f32 = 6.0;

/// Pointer input over one chart, in scene coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartInput {
    /// Interactive mark under the pointer.
    pub hover: Option<(MarkId, Point)>,
    /// A click, with the mark under it.
    pub click: Option<(Option<MarkId>, Point)>,
    /// A finished brush gesture; `Some(None)` when it was cleared.
    pub brush: Option<Option<Rect>>,
}

/// One chart panel. Holds the in-progress brush drag.
#[derive(Debug, Default)]
pub struct ChartView {
    brush_extent: Option<Rect>,
    drag_start: Option<Point>,
    live_brush: Option<Rect>,
}

impl ChartView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable brushing inside `extent`.
    pub fn with_brush(extent: Rect) -> Self {
        Self {
            brush_extent: Some(extent),
            ..Self::default()
        }
    }

    /// Move the brushable region. A drag in progress is abandoned when it moves.
    pub fn set_brush_extent(&mut self, extent: Rect) {
        if self.brush_extent != Some(extent) {
            self.drag_start = None;
            self.live_brush = None;
        }
        self.brush_extent = Some(extent);
    }

    pub fn show(&mut self, ui: &mut egui::Ui, scene: &Scene, tooltip: Option<&Tooltip>) -> ChartInput {
        let size = Vec2::new(scene.width.max(1.0), scene.height.max(1.0));
        let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
        let origin = response.rect.min;
        let to_screen = |p: Point| Pos2::new(origin.x + p.x, origin.y + p.y);
        let to_scene = |p: Pos2| Point::new(p.x - origin.x, p.y - origin.y);

        painter.rect_filled(response.rect, 0.0, Color32::WHITE);
        for primitive in &scene.primitives {
            paint_primitive(&painter, primitive, &to_screen);
        }

        let mut input = ChartInput::default();

        if let Some(pos) = response.hover_pos() {
            let p = to_scene(pos);
            input.hover = scene.hit_test(p).map(|id| (id, p));
        }

        if let Some(extent) = self.brush_extent {
            if response.drag_started() {
                // the press point, not where the drag threshold was crossed
                let origin = ui.input(|i| i.pointer.press_origin());
                self.drag_start = drag_origin(origin.map(to_scene), &extent);
            }
            if let (Some(start), Some(pos)) = (self.drag_start, response.interact_pointer_pos()) {
                self.live_brush = Some(clamp_rect(Rect::from_corners(start, to_scene(pos)), &extent));
            }
            if response.drag_stopped() {
                input.brush = finish_brush(self.drag_start.take(), self.live_brush.take());
            }
            if let Some(brush) = self.live_brush {
                painter.rect(
                    to_egui_rect(&brush, &to_screen),
                    0.0,
                    Color32::from_rgba_unmultiplied(119, 119, 119, 60),
                    Stroke::new(1.0, Color32::WHITE),
                );
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let p = to_scene(pos);
                input.click = Some((scene.hit_test(p), p));
                if self.brush_extent.is_some() {
                    input.brush = Some(None);
                }
            }
        }

        if let Some(tooltip) = tooltip {
            paint_tooltip(ui.ctx(), tooltip, to_screen(tooltip.anchor));
        }

        input
    }
}

/// A drag only brushes when it starts inside the brushable region.
fn drag_origin(press: Option<Point>, extent: &Rect) -> Option<Point> {
    press.filter(|p| extent.contains(*p))
}

/// Brush result of a finished drag; `None` for drags that never started a brush.
fn finish_brush(start: Option<Point>, live: Option<Rect>) -> Option<Option<Rect>> {
    start.map(|_| live.filter(|r| !r.is_empty()))
}

fn clamp_rect(r: Rect, extent: &Rect) -> Rect {
    Rect::new(
        r.x0.clamp(extent.x0, extent.x1),
        r.y0.clamp(extent.y0, extent.y1),
        r.x1.clamp(extent.x0, extent.x1),
        r.y1.clamp(extent.y0, extent.y1),
    )
}

fn to_egui_rect(r: &Rect, to_screen: &impl Fn(Point) -> Pos2) -> egui::Rect {
    egui::Rect::from_min_max(
        to_screen(Point::new(r.x0, r.y0)),
        to_screen(Point::new(r.x1, r.y1)),
    )
}

fn color32(c: crate::charts::scene::Color, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, alpha)
}

fn align(anchor: Anchor) -> Align2 {
    match anchor {
        Anchor::Start => Align2::LEFT_CENTER,
        Anchor::Middle => Align2::CENTER_CENTER,
        Anchor::End => Align2::RIGHT_CENTER,
    }
}

fn paint_primitive(painter: &egui::Painter, primitive: &Primitive, to_screen: &impl Fn(Point) -> Pos2) {
    let opacity = primitive.effective_opacity();
    match &primitive.shape {
        Shape::Rect { rect, fill, stroke } => {
            let r = to_egui_rect(rect, to_screen);
            painter.rect_filled(r, 0.0, color32(*fill, opacity));
            if let Some((color, width)) = stroke {
                painter.rect_stroke(r, 0.0, Stroke::new(*width, color32(*color, opacity)));
            }
        }
        Shape::Curve { points, color, width } => {
            let curve = CubicBezierShape::from_points_stroke(
                (*points).map(to_screen),
                false,
                Color32::TRANSPARENT,
                Stroke::new(*width, color32(*color, opacity)),
            );
            painter.add(curve);
        }
        Shape::Line { from, to, color, width } => {
            painter.line_segment(
                [to_screen(*from), to_screen(*to)],
                Stroke::new(*width, color32(*color, opacity)),
            );
        }
        Shape::Text {
            pos,
            text,
            size,
            color,
            anchor,
            bold: _,
            max_width,
        } => {
            let label = match max_width {
                Some(w) => fit_text(text, *size, *w),
                None => text.clone(),
            };
            if !label.is_empty() {
                painter.text(
                    to_screen(*pos),
                    align(*anchor),
                    label,
                    FontId::proportional(*size),
                    color32(*color, opacity),
                );
            }
        }
        Shape::Gradient { rect, from, to } => {
            let r = to_egui_rect(rect, to_screen);
            let (left, right) = (color32(*from, opacity), color32(*to, opacity));
            let mut mesh = Mesh::default();
            mesh.colored_vertex(r.left_top(), left);
            mesh.colored_vertex(r.right_top(), right);
            mesh.colored_vertex(r.right_bottom(), right);
            mesh.colored_vertex(r.left_bottom(), left);
            mesh.add_triangle(0, 1, 2);
            mesh.add_triangle(0, 2, 3);
            painter.add(egui::Shape::mesh(mesh));
        }
    }
}

fn paint_tooltip(ctx: &egui::Context, tooltip: &Tooltip, anchor: Pos2) {
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Tooltip,
        egui::Id::new("chart_tooltip"),
    ));
    let title = painter.layout_no_wrap(tooltip.title.clone(), FontId::proportional(13.0), Color32::BLACK);
    let detail = painter.layout_no_wrap(tooltip.detail.clone(), FontId::proportional(12.0), Color32::DARK_GRAY);
    let width = title.size().x.max(detail.size().x) + 2.0 * TOOLTIP_PADDING;
    let height = title.size().y + detail.size().y + 2.0 * TOOLTIP_PADDING;
    let frame = egui::Rect::from_min_size(anchor, Vec2::new(width, height));

    painter.rect(frame, 4.0, Color32::WHITE, Stroke::new(1.0, Color32::GRAY));
    let text_pos = anchor + Vec2::splat(TOOLTIP_PADDING);
    let title_height = title.size().y;
    painter.galley(text_pos, title, Color32::BLACK);
    painter.galley(text_pos + Vec2::new(0.0, title_height), detail, Color32::DARK_GRAY);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_rect_to_extent() {
        let extent = Rect::new(0.0, 50.0, 300.0, 450.0);
        let r = clamp_rect(Rect::new(-20.0, 10.0, 100.0, 500.0), &extent);
        assert_eq!(r, Rect::new(0.0, 50.0, 100.0, 450.0));
    }

    #[test]
    fn test_drag_outside_extent_keeps_brush() {
        let extent = Rect::new(0.0, 50.0, 300.0, 450.0);
        let start = drag_origin(Some(Point::new(10.0, 20.0)), &extent);
        assert_eq!(start, None);
        assert_eq!(finish_brush(start, None), None);
    }

    #[test]
    fn test_finished_drag_reports_brush() {
        let extent = Rect::new(0.0, 50.0, 300.0, 450.0);
        let start = drag_origin(Some(Point::new(10.0, 60.0)), &extent);
        assert_eq!(start, Some(Point::new(10.0, 60.0)));
        let live = Rect::new(10.0, 60.0, 40.0, 90.0);
        assert_eq!(finish_brush(start, Some(live)), Some(Some(live)));
        // a drag back onto its start clears the brush
        let flat = Rect::new(10.0, 60.0, 10.0, 60.0);
        assert_eq!(finish_brush(start, Some(flat)), Some(None));
    }

    #[test]
    fn test_moving_extent_abandons_drag() {
        let mut view = ChartView::with_brush(Rect::new(0.0, 50.0, 300.0, 450.0));
        view.drag_start = Some(Point::new(10.0, 60.0));
        view.live_brush = Some(Rect::new(10.0, 60.0, 40.0, 90.0));
        view.set_brush_extent(Rect::new(0.0, 50.0, 300.0, 450.0));
        assert!(view.drag_start.is_some());
        view.set_brush_extent(Rect::new(0.0, 50.0, 150.0, 450.0));
        assert_eq!(view.drag_start, None);
        assert_eq!(view.live_brush, None);
    }

    #[test]
    fn test_opacity_to_alpha() {
        let c = color32(crate::charts::scene::Color::BLACK, 0.3);
        assert_eq!(c.a(), 77);
    }
}
