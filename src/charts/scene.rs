//! Scene Primitives
//! The value every chart renderer returns: a flat, ordered list of shapes in
//! pixel space, each tagged with the data it stands for. Adapters (egui
//! painter, plotters export) turn a scene into draw calls.

use super::flow::{EdgeRef, NodeRef};
use crate::data::SkinType;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREY: Color = Color::rgb(0x88, 0x88, 0x88);
    pub const DARK: Color = Color::rgb(0x33, 0x33, 0x33);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From a `0xRRGGBB` literal.
    pub const fn hex(v: u32) -> Self {
        Self::rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn from_size(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    /// Rectangle spanned by two arbitrary corners (a drag gesture).
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }

    /// Closed-interval overlap: touching edges count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 <= other.x1 && self.x1 >= other.x0 && self.y0 <= other.y1 && self.y1 >= other.y0
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x0 + dx, self.y0 + dy, self.x1 + dx, self.y1 + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Shape {
    Rect {
        rect: Rect,
        fill: Color,
        stroke: Option<(Color, f32)>,
    },
    /// Cubic Bézier: start, two control points, end.
    Curve { points: [Point; 4], color: Color, width: f32 },
    Line { from: Point, to: Point, color: Color, width: f32 },
    Text {
        pos: Point,
        text: String,
        size: f32,
        color: Color,
        anchor: Anchor,
        bold: bool,
        /// Wrap width; adapters that cannot wrap truncate instead.
        max_width: Option<f32>,
    },
    /// Horizontal linear gradient.
    Gradient { rect: Rect, from: Color, to: Color },
}

/// What a primitive represents, used for hit testing and interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkId {
    Decoration,
    Bar { brand: usize, skin: SkinType },
    Cell(usize),
    Node(NodeRef),
    Edge(EdgeRef),
}

impl MarkId {
    pub fn is_interactive(&self) -> bool {
        !matches!(self, MarkId::Decoration | MarkId::Edge(_))
    }
}

/// Visual partition state derived from interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Emphasis {
    #[default]
    Neutral,
    Hovered,
    Highlighted,
    Faded,
    /// Dimmed and blurred (treemap cells outside a brush).
    Dimmed,
}

impl Emphasis {
    /// Final opacity for a primitive with the given base opacity.
    pub fn opacity(self, base: f32) -> f32 {
        match self {
            Emphasis::Neutral => base,
            Emphasis::Hovered => 0.7,
            Emphasis::Highlighted => 1.0,
            Emphasis::Faded => base * 0.2,
            Emphasis::Dimmed => 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Primitive {
    pub id: MarkId,
    pub shape: Shape,
    pub opacity: f32,
    pub emphasis: Emphasis,
}

impl Primitive {
    pub fn new(id: MarkId, shape: Shape) -> Self {
        Self {
            id,
            shape,
            opacity: 1.0,
            emphasis: Emphasis::Neutral,
        }
    }

    pub fn decoration(shape: Shape) -> Self {
        Self::new(MarkId::Decoration, shape)
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_emphasis(mut self, emphasis: Emphasis) -> Self {
        self.emphasis = emphasis;
        self
    }

    pub fn effective_opacity(&self) -> f32 {
        self.emphasis.opacity(self.opacity)
    }
}

/// Text primitive helper.
pub fn text(pos: Point, s: impl Into<String>, size: f32, color: Color, anchor: Anchor) -> Shape {
    Shape::Text {
        pos,
        text: s.into(),
        size,
        color,
        anchor,
        bold: false,
        max_width: None,
    }
}

pub fn bold_text(pos: Point, s: impl Into<String>, size: f32, color: Color, anchor: Anchor) -> Shape {
    Shape::Text {
        pos,
        text: s.into(),
        size,
        color,
        anchor,
        bold: true,
        max_width: None,
    }
}

/// Approximate advance of one glyph relative to the font size.
pub const GLYPH_WIDTH: f32 = 0.6;

/// Truncate `s` with a trailing "..." so it fits `max_width` at `size`.
pub fn fit_text(s: &str, size: f32, max_width: f32) -> String {
    let capacity = (max_width / (size * GLYPH_WIDTH)).floor().max(0.0) as usize;
    if s.chars().count() <= capacity {
        return s.to_string();
    }
    if capacity <= 3 {
        return String::new();
    }
    let mut out: String = s.chars().take(capacity - 3).collect();
    out.push_str("...");
    out
}

/// A rendered chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub primitives: Vec<Primitive>,
}

impl Scene {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            primitives: Vec::new(),
        }
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    /// Topmost interactive rectangle under `p`.
    pub fn hit_test(&self, p: Point) -> Option<MarkId> {
        self.primitives.iter().rev().find_map(|prim| match &prim.shape {
            Shape::Rect { rect, .. } if prim.id.is_interactive() && rect.contains(p) => {
                Some(prim.id)
            }
            _ => None,
        })
    }
}

#[cfg(test)]
impl Scene {
    pub fn count(&self, pred: impl Fn(&MarkId) -> bool) -> usize {
        self.primitives.iter().filter(|p| pred(&p.id)).count()
    }

    pub fn emphasis_of(&self, id: MarkId) -> Option<Emphasis> {
        self.primitives.iter().find(|p| p.id == id).map(|p| p.emphasis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_corners_normalizes() {
        let r = Rect::from_corners(Point::new(10.0, 5.0), Point::new(2.0, 8.0));
        assert_eq!(r, Rect::new(2.0, 5.0, 10.0, 8.0));
    }

    #[test]
    fn test_intersects_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(10.0, 0.0, 20.0, 5.0)));
        assert!(!a.intersects(&Rect::new(10.5, 0.0, 20.0, 5.0)));
    }

    #[test]
    fn test_hit_test_prefers_topmost_interactive() {
        let mut scene = Scene::new(100.0, 100.0);
        let rect = Rect::new(0.0, 0.0, 50.0, 50.0);
        scene.push(Primitive::new(
            MarkId::Cell(0),
            Shape::Rect { rect, fill: Color::BLACK, stroke: None },
        ));
        scene.push(Primitive::decoration(Shape::Rect { rect, fill: Color::WHITE, stroke: None }));
        assert_eq!(scene.hit_test(Point::new(10.0, 10.0)), Some(MarkId::Cell(0)));
        assert_eq!(scene.hit_test(Point::new(60.0, 10.0)), None);
    }

    #[test]
    fn test_fit_text() {
        // six pixels per glyph at size 10
        assert_eq!(fit_text("Glycerin", 10.0, 200.0), "Glycerin");
        assert_eq!(fit_text("Butylene Glycol", 10.0, 63.0), "Butylen...");
        assert_eq!(fit_text("Water", 10.0, 10.0), "");
    }

    #[test]
    fn test_color_lerp() {
        let c = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert_eq!(c, Color::rgb(128, 128, 128));
        assert_eq!(Color::hex(0x0065A2), Color::rgb(0x00, 0x65, 0xA2));
    }
}
