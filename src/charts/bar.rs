//! Grouped Bar Chart
//! Top brands by product count, one bar per skin type counting the products
//! suitable for it.

use super::interaction::{BarSelection, HoverTarget, Tooltip};
use super::scale::{nice_max, ticks, BandScale};
use super::scene::{text, Anchor, Color, Emphasis, MarkId, Point, Primitive, Rect, Scene, Shape};
use super::RenderContext;
use crate::data::{brand_categories, CategoryOrder, Dataset, Product, SkinType};

const MARGIN_TOP: f32 = 60.0;
const MARGIN_RIGHT: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 100.0;
const MARGIN_LEFT: f32 = 60.0;
const TICK_COUNT: usize = 10;
const LEGEND_SPACING: f32 = 90.0;
/// Per-item width used to centre the legend; narrower than the item spacing.
const LEGEND_CENTERING: f32 = 50.0;

pub const SKIN_COLORS: [Color; 5] = [
    Color::hex(0x4E79A7),
    Color::hex(0xF28E2B),
    Color::hex(0xE15759),
    Color::hex(0x76B7B2),
    Color::hex(0x59A14F),
];

/// Per-brand suitability counts, indexed by `SkinType::index`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarData {
    pub brands: Vec<String>,
    pub counts: Vec<[usize; 5]>,
}

impl BarData {
    /// Brands are the `top` most frequent ones, most frequent first.
    pub fn aggregate(rows: &[&Product], top: usize) -> Self {
        let brands = brand_categories(rows, CategoryOrder::TopByFrequency { limit: top });
        let counts = brands
            .iter()
            .map(|brand| {
                let mut counts = [0usize; 5];
                for p in rows.iter().filter(|p| p.brand == *brand) {
                    for skin in SkinType::ALL {
                        if p.suits(skin) {
                            counts[skin.index()] += 1;
                        }
                    }
                }
                counts
            })
            .collect();
        Self { brands, counts }
    }

    pub fn count(&self, brand: usize, skin: SkinType) -> Option<usize> {
        self.counts.get(brand).map(|c| c[skin.index()])
    }

    pub fn max_count(&self) -> usize {
        self.counts
            .iter()
            .flat_map(|c| c.iter().copied())
            .max()
            .unwrap_or(0)
    }

    pub fn brand_index(&self, brand: &str) -> Option<usize> {
        self.brands.iter().position(|b| b == brand)
    }
}

/// Rows behind a clicked bar, taken from the whole dataset.
pub fn selection_rows<'a>(dataset: &'a Dataset, selection: &BarSelection) -> Vec<&'a Product> {
    dataset
        .products()
        .iter()
        .filter(|p| p.brand == selection.brand && p.suits(selection.skin))
        .collect()
}

pub fn selection_title(selection: &BarSelection) -> String {
    format!("By {} for {} Skin", selection.brand, selection.skin.name())
}

pub fn tooltip(data: &BarData, hover: &HoverTarget) -> Option<Tooltip> {
    let HoverTarget::Bar { brand, skin, at } = *hover else {
        return None;
    };
    let count = data.count(brand, skin)?;
    Some(Tooltip::at(
        at,
        format!("{} Skin", skin.name()),
        format!("Total: {}", count),
    ))
}

pub fn render(data: &BarData, ctx: &RenderContext<'_>) -> Scene {
    let mut scene = Scene::new(ctx.width, ctx.height);
    let width = (ctx.width - MARGIN_LEFT - MARGIN_RIGHT).max(0.0);
    let height = (ctx.height - MARGIN_TOP - MARGIN_BOTTOM).max(0.0);

    let x0 = BandScale::new(data.brands.len(), width, 0.2, 0.2);
    let x1 = BandScale::new(SkinType::ALL.len(), x0.bandwidth, 0.1, 0.1);
    let y_max = nice_max(data.max_count() as f64, TICK_COUNT);
    let y = |v: f64| -> f32 {
        if y_max <= 0.0 {
            height
        } else {
            height - (v / y_max) as f32 * height
        }
    };

    // legend
    let legend_x = MARGIN_LEFT + width / 2.0 - (SkinType::ALL.len() as f32 * LEGEND_CENTERING) / 2.0;
    let legend_y = MARGIN_TOP - 30.0;
    for skin in SkinType::ALL {
        let x = legend_x + skin.index() as f32 * LEGEND_SPACING;
        scene.push(Primitive::decoration(Shape::Rect {
            rect: Rect::from_size(x, legend_y, 10.0, 10.0),
            fill: SKIN_COLORS[skin.index()],
            stroke: None,
        }));
        scene.push(Primitive::decoration(text(
            Point::new(x + 15.0, legend_y + 5.0),
            skin.name(),
            10.0,
            Color::BLACK,
            Anchor::Start,
        )));
    }

    let selected = ctx
        .interaction
        .bar_selection
        .as_ref()
        .and_then(|s| data.brand_index(&s.brand).map(|b| (b, s.skin)));
    let hovered = match ctx.interaction.hover {
        Some(HoverTarget::Bar { brand, skin, .. }) => Some((brand, skin)),
        _ => None,
    };

    for (b, counts) in data.counts.iter().enumerate() {
        for skin in SkinType::ALL {
            let count = counts[skin.index()] as f64;
            let left = MARGIN_LEFT + x0.position(b) + x1.position(skin.index());
            let top = MARGIN_TOP + y(count);
            let rect = Rect::new(left, top, left + x1.bandwidth, MARGIN_TOP + height);

            let key = (b, skin);
            let emphasis = match selected {
                Some(sel) if sel == key => Emphasis::Highlighted,
                Some(_) => Emphasis::Faded,
                None if hovered == Some(key) => Emphasis::Hovered,
                None => Emphasis::Neutral,
            };
            scene.push(
                Primitive::new(
                    MarkId::Bar { brand: b, skin },
                    Shape::Rect {
                        rect,
                        fill: SKIN_COLORS[skin.index()],
                        stroke: None,
                    },
                )
                .with_emphasis(emphasis),
            );
        }
    }

    // axes
    let origin = Point::new(MARGIN_LEFT, MARGIN_TOP + height);
    scene.push(Primitive::decoration(Shape::Line {
        from: origin,
        to: Point::new(MARGIN_LEFT + width, MARGIN_TOP + height),
        color: Color::BLACK,
        width: 1.0,
    }));
    scene.push(Primitive::decoration(Shape::Line {
        from: Point::new(MARGIN_LEFT, MARGIN_TOP),
        to: origin,
        color: Color::BLACK,
        width: 1.0,
    }));

    for (b, brand) in data.brands.iter().enumerate() {
        let cx = MARGIN_LEFT + x0.position(b) + x0.bandwidth / 2.0;
        scene.push(Primitive::decoration(Shape::Text {
            pos: Point::new(cx, MARGIN_TOP + height + 14.0),
            text: brand.clone(),
            size: 10.0,
            color: Color::BLACK,
            anchor: Anchor::Middle,
            bold: false,
            max_width: Some(x0.step),
        }));
    }

    for tick in ticks(y_max, TICK_COUNT) {
        let ty = MARGIN_TOP + y(tick);
        scene.push(Primitive::decoration(Shape::Line {
            from: Point::new(MARGIN_LEFT - 6.0, ty),
            to: Point::new(MARGIN_LEFT, ty),
            color: Color::BLACK,
            width: 1.0,
        }));
        scene.push(Primitive::decoration(text(
            Point::new(MARGIN_LEFT - 9.0, ty),
            format_tick(tick),
            10.0,
            Color::BLACK,
            Anchor::End,
        )));
    }

    scene.push(Primitive::decoration(text(
        Point::new(MARGIN_LEFT + width / 2.0, ctx.height - 20.0),
        "Brand Name",
        12.0,
        Color::BLACK,
        Anchor::Middle,
    )));
    scene.push(Primitive::decoration(text(
        Point::new(5.0, 12.0),
        "Number of Products",
        12.0,
        Color::BLACK,
        Anchor::Start,
    )));

    scene
}

fn format_tick(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}
