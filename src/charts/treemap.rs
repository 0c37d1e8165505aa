//! Ingredient Treemap
//! Most frequent ingredients as a squarified treemap, with a brush that
//! splits cells into touched and untouched.

use super::interaction::{HoverTarget, Tooltip};
use super::scene::{
    bold_text, text, Anchor, Color, Emphasis, MarkId, Point, Primitive, Rect, Scene, Shape,
};
use super::RenderContext;
use crate::data::Product;
use rayon::prelude::*;
use std::collections::HashMap;

const PADDING: f64 = 3.0;
const TOP_OFFSET: f32 = 50.0;
const WIDTH_FRAC: f32 = 0.95;
const BOTTOM_RESERVE: f32 = 120.0;
const LEGEND_HEIGHT: f32 = 20.0;
const LEGEND_LEFT: f32 = 20.0;
const LEGEND_TICKS: usize = 5;
const LABEL_MIN_WIDTH: f32 = 40.0;
const LABEL_MIN_HEIGHT: f32 = 20.0;
const LABEL_COLOR: Color = Color::hex(0x265828);

/// Target aspect ratio of squarified rows (golden ratio).
const PHI: f64 = 1.618_033_988_749_895;

/// The nine-step sequential blue ramp.
const BLUES: [Color; 9] = [
    Color::hex(0xF7FBFF),
    Color::hex(0xDEEBF7),
    Color::hex(0xC6DBEF),
    Color::hex(0x9ECAE1),
    Color::hex(0x6BAED6),
    Color::hex(0x4292C6),
    Color::hex(0x2171B5),
    Color::hex(0x08519C),
    Color::hex(0x08306B),
];

/// Sequential blue color for `t` in `[0, 1]`.
pub fn blues(t: f32) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (BLUES.len() - 1) as f32;
    let i = (scaled.floor() as usize).min(BLUES.len() - 2);
    BLUES[i].lerp(BLUES[i + 1], scaled - i as f32)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientCount {
    pub name: String,
    pub count: usize,
}

/// Number of products listing each ingredient (once per product).
pub fn ingredient_counts<'a>(rows: &[&'a Product]) -> HashMap<&'a str, usize> {
    rows.par_iter()
        .fold(HashMap::new, |mut acc: HashMap<&'a str, usize>, p: &&'a Product| {
            let product: &'a Product = p;
            for name in product.ingredient_set() {
                *acc.entry(name).or_default() += 1;
            }
            acc
        })
        .reduce(HashMap::new, |mut a, b| {
            for (name, n) in b {
                *a.entry(name).or_default() += n;
            }
            a
        })
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreemapData {
    /// Descending by count, ties lexicographic.
    pub items: Vec<IngredientCount>,
}

impl TreemapData {
    pub fn aggregate(rows: &[&Product], top: usize) -> Self {
        let mut items: Vec<IngredientCount> = ingredient_counts(rows)
            .into_iter()
            .map(|(name, count)| IngredientCount {
                name: name.to_string(),
                count,
            })
            .collect();
        items.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        items.truncate(top);
        Self { items }
    }

    pub fn max_count(&self) -> usize {
        self.items.iter().map(|i| i.count).max().unwrap_or(0)
    }
}

/// Squarified tiling of `area` for values already sorted in descending order.
pub fn squarify(values: &[f64], area: [f64; 4]) -> Vec<[f64; 4]> {
    let n = values.len();
    let mut out = vec![[0.0; 4]; n];
    let [mut x0, mut y0, x1, y1] = area;
    let mut value: f64 = values.iter().sum();
    let (mut i0, mut i1) = (0usize, 0usize);

    while i0 < n {
        let dx = x1 - x0;
        let dy = y1 - y0;

        // next non-empty value starts the row
        let mut sum_value;
        loop {
            sum_value = values[i1];
            i1 += 1;
            if sum_value != 0.0 || i1 >= n {
                break;
            }
        }
        let mut min_value = sum_value;
        let mut max_value = sum_value;
        let alpha = (dy / dx).max(dx / dy) / (value * PHI);
        let mut beta = sum_value * sum_value * alpha;
        let mut min_ratio = (max_value / beta).max(beta / min_value);

        // grow the row while its worst aspect ratio does not get worse
        while i1 < n {
            let node_value = values[i1];
            sum_value += node_value;
            min_value = min_value.min(node_value);
            max_value = max_value.max(node_value);
            beta = sum_value * sum_value * alpha;
            let new_ratio = (max_value / beta).max(beta / min_value);
            if new_ratio > min_ratio {
                sum_value -= node_value;
                break;
            }
            min_ratio = new_ratio;
            i1 += 1;
        }

        if dx < dy {
            let row_y1 = if value > 0.0 { y0 + dy * sum_value / value } else { y1 };
            dice(&values[i0..i1], &mut out[i0..i1], [x0, y0, x1, row_y1]);
            y0 = row_y1;
        } else {
            let row_x1 = if value > 0.0 { x0 + dx * sum_value / value } else { x1 };
            slice(&values[i0..i1], &mut out[i0..i1], [x0, y0, row_x1, y1]);
            x0 = row_x1;
        }
        value -= sum_value;
        i0 = i1;
    }
    out
}

/// Split horizontally in proportion to value.
fn dice(values: &[f64], out: &mut [[f64; 4]], [x0, y0, x1, y1]: [f64; 4]) {
    let total: f64 = values.iter().sum();
    let k = if total > 0.0 { (x1 - x0) / total } else { 0.0 };
    let mut x = x0;
    for (v, cell) in values.iter().zip(out.iter_mut()) {
        let next = x + v * k;
        *cell = [x, y0, next, y1];
        x = next;
    }
}

/// Split vertically in proportion to value.
fn slice(values: &[f64], out: &mut [[f64; 4]], [x0, y0, x1, y1]: [f64; 4]) {
    let total: f64 = values.iter().sum();
    let k = if total > 0.0 { (y1 - y0) / total } else { 0.0 };
    let mut y = y0;
    for (v, cell) in values.iter().zip(out.iter_mut()) {
        let next = y + v * k;
        *cell = [x0, y, x1, next];
        y = next;
    }
}

fn inset([x0, y0, x1, y1]: [f64; 4], p: f64) -> [f64; 4] {
    let (mut ax, mut bx) = (x0 + p, x1 - p);
    let (mut ay, mut by) = (y0 + p, y1 - p);
    if bx < ax {
        ax = (ax + bx) / 2.0;
        bx = ax;
    }
    if by < ay {
        ay = (ay + by) / 2.0;
        by = ay;
    }
    [ax, ay, bx, by]
}

/// Cell rectangles for a `width` × `height` area with uniform padding.
pub fn layout(values: &[f64], width: f32, height: f32, padding: f64) -> Vec<Rect> {
    let half = padding / 2.0;
    let area = inset([0.0, 0.0, width as f64, height as f64], padding - half);
    squarify(values, area)
        .into_iter()
        .map(|cell| {
            let [x0, y0, x1, y1] = inset(cell, half);
            Rect::new(x0 as f32, y0 as f32, x1 as f32, y1 as f32)
        })
        .collect()
}

pub fn tooltip(data: &TreemapData, hover: &HoverTarget) -> Option<Tooltip> {
    let HoverTarget::Cell { index, at } = *hover else {
        return None;
    };
    let item = data.items.get(index)?;
    let plural = if item.count > 1 { "s" } else { "" };
    Some(Tooltip::at(
        at,
        item.name.clone(),
        format!("Used in {} product{}", item.count, plural),
    ))
}

/// Brushable region in scene coordinates.
pub fn brush_extent(width: f32, height: f32) -> Rect {
    let (w, h) = plot_size(width, height);
    Rect::from_size(0.0, TOP_OFFSET, w, h)
}

fn plot_size(width: f32, height: f32) -> (f32, f32) {
    ((width * WIDTH_FRAC).max(0.0), (height - BOTTOM_RESERVE).max(0.0))
}

pub fn render(data: &TreemapData, ctx: &RenderContext<'_>, title: Option<&str>) -> Scene {
    let mut scene = Scene::new(ctx.width, ctx.height);
    let (width, height) = plot_size(ctx.width, ctx.height);

    if let Some(title) = title {
        scene.push(Primitive::decoration(bold_text(
            Point::new(20.0, 30.0),
            title,
            16.0,
            Color::BLACK,
            Anchor::Start,
        )));
    }
    scene.push(Primitive::decoration(text(
        Point::new(0.0, 10.0),
        "* Click and drag to highlight specific ingredient groups in the treemap.",
        14.0,
        Color::RED,
        Anchor::Start,
    )));

    let max = data.max_count() as f32;
    let values: Vec<f64> = data.items.iter().map(|i| i.count as f64).collect();
    let cells = layout(&values, width, height, PADDING);
    let brush = ctx.interaction.brush;
    let hovered = match ctx.interaction.hover {
        Some(HoverTarget::Cell { index, .. }) => Some(index),
        _ => None,
    };

    for (i, (item, cell)) in data.items.iter().zip(&cells).enumerate() {
        let rect = cell.translate(0.0, TOP_OFFSET);
        let (emphasis, stroke) = match brush {
            Some(b) if b.intersects(&rect) => (Emphasis::Highlighted, Some((Color::DARK, 3.0))),
            Some(_) => (Emphasis::Dimmed, None),
            None if hovered == Some(i) => (Emphasis::Neutral, Some((Color::DARK, 1.5))),
            None => (Emphasis::Neutral, None),
        };
        scene.push(
            Primitive::new(
                MarkId::Cell(i),
                Shape::Rect {
                    rect,
                    fill: blues(item.count as f32 / max),
                    stroke,
                },
            )
            .with_emphasis(emphasis),
        );

        if rect.width() > LABEL_MIN_WIDTH && rect.height() > LABEL_MIN_HEIGHT {
            scene.push(Primitive::decoration(Shape::Text {
                pos: Point::new(rect.x0 + 4.0, (rect.y0 + rect.y1) / 2.0),
                text: item.name.clone(),
                size: 10.0,
                color: LABEL_COLOR,
                anchor: Anchor::Start,
                bold: true,
                max_width: Some(rect.width() - 8.0),
            }));
        }
    }

    // color legend
    let legend_top = height + 80.0;
    let legend_width = (width - LEGEND_LEFT).max(0.0);
    scene.push(Primitive::decoration(bold_text(
        Point::new(0.0, legend_top - 10.0),
        "Ingredient Frequency (low to high)",
        11.0,
        Color::BLACK,
        Anchor::Start,
    )));
    scene.push(Primitive::decoration(Shape::Gradient {
        rect: Rect::from_size(LEGEND_LEFT, legend_top, legend_width, LEGEND_HEIGHT),
        from: blues(0.0),
        to: blues(1.0),
    }));
    if max > 0.0 {
        for tick in super::scale::ticks(max as f64, LEGEND_TICKS) {
            let x = LEGEND_LEFT + (tick as f32 / max) * legend_width;
            scene.push(Primitive::decoration(text(
                Point::new(x, legend_top + LEGEND_HEIGHT + 10.0),
                format!("{}", tick),
                10.0,
                Color::BLACK,
                Anchor::Middle,
            )));
        }
    }

    scene
}
