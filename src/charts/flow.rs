//! Flow Diagram
//! Brands → price ranges → rating categories. Aggregates rows into weighted
//! edges per stage, lays the three node columns out at fixed positions and
//! derives the highlighted/faded partition from the selected node.

use super::scene::{
    bold_text, text, Anchor, Color, Emphasis, MarkId, Point, Primitive, Rect, Scene, Shape,
};
use super::RenderContext;
use crate::data::buckets::{price_bucket, rating_bucket, PRICE_BUCKETS, RATING_BUCKETS};
use crate::data::{brand_categories, CategoryOrder, Product};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

const MAX_WIDTH: f32 = 1200.0;
const NODE_WIDTH: f32 = 100.0;
const NODE_HEIGHT: f32 = 20.0;
const TOP_MARGIN: f32 = 50.0;
const BRAND_X: f32 = 20.0;
const BRAND_SPACING: f32 = 30.0;
const PRICE_X_FRAC: f32 = 0.45;
const RATING_X_FRAC: f32 = 0.75;
const RIGHT_Y_OFFSET: f32 = 150.0;
const RIGHT_SPACING: f32 = 150.0;
const BOTTOM_PADDING: f32 = 300.0;
const LINK_OPACITY: f32 = 0.7;

const BRAND_FILL: Color = Color::hex(0x006F60);
const PRICE_FILL: Color = Color::hex(0x0065A2);
const RATING_FILLS: [Color; 3] = [
    Color::hex(0x492000),
    Color::hex(0x51DBFF),
    Color::hex(0xF2698B),
];
const HIGHLIGHT_STROKE: Color = Color::hex(0x39FF14);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Column {
    Brand,
    Price,
    Rating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeRef {
    pub column: Column,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Stage {
    BrandToPrice,
    PriceToRating,
}

impl Stage {
    fn columns(self) -> (Column, Column) {
        match self {
            Stage::BrandToPrice => (Column::Brand, Column::Price),
            Stage::PriceToRating => (Column::Price, Column::Rating),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeRef {
    pub stage: Stage,
    pub source: usize,
    pub target: usize,
}

/// Aggregated connection between two buckets. `count` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub count: usize,
}

impl Edge {
    /// Stroke width; square root keeps large counts from dominating.
    pub fn thickness(&self) -> f32 {
        (self.count as f32).sqrt().max(1.0)
    }
}

/// Count rows per (source, target) pair, skipping rows where either side has
/// no bucket. Sorted by descending count, then by pair.
pub fn aggregate_stage<S, T>(rows: &[&Product], source: S, target: T) -> Vec<Edge>
where
    S: Fn(&Product) -> Option<usize>,
    T: Fn(&Product) -> Option<usize>,
{
    let mut counts: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for row in rows {
        if let (Some(s), Some(t)) = (source(row), target(row)) {
            *counts.entry((s, t)).or_default() += 1;
        }
    }

    let mut edges: Vec<Edge> = counts
        .into_iter()
        .map(|((source, target), count)| Edge { source, target, count })
        .collect();
    // stable sort keeps the BTreeMap pair order among equal counts
    edges.sort_by(|a, b| b.count.cmp(&a.count));
    edges
}

/// Nodes and edges of the diagram for one row subset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowData {
    pub brands: Vec<String>,
    pub brand_to_price: Vec<Edge>,
    pub price_to_rating: Vec<Edge>,
}

impl FlowData {
    /// Brands are ordered lexicographically for this chart.
    pub fn aggregate(rows: &[&Product]) -> Self {
        let brands = brand_categories(rows, CategoryOrder::Lexicographic);
        let brand_index: HashMap<&str, usize> = brands
            .iter()
            .enumerate()
            .map(|(i, b)| (b.as_str(), i))
            .collect();

        let brand_to_price = aggregate_stage(
            rows,
            |p| brand_index.get(p.brand.as_str()).copied(),
            |p| price_bucket(p.price),
        );
        let price_to_rating =
            aggregate_stage(rows, |p| price_bucket(p.price), |p| rating_bucket(p.rating));

        Self {
            brands,
            brand_to_price,
            price_to_rating,
        }
    }

    pub fn edges(&self, stage: Stage) -> &[Edge] {
        match stage {
            Stage::BrandToPrice => &self.brand_to_price,
            Stage::PriceToRating => &self.price_to_rating,
        }
    }

    pub fn node_count(&self, column: Column) -> usize {
        match column {
            Column::Brand => self.brands.len(),
            Column::Price => PRICE_BUCKETS.len(),
            Column::Rating => RATING_BUCKETS.len(),
        }
    }

    pub fn node_name(&self, node: NodeRef) -> Option<&str> {
        match node.column {
            Column::Brand => self.brands.get(node.index).map(String::as_str),
            Column::Price => PRICE_BUCKETS.get(node.index).map(|b| b.name),
            Column::Rating => RATING_BUCKETS.get(node.index).map(|b| b.name),
        }
    }

    /// Nodes and edges reachable from `node`, following edges downstream
    /// (towards ratings) and upstream (towards brands).
    pub fn connected(&self, node: NodeRef) -> Partition {
        let mut partition = Partition::default();
        if node.index >= self.node_count(node.column) {
            return partition;
        }
        partition.nodes.insert(node);

        let start: BTreeSet<usize> = [node.index].into_iter().collect();

        let mut current = start.clone();
        let downstream: &[Stage] = match node.column {
            Column::Brand => &[Stage::BrandToPrice, Stage::PriceToRating],
            Column::Price => &[Stage::PriceToRating],
            Column::Rating => &[],
        };
        for &stage in downstream {
            current = self.follow(stage, &current, true, &mut partition);
        }

        let mut current = start;
        let upstream: &[Stage] = match node.column {
            Column::Brand => &[],
            Column::Price => &[Stage::BrandToPrice],
            Column::Rating => &[Stage::PriceToRating, Stage::BrandToPrice],
        };
        for &stage in upstream {
            current = self.follow(stage, &current, false, &mut partition);
        }

        partition
    }

    fn follow(
        &self,
        stage: Stage,
        from: &BTreeSet<usize>,
        forward: bool,
        partition: &mut Partition,
    ) -> BTreeSet<usize> {
        let (source_col, target_col) = stage.columns();
        let mut reached = BTreeSet::new();
        for edge in self.edges(stage) {
            let (near, far, far_col) = if forward {
                (edge.source, edge.target, target_col)
            } else {
                (edge.target, edge.source, source_col)
            };
            if from.contains(&near) {
                partition.edges.insert(EdgeRef {
                    stage,
                    source: edge.source,
                    target: edge.target,
                });
                partition.nodes.insert(NodeRef { column: far_col, index: far });
                reached.insert(far);
            }
        }
        reached
    }
}

/// Highlighted side of a selection; everything else is faded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub nodes: HashSet<NodeRef>,
    pub edges: HashSet<EdgeRef>,
}

/// Fixed column layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowLayout {
    pub width: f32,
    pub height: f32,
}

impl FlowLayout {
    pub fn new(viewport_width: f32, brand_count: usize) -> Self {
        let width = viewport_width.min(MAX_WIDTH).max(0.0);
        let height =
            TOP_MARGIN + brand_count as f32 * (NODE_HEIGHT + BRAND_SPACING) + BOTTOM_PADDING;
        Self { width, height }
    }

    pub fn node_rect(&self, node: NodeRef) -> Rect {
        let i = node.index as f32;
        let (x, y) = match node.column {
            Column::Brand => (BRAND_X, TOP_MARGIN + i * (NODE_HEIGHT + BRAND_SPACING)),
            Column::Price => (
                self.width * PRICE_X_FRAC,
                RIGHT_Y_OFFSET + i * (NODE_HEIGHT + RIGHT_SPACING),
            ),
            Column::Rating => (
                self.width * RATING_X_FRAC,
                RIGHT_Y_OFFSET + i * (NODE_HEIGHT + RIGHT_SPACING),
            ),
        };
        Rect::from_size(x, y, NODE_WIDTH, NODE_HEIGHT)
    }

    /// Curve from the right edge of `from` to the left edge of `to`.
    pub fn link_curve(&self, from: NodeRef, to: NodeRef) -> [Point; 4] {
        let a = self.node_rect(from);
        let b = self.node_rect(to);
        let (sx, sy) = (a.x1, (a.y0 + a.y1) / 2.0);
        let (tx, ty) = (b.x0, (b.y0 + b.y1) / 2.0);
        [
            Point::new(sx, sy),
            Point::new(sx + (tx - sx) * 0.4, sy),
            Point::new(sx + (tx - sx) * 0.6, ty),
            Point::new(tx, ty),
        ]
    }
}

fn node_fill(node: NodeRef) -> Color {
    match node.column {
        Column::Brand => BRAND_FILL,
        Column::Price => PRICE_FILL,
        Column::Rating => RATING_FILLS[node.index % RATING_FILLS.len()],
    }
}

/// Render the diagram. Its height follows the brand count, not `ctx.height`.
pub fn render(data: &FlowData, ctx: &RenderContext<'_>) -> Scene {
    let layout = FlowLayout::new(ctx.width, data.brands.len());
    let mut scene = Scene::new(layout.width, layout.height);

    let partition = ctx
        .interaction
        .flow_selection
        .map(|node| data.connected(node))
        .filter(|p| !p.nodes.is_empty());
    let node_emphasis = |node: NodeRef| match &partition {
        None => Emphasis::Neutral,
        Some(p) if p.nodes.contains(&node) => Emphasis::Highlighted,
        Some(_) => Emphasis::Faded,
    };
    let edge_emphasis = |edge: EdgeRef| match &partition {
        None => Emphasis::Neutral,
        Some(p) if p.edges.contains(&edge) => Emphasis::Highlighted,
        Some(_) => Emphasis::Faded,
    };

    let columns = [Column::Brand, Column::Price, Column::Rating];

    for column in columns {
        for index in 0..data.node_count(column) {
            let node = NodeRef { column, index };
            let emphasis = node_emphasis(node);
            let stroke = (emphasis == Emphasis::Highlighted).then_some((HIGHLIGHT_STROKE, 2.0));
            scene.push(
                Primitive::new(
                    MarkId::Node(node),
                    Shape::Rect {
                        rect: layout.node_rect(node),
                        fill: node_fill(node),
                        stroke,
                    },
                )
                .with_emphasis(emphasis),
            );
        }
    }

    for stage in [Stage::BrandToPrice, Stage::PriceToRating] {
        let (source_col, target_col) = stage.columns();
        for edge in data.edges(stage) {
            let id = EdgeRef {
                stage,
                source: edge.source,
                target: edge.target,
            };
            let color = match stage {
                Stage::BrandToPrice => Color::GREY,
                Stage::PriceToRating => RATING_FILLS[edge.target % RATING_FILLS.len()],
            };
            let points = layout.link_curve(
                NodeRef { column: source_col, index: edge.source },
                NodeRef { column: target_col, index: edge.target },
            );
            scene.push(
                Primitive::new(
                    MarkId::Edge(id),
                    Shape::Curve {
                        points,
                        color,
                        width: edge.thickness(),
                    },
                )
                .with_opacity(LINK_OPACITY)
                .with_emphasis(edge_emphasis(id)),
            );
        }
    }

    for column in columns {
        for index in 0..data.node_count(column) {
            let node = NodeRef { column, index };
            let rect = layout.node_rect(node);
            let name = data.node_name(node).unwrap_or_default();
            scene.push(Primitive::decoration(text(
                Point::new(rect.x0 + 5.0, (rect.y0 + rect.y1) / 2.0),
                name,
                10.0,
                Color::WHITE,
                Anchor::Start,
            )));
        }
    }

    let titles = [
        (Column::Brand, "Brands", TOP_MARGIN),
        (Column::Price, "Price Ranges", RIGHT_Y_OFFSET),
        (Column::Rating, "Rating Categories", RIGHT_Y_OFFSET),
    ];
    for (column, title, y) in titles {
        let rect = layout.node_rect(NodeRef { column, index: 0 });
        scene.push(Primitive::decoration(bold_text(
            Point::new(rect.x0 + NODE_WIDTH / 2.0, y - 20.0),
            title,
            15.0,
            Color::BLACK,
            Anchor::Middle,
        )));
    }

    scene.push(Primitive::decoration(text(
        Point::new(0.0, 10.0),
        "* Click on any node to highlight its price range and customer rating relationships.",
        14.0,
        Color::RED,
        Anchor::Start,
    )));

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::interaction::{InteractionEvent, InteractionState};
    use crate::data::{filter_rows, test_product as product, Dataset, LabelFilter};

    fn dataset() -> Dataset {
        Dataset::new(vec![
            product("A", "Moisturizer", 10.0, 4.5, "", &[]),
            product("A", "Moisturizer", 60.0, 3.5, "", &[]),
            product("A", "Cleanser", 210.0, 2.0, "", &[]),
            product("B", "Cleanser", 15.0, 4.2, "", &[]),
            product("B", "Moisturizer", 12.0, f64::NAN, "", &[]),
            product("C", "Moisturizer", f64::NAN, 4.0, "", &[]),
        ])
    }

    fn edge_sum(edges: &[Edge]) -> usize {
        edges.iter().map(|e| e.count).sum()
    }

    #[test]
    fn test_price_scenario_one_edge_per_bucket() {
        let rows = vec![
            product("A", "X", 10.0, 4.0, "", &[]),
            product("A", "X", 60.0, 4.0, "", &[]),
            product("A", "X", 210.0, 4.0, "", &[]),
        ];
        let refs: Vec<&Product> = rows.iter().collect();
        let data = FlowData::aggregate(&refs);
        assert_eq!(
            data.brand_to_price,
            vec![
                Edge { source: 0, target: 0, count: 1 },
                Edge { source: 0, target: 1, count: 1 },
                Edge { source: 0, target: 3, count: 1 },
            ]
        );
    }

    #[test]
    fn test_count_conservation() {
        let ds = dataset();
        let rows = ds.rows();
        let data = FlowData::aggregate(&rows);

        // C has no price
        assert_eq!(edge_sum(&data.brand_to_price), 5);
        // B's second row has no rating, C has no price
        assert_eq!(edge_sum(&data.price_to_rating), 4);
        assert_eq!(data.brands, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_edges_unique_and_nonzero() {
        let ds = dataset();
        let data = FlowData::aggregate(&ds.rows());
        for stage in [Stage::BrandToPrice, Stage::PriceToRating] {
            let edges = data.edges(stage);
            let pairs: HashSet<(usize, usize)> =
                edges.iter().map(|e| (e.source, e.target)).collect();
            assert_eq!(pairs.len(), edges.len());
            assert!(edges.iter().all(|e| e.count > 0));
            assert!(edges.windows(2).all(|w| w[0].count >= w[1].count));
        }
    }

    #[test]
    fn test_filtering_never_adds_weight() {
        let ds = dataset();
        let full = FlowData::aggregate(&ds.rows());
        let filtered_rows = filter_rows(&ds, &LabelFilter::Label("Moisturizer".into()));
        let filtered = FlowData::aggregate(&filtered_rows);

        let weight = |data: &FlowData| -> HashMap<(String, usize), usize> {
            data.brand_to_price
                .iter()
                .map(|e| ((data.brands[e.source].clone(), e.target), e.count))
                .collect()
        };
        let full_w = weight(&full);
        for (key, count) in weight(&filtered) {
            assert!(full_w.get(&key).is_some_and(|&c| c >= count));
        }
        for e in &filtered.price_to_rating {
            let original = full
                .price_to_rating
                .iter()
                .find(|f| f.source == e.source && f.target == e.target)
                .map(|f| f.count);
            assert!(original.is_some_and(|c| c >= e.count));
        }
    }

    #[test]
    fn test_thickness_mapping() {
        assert_eq!(Edge { source: 0, target: 0, count: 1 }.thickness(), 1.0);
        assert_eq!(Edge { source: 0, target: 0, count: 16 }.thickness(), 4.0);
    }

    #[test]
    fn test_brand_selection_partition() {
        let ds = dataset();
        let data = FlowData::aggregate(&ds.rows());
        let p = data.connected(NodeRef { column: Column::Brand, index: 1 });

        // B → Low price → every rating reachable from Low
        assert!(p.nodes.contains(&NodeRef { column: Column::Brand, index: 1 }));
        assert!(p.nodes.contains(&NodeRef { column: Column::Price, index: 0 }));
        assert!(!p.nodes.contains(&NodeRef { column: Column::Brand, index: 0 }));
        assert!(p.nodes.contains(&NodeRef { column: Column::Rating, index: 2 }));
        assert!(p.edges.contains(&EdgeRef { stage: Stage::BrandToPrice, source: 1, target: 0 }));
        assert!(!p.edges.contains(&EdgeRef { stage: Stage::BrandToPrice, source: 0, target: 0 }));
    }

    #[test]
    fn test_rating_selection_walks_upstream() {
        let ds = dataset();
        let data = FlowData::aggregate(&ds.rows());
        // Low rating only comes from the Premium row of brand A
        let p = data.connected(NodeRef { column: Column::Rating, index: 0 });
        assert!(p.nodes.contains(&NodeRef { column: Column::Price, index: 3 }));
        assert!(p.nodes.contains(&NodeRef { column: Column::Brand, index: 0 }));
        assert!(!p.nodes.contains(&NodeRef { column: Column::Brand, index: 1 }));
    }

    #[test]
    fn test_out_of_range_selection_is_empty() {
        let data = FlowData::default();
        assert!(data.connected(NodeRef { column: Column::Brand, index: 0 }).nodes.is_empty());
    }

    #[test]
    fn test_render_empty_subset() {
        let interaction = InteractionState::default();
        let ctx = RenderContext::new(800.0, 600.0, &interaction);
        let scene = render(&FlowData::aggregate(&[]), &ctx);
        let brand_nodes = scene.count(|id| {
            matches!(id, MarkId::Node(NodeRef { column: Column::Brand, .. }))
        });
        assert_eq!(brand_nodes, 0);
        assert_eq!(scene.count(|id| matches!(id, MarkId::Edge(_))), 0);
    }

    #[test]
    fn test_render_is_idempotent() {
        let data = FlowData::aggregate(&dataset().rows());
        let interaction = InteractionState::default();
        let ctx = RenderContext::new(900.0, 600.0, &interaction);
        assert_eq!(render(&data, &ctx), render(&data, &ctx));
    }

    #[test]
    fn test_render_layout_and_selection() {
        let data = FlowData::aggregate(&dataset().rows());
        let mut interaction = InteractionState::default();
        interaction.apply(InteractionEvent::SelectNode(NodeRef { column: Column::Brand, index: 1 }));
        let ctx = RenderContext::new(2000.0, 600.0, &interaction);
        let scene = render(&data, &ctx);

        assert_eq!(scene.width, MAX_WIDTH);
        assert_eq!(scene.height, TOP_MARGIN + 3.0 * 50.0 + BOTTOM_PADDING);
        assert_eq!(
            scene.emphasis_of(MarkId::Node(NodeRef { column: Column::Brand, index: 1 })),
            Some(Emphasis::Highlighted)
        );
        assert_eq!(
            scene.emphasis_of(MarkId::Node(NodeRef { column: Column::Brand, index: 0 })),
            Some(Emphasis::Faded)
        );

        let hit = scene.hit_test(Point::new(BRAND_X + 5.0, TOP_MARGIN + 55.0));
        assert_eq!(hit, Some(MarkId::Node(NodeRef { column: Column::Brand, index: 1 })));
    }
}
