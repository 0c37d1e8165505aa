//! Interaction State
//! Hover, selection and brush state for the three charts, updated by a pure
//! reducer. Renderers read this state to derive highlighted/faded partitions.

use super::flow::NodeRef;
use super::scene::{Point, Rect};
use crate::data::SkinType;

/// Which chart an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Treemap,
    Flow,
}

/// Hover target with the pointer position in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoverTarget {
    Bar { brand: usize, skin: SkinType, at: Point },
    Cell { index: usize, at: Point },
}

/// A selected bar, stored by name so it survives relayout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarSelection {
    pub brand: String,
    pub skin: SkinType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    /// Pointer moved onto a bar or cell.
    Hover(HoverTarget),
    /// Pointer left every hoverable mark.
    HoverOut,
    /// Click on a bar.
    SelectBar(BarSelection),
    /// Click on a flow node.
    SelectNode(NodeRef),
    /// Click on anything in the flow chart that is not a node.
    ClearFlowSelection,
    /// Brush gesture ended; `None` when the brush was cleared.
    Brush(Option<Rect>),
    /// Chart area resized. Brush and hover are held in scene pixels, so they
    /// are dropped rather than applied to the new layout.
    Relayout,
    /// Data under the charts changed (filter switch, new dataset).
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionState {
    pub hover: Option<HoverTarget>,
    pub bar_selection: Option<BarSelection>,
    pub flow_selection: Option<NodeRef>,
    pub brush: Option<Rect>,
}

impl InteractionState {
    /// Apply one event, returning the charts whose scene must be rebuilt.
    pub fn apply(&mut self, event: InteractionEvent) -> Vec<ChartKind> {
        match event {
            InteractionEvent::Hover(target) => {
                if self.hover == Some(target) {
                    return Vec::new();
                }
                let kind = match target {
                    HoverTarget::Bar { .. } => ChartKind::Bar,
                    HoverTarget::Cell { .. } => ChartKind::Treemap,
                };
                self.hover = Some(target);
                vec![kind]
            }
            InteractionEvent::HoverOut => match self.hover.take() {
                Some(HoverTarget::Bar { .. }) => vec![ChartKind::Bar],
                Some(HoverTarget::Cell { .. }) => vec![ChartKind::Treemap],
                None => Vec::new(),
            },
            InteractionEvent::SelectBar(selection) => {
                self.bar_selection = Some(selection);
                // the treemap is rebuilt over the new subset, so the old brush
                // no longer refers to the same cells
                self.brush = None;
                vec![ChartKind::Bar, ChartKind::Treemap]
            }
            InteractionEvent::SelectNode(node) => {
                if self.flow_selection == Some(node) {
                    self.flow_selection = None;
                } else {
                    self.flow_selection = Some(node);
                }
                vec![ChartKind::Flow]
            }
            InteractionEvent::ClearFlowSelection => {
                if self.flow_selection.take().is_some() {
                    vec![ChartKind::Flow]
                } else {
                    Vec::new()
                }
            }
            InteractionEvent::Brush(rect) => {
                self.brush = rect.filter(|r| !r.is_empty());
                vec![ChartKind::Treemap]
            }
            InteractionEvent::Relayout => {
                let mut kinds = Vec::new();
                match self.hover.take() {
                    Some(HoverTarget::Bar { .. }) => kinds.push(ChartKind::Bar),
                    Some(HoverTarget::Cell { .. }) => kinds.push(ChartKind::Treemap),
                    None => {}
                }
                if self.brush.take().is_some() && !kinds.contains(&ChartKind::Treemap) {
                    kinds.push(ChartKind::Treemap);
                }
                kinds
            }
            InteractionEvent::Reset => {
                *self = InteractionState::default();
                vec![ChartKind::Bar, ChartKind::Treemap, ChartKind::Flow]
            }
        }
    }
}

/// Positioned tooltip content.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub title: String,
    pub detail: String,
    pub anchor: Point,
}

impl Tooltip {
    /// Offset of the tooltip box from the pointer.
    pub const OFFSET: Point = Point::new(10.0, -28.0);

    pub fn at(pointer: Point, title: String, detail: String) -> Self {
        Self {
            title,
            detail,
            anchor: Point::new(pointer.x + Self::OFFSET.x, pointer.y + Self::OFFSET.y),
        }
    }
}
