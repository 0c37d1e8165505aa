//! Charts module - Pure renderers producing scenes, plus static export

pub mod bar;
pub mod export;
pub mod flow;
pub mod interaction;
pub mod scale;
pub mod scene;
pub mod treemap;

use crate::config::DashboardConfig;
use interaction::InteractionState;

/// Tunables shared by the renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSettings {
    pub top_brands: usize,
    pub top_ingredients: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            top_brands: 10,
            top_ingredients: 25,
        }
    }
}

impl From<&DashboardConfig> for ChartSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            top_brands: config.top_brands,
            top_ingredients: config.top_ingredients,
        }
    }
}

/// Layout inputs shared by every renderer: the drawing area and the current
/// interaction state. The chart data itself is passed alongside.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub width: f32,
    pub height: f32,
    pub interaction: &'a InteractionState,
}

impl<'a> RenderContext<'a> {
    pub fn new(width: f32, height: f32, interaction: &'a InteractionState) -> Self {
        Self {
            width,
            height,
            interaction,
        }
    }
}
