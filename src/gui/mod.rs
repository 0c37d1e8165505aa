//! GUI module - User interface components

mod app;
mod chart_view;
mod control_panel;
mod resize;

pub use app::DashboardApp;
pub use chart_view::{ChartInput, ChartView};
pub use control_panel::{ControlPanel, ControlPanelAction};
pub use resize::ResizeController;
