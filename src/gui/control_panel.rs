//! Control Panel Widget
//! Left side panel with the data source, the label filter and export actions.

use crate::charts::export::ExportFormat;
use crate::data::LabelFilter;
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// Left side control panel.
pub struct ControlPanel {
    pub csv_path: Option<PathBuf>,
    pub row_count: usize,
    pub filter_options: Vec<LabelFilter>,
    pub active_filter: LabelFilter,
    pub export_format: ExportFormat,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            csv_path: None,
            row_count: 0,
            filter_options: Vec::new(),
            active_filter: LabelFilter::All,
            export_format: ExportFormat::Svg,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the dropdown after a dataset load.
    pub fn update_filters(&mut self, options: Vec<LabelFilter>, active: LabelFilter) {
        self.filter_options = options;
        self.active_filter = active;
        self.export_enabled = true;
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("💄 Cosmetics Dashboard")
                    .size(20.0)
                    .color(Color32::from_rgb(0, 111, 96)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
                if self.row_count > 0 {
                    ui.label(
                        RichText::new(format!("{} products", self.row_count))
                            .size(11.0)
                            .color(Color32::GRAY),
                    );
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filter Section =====
        ui.label(RichText::new("🔎 Product Label").size(14.0).strong());
        ui.add_space(5.0);

        ComboBox::from_id_salt("label_filter")
            .width(200.0)
            .selected_text(self.active_filter.to_string())
            .show_ui(ui, |ui| {
                for option in &self.filter_options {
                    if ui
                        .selectable_label(self.active_filter == *option, option.to_string())
                        .clicked()
                        && self.active_filter != *option
                    {
                        self.active_filter = option.clone();
                        action = ControlPanelAction::FilterChanged(option.clone());
                    }
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.label(RichText::new("💾 Export").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            for format in ExportFormat::ALL {
                ui.radio_value(
                    &mut self.export_format,
                    format,
                    format.extension().to_ascii_uppercase(),
                );
            }
        });
        ui.add_space(8.0);

        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("📄 Export Charts").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Export(self.export_format);
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Loaded") || self.status.starts_with("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    FilterChanged(LabelFilter),
    Export(ExportFormat),
}
