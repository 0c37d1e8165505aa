//! Cosmetics Dashboard Main Application
//! Main window with the control panel and the three chart panels.

use crate::charts::bar::{self, BarData};
use crate::charts::export::{export_scene, ExportError, ExportFormat};
use crate::charts::flow::{self, FlowData};
use crate::charts::interaction::{
    BarSelection, ChartKind, HoverTarget, InteractionEvent, InteractionState,
};
use crate::charts::scene::{MarkId, Scene};
use crate::charts::treemap::{self, TreemapData};
use crate::charts::{ChartSettings, RenderContext};
use crate::config::DashboardConfig;
use crate::data::{DataLoader, Dataset, FilterController, LabelFilter, Product};
use crate::gui::{ChartInput, ChartView, ControlPanel, ControlPanelAction, ResizeController};
use egui::{RichText, SidePanel};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const BAR_HEIGHT: f32 = 400.0;
const TREEMAP_HEIGHT: f32 = 520.0;
const PANEL_SPACING: f32 = 16.0;
const ALL_CHARTS: [ChartKind; 3] = [ChartKind::Bar, ChartKind::Treemap, ChartKind::Flow];

/// CSV loading result from background thread
enum LoadResult {
    Progress(String),
    Complete { dataset: Dataset, path: PathBuf },
    Error(String),
}

/// Aggregates behind the charts, rebuilt when their rows change.
#[derive(Default)]
struct ChartData {
    bar: BarData,
    treemap: TreemapData,
    treemap_title: Option<String>,
    flow: FlowData,
}

#[derive(Default)]
struct Scenes {
    bar: Scene,
    treemap: Scene,
    flow: Scene,
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    settings: ChartSettings,
    loader: DataLoader,
    control_panel: ControlPanel,
    filter: FilterController,
    interaction: InteractionState,
    resize: ResizeController,

    bar_view: ChartView,
    treemap_view: ChartView,
    flow_view: ChartView,
    data: ChartData,
    scenes: Scenes,
    /// Width of the chart area the scenes were laid out for.
    layout_width: f32,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let resize = ResizeController::new(
            Duration::from_millis(config.resize_debounce_ms),
            config.flow_min_width_delta,
        );
        let mut app = Self {
            settings: ChartSettings::from(&config),
            loader: DataLoader::new(),
            control_panel: ControlPanel::new(),
            filter: FilterController::default(),
            interaction: InteractionState::default(),
            resize,
            bar_view: ChartView::new(),
            treemap_view: ChartView::with_brush(treemap::brush_extent(0.0, TREEMAP_HEIGHT)),
            flow_view: ChartView::new(),
            data: ChartData::default(),
            scenes: Scenes::default(),
            layout_width: 0.0,
            load_rx: None,
            is_loading: false,
            config,
        };
        if let Some(path) = app.config.data_path.clone() {
            app.start_load(path);
        }
        app
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_load(path);
        }
    }

    /// Load a CSV in a background thread.
    fn start_load(&mut self, path: PathBuf) {
        self.control_panel.csv_path = Some(path.clone());
        self.control_panel.set_status("Loading CSV file...");
        self.is_loading = true;
        tracing::info!("Loading {}", path.display());

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress("Reading CSV file...".to_string()));
            match DataLoader::read_csv(&path) {
                Ok(dataset) => {
                    let _ = tx.send(LoadResult::Complete { dataset, path });
                }
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                }
            }
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_status(&status);
                    }
                    LoadResult::Complete { dataset, path } => {
                        self.on_dataset_loaded(dataset, path);
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(error) => {
                        tracing::error!("CSV load failed: {}", error);
                        self.control_panel.set_status(&format!("Error: {}", error));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    fn on_dataset_loaded(&mut self, dataset: Dataset, path: PathBuf) {
        let row_count = dataset.len();
        if dataset.is_empty() {
            tracing::warn!("{} contains no product rows", path.display());
        } else {
            tracing::info!("Loaded {} products from {}", row_count, path.display());
        }

        self.filter = FilterController::new(&dataset, &self.config.preferred_label);
        self.control_panel
            .update_filters(self.filter.options().to_vec(), self.filter.active().clone());
        self.loader.set_dataset(Arc::new(dataset), path);
        self.control_panel.csv_path = self.loader.get_file_path().cloned();
        self.control_panel.row_count = self.loader.get_row_count();
        self.control_panel
            .set_status(&format!("Loaded {} products", row_count));

        self.interaction.apply(InteractionEvent::Reset);
        self.refresh_data();
        self.rebuild_scenes(&ALL_CHARTS);
    }

    fn handle_filter_changed(&mut self, filter: LabelFilter) {
        if !self.filter.select(filter) {
            return;
        }
        tracing::debug!("Label filter set to {}", self.filter.active());
        let kinds = self.interaction.apply(InteractionEvent::Reset);
        self.refresh_data();
        self.rebuild_scenes(&kinds);
    }

    /// Rows behind the treemap: the clicked bar's products, else the filtered rows.
    fn treemap_rows<'a>(&self, dataset: &'a Dataset) -> Vec<&'a Product> {
        match &self.interaction.bar_selection {
            Some(selection) => bar::selection_rows(dataset, selection),
            None => self.filter.apply(dataset),
        }
    }

    /// Recompute every chart's aggregates from the active rows.
    fn refresh_data(&mut self) {
        let Some(dataset) = self.loader.get_dataset() else {
            self.data = ChartData::default();
            return;
        };
        let rows = self.filter.apply(&dataset);
        let treemap_rows = self.treemap_rows(&dataset);
        let (top_brands, top_ingredients) = (self.settings.top_brands, self.settings.top_ingredients);

        let ((bar, flow), treemap) = rayon::join(
            || {
                rayon::join(
                    || BarData::aggregate(&rows, top_brands),
                    || FlowData::aggregate(&rows),
                )
            },
            || TreemapData::aggregate(&treemap_rows, top_ingredients),
        );
        self.data = ChartData {
            bar,
            treemap,
            treemap_title: self.interaction.bar_selection.as_ref().map(bar::selection_title),
            flow,
        };
    }

    fn refresh_treemap_data(&mut self) {
        let Some(dataset) = self.loader.get_dataset() else {
            return;
        };
        let rows = self.treemap_rows(&dataset);
        self.data.treemap = TreemapData::aggregate(&rows, self.settings.top_ingredients);
        self.data.treemap_title = self.interaction.bar_selection.as_ref().map(bar::selection_title);
    }

    fn half_width(&self) -> f32 {
        ((self.layout_width - PANEL_SPACING) / 2.0).max(0.0)
    }

    /// Re-render the given charts from the cached aggregates.
    fn rebuild_scenes(&mut self, kinds: &[ChartKind]) {
        let (width, half) = (self.layout_width, self.half_width());
        let (data, interaction) = (&self.data, &self.interaction);
        let wants = |kind: ChartKind| kinds.contains(&kind);

        let (bar_scene, (treemap_scene, flow_scene)) = rayon::join(
            || {
                wants(ChartKind::Bar).then(|| {
                    let ctx = RenderContext::new(half, BAR_HEIGHT, interaction);
                    bar::render(&data.bar, &ctx)
                })
            },
            || {
                rayon::join(
                    || {
                        wants(ChartKind::Treemap).then(|| {
                            let ctx = RenderContext::new(half, TREEMAP_HEIGHT, interaction);
                            treemap::render(&data.treemap, &ctx, data.treemap_title.as_deref())
                        })
                    },
                    || {
                        wants(ChartKind::Flow).then(|| {
                            let ctx = RenderContext::new(width, 0.0, interaction);
                            flow::render(&data.flow, &ctx)
                        })
                    },
                )
            },
        );

        if let Some(scene) = bar_scene {
            self.scenes.bar = scene;
        }
        if let Some(scene) = treemap_scene {
            self.scenes.treemap = scene;
            self.treemap_view
                .set_brush_extent(treemap::brush_extent(half, TREEMAP_HEIGHT));
        }
        if let Some(scene) = flow_scene {
            self.scenes.flow = scene;
            self.resize.mark_flow_rendered(width);
        }
    }

    fn apply_events(&mut self, events: Vec<InteractionEvent>) {
        for event in events {
            let refresh_treemap = matches!(event, InteractionEvent::SelectBar(_));
            let kinds = self.interaction.apply(event);
            if refresh_treemap {
                self.refresh_treemap_data();
            }
            if !kinds.is_empty() {
                self.rebuild_scenes(&kinds);
            }
        }
    }

    fn handle_resize(&mut self, width: f32, height: f32, ctx: &egui::Context) {
        let now = Instant::now();
        self.resize.observe((width, height), now);

        if self.layout_width <= 0.0 {
            self.layout_width = width;
            self.rebuild_scenes(&ALL_CHARTS);
            return;
        }

        if let Some(action) = self.resize.poll(now) {
            self.layout_width = width;
            let mut kinds = self.interaction.apply(InteractionEvent::Relayout);
            if action.bar_and_treemap {
                kinds.extend([ChartKind::Bar, ChartKind::Treemap]);
            }
            if action.flow {
                kinds.push(ChartKind::Flow);
            }
            self.rebuild_scenes(&kinds);
        } else if let Some(wait) = self.resize.remaining(now) {
            ctx.request_repaint_after(wait);
        }
    }

    /// Export the three charts into a folder.
    fn handle_export(&mut self, format: ExportFormat) {
        if let Err(e) = self.loader.require_dataset() {
            self.control_panel.set_status(&format!("Error: {}", e));
            return;
        }

        let mut dialog = rfd::FileDialog::new();
        if let Some(dir) = &self.config.export_dir {
            dialog = dialog.set_directory(dir);
        }
        let Some(dir) = dialog.pick_folder() else {
            return;
        };

        match export_charts(&self.scenes, &dir, format) {
            Ok(paths) => {
                self.control_panel.set_status(&format!(
                    "Exported {} charts to {}",
                    paths.len(),
                    dir.display()
                ));
                if self.config.open_after_export {
                    if let Err(e) = open::that(&dir) {
                        tracing::warn!("Could not open {}: {}", dir.display(), e);
                    }
                }
            }
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    fn show_charts(&mut self, ui: &mut egui::Ui) {
        let hover = self.interaction.hover;
        let bar_tooltip = hover.and_then(|h| bar::tooltip(&self.data.bar, &h));
        let treemap_tooltip = hover.and_then(|h| treemap::tooltip(&self.data.treemap, &h));

        let mut events = Vec::new();
        ui.horizontal_top(|ui| {
            ui.vertical(|ui| {
                ui.label(RichText::new("Skin Type Suitability by Brand").strong());
                let input = self.bar_view.show(ui, &self.scenes.bar, bar_tooltip.as_ref());
                events.extend(bar_events(&input, &self.data.bar, hover));
            });
            ui.add_space(PANEL_SPACING);
            ui.vertical(|ui| {
                ui.label(RichText::new("Top Ingredients").strong());
                let input =
                    self.treemap_view
                        .show(ui, &self.scenes.treemap, treemap_tooltip.as_ref());
                events.extend(treemap_events(&input, hover));
            });
        });
        ui.add_space(PANEL_SPACING);
        ui.label(RichText::new("Brand → Price → Rating").strong());
        let input = self.flow_view.show(ui, &self.scenes.flow, None);
        events.extend(flow_events(&input));

        self.apply_events(events);
    }
}

/// Write each chart scene to `dir` in `format`, in parallel.
fn export_charts(scenes: &Scenes, dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>, ExportError> {
    let jobs = [
        ("bar_chart", &scenes.bar),
        ("treemap", &scenes.treemap),
        ("flow_diagram", &scenes.flow),
    ];
    jobs.par_iter()
        .map(|(name, scene)| {
            let path = dir.join(format!("{}.{}", name, format.extension()));
            export_scene(scene, &path).map(|_| path)
        })
        .collect()
}

/// Hover-out when the pointer no longer rests on a mark of the chart owning the hover.
fn hover_out(current: Option<HoverTarget>, kind: ChartKind) -> Option<InteractionEvent> {
    let owned = match current {
        Some(HoverTarget::Bar { .. }) => kind == ChartKind::Bar,
        Some(HoverTarget::Cell { .. }) => kind == ChartKind::Treemap,
        None => false,
    };
    owned.then_some(InteractionEvent::HoverOut)
}

fn bar_events(input: &ChartInput, data: &BarData, current: Option<HoverTarget>) -> Vec<InteractionEvent> {
    let mut events = Vec::new();
    match input.hover {
        Some((MarkId::Bar { brand, skin }, at)) => {
            events.push(InteractionEvent::Hover(HoverTarget::Bar { brand, skin, at }));
        }
        _ => events.extend(hover_out(current, ChartKind::Bar)),
    }
    if let Some((Some(MarkId::Bar { brand, skin }), _)) = input.click {
        if let Some(name) = data.brands.get(brand) {
            events.push(InteractionEvent::SelectBar(BarSelection {
                brand: name.clone(),
                skin,
            }));
        }
    }
    events
}

fn treemap_events(input: &ChartInput, current: Option<HoverTarget>) -> Vec<InteractionEvent> {
    let mut events = Vec::new();
    match input.hover {
        Some((MarkId::Cell(index), at)) => {
            events.push(InteractionEvent::Hover(HoverTarget::Cell { index, at }));
        }
        _ => events.extend(hover_out(current, ChartKind::Treemap)),
    }
    if let Some(brush) = input.brush {
        events.push(InteractionEvent::Brush(brush));
    }
    events
}

fn flow_events(input: &ChartInput) -> Vec<InteractionEvent> {
    match input.click {
        Some((Some(MarkId::Node(node)), _)) => vec![InteractionEvent::SelectNode(node)],
        Some(_) => vec![InteractionEvent::ClearFlowSelection],
        None => Vec::new(),
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::FilterChanged(filter) => {
                            self.handle_filter_changed(filter)
                        }
                        ControlPanelAction::Export(format) => self.handle_export(format),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Charts
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.loader.get_dataset().is_none() {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No Data").size(20.0));
                });
                return;
            }

            let available = ui.available_size();
            self.handle_resize(available.x, available.y, ctx);

            egui::ScrollArea::both().show(ui, |ui| {
                self.show_charts(ui);
            });
        });
    }
}
