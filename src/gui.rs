//! The eframe dashboard: a load screen, then Overview, KPI, Visualisations
//! and Analysis sections over one loaded table.

use crate::analyser::logic::io::SUPPORTED_EXTENSIONS;
use crate::analyser::logic::{
    Aggregator, ColumnTypeMap, DataOverview, KpiSummary, StatsRecord, classify, clean_df,
    data_overview, describe, kpi_summary, load_df, save_df,
};
use crate::charts::{Chart, ChartRequest, correlation_heatmap};
use crate::config::DashboardConfig;
use crate::demo::DemoDataset;
use anyhow::Result;
use eframe::egui;
use polars::prelude::DataFrame;
use rfd::FileDialog;
use serde::{Deserialize, Serialize};

pub mod plots;
pub mod sections;
pub mod tables;

use tables::TablePreview;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Section {
    #[default]
    Overview,
    Kpi,
    Visualisations,
    Analysis,
}

impl Section {
    pub const ALL: [Self; 4] = [Self::Overview, Self::Kpi, Self::Visualisations, Self::Analysis];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Kpi => "KPI",
            Self::Visualisations => "Visualisations",
            Self::Analysis => "Analysis",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum OverviewTab {
    #[default]
    Preview,
    Statistics,
    Info,
}

/// A loaded table plus everything derived from it that every frame needs.
pub struct LoadedData {
    pub source: String,
    pub df: DataFrame,
    pub types: ColumnTypeMap,
    pub preview: TablePreview,
    pub stats: Vec<(String, StatsRecord)>,
    pub overview: DataOverview,
    pub kpi: KpiSummary,
    pub heatmap: Option<Chart>,
}

impl LoadedData {
    pub fn new(source: String, df: DataFrame, preview_rows: usize) -> Result<Self> {
        let heatmap = if classify(&df).numeric.len() >= 2 {
            Some(correlation_heatmap(&df, None)?)
        } else {
            None
        };
        Ok(Self {
            preview: TablePreview::from_df(&df, preview_rows)?,
            stats: describe(&df)?,
            overview: data_overview(&df),
            kpi: kpi_summary(&df)?,
            types: classify(&df),
            heatmap,
            source,
            df,
        })
    }
}

/// Results of the on-demand analysis actions.
#[derive(Default)]
pub struct AnalysisResults {
    pub chart: Option<Chart>,
    pub grouped: Option<(TablePreview, Chart)>,
    pub top: Option<TablePreview>,
    pub outliers: Option<(usize, TablePreview)>,
}

type LoadReceiver = crossbeam_channel::Receiver<Result<LoadedData>>;

#[derive(Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardApp {
    section: Section,
    overview_tab: OverviewTab,
    demo_choice: DemoDataset,
    chart_request: ChartRequest,
    group_column: Option<String>,
    value_column: Option<String>,
    aggregator: Aggregator,
    top_column: Option<String>,
    top_n: usize,
    outlier_column: Option<String>,

    #[serde(skip)]
    config: DashboardConfig,
    #[serde(skip)]
    data: Option<LoadedData>,
    #[serde(skip)]
    results: AnalysisResults,
    #[serde(skip)]
    status: String,
    #[serde(skip)]
    is_loading: bool,
    #[serde(skip)]
    receiver: Option<LoadReceiver>,
}

impl Default for DashboardApp {
    fn default() -> Self {
        Self::with_config(DashboardConfig::default())
    }
}

impl DashboardApp {
    pub fn with_config(config: DashboardConfig) -> Self {
        Self {
            section: Section::default(),
            overview_tab: OverviewTab::default(),
            demo_choice: DemoDataset::default(),
            chart_request: ChartRequest::default(),
            group_column: None,
            value_column: None,
            aggregator: config.default_aggregator,
            top_column: None,
            top_n: 10,
            outlier_column: None,
            config,
            data: None,
            results: AnalysisResults::default(),
            status: String::new(),
            is_loading: false,
            receiver: None,
        }
    }

    pub fn new(cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        crate::theme::apply_dashboard_theme(&cc.egui_ctx);
        if let Some(storage) = cc.storage
            && let Some(mut app) = eframe::get_value::<Self>(storage, eframe::APP_KEY)
        {
            app.config = config;
            return app;
        }
        Self::with_config(config)
    }

    fn report_error(&mut self, action: &str, err: impl std::fmt::Display) {
        tracing::error!("{action} failed: {err}");
        self.status = format!("Error: {err}");
    }

    fn poll_loader(&mut self) {
        let Some(rx) = &self.receiver else {
            return;
        };
        let Ok(result) = rx.try_recv() else {
            return;
        };
        self.is_loading = false;
        self.receiver = None;
        match result {
            Ok(data) => {
                self.status = format!(
                    "Loaded {} ({} rows, {} columns)",
                    data.source,
                    data.df.height(),
                    data.df.width()
                );
                self.set_data(data);
            }
            Err(e) => self.report_error("Loading", format!("{e:#}")),
        }
    }

    fn set_data(&mut self, data: LoadedData) {
        let keep = |sel: &Option<String>| sel.as_ref().is_some_and(|c| data.df.column(c).is_ok());
        if !keep(&self.chart_request.x) {
            self.chart_request.x = None;
        }
        if !keep(&self.chart_request.y) {
            self.chart_request.y = None;
        }
        for sel in [
            &mut self.group_column,
            &mut self.value_column,
            &mut self.top_column,
            &mut self.outlier_column,
        ] {
            if !sel.as_ref().is_some_and(|c| data.df.column(c).is_ok()) {
                *sel = None;
            }
        }
        self.results = AnalysisResults::default();
        self.data = Some(data);
    }

    fn spawn_load(
        &mut self,
        ctx: &egui::Context,
        job: impl FnOnce() -> Result<(String, DataFrame)> + Send + 'static,
    ) {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.receiver = Some(rx);
        self.is_loading = true;
        self.status = "Loading...".to_owned();

        let ctx = ctx.clone();
        let preview_rows = self.config.preview_row_limit;
        std::thread::spawn(move || {
            let result = job().and_then(|(source, df)| LoadedData::new(source, df, preview_rows));
            if tx.send(result).is_err() {
                tracing::error!("Dashboard closed before loading finished");
            }
            ctx.request_repaint();
        });
    }

    fn start_file_load(&mut self, ctx: &egui::Context) {
        let Some(file) = FileDialog::new()
            .add_filter("Data Files", &SUPPORTED_EXTENSIONS)
            .add_filter("CSV", &["csv"])
            .add_filter("Excel", &["xlsx", "xls", "xlsm", "xlsb", "ods"])
            .pick_file()
        else {
            return;
        };
        let options = self.config.load_options();
        self.spawn_load(ctx, move || {
            let df = load_df(&file, &options)?;
            Ok((file.display().to_string(), df))
        });
    }

    fn start_demo_load(&mut self, ctx: &egui::Context) {
        let dataset = self.demo_choice;
        let (records, seed) = (self.config.demo_records, self.config.demo_seed);
        self.spawn_load(ctx, move || {
            let df = dataset.generate(records, seed)?;
            Ok((format!("demo: {}", dataset.label()), df))
        });
    }

    fn clean_current(&mut self) {
        let Some(data) = &self.data else {
            return;
        };
        let before = data.df.height();
        let source = data.source.clone();
        let result = clean_df(&data.df)
            .map_err(anyhow::Error::from)
            .and_then(|df| LoadedData::new(source, df, self.config.preview_row_limit));
        match result {
            Ok(cleaned) => {
                self.status = format!(
                    "Cleaned: {before} rows -> {} rows, numeric gaps filled with medians",
                    cleaned.df.height()
                );
                self.set_data(cleaned);
            }
            Err(e) => self.report_error("Cleaning", format!("{e:#}")),
        }
    }

    fn export_current(&mut self) {
        let Some(data) = &self.data else {
            return;
        };
        let Some(path) = FileDialog::new()
            .add_filter("CSV", &["csv"])
            .add_filter("Parquet", &["parquet"])
            .set_file_name("export.csv")
            .save_file()
        else {
            return;
        };
        let mut df = data.df.clone();
        match save_df(&mut df, &path) {
            Ok(()) => self.status = format!("Exported to {}", path.display()),
            Err(e) => self.report_error("Export", format!("{e:#}")),
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar")
            .frame(crate::theme::top_bar_frame())
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(egui::RichText::new("Sales Analytics").strong());
                    ui.separator();

                    if self.data.is_some() {
                        for section in Section::ALL {
                            ui.selectable_value(&mut self.section, section, section.label());
                        }
                        ui.separator();
                        ui.add_enabled_ui(!self.is_loading, |ui| {
                            if ui.button("Clean data").clicked() {
                                self.clean_current();
                            }
                            if ui.button("Export CSV").clicked() {
                                self.export_current();
                            }
                            if ui.button("Load new data").clicked() {
                                self.data = None;
                                self.results = AnalysisResults::default();
                                self.status.clear();
                            }
                        });
                    }
                });

                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });
    }

    fn render_load_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(100.0);
                    ui.heading("Loading data...");
                    ui.spinner();
                });
                return;
            }

            ui.add_space(crate::theme::SPACING_LARGE);
            crate::theme::card_frame(ui).show(ui, |ui| {
                ui.heading("Open a file");
                ui.label(format!("Supported: {}", SUPPORTED_EXTENSIONS.join(", ")));
                if ui.button("Choose file...").clicked() {
                    self.start_file_load(ctx);
                }
            });

            ui.add_space(crate::theme::SPACING_MEDIUM);
            crate::theme::card_frame(ui).show(ui, |ui| {
                ui.heading("Or try a demo dataset");
                egui::ComboBox::from_id_salt("demo_dataset")
                    .selected_text(self.demo_choice.label())
                    .show_ui(ui, |ui| {
                        for dataset in DemoDataset::ALL {
                            ui.selectable_value(&mut self.demo_choice, dataset, dataset.label());
                        }
                    });
                ui.label(egui::RichText::new(self.demo_choice.description()).weak());
                if ui.button("Load demo").clicked() {
                    self.start_demo_load(ctx);
                }
            });
        });
    }
}

impl eframe::App for DashboardApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader();
        self.render_top_bar(ctx);

        if self.data.is_none() {
            self.render_load_screen(ctx);
            return;
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| match self.section {
                    Section::Overview => sections::render_overview(self, ui),
                    Section::Kpi => sections::render_kpi(self, ui),
                    Section::Visualisations => sections::render_visualisations(self, ui),
                    Section::Analysis => sections::render_analysis(self, ui),
                });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loaded_data_derives_views() -> Result<()> {
        let df = DemoDataset::Sales.generate(120, 3)?;
        let data = LoadedData::new("demo".to_owned(), df, 25)?;

        assert_eq!(data.preview.rows.len(), 25);
        assert_eq!(data.overview.row_count, 120);
        assert_eq!(data.kpi.revenue_column.as_deref(), Some("Revenue"));
        assert!(data.heatmap.is_some());
        assert_eq!(data.stats.len(), data.types.numeric.len());
        Ok(())
    }

    #[test]
    fn test_set_data_drops_stale_selections() -> Result<()> {
        let mut app = DashboardApp::default();
        app.group_column = Some("Region".to_owned());
        app.value_column = Some("Nope".to_owned());

        let df = DemoDataset::Sales.generate(30, 1)?;
        app.set_data(LoadedData::new("demo".to_owned(), df, 10)?);
        assert_eq!(app.group_column.as_deref(), Some("Region"));
        assert_eq!(app.value_column, None);
        Ok(())
    }
}
