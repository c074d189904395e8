use super::plots::{render_chart, render_heatmap};
use super::tables::{TablePreview, render_preview, render_stats_table};
use super::{DashboardApp, OverviewTab};
use crate::analyser::logic::{
    Aggregator, detect_outliers, filter_rows, group_and_aggregate, top_n,
};
use crate::charts::{ChartKind, bar_chart, build_chart};
use crate::utils::{fmt_bytes, fmt_money, fmt_opt};
use eframe::egui;

const PLOT_HEIGHT: f32 = 320.0;

/// Combo box over `options`; an empty selection reads "(choose)".
fn column_picker(
    ui: &mut egui::Ui,
    id: &str,
    label: &str,
    selected: &mut Option<String>,
    options: &[String],
) {
    ui.horizontal(|ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(selected.as_deref().unwrap_or("(choose)"))
            .show_ui(ui, |ui| {
                for name in options {
                    ui.selectable_value(selected, Some(name.clone()), name);
                }
            });
    });
}

fn metric_card(ui: &mut egui::Ui, title: &str, value: String) {
    crate::theme::card_frame(ui).show(ui, |ui| {
        ui.set_min_width(160.0);
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(title).weak());
            ui.heading(value);
        });
    });
}

pub fn render_overview(app: &mut DashboardApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.selectable_value(&mut app.overview_tab, OverviewTab::Preview, "Data preview");
        ui.selectable_value(&mut app.overview_tab, OverviewTab::Statistics, "Statistics");
        ui.selectable_value(&mut app.overview_tab, OverviewTab::Info, "Info");
    });
    ui.separator();

    let Some(data) = &app.data else {
        return;
    };
    match app.overview_tab {
        OverviewTab::Preview => render_preview(ui, "data_preview", &data.preview),
        OverviewTab::Statistics => render_stats_table(ui, &data.stats),
        OverviewTab::Info => {
            let o = &data.overview;
            egui::Grid::new("data_info_grid")
                .num_columns(2)
                .spacing([40.0, 4.0])
                .show(ui, |ui| {
                    ui.label("Source:");
                    ui.label(&data.source);
                    ui.end_row();
                    ui.label("Rows:");
                    ui.label(o.row_count.to_string());
                    ui.end_row();
                    ui.label("Columns:");
                    ui.label(o.column_count.to_string());
                    ui.end_row();
                    ui.label("Missing values:");
                    ui.label(o.missing_total.to_string());
                    ui.end_row();
                    ui.label("Memory:");
                    ui.label(fmt_bytes(o.estimated_bytes));
                    ui.end_row();
                });

            ui.add_space(crate::theme::SPACING_MEDIUM);
            egui::Grid::new("column_info_grid")
                .striped(true)
                .num_columns(4)
                .show(ui, |ui| {
                    ui.strong("Column");
                    ui.strong("Type");
                    ui.strong("Kind");
                    ui.strong("Missing");
                    ui.end_row();
                    for c in &o.columns {
                        ui.label(&c.name);
                        ui.label(&c.dtype);
                        ui.label(data.types.kind_of(&c.name).map_or("other", |k| k.as_str()));
                        ui.label(c.nulls.to_string());
                        ui.end_row();
                    }
                });
        }
    }
}

pub fn render_kpi(app: &mut DashboardApp, ui: &mut egui::Ui) {
    let Some(data) = &app.data else {
        return;
    };
    let kpi = &data.kpi;

    ui.horizontal_wrapped(|ui| {
        metric_card(ui, "Records", kpi.record_count.to_string());
        metric_card(ui, "Columns", kpi.column_count.to_string());
        if let Some(total) = kpi.total_revenue {
            metric_card(ui, "Total revenue", fmt_money(total));
        }
        if let Some(avg) = kpi.average_revenue {
            metric_card(ui, "Average revenue", fmt_money(avg));
        }
        if let Some(growth) = kpi.growth_pct {
            metric_card(ui, "Growth", format!("{growth:+.1}%"));
        }
    });

    match &kpi.revenue_column {
        Some(name) => {
            ui.label(egui::RichText::new(format!("Revenue column: {name}")).weak());
        }
        None => {
            ui.label("No revenue column found (looked for revenue, sales or amount).");
        }
    }
}

pub fn render_visualisations(app: &mut DashboardApp, ui: &mut egui::Ui) {
    let Some(data) = &app.data else {
        return;
    };
    let all_columns: Vec<String> = data
        .df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    let numeric = data.types.numeric.clone();

    ui.horizontal(|ui| {
        ui.label("Chart type:");
        egui::ComboBox::from_id_salt("chart_kind")
            .selected_text(app.chart_request.kind.label())
            .show_ui(ui, |ui| {
                for kind in ChartKind::ALL {
                    ui.selectable_value(&mut app.chart_request.kind, kind, kind.label());
                }
            });
    });

    let kind = app.chart_request.kind;
    match kind {
        ChartKind::Heatmap => {}
        ChartKind::Histogram => {
            column_picker(ui, "chart_x", "Column:", &mut app.chart_request.x, &numeric);
        }
        ChartKind::BoxPlot => {
            column_picker(ui, "chart_y", "Value:", &mut app.chart_request.y, &numeric);
            column_picker(ui, "chart_x", "Group by:", &mut app.chart_request.x, &all_columns);
        }
        _ => {
            column_picker(ui, "chart_x", "X axis:", &mut app.chart_request.x, &all_columns);
            column_picker(ui, "chart_y", "Y axis:", &mut app.chart_request.y, &numeric);
        }
    }

    if ui.button("Build chart").clicked()
        && let Some(data) = &app.data
    {
        match build_chart(&data.df, &app.chart_request) {
            Ok(chart) => app.results.chart = Some(chart),
            Err(e) => {
                app.results.chart = None;
                if e.is_caller_error() {
                    // A selection that does not fit the chart type.
                    app.status = e.to_string();
                } else {
                    app.report_error("Chart", e);
                }
            }
        }
    }

    if let Some(chart) = &app.results.chart {
        ui.add_space(crate::theme::SPACING_MEDIUM);
        render_chart(ui, "visualisation", chart, PLOT_HEIGHT);
    }
}

pub fn render_analysis(app: &mut DashboardApp, ui: &mut egui::Ui) {
    let Some(data) = &app.data else {
        return;
    };
    let all_columns: Vec<String> = data
        .df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    let numeric = data.types.numeric.clone();

    ui.collapsing("Correlation", |ui| match &data.heatmap {
        Some(chart) => {
            ui.strong(&chart.title);
            if let crate::charts::ChartData::Matrix { matrix } = &chart.data {
                render_heatmap(ui, "correlation_heatmap", matrix);
            }
        }
        None => {
            ui.label("Needs at least two numeric columns.");
        }
    });

    ui.collapsing("Top records", |ui| {
        column_picker(ui, "top_column", "By:", &mut app.top_column, &numeric);
        ui.horizontal(|ui| {
            ui.label("Rows:");
            ui.add(egui::DragValue::new(&mut app.top_n).range(1..=100));
        });
        if ui.button("Show top records").clicked()
            && let Some(column) = app.top_column.clone()
        {
            let result = top_n(&data.df, &column, app.top_n)
                .and_then(|df| TablePreview::from_df(&df, app.top_n));
            match result {
                Ok(preview) => app.results.top = Some(preview),
                Err(e) => {
                    tracing::error!("Top records failed: {e}");
                    app.status = format!("Error: {e}");
                }
            }
        }
        if let Some(preview) = &app.results.top {
            render_preview(ui, "top_records", preview);
        }
    });

    ui.collapsing("Group and aggregate", |ui| {
        column_picker(ui, "group_column", "Group by:", &mut app.group_column, &all_columns);
        column_picker(ui, "value_column", "Value:", &mut app.value_column, &all_columns);
        ui.horizontal(|ui| {
            ui.label("Aggregator:");
            egui::ComboBox::from_id_salt("aggregator")
                .selected_text(app.aggregator.as_str())
                .show_ui(ui, |ui| {
                    for aggregator in Aggregator::ALL {
                        ui.selectable_value(&mut app.aggregator, aggregator, aggregator.as_str());
                    }
                });
        });

        if ui.button("Aggregate").clicked()
            && let (Some(group), Some(value)) = (app.group_column.clone(), app.value_column.clone())
        {
            let aggregator = app.aggregator;
            let result = group_and_aggregate(&data.df, &group, &value, aggregator).and_then(|df| {
                let metric = df
                    .get_column_names()
                    .get(1)
                    .map(|n| n.to_string())
                    .unwrap_or_default();
                let title = format!("{aggregator} of {value} by {group}");
                let chart = bar_chart(&df, &group, &metric, Some(&title))?;
                Ok((TablePreview::from_df(&df, usize::MAX)?, chart))
            });
            match result {
                Ok(grouped) => app.results.grouped = Some(grouped),
                Err(e) => {
                    tracing::error!("Aggregation failed: {e}");
                    app.status = format!("Error: {e}");
                }
            }
        }
        if let Some((preview, chart)) = &app.results.grouped {
            render_chart(ui, "grouped_chart", chart, PLOT_HEIGHT);
            render_preview(ui, "grouped_table", preview);
        }
    });

    ui.collapsing("Outliers", |ui| {
        column_picker(ui, "outlier_column", "Column:", &mut app.outlier_column, &numeric);
        ui.label(
            egui::RichText::new(format!(
                "Method: {} (values beyond 1.5 x IQR from the quartiles)",
                app.config.outlier_method
            ))
            .weak(),
        );
        if ui.button("Detect outliers").clicked()
            && let Some(column) = app.outlier_column.clone()
        {
            let method = app.config.outlier_method.as_str();
            let result = detect_outliers(&data.df, &column, method).and_then(|mask| {
                let flagged = filter_rows(&data.df, &mask)?;
                Ok((flagged.height(), TablePreview::from_df(&flagged, app.config.preview_row_limit)?))
            });
            match result {
                Ok(found) => app.results.outliers = Some(found),
                Err(e) => {
                    tracing::error!("Outlier detection failed: {e}");
                    app.status = format!("Error: {e}");
                }
            }
        }
        if let Some((count, preview)) = &app.results.outliers {
            ui.label(format!("{count} outliers found"));
            render_preview(ui, "outlier_rows", preview);
        }
    });

    if let Some(stats) = app
        .outlier_column
        .as_ref()
        .and_then(|c| data.stats.iter().find(|(n, _)| n == c))
    {
        ui.label(
            egui::RichText::new(format!(
                "{}: median {}, IQR {}",
                stats.0,
                fmt_opt(Some(stats.1.median)),
                fmt_opt(Some(stats.1.iqr()))
            ))
            .weak(),
        );
    }
}
