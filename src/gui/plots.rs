//! Draws a [`Chart`] with `egui_plot`, or with the painter for the shapes
//! `egui_plot` has no primitive for (pie, heatmap).

use crate::analyser::logic::CorrelationMatrix;
use crate::charts::{AxisValues, Bin, BoxSummary, Chart, ChartData, ChartKind, Slice};
use eframe::egui;
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, Points};

pub fn render_chart(ui: &mut egui::Ui, id: &str, chart: &Chart, height: f32) {
    ui.vertical(|ui| {
        ui.strong(&chart.title);
        match &chart.data {
            ChartData::Series { x, y } => render_series(ui, id, chart, x, y, height),
            ChartData::Slices { slices } => render_pie(ui, slices, height),
            ChartData::Matrix { matrix } => render_heatmap(ui, id, matrix),
            ChartData::Bins { bins } => render_histogram(ui, id, bins, height),
            ChartData::Boxes { boxes } => render_boxes(ui, id, boxes, height),
        }
    });
}

/// Plot x coordinates and, for label axes, the tick labels.
fn x_coordinates(x: &AxisValues) -> (Vec<Option<f64>>, Vec<String>) {
    match x {
        AxisValues::Numbers(v) => (v.clone(), Vec::new()),
        AxisValues::Timestamps(v) => (v.iter().map(|t| t.map(|t| t as f64)).collect(), Vec::new()),
        AxisValues::Labels(v) => (
            (0..v.len()).map(|i| Some(i as f64)).collect(),
            v.iter()
                .map(|l| l.clone().unwrap_or_else(|| crate::charts::MISSING_LABEL.to_owned()))
                .collect(),
        ),
    }
}

fn format_timestamp(ms: f64) -> String {
    chrono::DateTime::from_timestamp_millis(ms as i64)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn render_series(
    ui: &mut egui::Ui,
    id: &str,
    chart: &Chart,
    x: &AxisValues,
    y: &[Option<f64>],
    height: f32,
) {
    let (xs, labels) = x_coordinates(x);
    let mut points: Vec<[f64; 2]> = xs
        .iter()
        .zip(y)
        .filter_map(|(x, y)| Some([(*x)?, (*y)?]))
        .collect();
    if points.is_empty() {
        ui.label("No values to plot.");
        return;
    }

    let is_time = matches!(x, AxisValues::Timestamps(_));
    let mut plot = Plot::new(id.to_owned())
        .height(height)
        .legend(Legend::default())
        .x_axis_label(chart.x_label.clone().unwrap_or_default())
        .y_axis_label(chart.y_label.clone().unwrap_or_default());
    if is_time {
        plot = plot.x_axis_formatter(|mark, _range| format_timestamp(mark.value));
    } else if !labels.is_empty() {
        let labels = labels.clone();
        plot = plot.x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > f64::EPSILON || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        });
    }

    let name = chart.y_label.clone().unwrap_or_default();
    plot.show(ui, |plot_ui| match chart.kind {
        ChartKind::Bar => {
            let width = if labels.is_empty() { bar_width(&points) } else { 0.7 };
            let bars = points
                .iter()
                .map(|p| Bar::new(p[0], p[1]).width(width))
                .collect();
            plot_ui.bar_chart(
                BarChart::new(name.clone(), bars).color(crate::theme::ACCENT_COLOR),
            );
        }
        ChartKind::Scatter => {
            plot_ui.points(
                Points::new(name.clone(), points.clone())
                    .radius(2.5)
                    .color(crate::theme::ACCENT_COLOR),
            );
        }
        _ => {
            if !labels.is_empty() || is_time {
                points.sort_by(|a, b| a[0].total_cmp(&b[0]));
            }
            plot_ui.line(
                Line::new(name.clone(), points.clone())
                    .color(crate::theme::ACCENT_COLOR)
                    .width(2.0),
            );
        }
    });
}

/// Bars as wide as the smallest gap between neighbouring x values.
fn bar_width(points: &[[f64; 2]]) -> f64 {
    let mut xs: Vec<f64> = points.iter().map(|p| p[0]).collect();
    xs.sort_by(f64::total_cmp);
    xs.windows(2)
        .filter_map(|w| match w {
            [a, b] if b > a => Some(b - a),
            _ => None,
        })
        .reduce(f64::min)
        .map_or(1.0, |gap| gap * 0.8)
}

fn render_histogram(ui: &mut egui::Ui, id: &str, bins: &[Bin], height: f32) {
    if bins.is_empty() {
        ui.label("No values to plot.");
        return;
    }
    let bars = bins
        .iter()
        .map(|b| {
            Bar::new(b.start + b.width / 2.0, b.count as f64)
                .width(b.width)
                .stroke(egui::Stroke::new(0.5, crate::theme::ACCENT_COLOR))
        })
        .collect();
    let chart = BarChart::new("Count", bars)
        .color(crate::theme::ACCENT_COLOR.linear_multiply(0.5))
        .element_formatter(Box::new(|bar, _| {
            format!("Value: {:.4}\nCount: {}", bar.argument, bar.value)
        }));

    Plot::new(id.to_owned())
        .height(height)
        .include_y(0.0)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

fn render_boxes(ui: &mut egui::Ui, id: &str, boxes: &[BoxSummary], height: f32) {
    let elems: Vec<BoxElem> = boxes
        .iter()
        .enumerate()
        .filter(|(_, b)| b.stats.median.is_finite())
        .map(|(i, b)| {
            let s = &b.stats;
            BoxElem::new(i as f64, BoxSpread::new(s.min, s.q25, s.median, s.q75, s.max))
                .name(&b.label)
                .box_width(0.5)
        })
        .collect();
    if elems.is_empty() {
        ui.label("No values to plot.");
        return;
    }
    let labels: Vec<String> = boxes.iter().map(|b| b.label.clone()).collect();

    Plot::new(id.to_owned())
        .height(height)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > f64::EPSILON || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new("Distribution", elems).color(crate::theme::ACCENT_COLOR));
        });
}

fn render_pie(ui: &mut egui::Ui, slices: &[Slice], height: f32) {
    let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
    if total <= 0.0 {
        ui.label("No positive values to plot.");
        return;
    }

    ui.horizontal(|ui| {
        let radius = height / 2.0;
        let (rect, _response) =
            ui.allocate_exact_size(egui::vec2(radius * 2.0, radius * 2.0), egui::Sense::hover());
        let center = rect.center();
        let painter = ui.painter();

        let mut start_angle = -std::f32::consts::FRAC_PI_2;
        for (slice, color) in slices.iter().zip(crate::theme::SERIES_COLORS.iter().cycle()) {
            let sweep = (slice.value.max(0.0) / total) as f32 * std::f32::consts::TAU;
            if sweep < 0.001 {
                continue;
            }
            // Convex pieces, so large slices are split into steps of at most a quarter turn.
            let steps = (sweep / std::f32::consts::FRAC_PI_2).ceil().max(1.0) as usize;
            let step = sweep / steps as f32;
            for s in 0..steps {
                let from = start_angle + s as f32 * step;
                let n_points = ((step / (std::f32::consts::PI / 32.0)).ceil() as usize).max(3);
                let mut points = vec![center];
                for j in 0..=n_points {
                    let angle = from + (j as f32 / n_points as f32) * step;
                    points.push(center + egui::vec2(angle.cos(), angle.sin()) * radius);
                }
                painter.add(egui::Shape::convex_polygon(
                    points,
                    *color,
                    egui::Stroke::new(1.0, color.gamma_multiply(0.5)),
                ));
            }
            start_angle += sweep;
        }

        ui.vertical(|ui| {
            for (slice, color) in slices.iter().zip(crate::theme::SERIES_COLORS.iter().cycle()) {
                ui.horizontal(|ui| {
                    let (swatch, _) =
                        ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                    ui.painter().rect_filled(swatch, 2.0, *color);
                    ui.label(format!(
                        "{}: {} ({:.1}%)",
                        slice.label,
                        crate::utils::fmt_money(slice.value),
                        slice.value / total * 100.0
                    ));
                });
            }
        });
    });
}

pub fn render_heatmap(ui: &mut egui::Ui, id: &str, matrix: &CorrelationMatrix) {
    if matrix.is_empty() {
        ui.label("Needs at least one numeric column.");
        return;
    }

    let n = matrix.len();
    let cell_size = 48.0;
    let label_width = 140.0;
    let header_height = 24.0;

    egui::ScrollArea::both().id_salt(id).show(ui, |ui| {
        let (rect, _response) = ui.allocate_exact_size(
            egui::vec2(
                label_width + n as f32 * cell_size + 20.0,
                header_height + n as f32 * cell_size + 20.0,
            ),
            egui::Sense::hover(),
        );
        let painter = ui.painter();
        let text_color = ui.visuals().text_color();

        for (j, name) in matrix.columns.iter().enumerate() {
            painter.text(
                rect.min
                    + egui::vec2(
                        label_width + j as f32 * cell_size + cell_size / 2.0,
                        header_height - 4.0,
                    ),
                egui::Align2::CENTER_BOTTOM,
                name.chars().take(8).collect::<String>(),
                egui::FontId::proportional(10.0),
                text_color,
            );
        }

        for (i, (row_name, row)) in matrix.columns.iter().zip(&matrix.data).enumerate() {
            painter.text(
                rect.min
                    + egui::vec2(
                        label_width - 10.0,
                        header_height + i as f32 * cell_size + cell_size / 2.0,
                    ),
                egui::Align2::RIGHT_CENTER,
                row_name.chars().take(24).collect::<String>(),
                egui::FontId::proportional(11.0),
                text_color,
            );

            for (j, &val) in row.iter().enumerate() {
                let cell = egui::Rect::from_min_size(
                    rect.min
                        + egui::vec2(
                            label_width + j as f32 * cell_size,
                            header_height + i as f32 * cell_size,
                        ),
                    egui::vec2(cell_size, cell_size),
                );
                painter.rect_filled(cell.shrink(1.0), 4.0, ui.visuals().extreme_bg_color);
                painter.rect_filled(cell.shrink(1.0), 4.0, crate::theme::correlation_color(val));
                painter.text(
                    cell.center(),
                    egui::Align2::CENTER_CENTER,
                    if val.is_finite() {
                        format!("{val:.2}")
                    } else {
                        "n/a".to_owned()
                    },
                    egui::FontId::proportional(10.0),
                    egui::Color32::WHITE,
                );
            }
        }
    });
}
