use crate::analyser::logic::StatsRecord;
use crate::analyser::logic::profiling::label_values;
use crate::error::Result;
use crate::utils::fmt_f64;
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use polars::prelude::DataFrame;

/// The first rows of a table rendered as text, ready to draw every frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TablePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows in the source table, which may exceed `rows.len()`.
    pub total_rows: usize,
}

impl TablePreview {
    pub fn from_df(df: &DataFrame, limit: usize) -> Result<Self> {
        let head = df.head(Some(limit));
        let headers = head
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();

        let columns = head
            .get_columns()
            .iter()
            .map(label_values)
            .collect::<Result<Vec<_>>>()?;
        let rows = (0..head.height())
            .map(|i| {
                columns
                    .iter()
                    .map(|c| c.get(i).cloned().flatten().unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(Self {
            headers,
            rows,
            total_rows: df.height(),
        })
    }
}

pub fn render_preview(ui: &mut egui::Ui, id: &str, preview: &TablePreview) {
    if preview.headers.is_empty() {
        ui.label("Nothing to show.");
        return;
    }
    if preview.total_rows > preview.rows.len() {
        ui.label(
            egui::RichText::new(format!(
                "Showing {} of {} rows",
                preview.rows.len(),
                preview.total_rows
            ))
            .weak(),
        );
    }

    ui.push_id(id, |ui| {
        egui::ScrollArea::horizontal().show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(Column::auto().at_least(60.0), preview.headers.len())
                .min_scrolled_height(0.0)
                .max_scroll_height(400.0)
                .header(20.0, |mut header| {
                    for name in &preview.headers {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, preview.rows.len(), |mut row| {
                        let Some(cells) = preview.rows.get(row.index()) else {
                            return;
                        };
                        for cell in cells {
                            row.col(|ui| {
                                ui.label(cell);
                            });
                        }
                    });
                });
        });
    });
}

pub fn render_stats_table(ui: &mut egui::Ui, stats: &[(String, StatsRecord)]) {
    if stats.is_empty() {
        ui.label("No numeric columns.");
        return;
    }

    egui::ScrollArea::horizontal()
        .id_salt("stats_table")
        .show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(Column::auto().at_least(70.0), StatsRecord::FIELDS.len() + 1)
                .header(20.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("Column");
                    });
                    for field in StatsRecord::FIELDS {
                        header.col(|ui| {
                            ui.strong(field);
                        });
                    }
                })
                .body(|mut body| {
                    for (name, record) in stats {
                        body.row(18.0, |mut row| {
                            row.col(|ui| {
                                ui.label(name);
                            });
                            for value in record.values() {
                                row.col(|ui| {
                                    ui.label(fmt_f64(value));
                                });
                            }
                        });
                    }
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_preview_limits_rows_and_renders_missing_as_blank() -> anyhow::Result<()> {
        let df = df!(
            "region" => &[Some("North"), None, Some("East")],
            "units" => &[1_i64, 2, 3]
        )?;
        let preview = TablePreview::from_df(&df, 2)?;

        assert_eq!(preview.headers, vec!["region".to_owned(), "units".to_owned()]);
        assert_eq!(preview.total_rows, 3);
        assert_eq!(
            preview.rows,
            vec![
                vec!["North".to_owned(), "1".to_owned()],
                vec![String::new(), "2".to_owned()],
            ]
        );
        Ok(())
    }
}
