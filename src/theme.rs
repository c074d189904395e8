//! Dashboard look: a slate dark palette with a teal accent, and the colours
//! charts draw with.

use eframe::egui;
use egui::{Color32, CornerRadius, Margin, Shadow, Stroke};

pub const ACCENT_COLOR: Color32 = Color32::from_rgb(0, 150, 136);
const ACCENT_HOVER: Color32 = Color32::from_rgb(0, 121, 107);

const SLATE_950: Color32 = Color32::from_rgb(15, 23, 42);
const SLATE_900: Color32 = Color32::from_rgb(22, 31, 51);
const SLATE_800: Color32 = Color32::from_rgb(30, 41, 59);
const SLATE_700: Color32 = Color32::from_rgb(51, 65, 85);
const SLATE_200: Color32 = Color32::from_rgb(226, 232, 240);

/// Negative correlations shade toward this, positive ones toward the accent.
const NEGATIVE_COLOR: Color32 = Color32::from_rgb(239, 108, 0);

pub const SPACING_SMALL: f32 = 6.0;
pub const SPACING_MEDIUM: f32 = 14.0;
pub const SPACING_LARGE: f32 = 24.0;

const CARD_PADDING: i8 = 12;
const CARD_RADIUS: u8 = 8;
const WIDGET_RADIUS: u8 = 4;

/// One colour per series or slice, repeating after eight.
pub const SERIES_COLORS: [Color32; 8] = [
    ACCENT_COLOR,
    Color32::from_rgb(255, 167, 38),
    Color32::from_rgb(92, 107, 192),
    Color32::from_rgb(236, 64, 122),
    Color32::from_rgb(124, 179, 66),
    Color32::from_rgb(41, 182, 246),
    Color32::from_rgb(141, 110, 99),
    Color32::from_rgb(144, 164, 174),
];

/// Heatmap cell colour for a coefficient in [-1, 1]; undefined cells are grey.
pub fn correlation_color(r: f64) -> Color32 {
    if !r.is_finite() {
        return SLATE_700;
    }
    let strength = r.abs().clamp(0.0, 1.0) as f32;
    let target = if r >= 0.0 { ACCENT_COLOR } else { NEGATIVE_COLOR };
    let mix = |from: u8, to: u8| {
        (f32::from(from) + (f32::from(to) - f32::from(from)) * strength).round() as u8
    };
    Color32::from_rgb(
        mix(SLATE_800.r(), target.r()),
        mix(SLATE_800.g(), target.g()),
        mix(SLATE_800.b(), target.b()),
    )
}

pub fn apply_dashboard_theme(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = SLATE_900;
    visuals.window_fill = SLATE_900;
    visuals.faint_bg_color = SLATE_800;
    visuals.extreme_bg_color = SLATE_950;
    visuals.override_text_color = Some(SLATE_200);
    visuals.hyperlink_color = ACCENT_COLOR;

    let radius = CornerRadius::same(WIDGET_RADIUS);
    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.hovered,
        &mut visuals.widgets.active,
    ] {
        widget.corner_radius = radius;
    }
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, SLATE_700);
    visuals.widgets.inactive.bg_fill = SLATE_700;
    visuals.widgets.inactive.weak_bg_fill = SLATE_800;
    visuals.widgets.hovered.bg_fill = ACCENT_HOVER;
    visuals.widgets.hovered.weak_bg_fill = ACCENT_HOVER;
    visuals.widgets.active.bg_fill = ACCENT_COLOR;
    visuals.widgets.active.weak_bg_fill = ACCENT_COLOR;

    visuals.selection.bg_fill = ACCENT_COLOR.gamma_multiply(0.5);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT_COLOR);
    visuals.window_corner_radius = CornerRadius::same(CARD_RADIUS);
    visuals.window_shadow = Shadow::NONE;

    ctx.set_visuals(visuals);
    ctx.style_mut(|style| {
        style.spacing.item_spacing = egui::vec2(SPACING_SMALL, SPACING_SMALL);
        style.spacing.button_padding = egui::vec2(10.0, 4.0);
    });
}

/// Panel for a KPI card or a chart.
pub fn card_frame(ui: &egui::Ui) -> egui::Frame {
    egui::Frame::new()
        .fill(ui.visuals().faint_bg_color)
        .corner_radius(CornerRadius::same(CARD_RADIUS))
        .inner_margin(Margin::same(CARD_PADDING))
        .stroke(Stroke::new(1.0, SLATE_700))
}

pub fn top_bar_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(SLATE_950)
        .inner_margin(Margin::symmetric(16, 8))
        .stroke(Stroke::new(1.0, ACCENT_COLOR.gamma_multiply(0.6)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_colors_are_distinct() {
        for (i, a) in SERIES_COLORS.iter().enumerate() {
            assert!(SERIES_COLORS.iter().skip(i + 1).all(|b| b != a));
        }
    }

    #[test]
    fn test_correlation_color_scale() {
        assert_eq!(correlation_color(f64::NAN), SLATE_700);
        assert_eq!(correlation_color(0.0), SLATE_800);
        assert_ne!(correlation_color(1.0), correlation_color(-1.0));
        // Beyond the range clamps to the end colour.
        assert_eq!(correlation_color(1.5), correlation_color(1.0));
    }
}
