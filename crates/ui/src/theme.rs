use bevy_egui::{egui, EguiContexts};

// Palette (rose pinks and gold, shared with the confetti)
pub const ROSE: egui::Color32 = egui::Color32::from_rgb(0xff, 0x6b, 0x9d);
pub const ROSE_LIGHT: egui::Color32 = egui::Color32::from_rgb(0xff, 0xb3, 0xc1);
pub const GOLD: egui::Color32 = egui::Color32::from_rgb(0xd4, 0xaf, 0x37);
pub const BG_PANEL: egui::Color32 = egui::Color32::from_rgb(58, 24, 40);
pub const TEXT: egui::Color32 = egui::Color32::from_rgb(255, 240, 244);
pub const TEXT_MUTED: egui::Color32 = egui::Color32::from_rgb(214, 170, 186);
pub const ERROR: egui::Color32 = egui::Color32::from_rgb(255, 140, 120);

pub const FONT_TITLE: f32 = 34.0;
pub const FONT_HEADING: f32 = 24.0;
pub const FONT_BODY: f32 = 16.0;
pub const FONT_SMALL: f32 = 13.0;

pub fn apply_rose_theme(mut contexts: EguiContexts) {
    let ctx = contexts.ctx_mut();
    let mut style = (*ctx.style()).clone();

    let inactive = egui::Color32::from_rgb(150, 50, 85);
    let hover = egui::Color32::from_rgb(200, 70, 115);
    let active = ROSE;

    style.visuals.widgets.noninteractive.bg_fill = BG_PANEL;
    style.visuals.widgets.inactive.bg_fill = inactive;
    style.visuals.widgets.hovered.bg_fill = hover;
    style.visuals.widgets.active.bg_fill = active;
    style.visuals.widgets.inactive.weak_bg_fill = inactive;
    style.visuals.widgets.hovered.weak_bg_fill = hover;
    style.visuals.widgets.active.weak_bg_fill = active;
    style.visuals.override_text_color = Some(TEXT);

    style.visuals.window_fill = BG_PANEL;
    style.visuals.panel_fill = BG_PANEL;
    style.visuals.window_stroke = egui::Stroke::new(1.0, ROSE_LIGHT);

    style.visuals.selection.bg_fill = active;
    style.visuals.selection.stroke = egui::Stroke::new(1.0, GOLD);

    let window_rounding = egui::CornerRadius::same(14);
    let widget_rounding = egui::CornerRadius::same(10);

    style.visuals.window_corner_radius = window_rounding;
    style.visuals.widgets.noninteractive.corner_radius = widget_rounding;
    style.visuals.widgets.inactive.corner_radius = widget_rounding;
    style.visuals.widgets.hovered.corner_radius = widget_rounding;
    style.visuals.widgets.active.corner_radius = widget_rounding;

    ctx.set_style(style);
}
