use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use placement::{AnchorStyle, StatusTone, ToolId};

pub const AR_BLUE: egui::Color32 = egui::Color32::from_rgb(0x21, 0x96, 0xF3);
pub const AR_GREEN: egui::Color32 = egui::Color32::from_rgb(0x4C, 0xAF, 0x50);
pub const AR_AMBER: egui::Color32 = egui::Color32::from_rgb(0xFF, 0x98, 0x00);
pub const AR_RED: egui::Color32 = egui::Color32::from_rgb(0xF4, 0x43, 0x36);
pub const TEXT_MUTED: egui::Color32 = egui::Color32::from_rgb(176, 190, 197);
pub const CARD_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(18, 18, 18, 235);

pub fn apply_ar_theme(mut contexts: EguiContexts) {
    let ctx = contexts.ctx_mut();
    let mut style = (*ctx.style()).clone();

    let panel = egui::Color32::from_rgb(0x12, 0x12, 0x12);
    let inactive = egui::Color32::from_rgb(0x37, 0x47, 0x4F);
    let hover = egui::Color32::from_rgb(0x45, 0x5A, 0x64);
    let active = egui::Color32::from_rgb(0x19, 0x76, 0xD2);

    style.visuals.widgets.noninteractive.bg_fill = panel;
    style.visuals.widgets.inactive.bg_fill = inactive;
    style.visuals.widgets.hovered.bg_fill = hover;
    style.visuals.widgets.active.bg_fill = active;
    style.visuals.widgets.inactive.weak_bg_fill = inactive;
    style.visuals.widgets.hovered.weak_bg_fill = hover;
    style.visuals.widgets.active.weak_bg_fill = active;

    style.visuals.window_fill = panel;
    style.visuals.panel_fill = panel;
    style.visuals.selection.bg_fill = active;
    style.visuals.selection.stroke = egui::Stroke::new(1.0, active);

    let card_rounding = egui::CornerRadius::same(12);
    let widget_rounding = egui::CornerRadius::same(8);
    style.visuals.window_corner_radius = card_rounding;
    style.visuals.widgets.noninteractive.corner_radius = widget_rounding;
    style.visuals.widgets.inactive.corner_radius = widget_rounding;
    style.visuals.widgets.hovered.corner_radius = widget_rounding;
    style.visuals.widgets.active.corner_radius = widget_rounding;

    ctx.set_style(style);
}

/// Card fill for the status card, by status class.
pub fn tone_fill(tone: StatusTone) -> egui::Color32 {
    match tone {
        StatusTone::Warning => AR_RED,
        StatusTone::Progress => AR_AMBER,
        StatusTone::Ready => AR_BLUE,
        StatusTone::Success => AR_GREEN,
    }
}

pub fn to_color32(color: Color) -> egui::Color32 {
    let c = color.to_srgba();
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(byte(c.red), byte(c.green), byte(c.blue), byte(c.alpha))
}

/// The tool's model color, used as its accent in lists.
pub fn tool_accent(tool: ToolId) -> egui::Color32 {
    to_color32(AnchorStyle::for_tool(tool).body_color)
}
