//! AR screen overlay: top bar, rejection banner and status card.
//!
//! Everything is drawn in panels and areas at the screen edges so the middle
//! of the view stays free for taps.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use placement::{ClearPlacementRequest, StatusView};

use crate::screens::NavigateBack;
use crate::theme::{tone_fill, AR_RED, CARD_FILL, TEXT_MUTED};

/// What the overlay shows, derived from the published status.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayModel {
    pub title: String,
    pub show_clear: bool,
    pub banner: Option<String>,
    pub card_fill: egui::Color32,
    pub headline: String,
    pub guidance: Vec<String>,
}

impl OverlayModel {
    pub fn from_view(view: &StatusView) -> Self {
        Self {
            title: view.tool_name.clone(),
            // Clearing while a destroy is in flight would be a no-op anyway.
            show_clear: view.placed && !view.cleaning,
            banner: view.rejection.as_ref().map(|r| r.message.clone()),
            card_fill: tone_fill(view.tone),
            headline: view.headline.clone(),
            guidance: view.guidance.clone(),
        }
    }
}

pub fn ar_overlay_ui(
    mut contexts: EguiContexts,
    view: Res<StatusView>,
    mut back: EventWriter<NavigateBack>,
    mut clear: EventWriter<ClearPlacementRequest>,
) {
    let model = OverlayModel::from_view(&view);
    let ctx = contexts.ctx_mut();

    egui::TopBottomPanel::top("ar_top_bar")
        .frame(egui::Frame::NONE.fill(CARD_FILL).inner_margin(egui::Margin::same(8)))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("← Back").clicked() {
                    back.send(NavigateBack);
                }
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(&model.title).strong().size(16.0));
                    ui.label(egui::RichText::new("Single placement mode").size(12.0).color(TEXT_MUTED));
                });
                if model.show_clear {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add(egui::Button::new("Clear").fill(AR_RED)).clicked() {
                            clear.send(ClearPlacementRequest);
                        }
                    });
                }
            });
        });

    if let Some(message) = &model.banner {
        egui::Area::new(egui::Id::new("ar_rejection_banner"))
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 72.0))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::NONE
                    .fill(AR_RED)
                    .corner_radius(egui::CornerRadius::same(8))
                    .inner_margin(egui::Margin::symmetric(14, 8))
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(message).color(egui::Color32::WHITE));
                    });
            });
    }

    egui::Area::new(egui::Id::new("ar_status_card"))
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -16.0))
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(model.card_fill.gamma_multiply(0.9))
                .corner_radius(egui::CornerRadius::same(12))
                .inner_margin(egui::Margin::same(14))
                .show(ui, |ui| {
                    ui.set_max_width(420.0);
                    ui.label(
                        egui::RichText::new(&model.headline)
                            .strong()
                            .size(17.0)
                            .color(egui::Color32::WHITE),
                    );
                    for line in &model.guidance {
                        ui.label(egui::RichText::new(line).size(13.0).color(egui::Color32::from_gray(235)));
                    }
                });
        });
}
