//! Tool catalog: every profile with its description and a button into the
//! detail screen, plus a short explanation of the AR flow.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use placement::{CatalogResource, ToolProfile};

use crate::screens::{AppScreen, SelectedTool};
use crate::theme::{tool_accent, AR_BLUE, TEXT_MUTED};

const HOW_IT_WORKS: [&str; 4] = [
    "Select a drill from the list",
    "View drill details and usage tips",
    "Start AR mode to place drill markers",
    "Tap on detected ground planes to place",
];

pub fn catalog_screen_ui(
    mut contexts: EguiContexts,
    catalog: Res<CatalogResource>,
    mut selected: ResMut<SelectedTool>,
    mut next: ResMut<NextState<AppScreen>>,
) {
    let ctx = contexts.ctx_mut();
    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.label(
                    egui::RichText::new("AR Drill Placement")
                        .size(32.0)
                        .strong()
                        .color(AR_BLUE),
                );
                ui.label(
                    egui::RichText::new("Select a drill to place in AR")
                        .size(16.0)
                        .color(TEXT_MUTED),
                );
            });
            ui.add_space(20.0);

            for profile in catalog.0.iter() {
                if profile_card(ui, profile) {
                    selected.0 = Some(profile.id);
                    next.set(AppScreen::Detail);
                }
                ui.add_space(8.0);
            }

            ui.add_space(16.0);
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(egui::RichText::new("How it works").strong().size(16.0));
                ui.add_space(4.0);
                for line in HOW_IT_WORKS {
                    ui.label(format!("• {line}"));
                }
            });
        });
    });
}

/// Returns `true` when the card's button was clicked.
fn profile_card(ui: &mut egui::Ui, profile: &ToolProfile) -> bool {
    let mut clicked = false;
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            let (swatch, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
            ui.painter().circle_filled(swatch.center(), 7.0, tool_accent(profile.id));
            ui.label(egui::RichText::new(&profile.name).size(18.0).strong());
        });
        ui.label(egui::RichText::new(&profile.description).color(TEXT_MUTED));
        ui.add_space(4.0);
        clicked = ui.button("View Details & Start AR").clicked();
    });
    clicked
}
