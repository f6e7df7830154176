//! Detail screen for the selected tool: description, numbered usage tips,
//! AR instructions and the button that opens the AR screen.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use placement::CatalogResource;

use crate::screens::{AppScreen, NavigateBack, SelectedTool};
use crate::theme::{tool_accent, AR_BLUE, TEXT_MUTED};

const AR_INSTRUCTIONS: [&str; 4] = [
    "Point your camera at a flat surface",
    "Wait for plane detection (white grid)",
    "Tap on the detected surface to place drill marker",
    "Only one drill can be placed at a time",
];

fn section(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.label(egui::RichText::new(title).strong().size(16.0));
        ui.add_space(4.0);
        add_contents(ui);
    });
    ui.add_space(10.0);
}

pub fn detail_screen_ui(
    mut contexts: EguiContexts,
    catalog: Res<CatalogResource>,
    selected: Res<SelectedTool>,
    mut back: EventWriter<NavigateBack>,
    mut next: ResMut<NextState<AppScreen>>,
) {
    let Some(profile) = selected.0.and_then(|id| catalog.0.get(id)) else {
        return;
    };
    let ctx = contexts.ctx_mut();

    egui::TopBottomPanel::top("detail_top_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui.button("← Back").clicked() {
                back.send(NavigateBack);
            }
            ui.label(
                egui::RichText::new(&profile.name)
                    .size(20.0)
                    .strong()
                    .color(tool_accent(profile.id)),
            );
        });
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical().show(ui, |ui| {
            section(ui, "Description", |ui| {
                ui.label(profile.description.as_str());
            });

            if !profile.tips.is_empty() {
                section(ui, "Usage Tips", |ui| {
                    for (index, tip) in profile.tips.iter().enumerate() {
                        ui.horizontal_wrapped(|ui| {
                            ui.label(egui::RichText::new(format!("{}", index + 1)).strong().color(AR_BLUE));
                            ui.label(tip.as_str());
                        });
                    }
                });
            }

            section(ui, "AR Instructions", |ui| {
                for line in AR_INSTRUCTIONS {
                    ui.label(egui::RichText::new(format!("• {line}")).color(TEXT_MUTED));
                }
            });

            ui.vertical_centered(|ui| {
                let start = egui::Button::new(egui::RichText::new("Start AR Drill Placement").size(18.0))
                    .fill(AR_BLUE)
                    .min_size(egui::vec2(260.0, 44.0));
                if ui.add(start).clicked() {
                    next.set(AppScreen::Ar);
                }
            });
        });
    });
}
