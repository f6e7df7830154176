//! Screens around the placement session: tool catalog, tool detail and the
//! AR overlay, drawn with egui.

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use placement::PlacementSet;

pub mod ar_overlay;
pub mod catalog_screen;
pub mod detail_screen;
pub mod screens;
pub mod theme;

use screens::{AppScreen, ScreensPlugin};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((EguiPlugin, ScreensPlugin))
            .add_systems(Startup, theme::apply_ar_theme)
            .add_systems(Update, screens::escape_navigates_back)
            .add_systems(
                Update,
                (
                    catalog_screen::catalog_screen_ui.run_if(in_state(AppScreen::Catalog)),
                    detail_screen::detail_screen_ui.run_if(in_state(AppScreen::Detail)),
                    ar_overlay::ar_overlay_ui
                        .run_if(in_state(AppScreen::Ar))
                        .after(PlacementSet::Publish),
                ),
            );
    }
}
