use bevy::prelude::*;
use bevy::render::view::screenshot::{save_to_disk, Screenshot};
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use placement::{CatalogResource, PlacementPlugin};
use ui::screens::{AppScreen, SelectedTool};

mod settings;
mod sim_tracking;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "AR Drill Placement".to_string(),
            resolution: (540.0, 960.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::Continuous,
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    })
    .add_systems(PreStartup, settings::load_configuration)
    .add_plugins((
        PlacementPlugin,
        rendering::RenderingPlugin,
        ui::UiPlugin,
        sim_tracking::SimTrackingPlugin,
    ));

    // Screenshot mode: opens the AR screen for the first tool, waits for the
    // room to be scanned, saves one screenshot and exits
    if let Ok(path) = std::env::var("ARPLACE_SCREENSHOT") {
        app.insert_resource(ScreenshotRun { frame: 0, path })
            .add_systems(Update, drive_screenshot);
    }

    app.run();
}

#[derive(Resource)]
struct ScreenshotRun {
    frame: u32,
    path: String,
}

const SCREENSHOT_FRAME: u32 = 360;

fn drive_screenshot(
    mut commands: Commands,
    mut run: ResMut<ScreenshotRun>,
    catalog: Res<CatalogResource>,
    mut selected: ResMut<SelectedTool>,
    mut next: ResMut<NextState<AppScreen>>,
    mut exit: EventWriter<AppExit>,
) {
    run.frame += 1;
    match run.frame {
        1 => {
            selected.0 = catalog.0.first().map(|p| p.id);
            next.set(AppScreen::Detail);
        }
        2 => next.set(AppScreen::Ar),
        SCREENSHOT_FRAME => {
            commands
                .spawn(Screenshot::primary_window())
                .observe(save_to_disk(run.path.clone()));
        }
        f if f > SCREENSHOT_FRAME + 20 => {
            exit.send(AppExit::Success);
        }
        _ => {}
    }
}
