//! Screen flow: catalog → detail → AR, and back.
//!
//! Entering the AR screen starts a placement session for the selected tool;
//! leaving it ends the session, which destroys any placed object.

use bevy::prelude::*;

use placement::{CatalogResource, EndPlacementSession, StartPlacementSession, ToolId};

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppScreen {
    #[default]
    Catalog,
    Detail,
    Ar,
}

impl AppScreen {
    /// Where the back button leads, `None` on the root screen.
    pub fn back(self) -> Option<AppScreen> {
        match self {
            AppScreen::Catalog => None,
            AppScreen::Detail => Some(AppScreen::Catalog),
            AppScreen::Ar => Some(AppScreen::Detail),
        }
    }
}

/// The tool chosen on the catalog screen.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SelectedTool(pub Option<ToolId>);

/// Sent by back buttons and the Escape key.
#[derive(Event, Debug, Default, Clone, Copy)]
pub struct NavigateBack;

/// State, navigation and session wiring without any drawing.
pub struct ScreensPlugin;

impl Plugin for ScreensPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppScreen>()
            .init_resource::<SelectedTool>()
            .add_event::<NavigateBack>()
            .add_systems(Update, navigate_back)
            .add_systems(OnEnter(AppScreen::Detail), require_selection)
            .add_systems(OnEnter(AppScreen::Ar), start_session)
            .add_systems(OnExit(AppScreen::Ar), end_session);
    }
}

pub fn navigate_back(
    mut events: EventReader<NavigateBack>,
    screen: Res<State<AppScreen>>,
    mut next: ResMut<NextState<AppScreen>>,
) {
    // Several presses in one frame still move back a single screen.
    if events.read().count() == 0 {
        return;
    }
    if let Some(target) = screen.get().back() {
        next.set(target);
    }
}

pub fn escape_navigates_back(keys: Res<ButtonInput<KeyCode>>, mut back: EventWriter<NavigateBack>) {
    if keys.just_pressed(KeyCode::Escape) {
        back.send(NavigateBack);
    }
}

/// The detail screen needs a tool that exists in the catalog.
fn require_selection(
    selected: Res<SelectedTool>,
    catalog: Res<CatalogResource>,
    mut next: ResMut<NextState<AppScreen>>,
) {
    let known = selected.0.is_some_and(|id| catalog.0.get(id).is_some());
    if !known {
        warn!("detail screen opened without a valid tool: {:?}", selected.0);
        next.set(AppScreen::Catalog);
    }
}

fn start_session(
    selected: Res<SelectedTool>,
    mut starts: EventWriter<StartPlacementSession>,
    mut next: ResMut<NextState<AppScreen>>,
) {
    match selected.0 {
        Some(tool) => {
            starts.send(StartPlacementSession { tool });
        }
        None => {
            warn!("AR screen opened without a selected tool");
            next.set(AppScreen::Catalog);
        }
    }
}

fn end_session(mut ends: EventWriter<EndPlacementSession>) {
    ends.send(EndPlacementSession);
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;
    use placement::{PlacementPlugin, PlacementSession};

    use super::*;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, PlacementPlugin, ScreensPlugin));
        app.update();
        app
    }

    fn go(app: &mut App, screen: AppScreen) {
        app.world_mut()
            .resource_mut::<NextState<AppScreen>>()
            .set(screen);
        app.update();
    }

    fn screen(app: &App) -> AppScreen {
        *app.world().resource::<State<AppScreen>>().get()
    }

    fn session_active(app: &App) -> bool {
        app.world().resource::<PlacementSession>().is_active()
    }

    #[test]
    fn back_targets() {
        assert_eq!(AppScreen::Catalog.back(), None);
        assert_eq!(AppScreen::Detail.back(), Some(AppScreen::Catalog));
        assert_eq!(AppScreen::Ar.back(), Some(AppScreen::Detail));
    }

    #[test]
    fn entering_ar_starts_a_session_and_back_ends_it() {
        let mut app = app();
        app.world_mut().insert_resource(SelectedTool(Some(ToolId(2))));
        go(&mut app, AppScreen::Detail);
        go(&mut app, AppScreen::Ar);
        assert_eq!(screen(&app), AppScreen::Ar);
        assert!(session_active(&app));

        app.world_mut().send_event(NavigateBack);
        app.update();
        app.update();
        assert_eq!(screen(&app), AppScreen::Detail);
        assert!(!session_active(&app));
    }

    #[test]
    fn detail_without_selection_returns_to_catalog() {
        let mut app = app();
        go(&mut app, AppScreen::Detail);
        app.update();
        assert_eq!(screen(&app), AppScreen::Catalog);
    }

    #[test]
    fn back_on_catalog_stays_put() {
        let mut app = app();
        app.world_mut().send_event(NavigateBack);
        app.update();
        app.update();
        assert_eq!(screen(&app), AppScreen::Catalog);
    }
}
