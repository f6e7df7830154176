//! # TestSession: headless harness for the placement pipeline
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins`, `PlacementPlugin` and a
//! [`FakeRenderer`] so scenarios can be driven frame by frame without a
//! window, a tracking device or a GPU. Time advances by a fixed step per
//! update; the simulated world (camera state, surfaces, light) is re-sent as a
//! tracking frame on every update.

mod assertions;
pub mod renderer;

use std::sync::Arc;
use std::time::Duration;

use bevy::app::App;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::catalog::{CatalogResource, ToolCatalog, ToolId};
use crate::command_log::PlacementCommandLog;
use crate::config::PlacementParams;
use crate::controller::{PlacementController, PlacementId};
use crate::events::{
    AnchorReport, ClearPlacementRequest, EndPlacementSession, ScreenTap, SessionLifecycle,
    StartPlacementSession, TrackingFrame,
};
use crate::geometry::Pose;
use crate::hit_test::{CameraProjection, RaycastHitTest, ScriptedHitTest};
use crate::plugin::{FrameHitTest, PlacementPlugin, PlacementSession, StatusView};
use crate::rejection::RejectionReason;
use crate::sets::PlacementSet;
use crate::tracking::{CameraTracking, FrameUpdate, Surface, TrackingFailureReason};

pub use renderer::{FakeRenderer, RendererOp};

/// Time added by one `tick()`.
pub const FRAME_STEP: Duration = Duration::from_millis(16);

/// Viewport of the fixed test camera, in pixels.
pub const VIEWPORT: Vec2 = Vec2::new(800.0, 800.0);

/// Height of the fixed test camera looking straight down at the origin.
const CAMERA_HEIGHT: f32 = 2.0;

/// Build a square surface polygon of the given half extent.
pub fn square(half: f32) -> Vec<Vec2> {
    vec![
        Vec2::new(-half, -half),
        Vec2::new(half, -half),
        Vec2::new(half, half),
        Vec2::new(-half, half),
    ]
}

/// A tracked, upward-facing floor centered at the origin.
pub fn floor(id: u64, half: f32) -> Surface {
    Surface::horizontal(id, Pose::IDENTITY, square(half))
}

/// The camera every session uses for hit testing.
pub fn test_camera() -> CameraProjection {
    let view = Transform::from_xyz(0.0, CAMERA_HEIGHT, 0.0).looking_at(Vec3::ZERO, Vec3::Z);
    CameraProjection {
        world_from_view: view.compute_matrix(),
        clip_from_view: Mat4::perspective_infinite_reverse_rh(1.2, VIEWPORT.x / VIEWPORT.y, 0.05),
        viewport: VIEWPORT,
    }
}

/// Screen position (pixels) of a world point under [`test_camera`].
pub fn project_to_screen(world: Vec3) -> Vec2 {
    let camera = test_camera();
    let clip_from_world = camera.clip_from_view * camera.world_from_view.inverse();
    let ndc = clip_from_world.project_point3(world);
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * camera.viewport.x,
        (1.0 - ndc.y) * 0.5 * camera.viewport.y,
    )
}

/// A headless Bevy App running the placement pipeline.
pub struct TestSession {
    app: App,
    camera: CameraTracking,
    surfaces: Vec<Surface>,
    light: Option<f32>,
    streaming: bool,
    scripted: Option<ScriptedHitTest>,
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSession {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Default catalog and parameters, no session started yet.
    pub fn new() -> Self {
        Self::with_config(ToolCatalog::default(), PlacementParams::default())
    }

    pub fn with_params(params: PlacementParams) -> Self {
        Self::with_config(ToolCatalog::default(), params)
    }

    pub fn with_config(catalog: ToolCatalog, params: PlacementParams) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME_STEP));
        app.insert_resource(CatalogResource(Arc::new(catalog)));
        app.insert_resource(params);
        app.add_plugins(PlacementPlugin);
        app.init_resource::<FakeRenderer>();
        app.add_systems(
            Update,
            renderer::execute_fake_commands.in_set(PlacementSet::Execute),
        );
        // The first update only starts the clock.
        app.update();

        Self {
            app,
            camera: CameraTracking::tracking(),
            surfaces: Vec::new(),
            light: Some(0.5),
            streaming: false,
            scripted: None,
        }
    }

    // -----------------------------------------------------------------------
    // Builder
    // -----------------------------------------------------------------------

    /// Start a session for `tool` and report the tracking session as created.
    /// Frames stream from the next update on.
    pub fn started(mut self, tool: u32) -> Self {
        self.start(ToolId(tool));
        self.tick();
        self
    }

    pub fn with_surfaces(mut self, surfaces: Vec<Surface>) -> Self {
        self.surfaces = surfaces;
        self.tick();
        self
    }

    pub fn with_light(mut self, light: Option<f32>) -> Self {
        self.light = light;
        self
    }

    // -----------------------------------------------------------------------
    // World control
    // -----------------------------------------------------------------------

    pub fn start(&mut self, tool: ToolId) {
        self.app.world_mut().send_event(StartPlacementSession { tool });
        self.app.world_mut().send_event(SessionLifecycle::Created);
        self.streaming = true;
    }

    pub fn end(&mut self) {
        self.app.world_mut().send_event(EndPlacementSession);
        self.streaming = false;
    }

    pub fn set_surfaces(&mut self, surfaces: Vec<Surface>) {
        self.surfaces = surfaces;
    }

    pub fn set_camera(&mut self, camera: CameraTracking) {
        self.camera = camera;
    }

    pub fn fail_tracking(&mut self, reason: TrackingFailureReason) {
        self.camera = CameraTracking::lost(reason);
    }

    pub fn recover_tracking(&mut self) {
        self.camera = CameraTracking::tracking();
    }

    /// Pause: frames stop and the session is told so.
    pub fn pause(&mut self) {
        self.app.world_mut().send_event(SessionLifecycle::Paused);
        self.streaming = false;
    }

    pub fn resume(&mut self) {
        self.app.world_mut().send_event(SessionLifecycle::Resumed);
        self.streaming = true;
    }

    /// Replace ray casting with canned hit results until cleared with `None`.
    pub fn script_hits(&mut self, script: Option<ScriptedHitTest>) {
        self.scripted = script;
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Tap the screen where `world` appears under the test camera.
    pub fn tap_world(&mut self, world: Vec3) {
        self.tap_screen(project_to_screen(world));
    }

    pub fn tap_screen(&mut self, position: Vec2) {
        self.app.world_mut().send_event(ScreenTap { position });
    }

    pub fn request_clear(&mut self) {
        self.app.world_mut().send_event(ClearPlacementRequest);
    }

    /// Report a creation the fake renderer held back.
    pub fn report_created(&mut self, id: PlacementId) {
        let handle = self.renderer_mut().allocate(id);
        self.app
            .world_mut()
            .send_event(AnchorReport::Created { id, handle });
    }

    pub fn renderer_mut(&mut self) -> Mut<'_, FakeRenderer> {
        self.app.world_mut().resource_mut::<FakeRenderer>()
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Run one update of [`FRAME_STEP`].
    pub fn tick(&mut self) {
        self.stream_frame();
        self.app.update();
    }

    pub fn tick_n(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Run a single update that advances the clock by `step`.
    pub fn advance(&mut self, step: Duration) {
        self.app
            .insert_resource(TimeUpdateStrategy::ManualDuration(step));
        self.tick();
        self.app
            .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME_STEP));
    }

    fn stream_frame(&mut self) {
        if !self.streaming {
            return;
        }
        let timestamp = self.elapsed();
        let update = FrameUpdate {
            timestamp,
            camera: self.camera,
            light_intensity: self.light,
            surfaces: self.surfaces.clone(),
        };
        let world = self.app.world_mut();
        world.send_event(TrackingFrame(update));
        let mut hit_test = world.resource_mut::<FrameHitTest>();
        match &self.scripted {
            Some(script) => hit_test.set(script.clone()),
            None => hit_test.set(RaycastHitTest::new(test_camera(), self.surfaces.clone())),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn elapsed(&self) -> Duration {
        self.app.world().resource::<Time<Real>>().elapsed()
    }

    pub fn view(&self) -> &StatusView {
        self.app.world().resource::<StatusView>()
    }

    pub fn controller(&self) -> Option<&PlacementController> {
        self.app
            .world()
            .resource::<PlacementSession>()
            .controller
            .as_ref()
    }

    pub fn renderer(&self) -> &FakeRenderer {
        self.app.world().resource::<FakeRenderer>()
    }

    pub fn command_log(&self) -> &PlacementCommandLog {
        self.app.world().resource::<PlacementCommandLog>()
    }

    pub fn placed_id(&self) -> Option<PlacementId> {
        self.view().placed_id
    }

    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        self.view().rejection.as_ref().map(|r| r.reason.clone())
    }

    pub fn app(&mut self) -> &mut App {
        &mut self.app
    }
}
