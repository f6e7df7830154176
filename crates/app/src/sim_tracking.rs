//! Simulated spatial-tracking backend for desktop runs.
//!
//! Replays a scripted room: the camera settles over the first second, then
//! surfaces appear one by one. A small floor patch is later merged into the
//! full floor, a table top and a wall come in between, and a two-vertex
//! sliver shows up that never qualifies. Light drifts on a seeded random
//! walk. Keyboard toggles force tracking failures and pause the session.
//!
//! Every frame while a session runs, a `TrackingFrame` is published together
//! with a `RaycastHitTest` through the AR camera.

use std::time::Duration;

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use placement::{
    CameraTracking, FrameHitTest, FrameUpdate, PlacementSession, PlacementSet, Pose,
    RaycastHitTest, SessionLifecycle, Surface, SurfaceId, SurfaceOrientation,
    TrackingFailureReason, TrackingFrame, TrackingQuality,
};
use rendering::camera::{ar_camera_projection, ArCamera};

const LIGHT_SEED: u64 = 0x5EED_11E7;
const LIGHT_STEP: f32 = 0.01;
const LIGHT_RANGE: (f32, f32) = (0.2, 0.95);
/// Reported intensity while the light failure is forced.
const DARK_INTENSITY: f32 = 0.08;

// ---------------------------------------------------------------------------
// Scripted environment
// ---------------------------------------------------------------------------

/// A surface and when the backend starts reporting it.
#[derive(Debug, Clone)]
pub struct ScriptedSurface {
    pub surface: Surface,
    pub detected_after: Duration,
    /// Merged into another surface from this time on.
    pub subsumed: Option<(Duration, SurfaceId)>,
}

#[derive(Resource, Debug, Clone)]
pub struct SimEnvironment {
    pub surfaces: Vec<ScriptedSurface>,
    /// Camera quality is Unknown before this.
    pub camera_unknown_until: Duration,
    /// Camera quality is NotTracking (no reason) before this.
    pub camera_settled_at: Duration,
}

fn rect(half_x: f32, half_z: f32) -> Vec<Vec2> {
    vec![
        Vec2::new(-half_x, -half_z),
        Vec2::new(half_x, -half_z),
        Vec2::new(half_x, half_z),
        Vec2::new(-half_x, half_z),
    ]
}

pub const FLOOR_PATCH: SurfaceId = SurfaceId(1);
pub const FLOOR: SurfaceId = SurfaceId(2);
pub const TABLE: SurfaceId = SurfaceId(3);
pub const WALL: SurfaceId = SurfaceId(4);
pub const SLIVER: SurfaceId = SurfaceId(5);

/// Table top height in meters.
pub const TABLE_HEIGHT: f32 = 0.75;
pub const TABLE_CENTER: Vec3 = Vec3::new(0.7, TABLE_HEIGHT, -1.0);
pub const TABLE_HALF: Vec2 = Vec2::new(0.4, 0.3);
pub const WALL_Z: f32 = -2.5;

impl Default for SimEnvironment {
    fn default() -> Self {
        let ms = Duration::from_millis;
        let wall_pose = Pose::new(
            Vec3::new(0.0, 1.2, WALL_Z),
            Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
        );
        Self {
            camera_unknown_until: ms(300),
            camera_settled_at: ms(1_000),
            surfaces: vec![
                ScriptedSurface {
                    surface: Surface::horizontal(
                        FLOOR_PATCH.0,
                        Pose::from_translation(Vec3::new(-0.2, 0.0, -0.8)),
                        rect(0.4, 0.3),
                    ),
                    detected_after: ms(1_500),
                    subsumed: Some((ms(4_000), FLOOR)),
                },
                ScriptedSurface {
                    surface: Surface::horizontal(
                        SLIVER.0,
                        Pose::from_translation(Vec3::new(-1.0, 0.0, -0.5)),
                        vec![Vec2::new(-0.2, 0.0), Vec2::new(0.2, 0.0)],
                    ),
                    detected_after: ms(2_000),
                    subsumed: None,
                },
                ScriptedSurface {
                    surface: Surface::horizontal(
                        TABLE.0,
                        Pose::from_translation(TABLE_CENTER),
                        rect(TABLE_HALF.x, TABLE_HALF.y),
                    ),
                    detected_after: ms(2_500),
                    subsumed: None,
                },
                ScriptedSurface {
                    surface: Surface::horizontal(WALL.0, wall_pose, rect(1.5, 1.2))
                        .with_orientation(SurfaceOrientation::Vertical),
                    detected_after: ms(3_000),
                    subsumed: None,
                },
                ScriptedSurface {
                    surface: Surface::horizontal(
                        FLOOR.0,
                        Pose::from_translation(Vec3::new(0.0, 0.0, -1.0)),
                        rect(2.0, 1.5),
                    ),
                    detected_after: ms(4_000),
                    subsumed: None,
                },
            ],
        }
    }
}

impl SimEnvironment {
    pub fn camera_at(&self, elapsed: Duration, forced: Option<TrackingFailureReason>) -> CameraTracking {
        if let Some(reason) = forced {
            return CameraTracking::lost(reason);
        }
        let quality = if elapsed < self.camera_unknown_until {
            TrackingQuality::Unknown
        } else if elapsed < self.camera_settled_at {
            TrackingQuality::NotTracking
        } else {
            TrackingQuality::Tracking
        };
        CameraTracking {
            quality,
            failure: None,
        }
    }

    /// Surfaces the backend reports at `elapsed`. While the camera has lost
    /// tracking every surface is reported as not tracking.
    pub fn surfaces_at(&self, elapsed: Duration, camera: &CameraTracking) -> Vec<Surface> {
        self.surfaces
            .iter()
            .filter(|s| elapsed >= s.detected_after)
            .map(|s| {
                let mut surface = s.surface.clone();
                if let Some((at, parent)) = s.subsumed {
                    if elapsed >= at {
                        surface = surface.subsumed_into(parent);
                    }
                }
                if camera.quality != TrackingQuality::Tracking {
                    surface = surface.with_quality(TrackingQuality::NotTracking);
                }
                surface
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Backend state
// ---------------------------------------------------------------------------

#[derive(Resource, Debug)]
pub struct SimTracking {
    /// Session start on the real clock; `None` while no session runs.
    started_at: Option<Duration>,
    paused: bool,
    forced: Option<TrackingFailureReason>,
    light: f32,
    rng: ChaCha8Rng,
}

impl Default for SimTracking {
    fn default() -> Self {
        Self {
            started_at: None,
            paused: false,
            forced: None,
            light: 0.55,
            rng: ChaCha8Rng::seed_from_u64(LIGHT_SEED),
        }
    }
}

impl SimTracking {
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn forced_failure(&self) -> Option<TrackingFailureReason> {
        self.forced
    }

    /// Toggle `reason`; a different forced reason is replaced.
    pub fn toggle_failure(&mut self, reason: TrackingFailureReason) {
        self.forced = if self.forced == Some(reason) {
            None
        } else {
            Some(reason)
        };
    }

    /// One random-walk step of the ambient light.
    pub fn step_light(&mut self) -> f32 {
        let delta = self.rng.gen_range(-LIGHT_STEP..=LIGHT_STEP);
        self.light = (self.light + delta).clamp(LIGHT_RANGE.0, LIGHT_RANGE.1);
        self.light
    }

    pub fn frame(&mut self, env: &SimEnvironment, elapsed: Duration) -> FrameUpdate {
        let camera = env.camera_at(elapsed, self.forced);
        let light = self.step_light();
        let light_intensity = if self.forced == Some(TrackingFailureReason::InsufficientLight) {
            DARK_INTENSITY
        } else {
            light
        };
        FrameUpdate {
            timestamp: elapsed,
            camera,
            light_intensity: Some(light_intensity),
            surfaces: env.surfaces_at(elapsed, &camera),
        }
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

pub struct SimTrackingPlugin;

impl Plugin for SimTrackingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimEnvironment>()
            .init_resource::<SimTracking>()
            .add_systems(Startup, spawn_room)
            .add_systems(
                Update,
                (follow_session, sim_keys, publish_sim_frame)
                    .chain()
                    .before(PlacementSet::Ingest),
            );
    }
}

/// Start the backend when a placement session appears and stop it when the
/// session goes away.
pub fn follow_session(
    session: Res<PlacementSession>,
    time: Res<Time<Real>>,
    mut sim: ResMut<SimTracking>,
    mut lifecycle: EventWriter<SessionLifecycle>,
) {
    match (session.is_active(), sim.is_running()) {
        (true, false) => {
            info!("Simulated tracking session created");
            sim.started_at = Some(time.elapsed());
            sim.paused = false;
            sim.forced = None;
            lifecycle.send(SessionLifecycle::Created);
        }
        (false, true) => {
            info!("Simulated tracking session closed");
            sim.started_at = None;
        }
        _ => {}
    }
}

/// `L` light, `M` motion, `F` features toggle a forced failure; `P` pauses.
pub fn sim_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut sim: ResMut<SimTracking>,
    mut lifecycle: EventWriter<SessionLifecycle>,
) {
    if !sim.is_running() {
        return;
    }
    let toggles = [
        (KeyCode::KeyL, TrackingFailureReason::InsufficientLight),
        (KeyCode::KeyM, TrackingFailureReason::ExcessiveMotion),
        (KeyCode::KeyF, TrackingFailureReason::InsufficientFeatures),
    ];
    for (key, reason) in toggles {
        if keys.just_pressed(key) {
            sim.toggle_failure(reason);
            info!("Forced tracking failure: {:?}", sim.forced_failure());
        }
    }
    if keys.just_pressed(KeyCode::KeyP) {
        sim.paused = !sim.paused;
        let event = if sim.paused {
            SessionLifecycle::Paused
        } else {
            SessionLifecycle::Resumed
        };
        info!("Simulated session {event:?}");
        lifecycle.send(event);
    }
}

pub fn publish_sim_frame(
    env: Res<SimEnvironment>,
    time: Res<Time<Real>>,
    mut sim: ResMut<SimTracking>,
    cameras: Query<(&Camera, &GlobalTransform), With<ArCamera>>,
    mut frames: EventWriter<TrackingFrame>,
    mut hit_test: ResMut<FrameHitTest>,
) {
    let Some(started_at) = sim.started_at else {
        return;
    };
    if sim.paused {
        return;
    }
    let elapsed = time.elapsed().saturating_sub(started_at);
    let frame = sim.frame(&env, elapsed);

    match cameras.get_single().ok().and_then(|(c, t)| ar_camera_projection(c, t)) {
        Some(projection) => hit_test.set(RaycastHitTest::new(projection, frame.surfaces.clone())),
        None => hit_test.clear(),
    }
    frames.send(TrackingFrame(frame));
}

/// Visible stand-ins for the scripted surfaces.
fn spawn_room(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let floor = materials.add(StandardMaterial {
        base_color: Color::srgb(0.55, 0.5, 0.45),
        perceptual_roughness: 0.9,
        ..default()
    });
    let wood = materials.add(StandardMaterial {
        base_color: Color::srgb(0.45, 0.3, 0.18),
        perceptual_roughness: 0.6,
        ..default()
    });
    let wall = materials.add(StandardMaterial {
        base_color: Color::srgb(0.82, 0.82, 0.8),
        perceptual_roughness: 0.95,
        ..default()
    });

    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(6.0, 0.002, 6.0))),
        MeshMaterial3d(floor),
        Transform::from_xyz(0.0, -0.001, -1.0),
    ));
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(TABLE_HALF.x * 2.0, 0.04, TABLE_HALF.y * 2.0))),
        MeshMaterial3d(wood.clone()),
        Transform::from_translation(TABLE_CENTER - Vec3::Y * 0.021),
    ));
    for (dx, dz) in [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
        let leg = Vec3::new(
            TABLE_CENTER.x + dx * (TABLE_HALF.x - 0.04),
            (TABLE_HEIGHT - 0.04) / 2.0,
            TABLE_CENTER.z + dz * (TABLE_HALF.y - 0.04),
        );
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(0.04, TABLE_HEIGHT - 0.04, 0.04))),
            MeshMaterial3d(wood.clone()),
            Transform::from_translation(leg),
        ));
    }
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(6.0, 3.0, 0.05))),
        MeshMaterial3d(wall),
        Transform::from_xyz(0.0, 1.5, WALL_Z - 0.026),
    ));
}
