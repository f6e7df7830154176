//! Rendering collaborator for the placement core: the AR camera, anchored
//! tool models, the surface overlay, pointer taps and feedback pulses.

use bevy::prelude::*;

use placement::PlacementSet;

pub mod anchors;
pub mod camera;
pub mod feedback;
pub mod surface_viz;
pub mod tap_input;

use anchors::AnchorRegistry;
use feedback::FeedbackFlash;
use surface_viz::SurfaceOverlay;
use tap_input::PointerPress;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AnchorRegistry>()
            .init_resource::<SurfaceOverlay>()
            .init_resource::<PointerPress>()
            .init_resource::<FeedbackFlash>()
            .insert_resource(ClearColor(Color::srgb(0.12, 0.12, 0.14)))
            .add_systems(Startup, (camera::setup_ar_camera, setup_lighting));

        // Device movement and pointer input feed the frame being ingested.
        app.add_systems(
            Update,
            (
                camera::move_device_keyboard,
                camera::apply_device_rig,
                tap_input::emit_screen_taps,
            )
                .chain()
                .before(PlacementSet::Ingest),
        );

        app.add_systems(
            Update,
            (
                anchors::execute_anchor_commands,
                feedback::play_feedback_pulses,
            )
                .in_set(PlacementSet::Execute),
        );

        app.add_systems(
            Update,
            (
                surface_viz::toggle_surface_overlay,
                surface_viz::draw_qualified_surfaces,
                feedback::fade_feedback_flash,
                feedback::draw_feedback_flash,
            )
                .chain()
                .after(PlacementSet::Publish),
        );
    }
}

fn setup_lighting(mut commands: Commands) {
    // Indoor fill light
    commands.insert_resource(AmbientLight {
        color: Color::srgb(1.0, 0.97, 0.92),
        brightness: 400.0,
    });

    // Ceiling light, steep so anchors cast short shadows
    commands.spawn((
        DirectionalLight {
            illuminance: 6000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_3,
            std::f32::consts::FRAC_PI_8,
            0.0,
        )),
    ));
}
