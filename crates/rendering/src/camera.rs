use bevy::prelude::*;

use placement::CameraProjection;

const MOVE_SPEED: f32 = 0.8;
const TURN_SPEED: f32 = 1.2;
const MIN_PITCH: f32 = -80.0 * std::f32::consts::PI / 180.0;
const MAX_PITCH: f32 = 10.0 * std::f32::consts::PI / 180.0;
const EYE_HEIGHT: f32 = 1.4;

/// Marker for the camera that stands in for the device's back camera.
#[derive(Component, Debug, Default)]
pub struct ArCamera;

/// Handheld device pose driven from the keyboard on desktop.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct DeviceRig {
    pub position: Vec3,
    /// Horizontal rotation in radians
    pub yaw: f32,
    /// Negative looks down
    pub pitch: f32,
}

impl Default for DeviceRig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, EYE_HEIGHT, 1.8),
            yaw: 0.0,
            pitch: -35.0_f32.to_radians(),
        }
    }
}

impl DeviceRig {
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position)
            .with_rotation(Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0))
    }
}

pub fn setup_ar_camera(mut commands: Commands) {
    let rig = DeviceRig::default();
    commands.spawn((
        ArCamera,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            near: 0.01,
            ..default()
        }),
        rig.transform(),
    ));
    commands.insert_resource(rig);
}

/// WASD moves the device along the floor, arrow keys turn and tilt it.
pub fn move_device_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut rig: ResMut<DeviceRig>,
) {
    let dt = time.delta_secs();

    let mut dir = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        dir.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        dir.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        dir.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        dir.x += 1.0;
    }
    let mut turn = 0.0;
    if keys.pressed(KeyCode::ArrowLeft) {
        turn += 1.0;
    }
    if keys.pressed(KeyCode::ArrowRight) {
        turn -= 1.0;
    }
    let mut tilt = 0.0;
    if keys.pressed(KeyCode::ArrowUp) {
        tilt += 1.0;
    }
    if keys.pressed(KeyCode::ArrowDown) {
        tilt -= 1.0;
    }
    if dir == Vec2::ZERO && turn == 0.0 && tilt == 0.0 {
        return;
    }

    let rotated = Vec2::from_angle(-rig.yaw).rotate(dir.normalize_or_zero());
    rig.position += Vec3::new(rotated.x, 0.0, rotated.y) * MOVE_SPEED * dt;
    rig.yaw += turn * TURN_SPEED * dt;
    rig.pitch = (rig.pitch + tilt * TURN_SPEED * dt).clamp(MIN_PITCH, MAX_PITCH);
}

pub fn apply_device_rig(rig: Res<DeviceRig>, mut query: Query<&mut Transform, With<ArCamera>>) {
    if !rig.is_changed() {
        return;
    }
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };
    *transform = rig.transform();
}

/// What the tracking backend needs to ray-cast taps through this camera.
///
/// `None` until the camera has a viewport.
pub fn ar_camera_projection(camera: &Camera, transform: &GlobalTransform) -> Option<CameraProjection> {
    let viewport = camera.logical_viewport_size()?;
    Some(CameraProjection {
        world_from_view: transform.compute_matrix(),
        clip_from_view: camera.clip_from_view(),
        viewport,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rig_looks_down_at_the_floor_ahead() {
        let forward = DeviceRig::default().transform().forward();
        assert!(forward.y < 0.0);
        assert!(forward.z < 0.0);
    }

    #[test]
    fn yaw_turns_left() {
        let rig = DeviceRig {
            yaw: std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
            ..DeviceRig::default()
        };
        let forward = rig.transform().forward();
        assert!((forward.x + 1.0).abs() < 1e-5, "forward {forward:?}");
    }
}
