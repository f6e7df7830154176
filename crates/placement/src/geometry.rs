//! Poses, polygon containment and screen-to-world rays.

use bevy::math::{Dir3, Mat4, Quat, Ray3d, Vec2, Vec3};
use bevy::prelude::Transform;

/// A rigid transform in tracking space (meters, +Y up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    /// False for NaN/infinite components or a zero-length rotation.
    pub fn is_finite(&self) -> bool {
        self.translation.is_finite()
            && self.rotation.is_finite()
            && self.rotation.length_squared() > 1e-6
    }

    /// Local +Y in world space. For a surface pose this is the surface normal.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.translation + self.rotation * local
    }

    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.translation)
    }

    pub fn to_transform(&self) -> Transform {
        Transform {
            translation: self.translation,
            rotation: self.rotation,
            scale: Vec3::ONE,
        }
    }
}

/// Even-odd crossing test. Degenerate polygons (< 3 vertices) contain nothing.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Distance along `ray` to the plane through `origin` with `normal`, if the
/// plane lies in front of the ray.
pub fn ray_plane_distance(ray: Ray3d, origin: Vec3, normal: Vec3) -> Option<f32> {
    let denom = ray.direction.dot(normal);
    if denom.abs() <= 1e-6 {
        return None;
    }
    let t = (origin - ray.origin).dot(normal) / denom;
    (t > 0.0 && t.is_finite()).then_some(t)
}

/// Unproject a screen point (pixels, origin top-left) into a world ray.
///
/// Assumes Bevy's reverse-z projection: the near plane maps to NDC z = 1.
pub fn screen_ray(
    screen: Vec2,
    viewport: Vec2,
    world_from_view: Mat4,
    clip_from_view: Mat4,
) -> Option<Ray3d> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    let ndc = Vec2::new(
        screen.x / viewport.x * 2.0 - 1.0,
        1.0 - screen.y / viewport.y * 2.0,
    );
    let world_from_ndc = world_from_view * clip_from_view.inverse();
    let near = world_from_ndc.project_point3(ndc.extend(1.0));
    let far = world_from_ndc.project_point3(ndc.extend(f32::EPSILON));
    let direction = Dir3::new(far - near).ok()?;
    Some(Ray3d {
        origin: near,
        direction,
    })
}
