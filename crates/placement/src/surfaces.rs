//! Surface qualification and first-detection tracking.
//!
//! A surface is placeable when all of these hold:
//! - its own tracking quality is `Tracking`
//! - it has not been subsumed into another surface
//! - it is horizontal (upward or downward facing)
//! - its boundary polygon has at least `min_polygon_vertices` vertices

use bevy::math::{Vec2, Vec3};

use crate::config::PlacementParams;
use crate::geometry::point_in_polygon;
use crate::tracking::{Surface, TrackingQuality, TrackingSnapshot};

pub fn is_placeable(surface: &Surface, params: &PlacementParams) -> bool {
    surface.quality == TrackingQuality::Tracking
        && surface.subsumed_by.is_none()
        && surface.orientation.is_horizontal()
        && surface.vertex_count() >= params.min_polygon_vertices
}

/// Keep only placeable surfaces, preserving backend order.
pub fn qualify_surfaces(surfaces: Vec<Surface>, params: &PlacementParams) -> Vec<Surface> {
    surfaces
        .into_iter()
        .filter(|s| is_placeable(s, params))
        .collect()
}

/// Whether a world-space point lies inside the surface's polygon (not just
/// on its infinite plane). The point is projected onto the surface's local
/// XZ plane first.
pub fn contains_point(surface: &Surface, world: Vec3) -> bool {
    let local = surface.center.inverse_transform_point(world);
    point_in_polygon(Vec2::new(local.x, local.z), &surface.polygon)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionPhase {
    #[default]
    NoSurfaces,
    SurfacesDetected,
}

/// Tracks the NoSurfaces -> SurfacesDetected transition so that its feedback
/// pulse fires once per detection event rather than once per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceDetection {
    phase: DetectionPhase,
}

impl SurfaceDetection {
    pub fn phase(&self) -> DetectionPhase {
        self.phase
    }

    /// Returns `true` exactly when this snapshot produced the transition into
    /// `SurfacesDetected`. The phase only re-arms when the camera is tracking
    /// and sees zero qualified surfaces, so a brief tracking loss does not
    /// retrigger the pulse.
    pub fn observe(&mut self, snapshot: &TrackingSnapshot) -> bool {
        let count = snapshot.qualified_surface_count();
        match self.phase {
            DetectionPhase::NoSurfaces if count > 0 => {
                self.phase = DetectionPhase::SurfacesDetected;
                true
            }
            DetectionPhase::SurfacesDetected if snapshot.is_tracking() && count == 0 => {
                self.phase = DetectionPhase::NoSurfaces;
                false
            }
            _ => false,
        }
    }
}
