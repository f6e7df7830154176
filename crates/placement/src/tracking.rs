//! Per-frame tracking input and the immutable snapshot derived from it.
//!
//! The tracking backend hands over a [`FrameUpdate`] every frame. Ingest turns
//! it into a [`TrackingSnapshot`]: qualified surfaces are computed once,
//! the light intensity is reduced to a hint, and a failure reason is only kept
//! while the camera is actually not tracking. Snapshots are replaced
//! wholesale, never patched.

use std::fmt;
use std::time::Duration;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::PlacementParams;
use crate::geometry::Pose;
use crate::surfaces;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrackingQuality {
    #[default]
    Unknown,
    Tracking,
    NotTracking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackingFailureReason {
    InsufficientLight,
    ExcessiveMotion,
    InsufficientFeatures,
    Other,
}

impl TrackingFailureReason {
    pub fn label(&self) -> &'static str {
        match self {
            TrackingFailureReason::InsufficientLight => "insufficient light",
            TrackingFailureReason::ExcessiveMotion => "excessive motion",
            TrackingFailureReason::InsufficientFeatures => "insufficient features",
            TrackingFailureReason::Other => "other",
        }
    }
}

/// Coarse light level shown next to the "ready to place" status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightQuality {
    Low,
    Good,
    Bright,
}

impl LightQuality {
    /// `None` for missing or nonsensical intensities.
    pub fn from_intensity(intensity: f32, params: &PlacementParams) -> Option<Self> {
        if !intensity.is_finite() || intensity < 0.0 {
            return None;
        }
        Some(if intensity < params.low_light_threshold {
            LightQuality::Low
        } else if intensity > params.bright_light_threshold {
            LightQuality::Bright
        } else {
            LightQuality::Good
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            LightQuality::Low => "Low light",
            LightQuality::Good => "Good lighting",
            LightQuality::Bright => "Bright light",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceOrientation {
    HorizontalUpward,
    HorizontalDownward,
    Vertical,
}

impl SurfaceOrientation {
    pub fn is_horizontal(&self) -> bool {
        matches!(
            self,
            SurfaceOrientation::HorizontalUpward | SurfaceOrientation::HorizontalDownward
        )
    }
}

/// A detected surface as reported by the tracking backend for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub id: SurfaceId,
    pub quality: TrackingQuality,
    /// Set once the backend has merged this surface into a larger one.
    pub subsumed_by: Option<SurfaceId>,
    pub orientation: SurfaceOrientation,
    /// Surface center; local +Y is the surface normal.
    pub center: Pose,
    /// Boundary in the surface's local XZ plane.
    pub polygon: Vec<Vec2>,
}

impl Surface {
    /// A tracked, upward-facing surface. Convenience for backends and tests.
    pub fn horizontal(id: u64, center: Pose, polygon: Vec<Vec2>) -> Self {
        Self {
            id: SurfaceId(id),
            quality: TrackingQuality::Tracking,
            subsumed_by: None,
            orientation: SurfaceOrientation::HorizontalUpward,
            center,
            polygon,
        }
    }

    pub fn with_quality(mut self, quality: TrackingQuality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_orientation(mut self, orientation: SurfaceOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn subsumed_into(mut self, parent: SurfaceId) -> Self {
        self.subsumed_by = Some(parent);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.polygon.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraTracking {
    pub quality: TrackingQuality,
    pub failure: Option<TrackingFailureReason>,
}

impl CameraTracking {
    pub fn tracking() -> Self {
        Self {
            quality: TrackingQuality::Tracking,
            failure: None,
        }
    }

    pub fn lost(reason: TrackingFailureReason) -> Self {
        Self {
            quality: TrackingQuality::NotTracking,
            failure: Some(reason),
        }
    }
}

/// Raw input for one tracking frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameUpdate {
    pub timestamp: Duration,
    pub camera: CameraTracking,
    /// Average pixel intensity in `[0, 1]`, when light estimation is on.
    pub light_intensity: Option<f32>,
    /// Every surface the backend currently knows about.
    pub surfaces: Vec<Surface>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSnapshot {
    timestamp: Duration,
    camera_quality: TrackingQuality,
    failure: Option<TrackingFailureReason>,
    qualified: Vec<Surface>,
    light_intensity: Option<f32>,
    light: Option<LightQuality>,
}

impl TrackingSnapshot {
    pub fn ingest(update: FrameUpdate, params: &PlacementParams) -> Self {
        let FrameUpdate {
            timestamp,
            camera,
            light_intensity,
            surfaces,
        } = update;

        let tracking = camera.quality == TrackingQuality::Tracking;
        // Surfaces are only trusted while the camera itself is tracking.
        let qualified = if tracking {
            surfaces::qualify_surfaces(surfaces, params)
        } else {
            Vec::new()
        };
        let failure = if tracking { None } else { camera.failure };
        let light_intensity = light_intensity.filter(|i| i.is_finite() && *i >= 0.0);
        let light = light_intensity.and_then(|i| LightQuality::from_intensity(i, params));

        Self {
            timestamp,
            camera_quality: camera.quality,
            failure,
            qualified,
            light_intensity,
            light,
        }
    }

    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    pub fn camera_quality(&self) -> TrackingQuality {
        self.camera_quality
    }

    pub fn is_tracking(&self) -> bool {
        self.camera_quality == TrackingQuality::Tracking
    }

    pub fn failure(&self) -> Option<TrackingFailureReason> {
        self.failure
    }

    pub fn qualified_surfaces(&self) -> &[Surface] {
        &self.qualified
    }

    pub fn qualified_surface_count(&self) -> usize {
        self.qualified.len()
    }

    pub fn find_qualified(&self, id: SurfaceId) -> Option<&Surface> {
        self.qualified.iter().find(|s| s.id == id)
    }

    pub fn light_intensity(&self) -> Option<f32> {
        self.light_intensity
    }

    pub fn light(&self) -> Option<LightQuality> {
        self.light
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Vec<Vec2> {
        vec![
            Vec2::new(-0.5, -0.5),
            Vec2::new(0.5, -0.5),
            Vec2::new(0.5, 0.5),
            Vec2::new(-0.5, 0.5),
        ]
    }

    fn frame(camera: CameraTracking, surfaces: Vec<Surface>) -> FrameUpdate {
        FrameUpdate {
            timestamp: Duration::from_millis(16),
            camera,
            light_intensity: Some(0.5),
            surfaces,
        }
    }

    #[test]
    fn light_quality_thresholds() {
        let params = PlacementParams::default();
        assert_eq!(LightQuality::from_intensity(0.1, &params), Some(LightQuality::Low));
        assert_eq!(LightQuality::from_intensity(0.3, &params), Some(LightQuality::Good));
        assert_eq!(LightQuality::from_intensity(0.8, &params), Some(LightQuality::Good));
        assert_eq!(LightQuality::from_intensity(0.95, &params), Some(LightQuality::Bright));
        assert_eq!(LightQuality::from_intensity(f32::NAN, &params), None);
        assert_eq!(LightQuality::from_intensity(-1.0, &params), None);
    }

    #[test]
    fn ingest_counts_only_qualified_surfaces() {
        let params = PlacementParams::default();
        let surfaces = vec![
            Surface::horizontal(1, Pose::IDENTITY, quad()),
            Surface::horizontal(2, Pose::IDENTITY, quad())
                .with_orientation(SurfaceOrientation::Vertical),
            Surface::horizontal(3, Pose::IDENTITY, quad()).subsumed_into(SurfaceId(1)),
        ];
        let snapshot = TrackingSnapshot::ingest(frame(CameraTracking::tracking(), surfaces), &params);
        assert_eq!(snapshot.timestamp(), Duration::from_millis(16));
        assert_eq!(snapshot.camera_quality(), TrackingQuality::Tracking);
        assert_eq!(snapshot.qualified_surface_count(), 1);
        assert!(snapshot.find_qualified(SurfaceId(1)).is_some());
        assert!(snapshot.find_qualified(SurfaceId(3)).is_none());
        assert_eq!(snapshot.light(), Some(LightQuality::Good));
    }

    #[test]
    fn ingest_ignores_surfaces_while_camera_is_not_tracking() {
        let params = PlacementParams::default();
        let surfaces = vec![Surface::horizontal(1, Pose::IDENTITY, quad())];
        let snapshot = TrackingSnapshot::ingest(
            frame(CameraTracking::lost(TrackingFailureReason::ExcessiveMotion), surfaces),
            &params,
        );
        assert!(!snapshot.is_tracking());
        assert_eq!(snapshot.camera_quality(), TrackingQuality::NotTracking);
        assert_eq!(snapshot.qualified_surface_count(), 0);
        assert_eq!(snapshot.failure(), Some(TrackingFailureReason::ExcessiveMotion));
    }

    #[test]
    fn failure_reason_is_dropped_while_tracking() {
        let params = PlacementParams::default();
        let camera = CameraTracking {
            quality: TrackingQuality::Tracking,
            failure: Some(TrackingFailureReason::Other),
        };
        let snapshot = TrackingSnapshot::ingest(frame(camera, Vec::new()), &params);
        assert_eq!(snapshot.failure(), None);
    }

    #[test]
    fn bogus_light_intensity_yields_no_hint() {
        let params = PlacementParams::default();
        let mut update = frame(CameraTracking::tracking(), Vec::new());
        update.light_intensity = Some(f32::INFINITY);
        let snapshot = TrackingSnapshot::ingest(update, &params);
        assert_eq!(snapshot.light_intensity(), None);
        assert_eq!(snapshot.light(), None);
    }
}
