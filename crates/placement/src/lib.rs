//! Single-object AR placement: tracking ingest, surface qualification, tap
//! resolution, the placement state machine and the status projection, plus
//! the Bevy plugin that drives them.

pub mod catalog;
pub mod command_log;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod geometry;
pub mod plugin;
pub mod rejection;
pub mod sets;
pub mod status;
pub mod style;
pub mod surfaces;
pub mod tap_resolver;
pub mod tracking;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use catalog::{CatalogResource, ToolCatalog, ToolId, ToolProfile};
pub use command_log::PlacementCommandLog;
pub use config::PlacementParams;
pub use controller::{
    AnchorHandle, FeedbackPulse, PlacedObject, PlacementCommand, PlacementController,
    PlacementId, PlacementOutcome, TapResult,
};
pub use error::{CreateError, LoadError, UnknownTool};
pub use events::{
    AnchorReport, ClearPlacementRequest, EndPlacementSession, PlacementCommandEvent, ScreenTap,
    SessionLifecycle, StartPlacementSession, TrackingFrame,
};
pub use geometry::Pose;
pub use hit_test::{CameraProjection, HitTest, RaycastHitTest, ScriptedHitTest, SurfaceHit};
pub use plugin::{FrameHitTest, PlacementPlugin, PlacementSession, StatusView};
pub use rejection::{PlacementRejection, RejectionReason};
pub use sets::PlacementSet;
pub use status::{PlacementStatus, StatusTone};
pub use style::AnchorStyle;
pub use tracking::{
    CameraTracking, FrameUpdate, LightQuality, Surface, SurfaceId, SurfaceOrientation,
    TrackingFailureReason, TrackingQuality, TrackingSnapshot,
};
