use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{ToolId, ToolProfile};
use crate::geometry::Pose;
use crate::rejection::RejectionReason;
use crate::style::AnchorStyle;
use crate::tracking::SurfaceId;

/// Opaque handle to a rendered anchor, allocated by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorHandle(pub u64);

impl fmt::Display for AnchorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}

/// Unique per placement event: tool id plus a session-wide serial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlacementId {
    pub tool: ToolId,
    pub serial: u64,
}

impl fmt::Display for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.tool, self.serial)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackPulse {
    /// Short corrective or informational pulse.
    Light,
    /// Confirmation of a user-visible change.
    Strong,
}

/// Side effect requested by the controller, executed in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementCommand {
    CreateAnchor {
        placement: PlacementId,
        pose: Pose,
        style: AnchorStyle,
    },
    DestroyAnchor {
        handle: AnchorHandle,
    },
    Feedback(FeedbackPulse),
}

/// The one object currently in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedObject {
    pub id: PlacementId,
    pub profile: Arc<ToolProfile>,
    pub pose: Pose,
    pub anchor: AnchorHandle,
    pub created_at: Duration,
}

/// A create command has been issued and not yet reported on.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCreation {
    pub id: PlacementId,
    pub profile: Arc<ToolProfile>,
    pub pose: Pose,
    pub surface: SurfaceId,
    pub issued_at: Duration,
    /// Debounce timestamp to restore if this creation does not succeed.
    pub(crate) previous_placement_at: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) enum PlacementSlot {
    #[default]
    Empty,
    Pending(PendingCreation),
    Placed(PlacedObject),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// A create command was issued for this placement.
    Issued(PlacementId),
    Rejected(RejectionReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TapResult {
    pub outcome: PlacementOutcome,
    pub commands: Vec<PlacementCommand>,
}

impl TapResult {
    pub fn is_issued(&self) -> bool {
        matches!(self.outcome, PlacementOutcome::Issued(_))
    }

    pub fn rejection(&self) -> Option<&RejectionReason> {
        match &self.outcome {
            PlacementOutcome::Rejected(reason) => Some(reason),
            PlacementOutcome::Issued(_) => None,
        }
    }
}
