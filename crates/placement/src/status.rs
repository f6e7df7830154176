//! Projects tracking and placement state onto one user-facing status.
//!
//! [`project_status`] is a pure function evaluated with fixed precedence, first
//! match wins:
//!
//! 1. tracking failure reason present: `Degraded`
//! 2. session not initialized: `Initializing`
//! 3. camera not tracking: `Stabilizing`
//! 4. no qualified surfaces: `Scanning`
//! 5. nothing placed: `ReadyToPlace`
//! 6. `Placed`
//!
//! A tracking failure therefore always hides a stale "placed" status.

use crate::controller::PlacedObject;
use crate::tracking::{LightQuality, TrackingFailureReason, TrackingSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementStatus {
    Degraded(TrackingFailureReason),
    Initializing,
    Stabilizing,
    Scanning,
    ReadyToPlace {
        surface_count: usize,
        light: Option<LightQuality>,
    },
    Placed {
        profile_name: String,
    },
}

/// Visual class of a status, used by the overlay to pick colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusTone {
    Warning,
    Progress,
    Ready,
    Success,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatusInputs<'a> {
    pub session_initialized: bool,
    pub snapshot: Option<&'a TrackingSnapshot>,
    pub placed: Option<&'a PlacedObject>,
}

pub fn project_status(inputs: &StatusInputs<'_>) -> PlacementStatus {
    if let Some(reason) = inputs.snapshot.and_then(|s| s.failure()) {
        return PlacementStatus::Degraded(reason);
    }
    if !inputs.session_initialized {
        return PlacementStatus::Initializing;
    }
    let Some(snapshot) = inputs.snapshot.filter(|s| s.is_tracking()) else {
        return PlacementStatus::Stabilizing;
    };
    if snapshot.qualified_surface_count() == 0 {
        return PlacementStatus::Scanning;
    }
    match inputs.placed {
        None => PlacementStatus::ReadyToPlace {
            surface_count: snapshot.qualified_surface_count(),
            light: snapshot.light(),
        },
        Some(placed) => PlacementStatus::Placed {
            profile_name: placed.profile.name.clone(),
        },
    }
}

impl PlacementStatus {
    /// One-line title. `tool_name` is the active tool, used while ready.
    pub fn headline(&self, tool_name: &str) -> String {
        match self {
            PlacementStatus::Degraded(reason) => match reason {
                TrackingFailureReason::InsufficientLight => "Need more light",
                TrackingFailureReason::ExcessiveMotion => "Move device slower",
                TrackingFailureReason::InsufficientFeatures => "Point at textured surfaces",
                TrackingFailureReason::Other => "Tracking issue",
            }
            .to_string(),
            PlacementStatus::Initializing => "Initializing AR...".to_string(),
            PlacementStatus::Stabilizing => "Getting ready...".to_string(),
            PlacementStatus::Scanning => "Scanning surfaces...".to_string(),
            PlacementStatus::ReadyToPlace { .. } => {
                format!("Tap the white grid to place {tool_name}")
            }
            PlacementStatus::Placed { profile_name } => format!("{profile_name} placed"),
        }
    }

    /// Secondary lines shown under the headline, possibly none.
    pub fn guidance(&self) -> Vec<String> {
        match self {
            PlacementStatus::Degraded(reason) => vec![match reason {
                TrackingFailureReason::InsufficientLight => {
                    "Move to better lighting or turn on more lights"
                }
                TrackingFailureReason::ExcessiveMotion => {
                    "Hold device steadier and move more slowly"
                }
                TrackingFailureReason::InsufficientFeatures => {
                    "Point camera at surfaces with patterns or textures"
                }
                TrackingFailureReason::Other => "Follow the guidance to resume tracking",
            }
            .to_string()],
            PlacementStatus::Initializing => Vec::new(),
            PlacementStatus::Stabilizing => {
                vec!["Move device slowly and point at textured surfaces".to_string()]
            }
            PlacementStatus::Scanning => {
                vec!["Point camera at flat surfaces like floors or tables".to_string()]
            }
            PlacementStatus::ReadyToPlace {
                surface_count,
                light,
            } => {
                let mut lines = vec!["Single placement mode".to_string()];
                let plural = if *surface_count == 1 { "" } else { "s" };
                lines.push(format!("{surface_count} surface{plural} detected"));
                if let Some(light) = light {
                    lines.push(format!("Lighting: {}", light.label()));
                }
                lines
            }
            PlacementStatus::Placed { .. } => {
                vec!["Tap another spot to move it, or clear to remove it".to_string()]
            }
        }
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            PlacementStatus::Degraded(_) => StatusTone::Warning,
            PlacementStatus::Initializing
            | PlacementStatus::Stabilizing
            | PlacementStatus::Scanning => StatusTone::Progress,
            PlacementStatus::ReadyToPlace { .. } => StatusTone::Ready,
            PlacementStatus::Placed { .. } => StatusTone::Success,
        }
    }
}
