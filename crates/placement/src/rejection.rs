//! Transient placement rejections shown to the user.

use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    TooSoonAfterLastPlacement,
    NoQualifiedSurfaceHit,
    SessionNotReady,
    /// A previous anchor creation has not been reported yet.
    CreationPending,
    Other(String),
}

impl RejectionReason {
    pub fn message(&self) -> String {
        match self {
            RejectionReason::TooSoonAfterLastPlacement => {
                "Please wait a moment before placing again".to_string()
            }
            RejectionReason::NoQualifiedSurfaceHit => {
                "Tap on a detected surface to place the tool".to_string()
            }
            RejectionReason::SessionNotReady => "Surface tracking is not ready yet".to_string(),
            RejectionReason::CreationPending => "Still placing the previous tool".to_string(),
            RejectionReason::Other(detail) => format!("Could not place tool: {detail}"),
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::TooSoonAfterLastPlacement => write!(f, "too soon after last placement"),
            RejectionReason::NoQualifiedSurfaceHit => write!(f, "no qualified surface hit"),
            RejectionReason::SessionNotReady => write!(f, "session not ready"),
            RejectionReason::CreationPending => write!(f, "creation pending"),
            RejectionReason::Other(detail) => write!(f, "other: {detail}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRejection {
    pub reason: RejectionReason,
    pub message: String,
}

impl From<RejectionReason> for PlacementRejection {
    fn from(reason: RejectionReason) -> Self {
        let message = reason.message();
        Self { reason, message }
    }
}

/// A rejection together with the moment it stops being shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRejection {
    pub rejection: PlacementRejection,
    pub expires_at: Duration,
}

impl ActiveRejection {
    pub fn new(reason: RejectionReason, now: Duration, display: Duration) -> Self {
        Self {
            rejection: reason.into(),
            expires_at: now + display,
        }
    }

    pub fn is_current(&self, now: Duration) -> bool {
        now < self.expires_at
    }
}
