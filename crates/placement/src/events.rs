//! Events crossing the boundary between the placement core and its
//! collaborators (tracking backend, renderer, UI).

use bevy::prelude::*;

use crate::catalog::ToolId;
use crate::controller::{AnchorHandle, PlacementCommand, PlacementId};
use crate::error::CreateError;
use crate::tracking::FrameUpdate;

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// One frame of tracking data from the backend.
#[derive(Event, Debug, Clone)]
pub struct TrackingFrame(pub FrameUpdate);

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLifecycle {
    Created,
    Resumed,
    Paused,
}

/// A completed tap gesture, in logical window pixels (origin top-left).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ScreenTap {
    pub position: Vec2,
}

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ClearPlacementRequest;

/// Begin placing `tool`. Replaces the active tool if a session already runs.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartPlacementSession {
    pub tool: ToolId,
}

/// Tear the session down, destroying any placed anchor.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct EndPlacementSession;

/// Result of executing an anchor command, sent back by the renderer.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum AnchorReport {
    Created {
        id: PlacementId,
        handle: AnchorHandle,
    },
    Failed {
        id: PlacementId,
        error: CreateError,
    },
    Destroyed {
        handle: AnchorHandle,
    },
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// A command for the renderer or feedback layer, sent in issue order.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PlacementCommandEvent(pub PlacementCommand);
