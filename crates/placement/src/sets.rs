//! Per-frame ordering of the placement pipeline.
//!
//! ```text
//! Ingest  →  Decide  →  Execute  →  Reconcile  →  Publish
//! ```
//!
//! * **Ingest** – session start/end requests, lifecycle events and tracking
//!   frames are fed to the controller.
//! * **Decide** – timers, clear requests and taps; commands are emitted.
//! * **Execute** – collaborators (the renderer) carry out the commands and
//!   send `AnchorReport`s. Nothing in this crate runs here.
//! * **Reconcile** – reports are applied to the controller.
//! * **Publish** – the `StatusView` is rebuilt for the UI.

use bevy::prelude::*;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlacementSet {
    Ingest,
    Decide,
    Execute,
    Reconcile,
    Publish,
}
