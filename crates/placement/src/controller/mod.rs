//! The placement state machine.
//!
//! [`PlacementController`] owns at most one placement, a pending creation or
//! nothing. Every event type has one ingestion method that updates the
//! controller and returns the [`PlacementCommand`]s the caller must execute,
//! in order. The controller never talks to the renderer directly; the renderer
//! reports back through `on_anchor_created`, `on_anchor_failed` and
//! `on_anchor_destroyed`.

pub mod machine;
pub mod types;

pub use machine::PlacementController;
pub use types::*;

#[cfg(test)]
mod tests;
