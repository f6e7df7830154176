//! In-memory stand-in for the rendering collaborator.
//!
//! Runs in `PlacementSet::Execute`, executes anchor commands against a map of
//! live anchors and answers with `AnchorReport`s, the way the real renderer
//! does. It can be told to fail the next creation or to hold creations back
//! until the test releases them.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::controller::{AnchorHandle, FeedbackPulse, PlacementCommand, PlacementId};
use crate::error::CreateError;
use crate::events::{AnchorReport, PlacementCommandEvent};

/// Everything the fake renderer was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererOp {
    Created { id: PlacementId, handle: AnchorHandle },
    Failed { id: PlacementId, error: CreateError },
    Deferred { id: PlacementId },
    Destroyed { handle: AnchorHandle },
    /// Destroy for a handle that was not live.
    DestroyedAbsent { handle: AnchorHandle },
    Pulse(FeedbackPulse),
}

impl RendererOp {
    /// Create/destroy operations, as opposed to feedback.
    pub fn touches_anchors(&self) -> bool {
        !matches!(self, RendererOp::Pulse(_))
    }
}

#[derive(Resource, Debug, Default)]
pub struct FakeRenderer {
    live: BTreeMap<AnchorHandle, PlacementId>,
    ops: Vec<RendererOp>,
    fail_next: Option<CreateError>,
    defer: bool,
    deferred: Vec<PlacementId>,
    next_handle: u64,
    max_live: usize,
}

impl FakeRenderer {
    pub fn fail_next(&mut self, error: CreateError) {
        self.fail_next = Some(error);
    }

    /// While set, creations are recorded but not reported.
    pub fn set_defer(&mut self, defer: bool) {
        self.defer = defer;
    }

    /// Creations held back by [`set_defer`](Self::set_defer), oldest first.
    pub fn take_deferred(&mut self) -> Vec<PlacementId> {
        std::mem::take(&mut self.deferred)
    }

    /// Allocate a live anchor for a creation the test completes by hand.
    pub fn allocate(&mut self, id: PlacementId) -> AnchorHandle {
        self.next_handle += 1;
        let handle = AnchorHandle(self.next_handle);
        self.live.insert(handle, id);
        self.max_live = self.max_live.max(self.live.len());
        self.ops.push(RendererOp::Created { id, handle });
        handle
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live(&self) -> impl Iterator<Item = (&AnchorHandle, &PlacementId)> {
        self.live.iter()
    }

    /// Highest number of anchors that were ever live at once.
    pub fn max_live(&self) -> usize {
        self.max_live
    }

    pub fn ops(&self) -> &[RendererOp] {
        &self.ops
    }

    pub fn anchor_op_count(&self) -> usize {
        self.ops.iter().filter(|op| op.touches_anchors()).count()
    }

    pub fn pulses(&self) -> Vec<FeedbackPulse> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                RendererOp::Pulse(pulse) => Some(*pulse),
                _ => None,
            })
            .collect()
    }

    fn execute(&mut self, command: &PlacementCommand) -> Option<AnchorReport> {
        match command {
            PlacementCommand::CreateAnchor { placement, .. } => {
                if let Some(error) = self.fail_next.take() {
                    self.ops.push(RendererOp::Failed {
                        id: *placement,
                        error: error.clone(),
                    });
                    return Some(AnchorReport::Failed {
                        id: *placement,
                        error,
                    });
                }
                if self.defer {
                    self.ops.push(RendererOp::Deferred { id: *placement });
                    self.deferred.push(*placement);
                    return None;
                }
                let handle = self.allocate(*placement);
                Some(AnchorReport::Created {
                    id: *placement,
                    handle,
                })
            }
            PlacementCommand::DestroyAnchor { handle } => {
                if self.live.remove(handle).is_some() {
                    self.ops.push(RendererOp::Destroyed { handle: *handle });
                } else {
                    self.ops.push(RendererOp::DestroyedAbsent { handle: *handle });
                }
                Some(AnchorReport::Destroyed { handle: *handle })
            }
            PlacementCommand::Feedback(pulse) => {
                self.ops.push(RendererOp::Pulse(*pulse));
                None
            }
        }
    }
}

pub(crate) fn execute_fake_commands(
    mut commands: EventReader<PlacementCommandEvent>,
    mut renderer: ResMut<FakeRenderer>,
    mut reports: EventWriter<AnchorReport>,
) {
    for PlacementCommandEvent(command) in commands.read() {
        if let Some(report) = renderer.execute(command) {
            reports.send(report);
        }
    }
}
