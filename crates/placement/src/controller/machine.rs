use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use bevy::log::{debug, info, warn};
use bevy::math::Vec2;

use super::types::{
    AnchorHandle, FeedbackPulse, PendingCreation, PlacedObject, PlacementCommand, PlacementId,
    PlacementOutcome, PlacementSlot, TapResult,
};
use crate::catalog::{ToolCatalog, ToolId, ToolProfile};
use crate::config::PlacementParams;
use crate::error::{CreateError, UnknownTool};
use crate::hit_test::HitTest;
use crate::rejection::{ActiveRejection, PlacementRejection, RejectionReason};
use crate::status::{project_status, PlacementStatus, StatusInputs};
use crate::style::AnchorStyle;
use crate::surfaces::{DetectionPhase, SurfaceDetection};
use crate::tap_resolver::{check_preconditions, resolve_tap, CandidatePose, TapContext};
use crate::tracking::{FrameUpdate, TrackingFailureReason, TrackingSnapshot};

/// Abandoned placement ids remembered so a late success can be recognised.
const MAX_ABANDONED: usize = 16;

/// A destroy issued by `clear_placement` that has not been reported yet.
#[derive(Debug, Clone, Copy)]
struct ClearInFlight {
    anchor: AnchorHandle,
    issued_at: Duration,
}

#[derive(Debug, Clone)]
pub struct PlacementController {
    catalog: Arc<ToolCatalog>,
    active_tool: Arc<ToolProfile>,
    params: PlacementParams,

    session_initialized: bool,
    paused: bool,
    snapshot: Option<TrackingSnapshot>,
    detection: SurfaceDetection,
    last_failure: Option<TrackingFailureReason>,

    slot: PlacementSlot,
    last_placement_at: Option<Duration>,
    rejection: Option<ActiveRejection>,
    /// Released by the destroy report or, failing that, after the creation timeout.
    cleaning: Option<ClearInFlight>,
    abandoned: VecDeque<PlacementId>,
    next_serial: u64,
}

impl PlacementController {
    pub fn new(
        catalog: Arc<ToolCatalog>,
        tool: ToolId,
        params: PlacementParams,
    ) -> Result<Self, UnknownTool> {
        let active_tool = Arc::clone(catalog.require(tool)?);
        Ok(Self {
            catalog,
            active_tool,
            params,
            session_initialized: false,
            paused: false,
            snapshot: None,
            detection: SurfaceDetection::default(),
            last_failure: None,
            slot: PlacementSlot::Empty,
            last_placement_at: None,
            rejection: None,
            cleaning: None,
            abandoned: VecDeque::new(),
            next_serial: 1,
        })
    }

    /// Later placements use `tool`; the current placement is left alone.
    pub fn set_active_tool(&mut self, tool: ToolId) -> Result<(), UnknownTool> {
        self.active_tool = Arc::clone(self.catalog.require(tool)?);
        Ok(())
    }

    pub fn active_tool(&self) -> &Arc<ToolProfile> {
        &self.active_tool
    }

    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    pub fn on_session_created(&mut self) -> Vec<PlacementCommand> {
        info!("placement session created for {}", self.active_tool.name);
        self.session_initialized = true;
        self.paused = false;
        vec![PlacementCommand::Feedback(FeedbackPulse::Light)]
    }

    pub fn on_session_resumed(&mut self) -> Vec<PlacementCommand> {
        debug!("placement session resumed");
        self.paused = false;
        Vec::new()
    }

    /// Drops the cached snapshot. The placement survives the pause.
    pub fn on_session_paused(&mut self) -> Vec<PlacementCommand> {
        debug!("placement session paused");
        self.paused = true;
        self.snapshot = None;
        Vec::new()
    }

    // -----------------------------------------------------------------------
    // Tracking frames
    // -----------------------------------------------------------------------

    pub fn ingest_frame(&mut self, update: FrameUpdate) -> Vec<PlacementCommand> {
        if self.paused {
            return Vec::new();
        }
        let snapshot = TrackingSnapshot::ingest(update, &self.params);
        let mut commands = Vec::new();

        let failure = snapshot.failure();
        if failure.is_some() && failure != self.last_failure {
            if let Some(reason) = failure {
                warn!("tracking degraded: {}", reason.label());
            }
            commands.push(PlacementCommand::Feedback(FeedbackPulse::Strong));
        }
        self.last_failure = failure;

        if self.detection.observe(&snapshot) {
            info!(
                "surfaces detected: {} qualified",
                snapshot.qualified_surface_count()
            );
            commands.push(PlacementCommand::Feedback(FeedbackPulse::Light));
        }

        self.snapshot = Some(snapshot);
        commands
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Resolve a tap against the latest snapshot and try to place there.
    pub fn on_tap(&mut self, screen: Vec2, hit_test: &dyn HitTest, now: Duration) -> TapResult {
        if let Err(reason) = self.preconditions(now) {
            return self.reject(reason, now, Vec::new());
        }
        let candidate = self
            .snapshot
            .as_ref()
            .and_then(|snapshot| resolve_tap(screen, snapshot, hit_test, &self.params));
        self.place(candidate, now)
    }

    /// Place at an already resolved candidate; `None` means the tap hit nothing.
    pub fn attempt_placement(
        &mut self,
        candidate: Option<CandidatePose>,
        now: Duration,
    ) -> TapResult {
        if let Err(reason) = self.preconditions(now) {
            return self.reject(reason, now, Vec::new());
        }
        self.place(candidate, now)
    }

    fn preconditions(&self, now: Duration) -> Result<(), RejectionReason> {
        let ctx = TapContext {
            snapshot: self.snapshot.as_ref(),
            session_initialized: self.session_initialized,
            cleaning: self.cleaning.is_some(),
            creation_pending: matches!(self.slot, PlacementSlot::Pending(_)),
            last_placement_at: self.last_placement_at,
            now,
        };
        check_preconditions(&ctx, &self.params)
    }

    fn place(&mut self, candidate: Option<CandidatePose>, now: Duration) -> TapResult {
        let Some(candidate) = candidate else {
            return self.reject(
                RejectionReason::NoQualifiedSurfaceHit,
                now,
                vec![PlacementCommand::Feedback(FeedbackPulse::Light)],
            );
        };
        if !candidate.pose.is_finite() {
            return self.reject(
                RejectionReason::Other("invalid pose".to_string()),
                now,
                Vec::new(),
            );
        }

        let mut commands = Vec::with_capacity(2);
        if let PlacementSlot::Placed(old) = std::mem::take(&mut self.slot) {
            info!("replacing placement {}", old.id);
            commands.push(PlacementCommand::DestroyAnchor { handle: old.anchor });
        }

        let id = PlacementId {
            tool: self.active_tool.id,
            serial: self.next_serial,
        };
        self.next_serial += 1;

        // Armed before the create goes out so a re-entrant tap is debounced.
        let previous_placement_at = self.last_placement_at.replace(now);
        self.slot = PlacementSlot::Pending(PendingCreation {
            id,
            profile: Arc::clone(&self.active_tool),
            pose: candidate.pose,
            surface: candidate.surface,
            issued_at: now,
            previous_placement_at,
        });
        self.rejection = None;

        commands.push(PlacementCommand::CreateAnchor {
            placement: id,
            pose: candidate.pose,
            style: AnchorStyle::for_tool(self.active_tool.id),
        });
        debug!("create issued for {id} on {}", candidate.surface);
        TapResult {
            outcome: PlacementOutcome::Issued(id),
            commands,
        }
    }

    fn reject(
        &mut self,
        reason: RejectionReason,
        now: Duration,
        commands: Vec<PlacementCommand>,
    ) -> TapResult {
        debug!("placement rejected: {reason}");
        self.rejection = Some(ActiveRejection::new(
            reason.clone(),
            now,
            self.params.rejection_display(),
        ));
        TapResult {
            outcome: PlacementOutcome::Rejected(reason),
            commands,
        }
    }

    fn abandon(&mut self, id: PlacementId) {
        if self.abandoned.len() >= MAX_ABANDONED {
            self.abandoned.pop_front();
        }
        self.abandoned.push_back(id);
    }

    // -----------------------------------------------------------------------
    // Renderer reports
    // -----------------------------------------------------------------------

    pub fn on_anchor_created(
        &mut self,
        id: PlacementId,
        handle: AnchorHandle,
        now: Duration,
    ) -> Vec<PlacementCommand> {
        match std::mem::take(&mut self.slot) {
            PlacementSlot::Pending(pending) if pending.id == id => {
                info!("placed {} ({}) at {}", pending.profile.name, id, handle);
                self.slot = PlacementSlot::Placed(PlacedObject {
                    id,
                    profile: pending.profile,
                    pose: pending.pose,
                    anchor: handle,
                    created_at: now,
                });
                self.last_placement_at = Some(now);
                vec![PlacementCommand::Feedback(FeedbackPulse::Strong)]
            }
            other => {
                self.slot = other;
                if let Some(pos) = self.abandoned.iter().position(|a| *a == id) {
                    self.abandoned.remove(pos);
                    warn!("late anchor {handle} for abandoned placement {id}, destroying");
                } else {
                    warn!("anchor {handle} for unknown placement {id}, destroying");
                }
                vec![PlacementCommand::DestroyAnchor { handle }]
            }
        }
    }

    pub fn on_anchor_failed(
        &mut self,
        id: PlacementId,
        error: CreateError,
        now: Duration,
    ) -> Vec<PlacementCommand> {
        match std::mem::take(&mut self.slot) {
            PlacementSlot::Pending(pending) if pending.id == id => {
                warn!("anchor creation for {id} failed: {error}");
                self.last_placement_at = pending.previous_placement_at;
                self.reject(RejectionReason::Other(error.to_string()), now, Vec::new());
            }
            other => {
                self.slot = other;
                self.abandoned.retain(|a| *a != id);
                debug!("ignoring failure report for stale placement {id}: {error}");
            }
        }
        Vec::new()
    }

    pub fn on_anchor_destroyed(&mut self, handle: AnchorHandle) -> Vec<PlacementCommand> {
        if self.cleaning.is_some_and(|c| c.anchor == handle) {
            debug!("clear finished for {handle}");
            self.cleaning = None;
        }
        Vec::new()
    }

    // -----------------------------------------------------------------------
    // Clearing and timers
    // -----------------------------------------------------------------------

    /// Remove the current placement. A no-op with nothing placed or while a
    /// previous clear is still in flight.
    pub fn clear_placement(&mut self, now: Duration) -> Vec<PlacementCommand> {
        if self.cleaning.is_some() {
            debug!("clear already in progress");
            return Vec::new();
        }
        match std::mem::take(&mut self.slot) {
            PlacementSlot::Empty => Vec::new(),
            PlacementSlot::Pending(pending) => {
                info!("clear abandons pending placement {}", pending.id);
                self.last_placement_at = pending.previous_placement_at;
                self.abandon(pending.id);
                Vec::new()
            }
            PlacementSlot::Placed(placed) => {
                info!("clearing placement {} at {now:?}", placed.id);
                self.cleaning = Some(ClearInFlight {
                    anchor: placed.anchor,
                    issued_at: now,
                });
                vec![
                    PlacementCommand::DestroyAnchor {
                        handle: placed.anchor,
                    },
                    PlacementCommand::Feedback(FeedbackPulse::Strong),
                ]
            }
        }
    }

    /// Destroy everything without feedback; used when the session ends.
    pub fn release_all(&mut self) -> Vec<PlacementCommand> {
        match std::mem::take(&mut self.slot) {
            PlacementSlot::Empty => Vec::new(),
            PlacementSlot::Pending(pending) => {
                self.abandon(pending.id);
                Vec::new()
            }
            PlacementSlot::Placed(placed) => {
                vec![PlacementCommand::DestroyAnchor {
                    handle: placed.anchor,
                }]
            }
        }
    }

    /// Expire rejections, time out a pending creation and release a clear
    /// the renderer never acknowledged.
    pub fn tick(&mut self, now: Duration) -> Vec<PlacementCommand> {
        if self.rejection.as_ref().is_some_and(|r| !r.is_current(now)) {
            self.rejection = None;
        }
        if let Some(clear) = self.cleaning {
            if now.saturating_sub(clear.issued_at) >= self.params.creation_timeout() {
                debug!("no destroy report for {}, releasing clear guard", clear.anchor);
                self.cleaning = None;
            }
        }
        let timed_out = matches!(
            &self.slot,
            PlacementSlot::Pending(p) if now.saturating_sub(p.issued_at) >= self.params.creation_timeout()
        );
        if timed_out {
            if let PlacementSlot::Pending(pending) = std::mem::take(&mut self.slot) {
                warn!("anchor creation for {} timed out", pending.id);
                self.last_placement_at = pending.previous_placement_at;
                self.abandon(pending.id);
                self.reject(
                    RejectionReason::Other("placement timed out".to_string()),
                    now,
                    Vec::new(),
                );
            }
        }
        Vec::new()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn status(&self) -> PlacementStatus {
        project_status(&StatusInputs {
            session_initialized: self.session_initialized,
            snapshot: self.snapshot.as_ref(),
            placed: self.placed(),
        })
    }

    /// The rejection to show at `now`, if it has not expired.
    pub fn current_rejection(&self, now: Duration) -> Option<&PlacementRejection> {
        self.rejection
            .as_ref()
            .filter(|r| r.is_current(now))
            .map(|r| &r.rejection)
    }

    pub fn placed(&self) -> Option<&PlacedObject> {
        match &self.slot {
            PlacementSlot::Placed(placed) => Some(placed),
            _ => None,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.placed().is_some()
    }

    pub fn pending(&self) -> Option<&PendingCreation> {
        match &self.slot {
            PlacementSlot::Pending(pending) => Some(pending),
            _ => None,
        }
    }

    pub fn is_cleaning(&self) -> bool {
        self.cleaning.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn session_initialized(&self) -> bool {
        self.session_initialized
    }

    pub fn snapshot(&self) -> Option<&TrackingSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn qualified_surface_count(&self) -> usize {
        self.snapshot
            .as_ref()
            .map_or(0, |s| s.qualified_surface_count())
    }

    pub fn detection_phase(&self) -> DetectionPhase {
        self.detection.phase()
    }

    pub fn last_placement_at(&self) -> Option<Duration> {
        self.last_placement_at
    }
}
