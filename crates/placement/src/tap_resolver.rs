//! Turns a screen tap into at most one candidate placement pose.
//!
//! Resolution has two halves. [`check_preconditions`] decides whether a tap
//! may be considered at all; [`resolve_tap`] walks the hit-test results in
//! their native depth order and keeps the first hit that lands inside a
//! qualified surface's polygon.

use std::time::Duration;

use bevy::math::Vec2;

use crate::config::PlacementParams;
use crate::geometry::Pose;
use crate::hit_test::HitTest;
use crate::rejection::RejectionReason;
use crate::surfaces::{contains_point, is_placeable};
use crate::tracking::{SurfaceId, TrackingSnapshot};

/// A resolved 3D placement point, tagged with the surface it landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidatePose {
    pub pose: Pose,
    pub surface: SurfaceId,
    pub distance: f32,
}

/// Everything the precondition check needs to know about the session.
#[derive(Debug, Clone, Copy)]
pub struct TapContext<'a> {
    pub snapshot: Option<&'a TrackingSnapshot>,
    pub session_initialized: bool,
    pub cleaning: bool,
    pub creation_pending: bool,
    pub last_placement_at: Option<Duration>,
    pub now: Duration,
}

/// Strictly more than the debounce interval must have passed.
pub fn debounce_elapsed(last: Option<Duration>, now: Duration, debounce: Duration) -> bool {
    match last {
        None => true,
        Some(last) => now.saturating_sub(last) > debounce,
    }
}

pub fn check_preconditions(
    ctx: &TapContext<'_>,
    params: &PlacementParams,
) -> Result<(), RejectionReason> {
    let ready = ctx.session_initialized
        && !ctx.cleaning
        && ctx
            .snapshot
            .is_some_and(|s| s.is_tracking() && s.qualified_surface_count() > 0);
    if !ready {
        return Err(RejectionReason::SessionNotReady);
    }
    if !debounce_elapsed(ctx.last_placement_at, ctx.now, params.debounce()) {
        return Err(RejectionReason::TooSoonAfterLastPlacement);
    }
    if ctx.creation_pending {
        return Err(RejectionReason::CreationPending);
    }
    Ok(())
}

/// First hit, nearest first, on a qualified surface and inside its polygon.
///
/// The surface state carried by the hit is checked as well as the snapshot's
/// qualified set, so a surface that lost tracking between the snapshot and
/// the hit test is never a target.
pub fn resolve_tap(
    screen: Vec2,
    snapshot: &TrackingSnapshot,
    hit_test: &dyn HitTest,
    params: &PlacementParams,
) -> Option<CandidatePose> {
    hit_test
        .hit_test(screen)
        .into_iter()
        .find(|hit| {
            is_placeable(&hit.surface, params)
                && snapshot.find_qualified(hit.surface.id).is_some()
                && contains_point(&hit.surface, hit.pose.translation)
        })
        .map(|hit| CandidatePose {
            pose: hit.pose,
            surface: hit.surface.id,
            distance: hit.distance,
        })
}
