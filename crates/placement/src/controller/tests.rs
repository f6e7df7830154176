use std::sync::Arc;
use std::time::Duration;

use bevy::math::{Vec2, Vec3};

use super::*;
use crate::catalog::{ToolCatalog, ToolId};
use crate::config::PlacementParams;
use crate::error::CreateError;
use crate::geometry::Pose;
use crate::hit_test::{ScriptedHitTest, SurfaceHit};
use crate::rejection::RejectionReason;
use crate::status::PlacementStatus;
use crate::surfaces::DetectionPhase;
use crate::tap_resolver::CandidatePose;
use crate::tracking::{
    CameraTracking, FrameUpdate, Surface, SurfaceId, TrackingFailureReason, TrackingQuality,
};

const TAP_A: Vec2 = Vec2::new(200.0, 400.0);
const TAP_B: Vec2 = Vec2::new(260.0, 420.0);
const TAP_MISS: Vec2 = Vec2::new(10.0, 10.0);

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn floor() -> Surface {
    Surface::horizontal(
        1,
        Pose::IDENTITY,
        vec![
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ],
    )
}

fn tracking_frame(surfaces: Vec<Surface>) -> FrameUpdate {
    FrameUpdate {
        timestamp: Duration::ZERO,
        camera: CameraTracking::tracking(),
        light_intensity: Some(0.5),
        surfaces,
    }
}

fn hits() -> ScriptedHitTest {
    let floor = floor();
    let at = |x: f32, z: f32| SurfaceHit {
        surface: floor.clone(),
        pose: Pose::from_translation(Vec3::new(x, 0.0, z)),
        distance: 1.5,
    };
    ScriptedHitTest::new()
        .with(TAP_A, vec![at(0.1, 0.2)])
        .with(TAP_B, vec![at(-0.3, 0.4)])
}

fn controller() -> PlacementController {
    PlacementController::new(
        Arc::new(ToolCatalog::default()),
        ToolId(1),
        PlacementParams::default(),
    )
    .expect("tool 1 is in the default catalog")
}

/// Session created and one tracked floor in view.
fn ready_controller() -> PlacementController {
    let mut c = controller();
    c.on_session_created();
    c.ingest_frame(tracking_frame(vec![floor()]));
    c
}

fn issued_id(result: &TapResult) -> PlacementId {
    match result.outcome {
        PlacementOutcome::Issued(id) => id,
        PlacementOutcome::Rejected(ref reason) => panic!("expected issue, got {reason:?}"),
    }
}

/// Tap and immediately report success with the given handle.
fn place_at(c: &mut PlacementController, tap: Vec2, handle: u64, now: Duration) -> PlacementId {
    let result = c.on_tap(tap, &hits(), now);
    let id = issued_id(&result);
    c.on_anchor_created(id, AnchorHandle(handle), now);
    id
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn unknown_tool_is_rejected_at_construction() {
    let err = PlacementController::new(
        Arc::new(ToolCatalog::default()),
        ToolId(99),
        PlacementParams::default(),
    )
    .unwrap_err();
    assert_eq!(err.0, ToolId(99));
}

#[test]
fn fresh_controller_is_initializing_and_empty() {
    let c = controller();
    assert_eq!(c.status(), PlacementStatus::Initializing);
    assert!(!c.is_placed());
    assert_eq!(c.qualified_surface_count(), 0);
}

// ---------------------------------------------------------------------------
// Session and frames
// ---------------------------------------------------------------------------

#[test]
fn session_created_emits_light_pulse() {
    let mut c = controller();
    assert_eq!(
        c.on_session_created(),
        vec![PlacementCommand::Feedback(FeedbackPulse::Light)]
    );
    assert!(c.session_initialized());
}

#[test]
fn first_detection_pulses_once() {
    let mut c = controller();
    c.on_session_created();
    assert!(c.ingest_frame(tracking_frame(Vec::new())).is_empty());
    assert_eq!(c.status(), PlacementStatus::Scanning);

    let first = c.ingest_frame(tracking_frame(vec![floor()]));
    assert_eq!(first, vec![PlacementCommand::Feedback(FeedbackPulse::Light)]);
    assert_eq!(c.detection_phase(), DetectionPhase::SurfacesDetected);
    assert!(c.ingest_frame(tracking_frame(vec![floor()])).is_empty());
}

#[test]
fn tracking_failure_pulses_on_appearance_and_change() {
    let mut c = ready_controller();
    let frame = |reason| FrameUpdate {
        camera: CameraTracking::lost(reason),
        ..tracking_frame(vec![floor()])
    };

    let cmds = c.ingest_frame(frame(TrackingFailureReason::InsufficientLight));
    assert_eq!(cmds, vec![PlacementCommand::Feedback(FeedbackPulse::Strong)]);
    assert!(c.ingest_frame(frame(TrackingFailureReason::InsufficientLight)).is_empty());

    let changed = c.ingest_frame(frame(TrackingFailureReason::ExcessiveMotion));
    assert_eq!(changed, vec![PlacementCommand::Feedback(FeedbackPulse::Strong)]);
    assert_eq!(
        c.status(),
        PlacementStatus::Degraded(TrackingFailureReason::ExcessiveMotion)
    );

    // Recovery is silent, the next failure pulses again.
    assert!(c.ingest_frame(tracking_frame(vec![floor()])).is_empty());
    assert_eq!(
        c.ingest_frame(frame(TrackingFailureReason::ExcessiveMotion)),
        vec![PlacementCommand::Feedback(FeedbackPulse::Strong)]
    );
}

#[test]
fn pause_drops_snapshot_but_keeps_placement() {
    let mut c = ready_controller();
    let id = place_at(&mut c, TAP_A, 1, ms(1_000));

    assert!(c.on_session_paused().is_empty());
    assert!(c.snapshot().is_none());
    assert!(c.is_paused());
    assert_eq!(c.placed().map(|p| p.id), Some(id));

    // Frames delivered while paused are not read.
    c.ingest_frame(tracking_frame(vec![floor()]));
    assert!(c.snapshot().is_none());

    let tap = c.on_tap(TAP_B, &hits(), ms(5_000));
    assert_eq!(tap.rejection(), Some(&RejectionReason::SessionNotReady));

    c.on_session_resumed();
    c.ingest_frame(tracking_frame(vec![floor()]));
    assert_eq!(c.placed().map(|p| p.id), Some(id));
    assert!(matches!(c.status(), PlacementStatus::Placed { .. }));
}

// ---------------------------------------------------------------------------
// Taps
// ---------------------------------------------------------------------------

#[test]
fn tap_before_ready_is_session_not_ready() {
    let mut c = controller();
    let result = c.on_tap(TAP_A, &hits(), ms(100));
    assert_eq!(result.rejection(), Some(&RejectionReason::SessionNotReady));
    assert!(result.commands.is_empty());

    c.on_session_created();
    c.ingest_frame(tracking_frame(Vec::new()));
    let result = c.on_tap(TAP_A, &hits(), ms(200));
    assert_eq!(result.rejection(), Some(&RejectionReason::SessionNotReady));
}

#[test]
fn accepted_tap_issues_create_then_confirms() {
    let mut c = ready_controller();
    let result = c.on_tap(TAP_A, &hits(), ms(1_000));
    let id = issued_id(&result);
    assert_eq!(id.tool, ToolId(1));
    assert_eq!(result.commands.len(), 1);
    assert!(matches!(
        result.commands[0],
        PlacementCommand::CreateAnchor { placement, .. } if placement == id
    ));
    assert!(c.pending().is_some());
    assert!(!c.is_placed());

    let cmds = c.on_anchor_created(id, AnchorHandle(7), ms(1_016));
    assert_eq!(cmds, vec![PlacementCommand::Feedback(FeedbackPulse::Strong)]);
    let placed = c.placed().expect("placement confirmed");
    assert_eq!(placed.anchor, AnchorHandle(7));
    assert_eq!(placed.profile.name, "Power Drill Pro");
    assert!((placed.pose.translation - Vec3::new(0.1, 0.0, 0.2)).length() < 1e-6);
    assert_eq!(c.last_placement_at(), Some(ms(1_016)));
}

#[test]
fn replacement_destroys_before_creating() {
    let mut c = ready_controller();
    let first = place_at(&mut c, TAP_A, 1, ms(1_000));

    let result = c.on_tap(TAP_B, &hits(), ms(1_700));
    let second = issued_id(&result);
    assert_ne!(first, second);
    assert_eq!(result.commands.len(), 2);
    assert_eq!(
        result.commands[0],
        PlacementCommand::DestroyAnchor {
            handle: AnchorHandle(1)
        }
    );
    assert!(matches!(
        result.commands[1],
        PlacementCommand::CreateAnchor { placement, .. } if placement == second
    ));
    // The old object is gone from the slot as soon as the destroy is issued.
    assert!(c.placed().is_none());
}

#[test]
fn debounce_rejects_second_tap_within_interval() {
    let mut c = ready_controller();
    let id = place_at(&mut c, TAP_A, 1, ms(1_000));

    let result = c.on_tap(TAP_B, &hits(), ms(1_100));
    assert_eq!(
        result.rejection(),
        Some(&RejectionReason::TooSoonAfterLastPlacement)
    );
    assert!(result.commands.is_empty());
    assert_eq!(c.placed().map(|p| p.id), Some(id));

    // Exactly the interval is still too soon.
    let result = c.on_tap(TAP_B, &hits(), ms(1_500));
    assert!(!result.is_issued());
    assert!(c.on_tap(TAP_B, &hits(), ms(1_501)).is_issued());
}

#[test]
fn miss_is_rejected_with_light_pulse_and_no_anchor_commands() {
    let mut c = ready_controller();
    let result = c.on_tap(TAP_MISS, &hits(), ms(1_000));
    assert_eq!(
        result.rejection(),
        Some(&RejectionReason::NoQualifiedSurfaceHit)
    );
    assert_eq!(
        result.commands,
        vec![PlacementCommand::Feedback(FeedbackPulse::Light)]
    );
    assert_eq!(
        c.current_rejection(ms(1_000)).map(|r| r.message.as_str()),
        Some("Tap on a detected surface to place the tool")
    );
    // A miss does not arm the debounce.
    assert!(c.on_tap(TAP_A, &hits(), ms(1_010)).is_issued());
}

#[test]
fn tap_while_creation_pending_is_blocked() {
    let mut c = ready_controller();
    let first = c.on_tap(TAP_A, &hits(), ms(1_000));
    assert!(first.is_issued());
    let second = c.on_tap(TAP_B, &hits(), ms(1_800));
    assert_eq!(second.rejection(), Some(&RejectionReason::CreationPending));
    assert!(second.commands.is_empty());
}

#[test]
fn duplicate_tap_before_creation_report_is_debounced() {
    let mut c = ready_controller();
    assert!(c.on_tap(TAP_A, &hits(), ms(1_000)).is_issued());
    let second = c.on_tap(TAP_B, &hits(), ms(1_100));
    assert_eq!(
        second.rejection(),
        Some(&RejectionReason::TooSoonAfterLastPlacement)
    );
    assert!(second.commands.is_empty());
}

#[test]
fn non_finite_candidate_is_rejected_before_destroying_anything() {
    let mut c = ready_controller();
    place_at(&mut c, TAP_A, 1, ms(1_000));
    let bad = CandidatePose {
        pose: Pose::from_translation(Vec3::new(f32::NAN, 0.0, 0.0)),
        surface: SurfaceId(1),
        distance: 1.0,
    };
    let result = c.attempt_placement(Some(bad), ms(2_000));
    assert_eq!(
        result.rejection(),
        Some(&RejectionReason::Other("invalid pose".to_string()))
    );
    assert!(result.commands.is_empty());
    assert!(c.is_placed());
}

#[test]
fn attempt_placement_without_candidate_is_no_hit() {
    let mut c = ready_controller();
    let result = c.attempt_placement(None, ms(1_000));
    assert_eq!(
        result.rejection(),
        Some(&RejectionReason::NoQualifiedSurfaceHit)
    );
}

#[test]
fn switching_tool_keeps_current_placement() {
    let mut c = ready_controller();
    place_at(&mut c, TAP_A, 1, ms(1_000));
    c.set_active_tool(ToolId(2)).expect("tool 2 exists");
    assert_eq!(c.placed().map(|p| p.profile.id), Some(ToolId(1)));

    let next = c.on_tap(TAP_B, &hits(), ms(2_000));
    assert_eq!(issued_id(&next).tool, ToolId(2));
    assert!(c.set_active_tool(ToolId(42)).is_err());
    assert_eq!(c.active_tool().id, ToolId(2));
}

// ---------------------------------------------------------------------------
// Renderer reports
// ---------------------------------------------------------------------------

#[test]
fn creation_failure_leaves_nothing_and_allows_retry() {
    let mut c = ready_controller();
    let result = c.on_tap(TAP_A, &hits(), ms(1_000));
    let id = issued_id(&result);

    let cmds = c.on_anchor_failed(id, CreateError::ResourceExhausted, ms(1_010));
    assert!(cmds.is_empty());
    assert!(c.pending().is_none());
    assert!(!c.is_placed());
    let rejection = c.current_rejection(ms(1_010)).expect("failure is surfaced");
    assert!(matches!(rejection.reason, RejectionReason::Other(_)));
    assert!(rejection.message.contains("exhausted"));

    // The debounce was restored, so an immediate retry goes through.
    assert!(c.on_tap(TAP_A, &hits(), ms(1_020)).is_issued());
}

#[test]
fn failed_replacement_keeps_previous_debounce() {
    let mut c = ready_controller();
    place_at(&mut c, TAP_A, 1, ms(1_000));
    let result = c.on_tap(TAP_B, &hits(), ms(2_000));
    c.on_anchor_failed(issued_id(&result), CreateError::InvalidPose, ms(2_010));
    // The old object was destroyed; nothing is placed now.
    assert!(!c.is_placed());
    assert_eq!(c.last_placement_at(), Some(ms(1_000)));
}

#[test]
fn pending_creation_times_out_and_late_success_is_destroyed() {
    let mut c = ready_controller();
    let result = c.on_tap(TAP_A, &hits(), ms(1_000));
    let id = issued_id(&result);

    c.tick(ms(2_999));
    assert!(c.pending().is_some());
    c.tick(ms(3_000));
    assert!(c.pending().is_none());
    assert_eq!(
        c.current_rejection(ms(3_000)).map(|r| r.reason.clone()),
        Some(RejectionReason::Other("placement timed out".to_string()))
    );
    assert_eq!(c.last_placement_at(), None);

    let cmds = c.on_anchor_created(id, AnchorHandle(5), ms(3_500));
    assert_eq!(
        cmds,
        vec![PlacementCommand::DestroyAnchor {
            handle: AnchorHandle(5)
        }]
    );
    assert!(!c.is_placed());
}

#[test]
fn created_report_for_unknown_placement_is_destroyed() {
    let mut c = ready_controller();
    let stray = PlacementId {
        tool: ToolId(3),
        serial: 77,
    };
    let cmds = c.on_anchor_created(stray, AnchorHandle(9), ms(10));
    assert_eq!(
        cmds,
        vec![PlacementCommand::DestroyAnchor {
            handle: AnchorHandle(9)
        }]
    );
}

#[test]
fn rejection_expires_after_display_time() {
    let mut c = ready_controller();
    c.on_tap(TAP_MISS, &hits(), ms(1_000));
    assert!(c.current_rejection(ms(3_999)).is_some());
    assert!(c.current_rejection(ms(4_000)).is_none());
    c.tick(ms(4_000));
    assert!(c.current_rejection(ms(1_000)).is_none(), "tick drops it");
}

// ---------------------------------------------------------------------------
// Clearing
// ---------------------------------------------------------------------------

#[test]
fn clear_destroys_once_and_is_guarded_until_reported() {
    let mut c = ready_controller();
    place_at(&mut c, TAP_A, 3, ms(1_000));

    let cmds = c.clear_placement(ms(2_000));
    assert_eq!(
        cmds,
        vec![
            PlacementCommand::DestroyAnchor {
                handle: AnchorHandle(3)
            },
            PlacementCommand::Feedback(FeedbackPulse::Strong),
        ]
    );
    assert!(c.is_cleaning());
    assert!(!c.is_placed());

    // Re-entrant clear and taps while cleaning do nothing.
    assert!(c.clear_placement(ms(2_001)).is_empty());
    let tap = c.on_tap(TAP_B, &hits(), ms(2_600));
    assert_eq!(tap.rejection(), Some(&RejectionReason::SessionNotReady));

    // A destroy report for some other handle does not release the guard.
    c.on_anchor_destroyed(AnchorHandle(99));
    assert!(c.is_cleaning());
    c.on_anchor_destroyed(AnchorHandle(3));
    assert!(!c.is_cleaning());
    assert!(c.on_tap(TAP_B, &hits(), ms(2_700)).is_issued());
}

#[test]
fn unacknowledged_clear_is_released_by_tick() {
    let mut c = ready_controller();
    place_at(&mut c, TAP_A, 3, ms(1_000));
    c.clear_placement(ms(2_000));
    assert!(c.is_cleaning());

    c.tick(ms(3_999));
    assert!(c.is_cleaning());
    c.tick(ms(4_000));
    assert!(!c.is_cleaning());
    assert!(c.on_tap(TAP_B, &hits(), ms(4_100)).is_issued());

    // A late report for the released anchor changes nothing.
    assert!(c.on_anchor_destroyed(AnchorHandle(3)).is_empty());
    assert!(!c.is_cleaning());
}

#[test]
fn clear_with_nothing_placed_is_a_no_op() {
    let mut c = ready_controller();
    assert!(c.clear_placement(ms(100)).is_empty());
    assert!(c.clear_placement(ms(200)).is_empty());
    assert!(!c.is_cleaning());
}

#[test]
fn clear_while_pending_abandons_creation() {
    let mut c = ready_controller();
    let result = c.on_tap(TAP_A, &hits(), ms(1_000));
    let id = issued_id(&result);
    assert!(c.clear_placement(ms(1_100)).is_empty());
    assert!(c.pending().is_none());
    let cmds = c.on_anchor_created(id, AnchorHandle(4), ms(1_200));
    assert_eq!(
        cmds,
        vec![PlacementCommand::DestroyAnchor {
            handle: AnchorHandle(4)
        }]
    );
    // The retry is not debounced by the abandoned attempt.
    assert!(c.on_tap(TAP_B, &hits(), ms(1_300)).is_issued());
}

#[test]
fn release_all_destroys_without_feedback() {
    let mut c = ready_controller();
    place_at(&mut c, TAP_A, 2, ms(1_000));
    assert_eq!(
        c.release_all(),
        vec![PlacementCommand::DestroyAnchor {
            handle: AnchorHandle(2)
        }]
    );
    assert!(c.release_all().is_empty());
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

#[test]
fn at_most_one_object_across_a_tap_sequence() {
    let mut c = ready_controller();
    let mut live: Vec<AnchorHandle> = Vec::new();
    let mut next_handle = 1;
    for step in 0..20u64 {
        let now = ms(1_000 + step * 300);
        let tap = if step % 2 == 0 { TAP_A } else { TAP_B };
        let result = c.on_tap(tap, &hits(), now);
        for cmd in &result.commands {
            match cmd {
                PlacementCommand::DestroyAnchor { handle } => live.retain(|h| h != handle),
                PlacementCommand::CreateAnchor { .. } => {
                    assert!(live.is_empty(), "create issued while {live:?} is live");
                }
                PlacementCommand::Feedback(_) => {}
            }
        }
        if let PlacementOutcome::Issued(id) = result.outcome {
            let handle = AnchorHandle(next_handle);
            next_handle += 1;
            c.on_anchor_created(id, handle, now);
            live.push(handle);
        }
        assert!(live.len() <= 1);
    }
    assert!(next_handle > 2, "several placements were accepted");
}

#[test]
fn surface_that_stopped_tracking_is_not_a_target() {
    let mut c = ready_controller();
    let stale = SurfaceHit {
        surface: floor().with_quality(TrackingQuality::NotTracking),
        pose: Pose::IDENTITY,
        distance: 1.0,
    };
    let script = ScriptedHitTest::new().with(TAP_A, vec![stale]);
    let result = c.on_tap(TAP_A, &script, ms(1_000));
    assert_eq!(
        result.rejection(),
        Some(&RejectionReason::NoQualifiedSurfaceHit)
    );
}
