//! Drives the placement controller from Bevy events.

use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;

use crate::catalog::CatalogResource;
use crate::command_log::PlacementCommandLog;
use crate::config::PlacementParams;
use crate::controller::{PlacementCommand, PlacementController, PlacementId};
use crate::events::{
    AnchorReport, ClearPlacementRequest, EndPlacementSession, PlacementCommandEvent,
    ScreenTap, SessionLifecycle, StartPlacementSession, TrackingFrame,
};
use crate::hit_test::{HitTest, ScriptedHitTest};
use crate::rejection::PlacementRejection;
use crate::sets::PlacementSet;
use crate::status::{PlacementStatus, StatusTone};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// The running placement session, if any.
#[derive(Resource, Debug, Default)]
pub struct PlacementSession {
    pub controller: Option<PlacementController>,
}

impl PlacementSession {
    pub fn is_active(&self) -> bool {
        self.controller.is_some()
    }
}

/// The tracking backend's hit-test primitive for the latest frame.
///
/// Cleared when the session pauses so no tap is resolved against a frame
/// that no longer exists.
#[derive(Resource, Default)]
pub struct FrameHitTest(pub Option<Box<dyn HitTest + Send + Sync>>);

impl FrameHitTest {
    pub fn set(&mut self, hit_test: impl HitTest + Send + Sync + 'static) {
        self.0 = Some(Box::new(hit_test));
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

/// Everything the overlay needs to draw, rebuilt every frame.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct StatusView {
    pub active: bool,
    pub tool_name: String,
    pub status: PlacementStatus,
    pub headline: String,
    pub guidance: Vec<String>,
    pub tone: StatusTone,
    pub rejection: Option<PlacementRejection>,
    pub placed: bool,
    pub placed_id: Option<PlacementId>,
    pub surface_count: usize,
    pub cleaning: bool,
}

impl Default for StatusView {
    fn default() -> Self {
        let status = PlacementStatus::Initializing;
        Self {
            active: false,
            tool_name: String::new(),
            headline: status.headline(""),
            guidance: status.guidance(),
            tone: status.tone(),
            status,
            rejection: None,
            placed: false,
            placed_id: None,
            surface_count: 0,
            cleaning: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct PlacementPlugin;

impl Plugin for PlacementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlacementParams>()
            .init_resource::<CatalogResource>()
            .init_resource::<PlacementSession>()
            .init_resource::<FrameHitTest>()
            .init_resource::<StatusView>()
            .init_resource::<PlacementCommandLog>();

        app.add_event::<TrackingFrame>()
            .add_event::<SessionLifecycle>()
            .add_event::<ScreenTap>()
            .add_event::<ClearPlacementRequest>()
            .add_event::<StartPlacementSession>()
            .add_event::<EndPlacementSession>()
            .add_event::<AnchorReport>()
            .add_event::<PlacementCommandEvent>();

        app.configure_sets(
            Update,
            (
                PlacementSet::Ingest,
                PlacementSet::Decide,
                PlacementSet::Execute,
                PlacementSet::Reconcile,
                PlacementSet::Publish,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (
                handle_session_requests,
                ingest_lifecycle,
                ingest_tracking_frames,
            )
                .chain()
                .in_set(PlacementSet::Ingest),
        )
        .add_systems(
            Update,
            (tick_controller, handle_clear_requests, handle_taps)
                .chain()
                .in_set(PlacementSet::Decide),
        )
        .add_systems(
            Update,
            apply_anchor_reports.in_set(PlacementSet::Reconcile),
        )
        .add_systems(
            Update,
            publish_status_view.in_set(PlacementSet::Publish),
        );
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn emit(
    commands: Vec<PlacementCommand>,
    now: Duration,
    writer: &mut EventWriter<PlacementCommandEvent>,
    log: &mut PlacementCommandLog,
) {
    for command in commands {
        log.push(now, command.clone());
        writer.send(PlacementCommandEvent(command));
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_session_requests(
    mut starts: EventReader<StartPlacementSession>,
    mut ends: EventReader<EndPlacementSession>,
    mut session: ResMut<PlacementSession>,
    mut hit_test: ResMut<FrameHitTest>,
    catalog: Res<CatalogResource>,
    params: Res<PlacementParams>,
    time: Res<Time<Real>>,
    mut writer: EventWriter<PlacementCommandEvent>,
    mut log: ResMut<PlacementCommandLog>,
) {
    let now = time.elapsed();
    for _ in ends.read() {
        if let Some(mut controller) = session.controller.take() {
            info!("ending placement session for {}", controller.active_tool().name);
            emit(controller.release_all(), now, &mut writer, &mut log);
        }
        hit_test.clear();
    }
    for start in starts.read() {
        match session.controller.as_mut() {
            Some(controller) => {
                if let Err(err) = controller.set_active_tool(start.tool) {
                    warn!("cannot switch tool: {err}");
                }
            }
            None => {
                match PlacementController::new(Arc::clone(&catalog.0), start.tool, params.clone()) {
                    Ok(controller) => {
                        info!("starting placement session for {}", controller.active_tool().name);
                        session.controller = Some(controller);
                    }
                    Err(err) => warn!("cannot start placement session: {err}"),
                }
            }
        }
    }
}

fn ingest_lifecycle(
    mut events: EventReader<SessionLifecycle>,
    mut session: ResMut<PlacementSession>,
    mut hit_test: ResMut<FrameHitTest>,
    time: Res<Time<Real>>,
    mut writer: EventWriter<PlacementCommandEvent>,
    mut log: ResMut<PlacementCommandLog>,
) {
    let now = time.elapsed();
    for event in events.read() {
        let Some(controller) = session.controller.as_mut() else {
            debug!("lifecycle {event:?} without a placement session");
            continue;
        };
        let commands = match event {
            SessionLifecycle::Created => controller.on_session_created(),
            SessionLifecycle::Resumed => controller.on_session_resumed(),
            SessionLifecycle::Paused => {
                hit_test.clear();
                controller.on_session_paused()
            }
        };
        emit(commands, now, &mut writer, &mut log);
    }
}

fn ingest_tracking_frames(
    mut frames: EventReader<TrackingFrame>,
    mut session: ResMut<PlacementSession>,
    time: Res<Time<Real>>,
    mut writer: EventWriter<PlacementCommandEvent>,
    mut log: ResMut<PlacementCommandLog>,
) {
    let now = time.elapsed();
    let Some(controller) = session.controller.as_mut() else {
        frames.clear();
        return;
    };
    for TrackingFrame(update) in frames.read() {
        let commands = controller.ingest_frame(update.clone());
        emit(commands, now, &mut writer, &mut log);
    }
}

fn tick_controller(
    mut session: ResMut<PlacementSession>,
    time: Res<Time<Real>>,
    mut writer: EventWriter<PlacementCommandEvent>,
    mut log: ResMut<PlacementCommandLog>,
) {
    let now = time.elapsed();
    if let Some(controller) = session.controller.as_mut() {
        emit(controller.tick(now), now, &mut writer, &mut log);
    }
}

fn handle_clear_requests(
    mut requests: EventReader<ClearPlacementRequest>,
    mut session: ResMut<PlacementSession>,
    time: Res<Time<Real>>,
    mut writer: EventWriter<PlacementCommandEvent>,
    mut log: ResMut<PlacementCommandLog>,
) {
    let now = time.elapsed();
    for _ in requests.read() {
        if let Some(controller) = session.controller.as_mut() {
            emit(controller.clear_placement(now), now, &mut writer, &mut log);
        }
    }
}

fn handle_taps(
    mut taps: EventReader<ScreenTap>,
    mut session: ResMut<PlacementSession>,
    hit_test: Res<FrameHitTest>,
    time: Res<Time<Real>>,
    mut writer: EventWriter<PlacementCommandEvent>,
    mut log: ResMut<PlacementCommandLog>,
) {
    let now = time.elapsed();
    let Some(controller) = session.controller.as_mut() else {
        taps.clear();
        return;
    };
    let no_hits = ScriptedHitTest::default();
    let frame_hits: &dyn HitTest = match hit_test.0.as_deref() {
        Some(frame_hits) => frame_hits,
        None => &no_hits,
    };
    for tap in taps.read() {
        let result = controller.on_tap(tap.position, frame_hits, now);
        emit(result.commands, now, &mut writer, &mut log);
    }
}

fn apply_anchor_reports(
    mut reports: EventReader<AnchorReport>,
    mut session: ResMut<PlacementSession>,
    time: Res<Time<Real>>,
    mut writer: EventWriter<PlacementCommandEvent>,
    mut log: ResMut<PlacementCommandLog>,
) {
    let now = time.elapsed();
    for report in reports.read() {
        let commands = match (session.controller.as_mut(), report) {
            (Some(controller), AnchorReport::Created { id, handle }) => {
                controller.on_anchor_created(*id, *handle, now)
            }
            (Some(controller), AnchorReport::Failed { id, error }) => {
                controller.on_anchor_failed(*id, error.clone(), now)
            }
            (Some(controller), AnchorReport::Destroyed { handle }) => {
                controller.on_anchor_destroyed(*handle)
            }
            // The session ended while the anchor was being created.
            (None, AnchorReport::Created { id, handle }) => {
                warn!("anchor {handle} for {id} arrived after the session ended, destroying");
                vec![PlacementCommand::DestroyAnchor { handle: *handle }]
            }
            (None, _) => Vec::new(),
        };
        emit(commands, now, &mut writer, &mut log);
    }
}

fn publish_status_view(
    session: Res<PlacementSession>,
    time: Res<Time<Real>>,
    mut view: ResMut<StatusView>,
) {
    let Some(controller) = session.controller.as_ref() else {
        if view.active {
            *view = StatusView::default();
        }
        return;
    };
    let now = time.elapsed();
    let status = controller.status();
    let tool_name = controller.active_tool().name.clone();
    let next = StatusView {
        active: true,
        headline: status.headline(&tool_name),
        guidance: status.guidance(),
        tone: status.tone(),
        status,
        tool_name,
        rejection: controller.current_rejection(now).cloned(),
        placed: controller.is_placed(),
        placed_id: controller.placed().map(|p| p.id),
        surface_count: controller.qualified_surface_count(),
        cleaning: controller.is_cleaning(),
    };
    if *view != next {
        *view = next;
    }
}
