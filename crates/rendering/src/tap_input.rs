//! Turns completed pointer gestures into `ScreenTap` events.
//!
//! A tap is a left-button press and release (or touch start and end) that
//! moved less than `TAP_SLOP` pixels and did not start over the overlay.
//! Taps are only produced while a placement session runs.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use placement::{PlacementSession, ScreenTap};

/// Movement in logical pixels beyond which a press becomes a drag.
pub const TAP_SLOP: f32 = 8.0;

/// Mouse press in progress.
#[derive(Resource, Debug, Default)]
pub struct PointerPress {
    pub start: Option<Vec2>,
    pub over_ui: bool,
}

pub fn is_tap(start: Vec2, end: Vec2) -> bool {
    start.distance(end) <= TAP_SLOP
}

/// The pointer is over an overlay panel or egui is handling it.
fn pointer_over_overlay(contexts: &mut EguiContexts) -> bool {
    let ctx = contexts.ctx_mut();
    ctx.is_pointer_over_area() || ctx.wants_pointer_input()
}

pub fn emit_screen_taps(
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Option<Res<Touches>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    session: Res<PlacementSession>,
    mut press: ResMut<PointerPress>,
    mut contexts: EguiContexts,
    mut taps: EventWriter<ScreenTap>,
) {
    let over_ui = pointer_over_overlay(&mut contexts);
    let cursor = windows.get_single().ok().and_then(|w| w.cursor_position());

    if buttons.just_pressed(MouseButton::Left) {
        press.start = cursor;
        press.over_ui = over_ui;
    }
    if buttons.just_released(MouseButton::Left) {
        let start = press.start.take();
        if let (Some(start), Some(end)) = (start, cursor) {
            if session.is_active() && !press.over_ui && is_tap(start, end) {
                taps.send(ScreenTap { position: end });
            }
        }
    }

    let Some(touches) = touches else {
        return;
    };
    if over_ui || !session.is_active() {
        return;
    }
    for touch in touches.iter_just_released() {
        if is_tap(touch.start_position(), touch.position()) {
            taps.send(ScreenTap {
                position: touch.position(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_movement_is_still_a_tap() {
        assert!(is_tap(Vec2::new(100.0, 100.0), Vec2::new(104.0, 105.0)));
        assert!(!is_tap(Vec2::new(100.0, 100.0), Vec2::new(130.0, 100.0)));
    }
}
