//! Feedback pulses: a short tint along the screen edges standing in for
//! haptics on desktop.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use placement::{FeedbackPulse, PlacementCommand, PlacementCommandEvent};

const EDGE_WIDTH: f32 = 10.0;

/// The pulse currently fading out, if any.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct FeedbackFlash {
    pulse: Option<FeedbackPulse>,
    remaining: f32,
}

impl FeedbackFlash {
    fn duration(pulse: FeedbackPulse) -> f32 {
        match pulse {
            FeedbackPulse::Light => 0.12,
            FeedbackPulse::Strong => 0.3,
        }
    }

    fn peak_alpha(pulse: FeedbackPulse) -> f32 {
        match pulse {
            FeedbackPulse::Light => 0.25,
            FeedbackPulse::Strong => 0.6,
        }
    }

    /// A new pulse replaces whatever is still fading.
    pub fn trigger(&mut self, pulse: FeedbackPulse) {
        self.pulse = Some(pulse);
        self.remaining = Self::duration(pulse);
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
        if self.remaining == 0.0 {
            self.pulse = None;
        }
    }

    pub fn pulse(&self) -> Option<FeedbackPulse> {
        self.pulse
    }

    /// Linear fade from the pulse's peak to zero.
    pub fn alpha(&self) -> f32 {
        match self.pulse {
            Some(pulse) => Self::peak_alpha(pulse) * self.remaining / Self::duration(pulse),
            None => 0.0,
        }
    }
}

pub fn play_feedback_pulses(
    mut events: EventReader<PlacementCommandEvent>,
    mut flash: ResMut<FeedbackFlash>,
) {
    for PlacementCommandEvent(command) in events.read() {
        if let PlacementCommand::Feedback(pulse) = command {
            debug!("Feedback pulse: {pulse:?}");
            flash.trigger(*pulse);
        }
    }
}

pub fn fade_feedback_flash(time: Res<Time>, mut flash: ResMut<FeedbackFlash>) {
    if flash.pulse().is_some() {
        flash.tick(time.delta_secs());
    }
}

pub fn draw_feedback_flash(flash: Res<FeedbackFlash>, mut contexts: EguiContexts) {
    let alpha = flash.alpha();
    if alpha <= 0.0 {
        return;
    }
    let ctx = contexts.ctx_mut();
    let screen = ctx.screen_rect();
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("feedback_flash"),
    ));
    let color = egui::Color32::from_rgba_unmultiplied(255, 255, 255, (alpha * 255.0) as u8);
    let edges = [
        egui::Rect::from_min_max(screen.min, egui::pos2(screen.max.x, screen.min.y + EDGE_WIDTH)),
        egui::Rect::from_min_max(egui::pos2(screen.min.x, screen.max.y - EDGE_WIDTH), screen.max),
        egui::Rect::from_min_max(screen.min, egui::pos2(screen.min.x + EDGE_WIDTH, screen.max.y)),
        egui::Rect::from_min_max(egui::pos2(screen.max.x - EDGE_WIDTH, screen.min.y), screen.max),
    ];
    for edge in edges {
        painter.rect_filled(edge, 0.0, color);
    }
}
