//! Assertion helpers for `TestSession` scenarios.

use crate::controller::{FeedbackPulse, PlacementCommand};
use crate::rejection::RejectionReason;
use crate::status::PlacementStatus;

use super::TestSession;

impl TestSession {
    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_placed(&self) {
        let view = self.view();
        assert!(view.placed, "Expected a placed object, status is {:?}", view.status);
        assert_eq!(
            self.renderer().live_count(),
            1,
            "Expected exactly one live anchor"
        );
    }

    pub fn assert_not_placed(&self) {
        let view = self.view();
        assert!(!view.placed, "Expected nothing placed, got {:?}", view.placed_id);
    }

    /// Never more than one anchor alive at once during the whole session.
    pub fn assert_single_placement_held(&self) {
        let max = self.renderer().max_live();
        assert!(max <= 1, "Expected at most one live anchor, peak was {max}");
    }

    pub fn assert_status(&self, expected: &PlacementStatus) {
        assert_eq!(&self.view().status, expected, "Unexpected status");
    }

    pub fn assert_status_matches(&self, predicate: impl Fn(&PlacementStatus) -> bool, what: &str) {
        let status = &self.view().status;
        assert!(predicate(status), "Expected {what}, status is {status:?}");
    }

    pub fn assert_rejection(&self, expected: RejectionReason) {
        assert_eq!(
            self.rejection_reason(),
            Some(expected),
            "Unexpected rejection"
        );
    }

    pub fn assert_no_rejection(&self) {
        assert_eq!(self.rejection_reason(), None, "Expected no visible rejection");
    }

    pub fn assert_anchor_ops(&self, expected: usize) {
        let count = self.renderer().anchor_op_count();
        assert_eq!(
            count, expected,
            "Expected {expected} anchor operations, got {count}: {:?}",
            self.renderer().ops()
        );
    }

    /// The most recent feedback pulse the controller issued.
    pub fn assert_last_pulse(&self, expected: FeedbackPulse) {
        let pulses: Vec<FeedbackPulse> = self
            .command_log()
            .iter()
            .filter_map(|command| match command {
                PlacementCommand::Feedback(pulse) => Some(*pulse),
                _ => None,
            })
            .collect();
        assert_eq!(pulses.last(), Some(&expected), "Pulses so far: {pulses:?}");
    }
}
