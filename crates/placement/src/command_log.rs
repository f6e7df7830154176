//! Ring-buffer log of recently issued placement commands.
//!
//! The [`PlacementCommandLog`] resource keeps the last 64 commands together
//! with the time they were issued, so diagnostics and tests can check what
//! the controller asked for without listening to every event.

use std::time::Duration;

use bevy::prelude::*;

use crate::controller::PlacementCommand;

/// Maximum number of entries retained in the ring buffer.
const MAX_ENTRIES: usize = 64;

#[derive(Resource, Debug, Clone, Default)]
pub struct PlacementCommandLog {
    entries: Vec<(Duration, PlacementCommand)>,
}

impl PlacementCommandLog {
    /// Record a command. If the buffer is full the oldest entry is evicted.
    pub fn push(&mut self, at: Duration, command: PlacementCommand) {
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push((at, command));
    }

    /// Return the last `n` entries (or fewer if the log is shorter).
    pub fn last_n(&self, n: usize) -> &[(Duration, PlacementCommand)] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacementCommand> {
        self.entries.iter().map(|(_, command)| command)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
