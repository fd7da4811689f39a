//! Reconciling forward-time birth times against the reverse-time coordinate
//! tree sequences require.
//!
//! Grounded directly on the Python prototype's `update_times`: node rows
//! added since the last call are still in forward time and get flipped
//! against the current `max_time`; rows already flipped by a previous call
//! get shifted by how far `max_time` has advanced since then.

use crate::tables::TableCollection;
use crate::tsdef::Time;

/// Tracks the two pieces of state `update_times` needs across calls:
/// the anchor time of the last reconciliation, and how many node rows
/// existed at that point.
#[derive(Default)]
pub struct TimeReconciler {
    last_update_time: Time,
    last_update_node: usize,
}

impl TimeReconciler {
    pub fn new() -> Self {
        TimeReconciler {
            last_update_time: 0.0,
            last_update_node: 0,
        }
    }

    /// Build a reconciler that already considers every row up to
    /// `last_update_node` reconciled against anchor `last_update_time` (used
    /// when seeding a recorder from prior history, or right after a
    /// successful simplify).
    pub fn with_state(last_update_time: Time, last_update_node: usize) -> Self {
        TimeReconciler {
            last_update_time,
            last_update_node,
        }
    }

    pub fn last_update_node(&self) -> usize {
        self.last_update_node
    }

    /// Rewrite `tables`'s node times in place so that all rows are in
    /// reverse time anchored at `max_time`. Idempotent: calling this twice
    /// in a row with the same `max_time` and no new nodes leaves every time
    /// unchanged.
    pub fn update_times(&mut self, tables: &mut TableCollection, max_time: Time) {
        let dt = max_time - self.last_update_time;
        let mut times: Vec<Time> = tables.nodes().iter().map(|n| n.time).collect();

        for t in times.iter_mut().take(self.last_update_node) {
            *t += dt;
        }
        for t in times.iter_mut().skip(self.last_update_node) {
            *t = max_time - *t;
        }

        tables.set_node_times(&times);
        self.last_update_time = max_time;
        self.last_update_node = tables.num_nodes();
    }
}
