//! `ArgRecorder`: the boundary between a forward-time simulator and the
//! columnar tables, as described by §4.5 of the data model.
//!
//! Grounded end to end on the Python prototype's `ARGrecorder`: the same
//! four operations (`add_individual`, `add_record`, `add_mutation`, the
//! combined call form) and the same "tables own everything, the ID map owns
//! nothing but itself" ownership split, translated to owned Rust types and a
//! `thiserror`-backed error path instead of bare `ValueError`s.

use crate::error::{RecorderError, Result};
use crate::flags::NodeFlags;
use crate::id_map::IdMap;
use crate::simplify;
use crate::tables::TableCollection;
use crate::time_reconciler::TimeReconciler;
use crate::tree_sequence::TreeSequence;
use crate::tsdef::{IdType, Position, Time, NULL_POPULATION};

/// Owns the four tables, the input-ID to node-ID map, and the bookkeeping
/// needed to reconcile forward time and to simplify.
pub struct ArgRecorder {
    tables: TableCollection,
    ids: IdMap,
    reconciler: TimeReconciler,
    max_time: Time,
    num_simplifies: usize,
}

impl ArgRecorder {
    /// A recorder with no prior history: an empty set of tables over
    /// `[0, sequence_length)`.
    pub fn new(sequence_length: Position) -> Result<Self> {
        Ok(ArgRecorder {
            tables: TableCollection::new(sequence_length)?,
            ids: IdMap::new(),
            reconciler: TimeReconciler::new(),
            max_time: 0.0,
            num_simplifies: 0,
        })
    }

    /// Seed a recorder with an initial roster of founders: `roster` maps
    /// each founder's input ID to a dense index `k` in `0..n`, and `n` node
    /// rows are appended at forward time zero, flagged `IS_SAMPLE`.
    pub fn with_initial_roster(
        sequence_length: Position,
        roster: &[(IdType, IdType)],
    ) -> Result<Self> {
        let mut recorder = ArgRecorder::new(sequence_length)?;
        let mut sorted_roster: Vec<(IdType, IdType)> = roster.to_vec();
        sorted_roster.sort_by_key(|&(_, k)| k);
        for (input_id, _) in sorted_roster {
            recorder.add_individual(input_id, 0.0, NodeFlags::IS_SAMPLE, NULL_POPULATION)?;
        }
        Ok(recorder)
    }

    /// Seed a recorder from an already-built prior history, e.g. one
    /// produced by a neutral-coalescent collaborator outside this crate,
    /// plus the `input_id -> node_id` map into that history's rows.
    pub fn with_prior_history(
        tables: TableCollection,
        id_map: &[(IdType, IdType)],
        sequence_length: Position,
    ) -> Result<Self> {
        if (tables.sequence_length() - sequence_length).abs() > 0.0 {
            return Err(RecorderError::SequenceLengthMismatch {
                prior: tables.sequence_length(),
                given: sequence_length,
            });
        }
        let mut ids = IdMap::new();
        let max_time = tables.nodes().iter().map(|n| n.time).fold(0.0, f64::max);
        let num_nodes = tables.num_nodes();
        for &(input_id, node_id) in id_map {
            ids.assign(input_id, node_id)?;
        }
        // Prior history is already in reverse time; treat every existing row
        // as "already reconciled" so a later `update_times` only flips rows
        // added after this point.
        Ok(ArgRecorder {
            tables,
            ids,
            reconciler: TimeReconciler::with_state(max_time, num_nodes),
            max_time,
            num_simplifies: 0,
        })
    }

    pub fn sequence_length(&self) -> Position {
        self.tables.sequence_length()
    }

    pub fn num_simplifies(&self) -> usize {
        self.num_simplifies
    }

    pub fn tables(&self) -> &TableCollection {
        &self.tables
    }

    fn check_ids(&self, input_ids: &[IdType]) -> Result<()> {
        for &id in input_ids {
            if !self.ids.contains(id) {
                return Err(RecorderError::UnknownId { input_id: id });
            }
        }
        Ok(())
    }

    /// Assign a fresh node ID to `input_id`, append a node row with forward
    /// time `time`, and advance `max_time` if necessary. Fails with
    /// `DuplicateId` if `input_id` is already known.
    pub fn add_individual(
        &mut self,
        input_id: IdType,
        time: Time,
        flags: NodeFlags,
        population: i32,
    ) -> Result<IdType> {
        let node_id = self.tables.add_node(flags, time, population)?;
        self.ids.assign(input_id, node_id)?;
        if time > self.max_time {
            self.max_time = time;
        }
        Ok(node_id)
    }

    /// Bulk form of [`Self::add_individual`]. All four slices must have
    /// equal length.
    pub fn add_individuals(
        &mut self,
        input_ids: &[IdType],
        times: &[Time],
        flags: &[NodeFlags],
        populations: &[i32],
    ) -> Result<Vec<IdType>> {
        assert_eq!(input_ids.len(), times.len());
        assert_eq!(input_ids.len(), flags.len());
        assert_eq!(input_ids.len(), populations.len());
        input_ids
            .iter()
            .zip(times.iter())
            .zip(flags.iter())
            .zip(populations.iter())
            .map(|(((&id, &t), &f), &p)| self.add_individual(id, t, f, p))
            .collect()
    }

    /// Append one edge per child in `child_input_ids`, all on
    /// `[left, right)` from `parent_input_id`. Fails with `UnknownId` if any
    /// input ID is not yet known; the recorder does not itself check
    /// `time[parent] > time[child]` (simplify does).
    pub fn add_record(
        &mut self,
        left: Position,
        right: Position,
        parent_input_id: IdType,
        child_input_ids: &[IdType],
    ) -> Result<()> {
        let parent = self.ids.lookup(parent_input_id)?;
        let children = self.ids.lookup_all(child_input_ids)?;
        for child in children {
            self.tables.add_edge(left, right, parent, child)?;
        }
        Ok(())
    }

    /// Record a mutation at `position` on the chromosome of `node_input_id`,
    /// creating a new site if `position` has not been seen before.
    pub fn add_mutation(
        &mut self,
        position: Position,
        node_input_id: IdType,
        derived_state: Vec<u8>,
        ancestral_state: Vec<u8>,
    ) -> Result<()> {
        let node = self.ids.lookup(node_input_id)?;
        let site = self.tables.add_or_find_site(position, ancestral_state)?;
        self.tables.add_mutation(site, node, derived_state)?;
        Ok(())
    }

    /// Combined call form: if `child` is not yet known, add it as a new
    /// individual first (tolerating the case where it was just created in
    /// the same logical call), then record the transmission.
    pub fn record_birth(
        &mut self,
        parent: IdType,
        time: Time,
        population: i32,
        child: IdType,
        left: Position,
        right: Position,
    ) -> Result<()> {
        if !self.ids.contains(child) {
            self.add_individual(child, time, NodeFlags::IS_SAMPLE, population)?;
        }
        self.add_record(left, right, parent, &[child])
    }

    /// Set `IS_SAMPLE` on the node rows for `input_ids`, clearing it on
    /// every other row. Does not itself trigger simplify.
    pub fn mark_samples(&mut self, input_ids: &[IdType]) -> Result<()> {
        self.check_ids(input_ids)?;
        let sample_nodes = self.ids.lookup_all(input_ids)?;
        let mut flags: Vec<NodeFlags> = self
            .tables
            .nodes()
            .iter()
            .map(|n| n.flags & !NodeFlags::IS_SAMPLE)
            .collect();
        for node in sample_nodes {
            flags[node as usize] |= NodeFlags::IS_SAMPLE;
        }
        self.tables.set_node_flags(&flags);
        Ok(())
    }

    /// Reconcile forward/reverse time coordinates. Safe to call any number
    /// of times; idempotent if no node rows have been added since the last
    /// call.
    pub fn update_times(&mut self) {
        self.reconciler.update_times(&mut self.tables, self.max_time);
    }

    /// Run `update_times`, sort, and simplify down to `sample_input_ids` in
    /// place. On success, the ID map is rebuilt so `sample_input_ids[k]` maps
    /// to node `k`. On failure, the recorder is left exactly as it was
    /// before the call.
    pub fn simplify(&mut self, sample_input_ids: &[IdType]) -> Result<()> {
        self.check_ids(sample_input_ids)?;
        self.update_times();
        let sample_nodes = self.ids.lookup_all(sample_input_ids)?;

        let last_sorted = self.tables.last_sorted_edge();
        self.tables.sort_tables_for_simplification();

        match simplify::simplify(&self.tables, &sample_nodes) {
            Ok(output) => {
                self.tables.set_tables(
                    output.nodes,
                    output.edges,
                    output.sites,
                    output.mutations,
                );
                self.reconciler =
                    TimeReconciler::with_state(self.max_time, self.tables.num_nodes());
                self.ids.rebind(sample_input_ids);
                self.num_simplifies += 1;
                Ok(())
            }
            Err(e) => {
                // Restore the pre-sort edge ordering guarantee: a failed
                // simplify must leave the recorder in its pre-call state.
                self.tables.mark_last_sorted_edge(last_sorted);
                Err(e)
            }
        }
    }

    /// Produce a detached tree sequence for `sample_input_ids`: reconciles
    /// time and marks the given samples on the stored tables, same as a
    /// real `simplify` call would need, but simplifies only a scratch copy
    /// and leaves the stored tables un-simplified.
    pub fn tree_sequence(&mut self, sample_input_ids: &[IdType]) -> Result<TreeSequence> {
        self.check_ids(sample_input_ids)?;
        self.update_times();
        self.mark_samples(sample_input_ids)?;
        let sample_nodes = self.ids.lookup_all(sample_input_ids)?;
        let mut tables = TableCollection::new(self.tables.sequence_length())?;
        tables.set_tables(
            self.tables.nodes().clone(),
            self.tables.edges().clone(),
            self.tables.sites().clone(),
            self.tables.mutations().clone(),
        );
        tables.sort_tables_for_simplification();
        let output = simplify::simplify(&tables, &sample_nodes)?;
        Ok(TreeSequence::new(
            self.tables.sequence_length(),
            output.nodes,
            output.edges,
            output.sites,
            output.mutations,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scenario 6: zero-length and inverted edges are rejected up front.
    #[test]
    fn test_scenario_6_invalid_edge_rejected() {
        let mut r = ArgRecorder::new(1.0).unwrap();
        r.add_individual(0, 0.0, NodeFlags::IS_SAMPLE, NULL_POPULATION)
            .unwrap();
        r.add_individual(1, 1.0, NodeFlags::empty(), NULL_POPULATION)
            .unwrap();
        assert!(matches!(
            r.add_record(0.5, 0.5, 1, &[0]),
            Err(RecorderError::Tables(_))
        ));
        assert!(matches!(
            r.add_record(0.5, 0.4, 1, &[0]),
            Err(RecorderError::Tables(_))
        ));
    }

    #[test]
    fn test_add_record_unknown_parent() {
        let mut r = ArgRecorder::new(1.0).unwrap();
        r.add_individual(0, 0.0, NodeFlags::IS_SAMPLE, NULL_POPULATION)
            .unwrap();
        assert_eq!(
            r.add_record(0.0, 1.0, 99, &[0]).unwrap_err(),
            RecorderError::UnknownId { input_id: 99 }
        );
    }

    #[test]
    fn test_duplicate_individual_rejected() {
        let mut r = ArgRecorder::new(1.0).unwrap();
        r.add_individual(0, 0.0, NodeFlags::IS_SAMPLE, NULL_POPULATION)
            .unwrap();
        assert_eq!(
            r.add_individual(0, 1.0, NodeFlags::IS_SAMPLE, NULL_POPULATION)
                .unwrap_err(),
            RecorderError::DuplicateId { input_id: 0 }
        );
    }

    #[test]
    fn test_record_birth_combined_form_tolerates_same_call_addition() {
        let mut r = ArgRecorder::new(1.0).unwrap();
        r.add_individual(0, 0.0, NodeFlags::IS_SAMPLE, NULL_POPULATION)
            .unwrap();
        r.record_birth(0, 1.0, NULL_POPULATION, 1, 0.0, 1.0)
            .unwrap();
        assert_eq!(r.tables().num_nodes(), 2);
        assert_eq!(r.tables().num_edges(), 1);
    }

    /// `tree_sequence` must reconcile time and simplify away the unary
    /// ancestor the same way an in-place `simplify` would, while leaving
    /// the recorder's own stored edges un-simplified.
    #[test]
    fn test_tree_sequence_matches_simplify_but_leaves_tables_unsimplified() {
        let mut r = ArgRecorder::new(1.0).unwrap();
        r.add_individual(3, 0.0, NodeFlags::empty(), NULL_POPULATION)
            .unwrap();
        r.add_individual(2, 1.0, NodeFlags::empty(), NULL_POPULATION)
            .unwrap();
        r.add_individual(0, 2.0, NodeFlags::IS_SAMPLE, NULL_POPULATION)
            .unwrap();
        r.add_individual(1, 2.0, NodeFlags::IS_SAMPLE, NULL_POPULATION)
            .unwrap();
        r.add_record(0.0, 1.0, 3, &[2]).unwrap();
        r.add_record(0.0, 1.0, 2, &[0]).unwrap();
        r.add_record(0.0, 1.0, 3, &[1]).unwrap();

        let ts = r.tree_sequence(&[0, 1]).unwrap();

        // The unary node (input id 2) collapses away: two edges from the
        // root ancestor straight to the two samples.
        assert_eq!(ts.nodes().len(), 3);
        assert_eq!(ts.edges().len(), 2);

        // The stored tables are untouched by simplification: all three
        // original edges and four original nodes are still there.
        assert_eq!(r.tables().num_nodes(), 4);
        assert_eq!(r.tables().num_edges(), 3);
    }
}
