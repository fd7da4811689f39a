//! Map from a simulator's opaque "input IDs" to dense internal node IDs.
//!
//! Grounded on the `node_ids` dict carried by the Python prototype's
//! recorder: assignment hands back the next dense row index and records the
//! mapping, lookup fails loudly on an unknown key, and a successful
//! `simplify` throws the whole map away and rebuilds it from the surviving
//! sample order.

use crate::error::{RecorderError, Result};
use crate::tsdef::IdType;
use hashbrown::HashMap;

/// Bidirectional-in-spirit (but only the input->node direction is ever
/// queried) map from simulator input IDs to node IDs.
#[derive(Default)]
pub struct IdMap {
    node_ids: HashMap<IdType, IdType>,
}

impl IdMap {
    pub fn new() -> Self {
        IdMap {
            node_ids: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    pub fn contains(&self, input_id: IdType) -> bool {
        self.node_ids.contains_key(&input_id)
    }

    /// Record that `input_id` now maps to `node_id`. Fails with
    /// `DuplicateId` if `input_id` is already known.
    pub fn assign(&mut self, input_id: IdType, node_id: IdType) -> Result<()> {
        if self.node_ids.contains_key(&input_id) {
            return Err(RecorderError::DuplicateId { input_id });
        }
        self.node_ids.insert(input_id, node_id);
        Ok(())
    }

    /// Look up the node ID for `input_id`. Fails with `UnknownId` if it has
    /// never been assigned.
    pub fn lookup(&self, input_id: IdType) -> Result<IdType> {
        self.node_ids
            .get(&input_id)
            .copied()
            .ok_or(RecorderError::UnknownId { input_id })
    }

    /// Look up every ID in `input_ids`, failing on the first unknown one.
    pub fn lookup_all(&self, input_ids: &[IdType]) -> Result<Vec<IdType>> {
        input_ids.iter().map(|&id| self.lookup(id)).collect()
    }

    /// Clear the map and rebuild it so that `samples[k] -> k`, as done after
    /// a successful simplify.
    pub fn rebind(&mut self, samples: &[IdType]) {
        self.node_ids.clear();
        for (k, &input_id) in samples.iter().enumerate() {
            self.node_ids.insert(input_id, k as IdType);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_and_lookup() {
        let mut m = IdMap::new();
        m.assign(100, 0).unwrap();
        m.assign(101, 1).unwrap();
        assert_eq!(m.lookup(100).unwrap(), 0);
        assert_eq!(m.lookup(101).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_assign_fails() {
        let mut m = IdMap::new();
        m.assign(100, 0).unwrap();
        assert_eq!(
            m.assign(100, 1).unwrap_err(),
            RecorderError::DuplicateId { input_id: 100 }
        );
    }

    #[test]
    fn test_unknown_lookup_fails() {
        let m = IdMap::new();
        assert_eq!(
            m.lookup(7).unwrap_err(),
            RecorderError::UnknownId { input_id: 7 }
        );
    }

    #[test]
    fn test_rebind_after_simplify() {
        let mut m = IdMap::new();
        m.assign(5, 0).unwrap();
        m.assign(6, 1).unwrap();
        m.assign(7, 2).unwrap();
        m.rebind(&[6, 7]);
        assert_eq!(m.lookup(6).unwrap(), 0);
        assert_eq!(m.lookup(7).unwrap(), 1);
        assert!(m.lookup(5).is_err());
        assert_eq!(m.len(), 2);
    }
}
