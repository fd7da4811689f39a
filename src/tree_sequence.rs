//! A detached, simplified tree sequence and its bridge into `tskit`.
//!
//! Grounded on `tskit::TableCollection`'s own `add_node`/`add_edge`/
//! `add_site`/`add_mutation` row-builder API: [`TreeSequence::to_tskit`]
//! walks this crate's own tables once and replays each row through that
//! builder, rather than trying to share storage with the `tskit` crate's
//! C-backed tables.

use crate::error::Result;
use crate::tables::{EdgeTable, MutationTable, NodeTable, SiteTable};
use crate::tsdef::Position;

/// The output of a successful `simplify`: a self-contained snapshot of the
/// four tables, detached from any [`crate::recorder::ArgRecorder`].
pub struct TreeSequence {
    sequence_length: Position,
    nodes: NodeTable,
    edges: EdgeTable,
    sites: SiteTable,
    mutations: MutationTable,
}

impl TreeSequence {
    pub fn new(
        sequence_length: Position,
        nodes: NodeTable,
        edges: EdgeTable,
        sites: SiteTable,
        mutations: MutationTable,
    ) -> Self {
        TreeSequence {
            sequence_length,
            nodes,
            edges,
            sites,
            mutations,
        }
    }

    pub fn sequence_length(&self) -> Position {
        self.sequence_length
    }

    pub fn nodes(&self) -> &NodeTable {
        &self.nodes
    }

    pub fn edges(&self) -> &EdgeTable {
        &self.edges
    }

    pub fn sites(&self) -> &SiteTable {
        &self.sites
    }

    pub fn mutations(&self) -> &MutationTable {
        &self.mutations
    }

    /// Build a `tskit::TableCollection` carrying the same rows, indexed and
    /// ready for `tskit`'s own tree-walking APIs.
    pub fn to_tskit(&self) -> Result<tskit::TableCollection> {
        let mut tables = tskit::TableCollection::new(self.sequence_length)
            .map_err(|e| crate::error::RecorderError::InvalidRow {
                reason: e.to_string(),
            })?;

        for node in &self.nodes {
            tables
                .add_node(
                    node.flags.bits() as tskit::tsk_flags_t,
                    node.time,
                    node.population,
                    tskit::TSK_NULL,
                )
                .map_err(|e| crate::error::RecorderError::InvalidRow {
                    reason: e.to_string(),
                })?;
        }

        for edge in &self.edges {
            tables
                .add_edge(edge.left, edge.right, edge.parent, edge.child)
                .map_err(|e| crate::error::RecorderError::InvalidRow {
                    reason: e.to_string(),
                })?;
        }

        for site in &self.sites {
            tables
                .add_site(site.position, Some(&site.ancestral_state))
                .map_err(|e| crate::error::RecorderError::InvalidRow {
                    reason: e.to_string(),
                })?;
        }

        for mutation in &self.mutations {
            tables
                .add_mutation(
                    mutation.site as tskit::tsk_id_t,
                    mutation.node,
                    tskit::TSK_NULL,
                    f64::NAN,
                    Some(&mutation.derived_state),
                )
                .map_err(|e| crate::error::RecorderError::InvalidRow {
                    reason: e.to_string(),
                })?;
        }

        tables
            .full_sort()
            .map_err(|e| crate::error::RecorderError::InvalidRow {
                reason: e.to_string(),
            })?;
        tables
            .build_index(0)
            .map_err(|e| crate::error::RecorderError::InvalidRow {
                reason: e.to_string(),
            })?;

        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::NodeFlags;
    use crate::tables::{Edge, Node};
    use crate::tsdef::NULL_POPULATION;

    #[test]
    fn test_empty_tree_sequence_round_trips_through_tskit() {
        let ts = TreeSequence::new(10.0, vec![], vec![], vec![], vec![]);
        let tables = ts.to_tskit().unwrap();
        assert_eq!(tables.sequence_length(), 10.0);
    }

    #[test]
    fn test_single_edge_tree_sequence_round_trips_through_tskit() {
        let nodes = vec![
            Node {
                flags: NodeFlags::IS_SAMPLE,
                population: NULL_POPULATION,
                time: 0.0,
            },
            Node {
                flags: NodeFlags::empty(),
                population: NULL_POPULATION,
                time: 1.0,
            },
        ];
        let edges = vec![Edge {
            left: 0.0,
            right: 10.0,
            parent: 1,
            child: 0,
        }];
        let ts = TreeSequence::new(10.0, nodes, edges, vec![], vec![]);
        let tables = ts.to_tskit().unwrap();
        assert_eq!(tables.nodes().num_rows(), 2);
        assert_eq!(tables.edges().num_rows(), 1);
    }
}
