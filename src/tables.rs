//! The four append-only columnar tables (§3 of the data model) plus the
//! bookkeeping [`TableCollection`] bundles them with.
//!
//! This module intentionally stays a thin, validating wrapper over
//! `Vec<Row>` columns, the same shape the original draft of this crate used
//! (one `Vec` per column, free functions that validate before pushing). What
//! changed moving from that draft to this one: positions and times are
//! floating point rather than integer (the spec's genomic coordinates are
//! real-valued), nodes carry flags and a population, and sites/mutations
//! carry arbitrary byte strings rather than a single `i8` allele code.

use crate::flags::NodeFlags;
use crate::tsdef::{IdType, Position, Time, NULL_POPULATION};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TablesError {
    #[error("invalid genome length: {found:?}")]
    InvalidGenomeLength { found: Position },
    #[error("invalid node: {found:?}")]
    InvalidNodeValue { found: IdType },
    #[error("invalid value for position: {found:?}")]
    InvalidPosition { found: Position },
    #[error("invalid position range: {found:?}")]
    InvalidLeftRight { found: (Position, Position) },
    #[error("invalid value for time: {found:?}")]
    InvalidTime { found: Time },
    #[error("invalid value for population: {found:?}")]
    InvalidPopulation { found: i32 },
}

/// Result type for operations on tables.
pub type TablesResult<T> = std::result::Result<T, TablesError>;

/// A node of a tree sequence: a single chromosome.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    /// Flags (currently only `IS_SAMPLE`).
    pub flags: NodeFlags,
    /// Population (deme) of origin. `NULL_POPULATION` if unknown.
    pub population: i32,
    /// Birth time. Forward time until `update_times` has run on the
    /// enclosing [`TableCollection`]; reverse time afterward.
    pub time: Time,
}

/// An edge: a transmission event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub left: Position,
    pub right: Position,
    /// Row index of parent in the [`NodeTable`].
    pub parent: IdType,
    /// Row index of child in the [`NodeTable`].
    pub child: IdType,
}

/// A site: the location and ancestral state of one or more mutations.
#[derive(Clone, Debug, PartialEq)]
pub struct Site {
    pub position: Position,
    pub ancestral_state: Vec<u8>,
}

/// A mutation: the minimal information needed to place a derived allele on
/// a tree sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Mutation {
    pub site: usize,
    pub node: IdType,
    pub derived_state: Vec<u8>,
}

pub type NodeTable = Vec<Node>;
pub type EdgeTable = Vec<Edge>;
pub type SiteTable = Vec<Site>;
pub type MutationTable = Vec<Mutation>;

fn position_in_range(x: Position, sequence_length: Position) -> TablesResult<()> {
    if x < 0.0 || x > sequence_length || !x.is_finite() {
        return Err(TablesError::InvalidPosition { found: x });
    }
    Ok(())
}

fn node_non_negative(x: IdType) -> TablesResult<()> {
    if x < 0 {
        return Err(TablesError::InvalidNodeValue { found: x });
    }
    Ok(())
}

fn time_non_negative(x: Time) -> TablesResult<()> {
    if x < 0.0 || !x.is_finite() {
        return Err(TablesError::InvalidTime { found: x });
    }
    Ok(())
}

fn population_valid(x: i32) -> TablesResult<()> {
    if x < 0 && x != NULL_POPULATION {
        return Err(TablesError::InvalidPopulation { found: x });
    }
    Ok(())
}

pub fn node_table_add_row(
    nodes: &mut NodeTable,
    flags: NodeFlags,
    time: Time,
    population: i32,
) -> TablesResult<IdType> {
    time_non_negative(time)?;
    population_valid(population)?;
    nodes.push(Node {
        flags,
        population,
        time,
    });
    Ok((nodes.len() - 1) as IdType)
}

pub fn edge_table_add_row(
    edges: &mut EdgeTable,
    left: Position,
    right: Position,
    parent: IdType,
    child: IdType,
    sequence_length: Position,
) -> TablesResult<usize> {
    if !(left < right) {
        return Err(TablesError::InvalidLeftRight {
            found: (left, right),
        });
    }
    position_in_range(left, sequence_length)?;
    position_in_range(right, sequence_length)?;
    node_non_negative(parent)?;
    node_non_negative(child)?;

    edges.push(Edge {
        left,
        right,
        parent,
        child,
    });
    Ok(edges.len() - 1)
}

pub fn site_table_add_row(
    sites: &mut SiteTable,
    position: Position,
    ancestral_state: Vec<u8>,
    sequence_length: Position,
) -> TablesResult<usize> {
    position_in_range(position, sequence_length)?;
    sites.push(Site {
        position,
        ancestral_state,
    });
    Ok(sites.len() - 1)
}

pub fn mutation_table_add_row(
    mutations: &mut MutationTable,
    site: usize,
    node: IdType,
    derived_state: Vec<u8>,
) -> TablesResult<usize> {
    node_non_negative(node)?;
    mutations.push(Mutation {
        site,
        node,
        derived_state,
    });
    Ok(mutations.len() - 1)
}

/// Bit-pattern key used to index `site_positions`. Sites are compared for
/// "same position" with ordinary float equality, per the spec's numeric
/// semantics note (callers are responsible for not generating aliased but
/// not-equal boundaries), so a raw bit pattern is a safe hash key as long as
/// NaN positions are rejected, which `position_in_range` already does.
fn position_key(p: Position) -> u64 {
    p.to_bits()
}

/// A collection of node, edge, site, and mutation tables, plus the
/// bookkeeping needed to append new rows, reconcile time coordinates, and
/// sort prior to simplification.
pub struct TableCollection {
    sequence_length: Position,

    pub(crate) nodes_: NodeTable,
    pub(crate) edges_: EdgeTable,
    pub(crate) sites_: SiteTable,
    pub(crate) mutations_: MutationTable,

    /// Position -> row index in `sites_`. Kept here (rather than duplicated
    /// on the recorder) because it is purely a lookup index over a table
    /// this collection already owns; see DESIGN.md.
    site_positions: hashbrown::HashMap<u64, usize>,

    /// Number of edge rows (a prefix of `edges_`) already known to be sorted
    /// by `(time[parent], parent, child, left)`. Simplify uses this to sort
    /// only the unsorted suffix. Reset whenever the tables are rebuilt.
    last_sorted_edge: usize,
}

impl TableCollection {
    pub fn new(sequence_length: Position) -> TablesResult<TableCollection> {
        if !(sequence_length > 0.0) || !sequence_length.is_finite() {
            return Err(TablesError::InvalidGenomeLength {
                found: sequence_length,
            });
        }
        Ok(TableCollection {
            sequence_length,
            nodes_: NodeTable::new(),
            edges_: EdgeTable::new(),
            sites_: SiteTable::new(),
            mutations_: MutationTable::new(),
            site_positions: hashbrown::HashMap::new(),
            last_sorted_edge: 0,
        })
    }

    pub fn sequence_length(&self) -> Position {
        self.sequence_length
    }

    pub fn add_node(
        &mut self,
        flags: NodeFlags,
        time: Time,
        population: i32,
    ) -> TablesResult<IdType> {
        node_table_add_row(&mut self.nodes_, flags, time, population)
    }

    pub fn add_edge(
        &mut self,
        left: Position,
        right: Position,
        parent: IdType,
        child: IdType,
    ) -> TablesResult<usize> {
        edge_table_add_row(
            &mut self.edges_,
            left,
            right,
            parent,
            child,
            self.sequence_length,
        )
    }

    /// Add a new site, or return the row index of the existing site at
    /// `position` if one is already recorded.
    pub fn add_or_find_site(
        &mut self,
        position: Position,
        ancestral_state: Vec<u8>,
    ) -> TablesResult<usize> {
        if let Some(row) = self.site_positions.get(&position_key(position)) {
            return Ok(*row);
        }
        let row = site_table_add_row(
            &mut self.sites_,
            position,
            ancestral_state,
            self.sequence_length,
        )?;
        self.site_positions.insert(position_key(position), row);
        Ok(row)
    }

    pub fn add_mutation(
        &mut self,
        site: usize,
        node: IdType,
        derived_state: Vec<u8>,
    ) -> TablesResult<usize> {
        mutation_table_add_row(&mut self.mutations_, site, node, derived_state)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes_.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges_.len()
    }

    pub fn num_sites(&self) -> usize {
        self.sites_.len()
    }

    pub fn num_mutations(&self) -> usize {
        self.mutations_.len()
    }

    pub fn nodes(&self) -> &NodeTable {
        &self.nodes_
    }

    pub fn edges(&self) -> &EdgeTable {
        &self.edges_
    }

    pub fn sites(&self) -> &SiteTable {
        &self.sites_
    }

    pub fn mutations(&self) -> &MutationTable {
        &self.mutations_
    }

    pub fn node(&self, i: IdType) -> Node {
        self.nodes_[i as usize]
    }

    pub fn last_sorted_edge(&self) -> usize {
        self.last_sorted_edge
    }

    pub fn mark_last_sorted_edge(&mut self, n: usize) {
        self.last_sorted_edge = n;
    }

    /// Sort `edges_` by `(time[parent] ascending, parent, child, left)` and
    /// stably sort `sites_`/`mutations_`, per §4.6 step 2. Only the suffix of
    /// edges after `last_sorted_edge` is sorted and merged back in, so
    /// repeated `simplify` calls on a recorder that appends a modest number
    /// of new edges between calls stay close to linear in the new edges.
    pub fn sort_tables_for_simplification(&mut self) {
        sort_edge_table(&self.nodes_, &mut self.edges_, self.last_sorted_edge);
        sort_site_table(&mut self.sites_, &mut self.mutations_);
        sort_mutation_table(&self.sites_, &mut self.mutations_);
    }

    /// Replace all four tables wholesale. Used by [`crate::simplify`] to
    /// swap in the freshly-built, minimal tables once simplification has
    /// succeeded.
    pub fn set_tables(
        &mut self,
        nodes: NodeTable,
        edges: EdgeTable,
        sites: SiteTable,
        mutations: MutationTable,
    ) {
        self.nodes_ = nodes;
        self.edges_ = edges;
        self.sites_ = sites;
        self.mutations_ = mutations;
        self.site_positions.clear();
        for (i, s) in self.sites_.iter().enumerate() {
            self.site_positions.insert(position_key(s.position), i);
        }
        self.last_sorted_edge = 0;
    }

    /// Bulk-rewrite node times in place, used by `update_times`.
    pub fn set_node_times(&mut self, times: &[Time]) {
        assert_eq!(times.len(), self.nodes_.len());
        for (n, t) in self.nodes_.iter_mut().zip(times.iter()) {
            n.time = *t;
        }
    }

    /// Bulk-rewrite node flags in place, used by `mark_samples`.
    pub fn set_node_flags(&mut self, flags: &[NodeFlags]) {
        assert_eq!(flags.len(), self.nodes_.len());
        for (n, f) in self.nodes_.iter_mut().zip(flags.iter()) {
            n.flags = *f;
        }
    }

    /// Reset all four tables to empty, preserving `sequence_length`.
    pub fn reset(&mut self) {
        self.nodes_.clear();
        self.edges_.clear();
        self.sites_.clear();
        self.mutations_.clear();
        self.site_positions.clear();
        self.last_sorted_edge = 0;
    }
}

fn sort_edge_table(nodes: &NodeTable, edges: &mut EdgeTable, sorted_prefix: usize) {
    let sorted_prefix = sorted_prefix.min(edges.len());
    let key = |e: &Edge| (nodes[e.parent as usize].time, e.parent, e.child, e.left);
    let cmp = |a: &Edge, b: &Edge| {
        let (ta, pa, ca, la) = key(a);
        let (tb, pb, cb, lb) = key(b);
        ta.partial_cmp(&tb)
            .unwrap()
            .then(pa.cmp(&pb))
            .then(ca.cmp(&cb))
            .then(la.partial_cmp(&lb).unwrap())
    };
    if sorted_prefix == 0 {
        edges.sort_by(cmp);
        return;
    }
    let suffix_owned = edges.split_off(sorted_prefix);
    let mut suffix = suffix_owned;
    suffix.sort_by(cmp);
    let mut merged = Vec::with_capacity(edges.len() + suffix.len());
    let mut i = 0;
    let mut j = 0;
    while i < edges.len() && j < suffix.len() {
        if cmp(&edges[i], &suffix[j]) != std::cmp::Ordering::Greater {
            merged.push(edges[i]);
            i += 1;
        } else {
            merged.push(suffix[j]);
            j += 1;
        }
    }
    merged.extend_from_slice(&edges[i..]);
    merged.extend_from_slice(&suffix[j..]);
    *edges = merged;
}

fn sort_site_table(sites: &mut SiteTable, mutations: &mut MutationTable) {
    let mut order: Vec<usize> = (0..sites.len()).collect();
    order.sort_by(|&a, &b| sites[a].position.partial_cmp(&sites[b].position).unwrap());
    let mut remap = vec![0usize; sites.len()];
    for (new_idx, &old_idx) in order.iter().enumerate() {
        remap[old_idx] = new_idx;
    }
    let sorted_sites: Vec<Site> = order.iter().map(|&i| sites[i].clone()).collect();
    *sites = sorted_sites;
    for m in mutations.iter_mut() {
        m.site = remap[m.site];
    }
}

fn sort_mutation_table(sites: &SiteTable, mutations: &mut MutationTable) {
    mutations.sort_by(|a, b| {
        let pa = sites[a.site].position;
        let pb = sites[b.site].position;
        pa.partial_cmp(&pb).unwrap().then(a.node.cmp(&b.node))
    });
}
