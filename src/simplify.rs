//! The ancestry-segment sweep that rebuilds a minimal set of tables for a
//! chosen sample set.
//!
//! This is the msprime/tskit-style simplify algorithm: a per-node list of
//! `(left, right, descendant)` segments tracks, for every node still
//! relevant to the sample set, which already-emitted output node currently
//! represents it at each position. Edges are walked oldest-parent-last in
//! ascending `time[parent]` order (already arranged by
//! [`crate::tables::TableCollection::sort_tables_for_simplification`]), and
//! for each parent the overlapping descendant segments contributed by its
//! children are swept left to right, the way
//! [`crate::nested_forward_list`]'s sibling overlap-sweep iterator in the
//! wider prototype family does it, to either forward a lone descendant
//! through (collapsing unary ancestry) or coalesce several into a freshly
//! emitted node.
//!
//! A sample's own seed segment persists for its whole lifetime: a node that
//! is itself a sample is never collapsed away even where it has only one
//! descendant, since it must remain addressable over its full genome.

use crate::error::{parent_not_older, RecorderError, Result};
use crate::flags::NodeFlags;
use crate::nested_forward_list::NestedForwardList;
use crate::segment::Segment;
use crate::tables::{EdgeTable, MutationTable, Node, NodeTable, SiteTable, TableCollection};
use crate::tsdef::{IdType, Position, NULL_ID};

/// The four rebuilt tables produced by a successful simplify.
pub struct SimplifyOutput {
    pub nodes: NodeTable,
    pub edges: EdgeTable,
    pub sites: SiteTable,
    pub mutations: MutationTable,
}

/// Lazily-growing sweep over a set of (possibly overlapping) segments,
/// yielding maximal sub-intervals paired with the segments active over each.
struct Overlapper {
    segments: Vec<Segment>,
    active: Vec<Segment>,
    j: usize,
    n: usize,
    right: Position,
}

impl Overlapper {
    fn new(mut segments: Vec<Segment>) -> Self {
        segments.sort_by(|a, b| a.left.partial_cmp(&b.left).unwrap());
        let n = segments.len();
        let right = if n > 0 { segments[0].left } else { 0.0 };
        Overlapper {
            segments,
            active: Vec::new(),
            j: 0,
            n,
            right,
        }
    }
}

impl Iterator for Overlapper {
    type Item = (Position, Position, Vec<Segment>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.j < self.n {
            let mut left = self.right;
            self.active.retain(|s| s.right > left);
            if self.active.is_empty() {
                left = self.segments[self.j].left;
            }
            while self.j < self.n && self.segments[self.j].left == left {
                self.active.push(self.segments[self.j]);
                self.j += 1;
            }
            self.right = self
                .active
                .iter()
                .fold(Position::INFINITY, |a, s| a.min(s.right));
            if self.j < self.n {
                self.right = self.right.min(self.segments[self.j].left);
            }
            return Some((left, self.right, self.active.clone()));
        }
        if !self.active.is_empty() {
            let left = self.right;
            self.active.retain(|s| s.right > left);
            if !self.active.is_empty() {
                self.right = self
                    .active
                    .iter()
                    .fold(Position::INFINITY, |a, s| a.min(s.right));
                return Some((left, self.right, self.active.clone()));
            }
        }
        None
    }
}

fn distinct_descendants(active: &[Segment]) -> Vec<IdType> {
    let mut v: Vec<IdType> = active.iter().map(|s| s.node).collect();
    v.sort_unstable();
    v.dedup();
    v
}

/// Merge adjacent segments that share a descendant and meet at a common
/// boundary, per the segment-merger canonical form.
fn coalesce_adjacent(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
    for seg in segments {
        if let Some(last) = out.last_mut() {
            if last.right == seg.left && last.node == seg.node {
                last.right = seg.right;
                continue;
            }
        }
        out.push(seg);
    }
    out
}

struct OutEdge {
    left: Position,
    right: Position,
    parent: IdType,
    child: IdType,
}

fn squash_edges(mut edges: Vec<OutEdge>) -> Vec<OutEdge> {
    edges.sort_by(|a, b| {
        a.parent
            .cmp(&b.parent)
            .then(a.child.cmp(&b.child))
            .then(a.left.partial_cmp(&b.left).unwrap())
    });
    let mut out: Vec<OutEdge> = Vec::with_capacity(edges.len());
    for e in edges {
        if let Some(last) = out.last_mut() {
            if last.parent == e.parent && last.child == e.child && last.right == e.left {
                last.right = e.right;
                continue;
            }
        }
        out.push(e);
    }
    out
}

fn lookup_output_node(
    ancestry: &NestedForwardList<Segment>,
    u: IdType,
    pos: Position,
) -> Result<Option<IdType>> {
    let mut found = None;
    ancestry.for_each(u, |seg| {
        if seg.left <= pos && pos < seg.right {
            found = Some(seg.node);
            false
        } else {
            true
        }
    })?;
    Ok(found)
}

/// Run the ancestry-segment sweep over `tables` (assumed already sorted by
/// [`TableCollection::sort_tables_for_simplification`]) down to
/// `samples` (node IDs, in the order they should receive dense output IDs
/// `0..samples.len()`), returning freshly built tables.
pub fn simplify(tables: &TableCollection, samples: &[IdType]) -> Result<SimplifyOutput> {
    let num_nodes = tables.num_nodes();
    for &s in samples {
        if s < 0 || s as usize >= num_nodes {
            return Err(RecorderError::InvalidRow {
                reason: format!("sample node {:?} is out of range", s),
            });
        }
    }

    let mut ancestry: NestedForwardList<Segment> = NestedForwardList::new();
    ancestry.reset(num_nodes);

    let mut node_map = vec![NULL_ID; num_nodes];
    let mut out_nodes = NodeTable::new();
    let mut out_edges: Vec<OutEdge> = Vec::new();
    let sequence_length = tables.sequence_length();

    for &s in samples {
        let orig = tables.node(s);
        let out_id = out_nodes.len() as IdType;
        out_nodes.push(Node {
            flags: orig.flags | NodeFlags::IS_SAMPLE,
            population: orig.population,
            time: orig.time,
        });
        node_map[s as usize] = out_id;
        ancestry.extend(s, Segment::new(0.0, sequence_length, out_id))?;
    }

    let edges = tables.edges();
    let mut i = 0;
    while i < edges.len() {
        let parent = edges[i].parent;
        let mut j = i;
        while j < edges.len() && edges[j].parent == parent {
            j += 1;
        }
        let group = &edges[i..j];

        let mut candidates: Vec<Segment> = Vec::new();
        for e in group {
            if !(e.left < e.right) {
                return Err(RecorderError::invalid_edge(e.left, e.right));
            }
            if tables.node(e.parent).time <= tables.node(e.child).time {
                return Err(parent_not_older(
                    tables.node(e.parent).time,
                    tables.node(e.child).time,
                ));
            }
            ancestry.for_each(e.child, |seg| {
                let l = seg.left.max(e.left);
                let r = seg.right.min(e.right);
                if l < r {
                    candidates.push(Segment::new(l, r, seg.node));
                }
                true
            })?;
        }

        if !candidates.is_empty() {
            let is_sample_parent = node_map[parent as usize] != NULL_ID;

            if is_sample_parent {
                let p_out = node_map[parent as usize];
                for (left, right, active) in Overlapper::new(candidates) {
                    for d in distinct_descendants(&active) {
                        out_edges.push(OutEdge {
                            left,
                            right,
                            parent: p_out,
                            child: d,
                        });
                    }
                }
            } else {
                let mut p_output: Option<IdType> = None;
                let mut new_segments: Vec<Segment> = Vec::new();

                for (left, right, active) in Overlapper::new(candidates) {
                    let distinct = distinct_descendants(&active);
                    if distinct.len() > 1 {
                        let p_out = match p_output {
                            Some(id) => id,
                            None => {
                                let orig = tables.node(parent);
                                let id = out_nodes.len() as IdType;
                                out_nodes.push(Node {
                                    flags: orig.flags,
                                    population: orig.population,
                                    time: orig.time,
                                });
                                p_output = Some(id);
                                id
                            }
                        };
                        for &d in &distinct {
                            out_edges.push(OutEdge {
                                left,
                                right,
                                parent: p_out,
                                child: d,
                            });
                        }
                        new_segments.push(Segment::new(left, right, p_out));
                    } else {
                        new_segments.push(Segment::new(left, right, distinct[0]));
                    }
                }

                for seg in coalesce_adjacent(new_segments) {
                    ancestry.extend(parent, seg)?;
                }
                node_map[parent as usize] = p_output.unwrap_or(NULL_ID);
            }
        }

        i = j;
    }

    let squashed = squash_edges(out_edges);
    let mut out_edge_table = EdgeTable::with_capacity(squashed.len());
    for e in &squashed {
        out_edge_table.push(crate::tables::Edge {
            left: e.left,
            right: e.right,
            parent: e.parent,
            child: e.child,
        });
    }
    out_edge_table.sort_by(|a, b| {
        let ta = out_nodes[a.parent as usize].time;
        let tb = out_nodes[b.parent as usize].time;
        ta.partial_cmp(&tb)
            .unwrap()
            .then(a.parent.cmp(&b.parent))
            .then(a.child.cmp(&b.child))
            .then(a.left.partial_cmp(&b.left).unwrap())
    });

    let mut out_sites = SiteTable::new();
    let mut out_mutations = MutationTable::new();
    let mut site_index: hashbrown::HashMap<u64, usize> = hashbrown::HashMap::new();
    for m in tables.mutations() {
        let site = &tables.sites()[m.site];
        if let Some(out_node) = lookup_output_node(&ancestry, m.node, site.position)? {
            let key = site.position.to_bits();
            let out_site = match site_index.get(&key) {
                Some(&idx) => idx,
                None => {
                    out_sites.push(crate::tables::Site {
                        position: site.position,
                        ancestral_state: site.ancestral_state.clone(),
                    });
                    let idx = out_sites.len() - 1;
                    site_index.insert(key, idx);
                    idx
                }
            };
            out_mutations.push(crate::tables::Mutation {
                site: out_site,
                node: out_node,
                derived_state: m.derived_state.clone(),
            });
        }
    }

    Ok(SimplifyOutput {
        nodes: out_nodes,
        edges: out_edge_table,
        sites: out_sites,
        mutations: out_mutations,
    })
}
