//! Ancestral recombination graph recording and simplification for
//! forward-time population simulators.
//!
//! The pieces: four append-only [`tables`], an [`id_map`] translating a
//! simulator's own IDs into dense node IDs, a [`time_reconciler`] for
//! forward/reverse time bookkeeping, a [`segment_merger`] for folding
//! transmission records into a parent's canonical interval list, the
//! [`simplify`] sweep itself, and [`recorder::ArgRecorder`] tying all of it
//! together behind one API. [`recomb_collector`] adapts a text wire format
//! some simulators emit into calls against a recorder, and
//! [`tree_sequence`] hands a simplified result off to `tskit`.

pub mod error;
pub mod flags;
pub mod id_map;
pub mod nested_forward_list;
pub mod recomb_collector;
pub mod recorder;
pub mod segment;
pub mod segment_merger;
pub mod simplify;
pub mod tables;
pub mod time_reconciler;
pub mod tree_sequence;
pub mod tsdef;

pub use error::{RecorderError, Result};
pub use flags::NodeFlags;
pub use recorder::ArgRecorder;
pub use tree_sequence::TreeSequence;
