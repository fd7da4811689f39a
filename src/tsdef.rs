//! Primitive type aliases shared across the crate.
//!
//! Node IDs are dense row indices into the [node table](crate::tables::NodeTable).
//! Positions and times are both floating point: positions index into
//! `[0, sequence_length)`, times are measured in the reverse-time coordinate
//! described in [`crate::time_reconciler`] once a recorder has called
//! `update_times`.

/// Row index into a [``NodeTable``](crate::tables::NodeTable), or an opaque
/// input ID supplied by a simulator before it has been resolved through an
/// [``IdMap``](crate::id_map::IdMap).
pub type IdType = i32;

/// A chromosomal position, in `[0, sequence_length)`.
pub type Position = f64;

/// A time coordinate. Forward time increases toward the present; reverse
/// time (the only kind the tables are allowed to hold once
/// [`crate::time_reconciler::update_times`] has run) increases toward the past.
pub type Time = f64;

/// Sentinel value for "no node".
pub const NULL_ID: IdType = -1;

/// Sentinel value for "no population assigned".
pub const NULL_POPULATION: i32 = -1;
