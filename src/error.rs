//! The error taxonomy crossing every public API boundary.
//!
//! Individual modules define their own narrow error enums where that makes
//! the module usable in isolation (see [`crate::tables::TablesError`] and
//! [`crate::nested_forward_list::NestedForwardListError`]); all of them fold
//! into [`RecorderError`] via `#[from]` so that callers driving the
//! [recorder](crate::recorder::ArgRecorder) only ever match on one type.

use crate::nested_forward_list::NestedForwardListError;
use crate::tables::TablesError;
use crate::tsdef::{IdType, Position, Time};
use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, RecorderError>;

#[derive(Error, Debug, PartialEq)]
pub enum RecorderError {
    /// `add_individual` was called with an `input_id` already known to the
    /// [`IdMap`](crate::id_map::IdMap).
    #[error("input id {input_id:?} has already been added")]
    DuplicateId { input_id: IdType },

    /// An `input_id` was looked up that the [`IdMap`](crate::id_map::IdMap)
    /// has no record of.
    #[error("input id {input_id:?} is not known to this recorder")]
    UnknownId { input_id: IdType },

    /// `left >= right`, `left < 0`, `right > sequence_length`, or (at
    /// simplify time) `time[parent] <= time[child]`.
    #[error("invalid edge: left={left:?}, right={right:?}")]
    InvalidEdge { left: Position, right: Position },

    /// A table row failed a column-level domain constraint.
    #[error("invalid row: {reason}")]
    InvalidRow { reason: String },

    /// The segment merger was asked to fold a record into a list belonging
    /// to a different parent.
    #[error("segment merger parent mismatch: expected {expected:?}, got {found:?}")]
    ParentMismatch { expected: IdType, found: IdType },

    /// Construction was given both prior history and an explicit
    /// `sequence_length` that disagree.
    #[error("sequence length mismatch: prior history has {prior:?}, constructor argument was {given:?}")]
    SequenceLengthMismatch { prior: Position, given: Position },

    /// Construction was given neither prior history nor an explicit
    /// `sequence_length`.
    #[error("sequence length was not provided and there is no prior history to infer it from")]
    MissingSequenceLength,

    /// Simplification detected tables that were not sorted as required.
    #[error("tables are not correctly sorted for simplification: {reason}")]
    NotSorted { reason: String },

    /// Forwarded from [`TablesError`].
    #[error(transparent)]
    Tables(#[from] TablesError),

    /// Forwarded from [`NestedForwardListError`].
    #[error(transparent)]
    AncestryList(#[from] NestedForwardListError),
}

impl RecorderError {
    pub(crate) fn invalid_edge(left: Position, right: Position) -> Self {
        RecorderError::InvalidEdge { left, right }
    }
}

/// Convenience used by the time reconciler to report a non-monotonic node
/// time without threading a whole new error variant through every call site.
pub(crate) fn parent_not_older(parent_time: Time, child_time: Time) -> RecorderError {
    RecorderError::NotSorted {
        reason: format!(
            "parent time {:?} is not strictly greater than child time {:?}",
            parent_time, child_time
        ),
    }
}
