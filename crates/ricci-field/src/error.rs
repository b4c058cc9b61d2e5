//! Error types for tensor-field construction.

use thiserror::Error;

/// Error raised when a tensor field cannot be built from its inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The fourth-order stencils reach two neighbours to each side, so a
    /// grid axis needs more than 4 points.
    #[error("grids need more than 4 divisions per axis, got {divisions}")]
    GridTooCoarse {
        /// Requested points per axis.
        divisions: usize,
    },

    /// Point tensors inherit the grid's axis count as their extent, and a
    /// tensor axis needs at least two positions.
    #[error("tensor fields need at least 2 spatial dimensions, got {dimensions}")]
    TooFewDimensions {
        /// Requested grid axis count.
        dimensions: usize,
    },

    /// A point buffer of the wrong length was supplied.
    #[error(
        "a grid of {dimensions} dimensions with {divisions} divisions holds {expected} points, got {actual}"
    )]
    WrongPointCount {
        /// Grid axis count.
        dimensions: usize,
        /// Points per axis.
        divisions: usize,
        /// `divisions^dimensions`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// A supplied point tensor does not match the field's tensor shape.
    #[error(
        "point {index} has extent {extent} and rank {rank}, expected extent {expected_extent} and rank {expected_rank}"
    )]
    PointShapeMismatch {
        /// Offending point's flat grid index.
        index: usize,
        /// Offending point's extent.
        extent: usize,
        /// Offending point's rank.
        rank: usize,
        /// Extent the field requires (its dimension count).
        expected_extent: usize,
        /// Rank the field requires.
        expected_rank: usize,
    },
}
