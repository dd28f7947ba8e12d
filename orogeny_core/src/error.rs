// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for transform algebra and animation control.

use core::fmt;

use crate::transform::MatrixType;

/// Errors raised by transform queries, inversion, and bulk point operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformError {
    /// The determinant is zero (or an axis-aligned scale factor is zero), so
    /// no inverse exists.
    NonInvertible,
    /// A 2D-only operation was invoked on a transform with a Z effect.
    NotTwoDimensional,
    /// A 2D matrix shape was requested from a transform with a Z effect.
    MatrixTypeFor3d(MatrixType),
    /// Row index outside the requested matrix shape.
    RowOutOfBounds {
        /// Requested shape.
        matrix: MatrixType,
        /// Offending row.
        row: usize,
    },
    /// Column index outside the requested matrix shape.
    ColumnOutOfBounds {
        /// Requested shape.
        matrix: MatrixType,
        /// Offending column.
        column: usize,
    },
    /// Element index outside the requested matrix shape.
    ElementOutOfBounds {
        /// Requested shape.
        matrix: MatrixType,
        /// Offending row.
        row: usize,
        /// Offending column.
        column: usize,
    },
    /// A bulk transform would access coordinates past the end of a buffer.
    BufferOutOfBounds {
        /// Length of the buffer.
        len: usize,
        /// Number of elements the operation needs.
        required: usize,
    },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonInvertible => f.write_str("determinant is 0"),
            Self::NotTwoDimensional => {
                f.write_str("cannot use 2D operation on a transform with a Z effect")
            }
            Self::MatrixTypeFor3d(ty) => {
                write!(f, "cannot request {ty:?} matrix from a 3D transform")
            }
            Self::RowOutOfBounds { matrix, row } => {
                write!(f, "row {row} is out of bounds for {matrix:?}")
            }
            Self::ColumnOutOfBounds { matrix, column } => {
                write!(f, "column {column} is out of bounds for {matrix:?}")
            }
            Self::ElementOutOfBounds {
                matrix,
                row,
                column,
            } => write!(f, "element ({row}, {column}) is out of bounds for {matrix:?}"),
            Self::BufferOutOfBounds { len, required } => {
                write!(f, "buffer of length {len} is too short, {required} needed")
            }
        }
    }
}

impl core::error::Error for TransformError {}

/// Errors raised by [`Animation::jump_to`](crate::animation::Animation::jump_to).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationError {
    /// No cue point with the given name exists.
    UnknownCuePoint,
    /// The jump target is [`Duration::UNKNOWN`](crate::time::Duration::UNKNOWN).
    UnresolvedTime,
}

impl fmt::Display for AnimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCuePoint => f.write_str("unknown cue point"),
            Self::UnresolvedTime => f.write_str("cannot jump to an unknown time"),
        }
    }
}

impl core::error::Error for AnimationError {}
