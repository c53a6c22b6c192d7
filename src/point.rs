//! Caller-facing positions: points, ranges and edits.
//!
//! Every value here is expressed in caller units. Conversion to the engine's
//! native units happens in [`crate::codec::PositionCodec`].

use serde::Serialize;
use std::fmt;

/// A (row, column) position. Rows are zero-based lines, columns are in the
/// same unit as byte offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub const ORIGIN: Point = Point { row: 0, column: 0 };

    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    pub fn is_origin(&self) -> bool {
        *self == Self::ORIGIN
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

/// Byte and point span of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_point: Point,
    pub end_point: Point,
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] - [{}] ({}..{})",
            self.start_point, self.end_point, self.start_byte, self.end_byte
        )
    }
}

/// Describes a change to the source text, applied with [`crate::Tree::edit`]
/// before an incremental reparse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEdit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
    pub start_point: Point,
    pub old_end_point: Point,
    pub new_end_point: Point,
}
