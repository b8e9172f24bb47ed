//! Active falling piece geometry

use crate::shape::Shape;
use crate::tetromino::{PieceKind, Rotation};

/// An active falling piece
///
/// Movement and rotation produce new candidate values; the engine swaps a
/// candidate in only after checking it against the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// The type of tetromino
    pub kind: PieceKind,
    /// Current occupancy matrix
    pub shape: Shape,
    /// Anchor column of the shape's left edge
    pub x: i32,
    /// Anchor row of the shape's top edge; negative rows are above the board
    pub y: i32,
    /// Current rotation state (informational, the shape is authoritative)
    pub rotation: Rotation,
}

impl Piece {
    pub fn new(kind: PieceKind, shape: Shape, x: i32, y: i32) -> Self {
        Self {
            kind,
            shape,
            x,
            y,
            rotation: Rotation::North,
        }
    }

    /// A piece using the canonical table shape for `rotation`
    pub fn canonical(kind: PieceKind, rotation: Rotation, x: i32, y: i32) -> Self {
        Self {
            kind,
            shape: kind.shape(rotation),
            x,
            y,
            rotation,
        }
    }

    /// Absolute (x, y) positions of all occupied sub-cells
    ///
    /// Positions saturate at the `i32` range. Any saturated coordinate is far
    /// off the board, so placement checks reject it.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape.occupied().map(|(dy, dx)| {
            (
                self.x.saturating_add(dx as i32),
                self.y.saturating_add(dy as i32),
            )
        })
    }

    /// Copy of this piece moved by (dx, dy), saturating at the `i32` range
    pub fn shifted(&self, dx: i32, dy: i32) -> Piece {
        Piece {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..self.clone()
        }
    }

    /// Copy of this piece turned 90° clockwise about the same anchor
    pub fn rotated_cw(&self) -> Piece {
        Piece {
            shape: self.shape.rotated_cw(),
            rotation: self.rotation.cw(),
            ..self.clone()
        }
    }

    /// Whether any occupied sub-cell sits above the visible board
    pub fn extends_above(&self) -> bool {
        self.cells().any(|(_, y)| y < 0)
    }
}
