//! Tetromino definitions and shapes
//!
//! The 7 canonical pieces with a precomputed shape for each of their 4 rotations.

use crate::shape::Shape;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I, // Cyan - long bar
    J, // Blue - J-shape
    L, // Orange - L-shape
    O, // Yellow - square
    S, // Green - S-shape
    T, // Purple - T-shape
    Z, // Red - Z-shape
}

/// Canonical shapes indexed by `[kind][rotation]`
///
/// I, O, S and Z only have two distinct orientations; their 180° and 270°
/// entries repeat the first two.
const SHAPES: [[Shape; 4]; 7] = [
    // I
    [
        Shape::from_pattern(&["1111"]),
        Shape::from_pattern(&["1", "1", "1", "1"]),
        Shape::from_pattern(&["1111"]),
        Shape::from_pattern(&["1", "1", "1", "1"]),
    ],
    // J
    [
        Shape::from_pattern(&["100", "111"]),
        Shape::from_pattern(&["11", "10", "10"]),
        Shape::from_pattern(&["111", "001"]),
        Shape::from_pattern(&["01", "01", "11"]),
    ],
    // L
    [
        Shape::from_pattern(&["001", "111"]),
        Shape::from_pattern(&["10", "10", "11"]),
        Shape::from_pattern(&["111", "100"]),
        Shape::from_pattern(&["11", "01", "01"]),
    ],
    // O
    [
        Shape::from_pattern(&["11", "11"]),
        Shape::from_pattern(&["11", "11"]),
        Shape::from_pattern(&["11", "11"]),
        Shape::from_pattern(&["11", "11"]),
    ],
    // S
    [
        Shape::from_pattern(&["011", "110"]),
        Shape::from_pattern(&["10", "11", "01"]),
        Shape::from_pattern(&["011", "110"]),
        Shape::from_pattern(&["10", "11", "01"]),
    ],
    // T
    [
        Shape::from_pattern(&["010", "111"]),
        Shape::from_pattern(&["10", "11", "10"]),
        Shape::from_pattern(&["111", "010"]),
        Shape::from_pattern(&["01", "11", "01"]),
    ],
    // Z
    [
        Shape::from_pattern(&["110", "011"]),
        Shape::from_pattern(&["01", "11", "10"]),
        Shape::from_pattern(&["110", "011"]),
        Shape::from_pattern(&["01", "11", "10"]),
    ],
];

impl PieceKind {
    /// All kinds, in table order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    fn index(self) -> usize {
        match self {
            PieceKind::I => 0,
            PieceKind::J => 1,
            PieceKind::L => 2,
            PieceKind::O => 3,
            PieceKind::S => 4,
            PieceKind::T => 5,
            PieceKind::Z => 6,
        }
    }

    /// Get the canonical shape for this tetromino at a given rotation
    pub fn shape(self, rotation: Rotation) -> Shape {
        SHAPES[self.index()][rotation.index()]
    }

    /// Get the color for this tetromino
    pub fn color(self) -> Color {
        match self {
            PieceKind::I => Color::Cyan,
            PieceKind::J => Color::Blue,
            PieceKind::L => Color::Rgb(255, 165, 0), // Orange
            PieceKind::O => Color::Yellow,
            PieceKind::S => Color::Green,
            PieceKind::T => Color::Magenta,
            PieceKind::Z => Color::Red,
        }
    }

    pub fn letter(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::Z => 'Z',
        }
    }
}

/// Rotation states, clockwise from spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    North, // Spawn state
    East,  // Clockwise from North
    South, // 180 from North
    West,  // Counter-clockwise from North
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::North, Rotation::East, Rotation::South, Rotation::West];

    /// Rotate clockwise: North → East → South → West → North
    pub fn cw(self) -> Rotation {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotation index 0-3
    pub fn index(self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }
}
