//! GRIDTRIS - a falling-block puzzle engine
//!
//! The [`engine::Engine`] owns the grid, the active piece and the score.
//! Everything else either feeds it pieces ([`source`]), persists it
//! ([`snapshot`]) or drives it from a terminal ([`input`], [`ui`]).

pub mod board;
pub mod engine;
pub mod input;
pub mod piece;
pub mod score;
pub mod settings;
pub mod shape;
pub mod snapshot;
pub mod source;
pub mod tetromino;
pub mod ui;

pub use board::{Board, Cell};
pub use engine::{Direction, Engine, EngineError, EngineState};
pub use piece::Piece;
pub use score::Score;
pub use shape::{Shape, ShapeError};
pub use snapshot::{GameStore, SavedGame, StoreError};
pub use source::{BagSource, PieceSource, SequenceSource, UniformSource};
pub use tetromino::{PieceKind, Rotation};
