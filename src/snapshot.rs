//! Saved games
//!
//! A [`SavedGame`] is an owned copy of an engine state that can be written as
//! JSON. [`GameStore`] keeps one document per game id in a directory
//! (`<data dir>/saves/<id>.json` by default).

use crate::engine::EngineState;
use crate::piece::Piece;
use crate::shape::{Shape, ShapeError};
use crate::tetromino::{PieceKind, Rotation};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Serialisable copy of the active piece
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPiece {
    pub kind: PieceKind,
    pub shape: Vec<Vec<bool>>,
    pub x: i32,
    pub y: i32,
    pub rotation: Rotation,
}

impl SavedPiece {
    pub fn capture(piece: &Piece) -> Self {
        Self {
            kind: piece.kind,
            shape: piece.shape.to_rows(),
            x: piece.x,
            y: piece.y,
            rotation: piece.rotation,
        }
    }

    pub fn to_piece(&self) -> Result<Piece, ShapeError> {
        Ok(Piece {
            kind: self.kind,
            shape: Shape::from_rows(self.shape.as_slice())?,
            x: self.x,
            y: self.y,
            rotation: self.rotation,
        })
    }
}

/// Serialisable copy of a whole engine state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub width: usize,
    pub height: usize,
    /// Rows top to bottom, `None` for an empty cell
    pub grid: Vec<Vec<Option<PieceKind>>>,
    pub active_piece: Option<SavedPiece>,
    pub score: u64,
    #[serde(default)]
    pub lines: u32,
    pub game_over: bool,
}

impl SavedGame {
    pub fn capture(state: &EngineState<'_>) -> Self {
        Self {
            width: state.board.width(),
            height: state.board.height(),
            grid: state
                .board
                .rows()
                .map(|row| row.iter().map(|cell| cell.kind()).collect())
                .collect(),
            active_piece: state.active_piece.map(SavedPiece::capture),
            score: state.score.points,
            lines: state.score.lines,
            game_over: state.game_over,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum StoreError {
    #[display("game id {_0:?} must be non-empty ASCII letters, digits, '-' or '_'")]
    InvalidId(#[error(not(source))] String),
    #[display("could not determine data directory")]
    NoDataDir,
    #[display("save file I/O failed: {_0}")]
    Io(#[error(source)] io::Error),
    #[display("save file is not valid JSON: {_0}")]
    Json(#[error(source)] serde_json::Error),
}

/// Directory of saved games keyed by game id
#[derive(Debug, Clone)]
pub struct GameStore {
    dir: PathBuf,
}

impl GameStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform data directory
    pub fn open_default() -> Result<Self, StoreError> {
        ProjectDirs::from("com", "gridtris", "gridtris")
            .map(|dirs| Self::new(dirs.data_dir().join("saves")))
            .ok_or(StoreError::NoDataDir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    /// Write `game` under `id`, replacing any previous save
    pub fn save(&self, id: &str, game: &SavedGame) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        fs::create_dir_all(&self.dir).map_err(StoreError::Io)?;
        let contents = serde_json::to_string_pretty(game).map_err(StoreError::Json)?;
        fs::write(&path, contents).map_err(StoreError::Io)?;
        info!(id, path = %path.display(), score = game.score, "saved game");
        Ok(())
    }

    /// Load the game saved under `id`, `None` if there is none
    pub fn load(&self, id: &str) -> Result<Option<SavedGame>, StoreError> {
        let path = self.path_for(id)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(id, "no saved game");
                return Ok(None);
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        let game = serde_json::from_str(&contents).map_err(StoreError::Json)?;
        Ok(Some(game))
    }

    /// Delete the save for `id`; missing saves are not an error
    pub fn remove(&self, id: &str) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
