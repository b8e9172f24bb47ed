//! The grid engine: a synchronous falling-block state machine
//!
//! A piece moves through `none → active → locked → none`. Drivers call
//! [`Engine::spawn`], [`Engine::move_piece`], [`Engine::rotate_piece`] and
//! [`Engine::hard_drop`], then render from [`Engine::state`]. Once
//! `game_over` is set every operation that could advance play is a no-op.

use crate::board::{Board, Cell};
use crate::piece::Piece;
use crate::score::Score;
use crate::shape::{Shape, ShapeError};
use crate::snapshot::SavedGame;
use crate::source::PieceSource;
use crate::tetromino::PieceKind;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum EngineError {
    #[display("board dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[display("saved grid is empty, ragged or does not match its recorded size")]
    MalformedGrid,
    #[display("saved piece has an invalid shape: {_0}")]
    MalformedPiece(#[error(source)] ShapeError),
}

/// Direction for a single-step move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    fn offset(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
        }
    }
}

/// Read-only view of the engine for rendering and persistence
#[derive(Debug, Clone, Copy)]
pub struct EngineState<'a> {
    pub board: &'a Board,
    pub active_piece: Option<&'a Piece>,
    pub score: &'a Score,
    pub game_over: bool,
}

/// The grid engine
#[derive(Debug, Clone)]
pub struct Engine {
    board: Board,
    active_piece: Option<Piece>,
    score: Score,
    game_over: bool,
}

impl Engine {
    /// Create an engine with an empty `width` x `height` grid
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions { width, height });
        }
        Ok(Self {
            board: Board::new(width, height),
            active_piece: None,
            score: Score::new(),
            game_over: false,
        })
    }

    /// Rebuild an engine from a saved snapshot
    pub fn restore(saved: &SavedGame) -> Result<Self, EngineError> {
        let rows = saved
            .grid
            .iter()
            .map(|row| row.iter().copied().map(Cell::from).collect())
            .collect();
        let board = Board::from_rows(rows)
            .filter(|board| board.width() == saved.width && board.height() == saved.height)
            .ok_or(EngineError::MalformedGrid)?;
        let active_piece = saved
            .active_piece
            .as_ref()
            .map(|piece| piece.to_piece())
            .transpose()
            .map_err(EngineError::MalformedPiece)?;
        info!(
            width = board.width(),
            height = board.height(),
            score = saved.score,
            game_over = saved.game_over,
            "restored engine"
        );
        Ok(Self {
            board,
            active_piece,
            score: Score::restored(saved.score, saved.lines),
            game_over: saved.game_over,
        })
    }

    pub fn width(&self) -> usize {
        self.board.width()
    }

    pub fn height(&self) -> usize {
        self.board.height()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct grid access for setting up positions
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn active_piece(&self) -> Option<&Piece> {
        self.active_piece.as_ref()
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Snapshot for rendering
    pub fn state(&self) -> EngineState<'_> {
        EngineState {
            board: &self.board,
            active_piece: self.active_piece.as_ref(),
            score: &self.score,
            game_over: self.game_over,
        }
    }

    /// Spawn a piece of `kind` with `shape` anchored at column `x`
    ///
    /// Without `y` the piece enters from above so that its bottom row sits on
    /// grid row 0. Returns whether the piece is active afterwards.
    pub fn spawn(&mut self, kind: PieceKind, shape: Shape, x: i32, y: Option<i32>) -> bool {
        let y = y.unwrap_or(-(shape.rows() as i32 - 1));
        self.spawn_piece(Piece::new(kind, shape, x, y))
    }

    /// Spawn a fully formed piece, replacing any active one
    ///
    /// An invalid spawn locks the piece where it stands and ends the game.
    pub fn spawn_piece(&mut self, piece: Piece) -> bool {
        debug!(kind = ?piece.kind, x = piece.x, y = piece.y, "spawn");
        let valid = self.is_valid_spawn(&piece);
        self.active_piece = Some(piece);

        if !valid {
            self.place_piece();
            self.game_over = true;
            info!(score = self.score.points, "spawn blocked, game over");
        }
        valid
    }

    /// Draw the next piece from `source` and spawn it at the top centre
    pub fn spawn_from<S: PieceSource + ?Sized>(&mut self, source: &mut S) -> bool {
        let (kind, shape) = source.next();
        let x = (self.width() / 2) as i32 - 1;
        self.spawn(kind, shape, x, Some(0))
    }

    /// Spawn check: rows above the grid are exempt, visible rows must be in
    /// bounds and empty
    fn is_valid_spawn(&self, piece: &Piece) -> bool {
        piece
            .cells()
            .all(|(x, y)| y < 0 || self.board.get(x, y).is_some_and(|cell| cell.is_empty()))
    }

    /// Whether `piece` fits: every occupied sub-cell within the columns,
    /// above the floor, and on an empty cell when on the visible grid
    pub fn can_place(&self, piece: &Piece) -> bool {
        piece.cells().all(|(x, y)| {
            if x < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
                return false;
            }
            y < 0 || self.board.get(x, y).is_some_and(|cell| cell.is_empty())
        })
    }

    /// Move the active piece one step
    ///
    /// A blocked downward move locks the piece. Returns whether anything changed.
    pub fn move_piece(&mut self, direction: Direction) -> bool {
        if self.game_over {
            return false;
        }
        let Some(piece) = &self.active_piece else {
            return false;
        };

        let (dx, dy) = direction.offset();
        let candidate = piece.shifted(dx, dy);
        if self.can_place(&candidate) {
            self.active_piece = Some(candidate);
            if direction == Direction::Down {
                self.score.add_soft_drop(1);
            }
            true
        } else if direction == Direction::Down {
            self.place_piece();
            true
        } else {
            false
        }
    }

    /// Rotate the active piece 90° clockwise in place, without wall kicks
    pub fn rotate_piece(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        let Some(piece) = &self.active_piece else {
            return false;
        };

        let rotated = piece.rotated_cw();
        if self.can_place(&rotated) {
            self.active_piece = Some(rotated);
            true
        } else {
            false
        }
    }

    /// Drop the active piece as far as it can fall and lock it
    ///
    /// A piece that cannot fall at all is left active. Returns the distance.
    pub fn hard_drop(&mut self) -> u32 {
        if self.game_over {
            return 0;
        }
        let Some(piece) = &self.active_piece else {
            return 0;
        };

        let mut landed = piece.clone();
        let mut distance = 0;
        loop {
            let next = landed.shifted(0, 1);
            if !self.can_place(&next) {
                break;
            }
            landed = next;
            distance += 1;
        }

        if distance > 0 {
            self.active_piece = Some(landed);
            self.score.add_hard_drop(distance);
            self.place_piece();
        }
        distance
    }

    /// Lock the active piece onto the grid and clear lines
    ///
    /// A piece with any sub-cell above the grid ends the game once locked.
    pub fn place_piece(&mut self) {
        let Some(piece) = self.active_piece.take() else {
            return;
        };

        let overflowed = piece.extends_above();
        for (x, y) in piece.cells().filter(|&(_, y)| y >= 0) {
            self.board.set(x, y, Cell::Filled(piece.kind));
        }
        debug!(kind = ?piece.kind, x = piece.x, y = piece.y, overflowed, "lock");

        self.clear_lines();

        if overflowed {
            self.game_over = true;
            info!(score = self.score.points, "locked above the grid, game over");
        }
    }

    /// Remove full rows and score them
    ///
    /// Does nothing once the game is over. Returns the number of rows removed.
    pub fn clear_lines(&mut self) -> usize {
        if self.game_over {
            return 0;
        }

        let cleared = self.board.clear_lines();
        if cleared >= crate::score::LINE_CLEAR_POINTS.len() {
            warn!(cleared, "more rows cleared than the score table covers");
        }
        let awarded = self.score.add_clear(cleared);
        if cleared > 0 {
            debug!(cleared, awarded, total = self.score.points, "lines cleared");
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SequenceSource;
    use crate::tetromino::Rotation;

    fn engine() -> Engine {
        Engine::new(10, 20).unwrap()
    }

    fn spawn_canonical(engine: &mut Engine, kind: PieceKind, x: i32, y: i32) -> bool {
        engine.spawn(kind, kind.shape(Rotation::North), x, Some(y))
    }

    #[test]
    fn test_new_engine() {
        let engine = engine();
        let state = engine.state();
        assert_eq!(state.board.height(), 20);
        assert_eq!(state.board.width(), 10);
        assert!(state.board.is_empty());
        assert!(state.active_piece.is_none());
        assert_eq!(state.score.points, 0);
        assert!(!state.game_over);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(
            Engine::new(0, 20).unwrap_err(),
            EngineError::InvalidDimensions { width: 0, height: 20 }
        );
        assert!(Engine::new(10, 0).is_err());
    }

    #[test]
    fn test_spawn_valid_piece() {
        let mut engine = engine();
        assert!(spawn_canonical(&mut engine, PieceKind::T, 4, 0));
        let piece = engine.active_piece().unwrap();
        assert_eq!(piece.kind, PieceKind::T);
        assert_eq!(piece.rotation, Rotation::North);
    }

    #[test]
    fn test_spawn_default_row_enters_from_above() {
        let mut engine = engine();
        assert!(engine.spawn(PieceKind::I, PieceKind::I.shape(Rotation::East), 0, None));
        let piece = engine.active_piece().unwrap();
        assert_eq!(piece.y, -3);
        assert_eq!(piece.cells().map(|(_, y)| y).max(), Some(0));
    }

    #[test]
    fn test_spawn_over_filled_cells_ends_game() {
        let mut engine = engine();
        engine.board_mut().fill_row(0, PieceKind::O);

        assert!(!spawn_canonical(&mut engine, PieceKind::I, 3, 0));
        let state = engine.state();
        assert!(state.game_over);
        assert!(state.active_piece.is_none());
    }

    #[test]
    fn test_spawn_above_grid_is_exempt() {
        let mut engine = engine();
        // Row 0 filled except under the bottom cell of the vertical I
        engine.board_mut().fill_row(0, PieceKind::O);
        engine.board_mut().set(0, 0, Cell::Empty);
        assert!(engine.spawn(PieceKind::I, PieceKind::I.shape(Rotation::East), 0, None));
        assert!(!engine.is_game_over());
    }

    #[test]
    fn test_invalid_spawn_prelocks_visible_cells() {
        let mut engine = engine();
        engine.board_mut().set(4, 1, Cell::Filled(PieceKind::Z));

        assert!(!spawn_canonical(&mut engine, PieceKind::O, 4, 0));
        assert!(engine.is_game_over());
        // Visible cells of the blocked piece were written before game over
        assert_eq!(engine.board().get(5, 0), Some(Cell::Filled(PieceKind::O)));
        assert_eq!(engine.board().get(5, 1), Some(Cell::Filled(PieceKind::O)));
    }

    #[test]
    fn test_spawn_outside_columns_ends_game() {
        let mut engine = engine();
        // T at x = -1 pokes its lower-left cell out of the grid
        assert!(!spawn_canonical(&mut engine, PieceKind::T, -1, 0));
        assert!(engine.is_game_over());
        assert_eq!(engine.board().get(0, 0), Some(Cell::Filled(PieceKind::T)));
        assert_eq!(engine.board().get(0, 1), Some(Cell::Filled(PieceKind::T)));
        assert_eq!(engine.board().get(1, 1), Some(Cell::Filled(PieceKind::T)));
    }

    #[test]
    fn test_spawn_column_check_skips_rows_above_grid() {
        let mut engine = engine();
        // J East at x = 9: its top-right cell is past the wall but above the grid
        assert!(engine.spawn(PieceKind::J, PieceKind::J.shape(Rotation::East), 9, Some(-2)));
        assert!(!engine.is_game_over());
        let piece = engine.active_piece().unwrap().clone();
        assert!(!engine.can_place(&piece));

        // The next step down is rejected too, so the piece locks above the grid
        assert!(engine.move_piece(Direction::Down));
        assert!(engine.is_game_over());
        assert_eq!(engine.board().get(9, 0), Some(Cell::Filled(PieceKind::J)));
    }

    #[test]
    fn test_extreme_anchors_are_rejected_not_panics() {
        let mut engine = engine();
        assert!(!spawn_canonical(&mut engine, PieceKind::T, i32::MAX, 0));
        assert!(engine.is_game_over());
        assert!(engine.board().is_empty());

        let mut engine = Engine::new(10, 20).unwrap();
        assert!(!spawn_canonical(&mut engine, PieceKind::I, 0, i32::MAX));
        assert!(engine.is_game_over());
        assert!(engine.board().is_empty());

        let o = |x, y| Piece::canonical(PieceKind::O, Rotation::North, x, y);
        assert!(!engine.can_place(&o(i32::MAX, 0)));
        assert!(!engine.can_place(&o(0, i32::MAX)));
        assert!(!engine.can_place(&o(i32::MIN, i32::MIN)));
    }

    #[test]
    fn test_restored_piece_at_extreme_row_locks_cleanly() {
        let mut saved = SavedGame::capture(&engine().state());
        saved.active_piece = Some(crate::snapshot::SavedPiece::capture(&Piece::canonical(
            PieceKind::O,
            Rotation::North,
            0,
            i32::MAX,
        )));
        let mut engine = Engine::restore(&saved).unwrap();

        assert!(!engine.move_piece(Direction::Left));
        assert!(!engine.rotate_piece());
        assert_eq!(engine.hard_drop(), 0);
        assert!(engine.move_piece(Direction::Down));
        assert!(engine.active_piece().is_none());
        assert!(engine.board().is_empty());
        assert!(!engine.is_game_over());
    }

    #[test]
    fn test_spawn_from_source_uses_centre_column() {
        let mut engine = Engine::new(16, 16).unwrap();
        let mut source = SequenceSource::new(vec![PieceKind::L]).unwrap();
        assert!(engine.spawn_from(&mut source));
        let piece = engine.active_piece().unwrap();
        assert_eq!((piece.kind, piece.x, piece.y), (PieceKind::L, 7, 0));
    }

    #[test]
    fn test_move_left_and_right() {
        let mut engine = engine();
        spawn_canonical(&mut engine, PieceKind::I, 3, 5);
        assert!(engine.move_piece(Direction::Right));
        assert_eq!(engine.active_piece().unwrap().x, 4);
        assert!(engine.move_piece(Direction::Left));
        assert_eq!(engine.active_piece().unwrap().x, 3);
        assert_eq!(engine.score().points, 0);
    }

    #[test]
    fn test_move_left_stops_at_wall() {
        let mut engine = Engine::new(16, 16).unwrap();
        spawn_canonical(&mut engine, PieceKind::T, 3, 0);
        for _ in 0..3 {
            assert!(engine.move_piece(Direction::Left));
        }
        for _ in 0..5 {
            assert!(!engine.move_piece(Direction::Left));
            assert_eq!(engine.active_piece().unwrap().x, 0);
        }
    }

    #[test]
    fn test_soft_drop_scores_one_per_row() {
        let mut engine = engine();
        spawn_canonical(&mut engine, PieceKind::O, 4, 0);
        for expected in 1..=5 {
            assert!(engine.move_piece(Direction::Down));
            assert_eq!(engine.score().points, expected);
        }
        assert_eq!(engine.active_piece().unwrap().y, 5);
    }

    #[test]
    fn test_blocked_down_locks() {
        let mut engine = engine();
        spawn_canonical(&mut engine, PieceKind::O, 4, 18);
        assert!(engine.move_piece(Direction::Down));
        assert!(engine.active_piece().is_none());
        assert_eq!(engine.score().points, 0);
        assert_eq!(engine.board().get(4, 19), Some(Cell::Filled(PieceKind::O)));
        assert!(!engine.is_game_over());
    }

    #[test]
    fn test_move_without_piece_is_noop() {
        let mut engine = engine();
        assert!(!engine.move_piece(Direction::Down));
        assert!(!engine.rotate_piece());
        assert_eq!(engine.hard_drop(), 0);
        assert_eq!(engine.score().points, 0);
    }

    #[test]
    fn test_rotate_t_piece() {
        let mut engine = engine();
        spawn_canonical(&mut engine, PieceKind::T, 4, 5);
        assert!(engine.rotate_piece());
        let piece = engine.active_piece().unwrap();
        assert_eq!(piece.shape, PieceKind::T.shape(Rotation::East));
        assert_eq!(piece.rotation, Rotation::East);
    }

    #[test]
    fn test_rotate_rejected_at_wall() {
        let mut engine = engine();
        // Vertical I against the right wall cannot turn horizontal
        engine.spawn(PieceKind::I, PieceKind::I.shape(Rotation::East), 9, Some(5));
        assert!(!engine.rotate_piece());
        assert_eq!(engine.active_piece().unwrap().shape, PieceKind::I.shape(Rotation::East));
    }

    #[test]
    fn test_rotate_rejected_by_occupied_cell() {
        let mut engine = engine();
        spawn_canonical(&mut engine, PieceKind::T, 4, 5);
        // T East occupies (4,7); block it
        engine.board_mut().set(4, 7, Cell::Filled(PieceKind::S));
        assert!(!engine.rotate_piece());
        assert_eq!(engine.active_piece().unwrap().rotation, Rotation::North);
    }

    #[test]
    fn test_rotate_rejected_below_floor() {
        let mut engine = engine();
        spawn_canonical(&mut engine, PieceKind::I, 3, 19);
        assert!(!engine.rotate_piece());
    }

    #[test]
    fn test_hard_drop_scores_and_locks() {
        let mut engine = engine();
        spawn_canonical(&mut engine, PieceKind::O, 4, 0);
        assert_eq!(engine.hard_drop(), 18);
        assert_eq!(engine.score().points, 36);
        assert!(engine.active_piece().is_none());
        assert_eq!(engine.board().get(4, 18), Some(Cell::Filled(PieceKind::O)));
        assert_eq!(engine.board().get(5, 19), Some(Cell::Filled(PieceKind::O)));
    }

    #[test]
    fn test_hard_drop_zero_distance_is_noop() {
        let mut engine = engine();
        spawn_canonical(&mut engine, PieceKind::O, 4, 18);
        assert_eq!(engine.hard_drop(), 0);
        assert_eq!(engine.score().points, 0);
        assert!(engine.active_piece().is_some());
        assert!(engine.board().is_empty());
    }

    #[test]
    fn test_can_place_bounds() {
        let mut engine = engine();
        let o = |x, y| Piece::canonical(PieceKind::O, Rotation::North, x, y);
        assert!(engine.can_place(&o(0, 0)));
        assert!(engine.can_place(&o(8, 18)));
        assert!(engine.can_place(&o(4, -5)));
        assert!(!engine.can_place(&o(-1, 0)));
        assert!(!engine.can_place(&o(9, 0)));
        assert!(!engine.can_place(&o(4, 19)));
        // Columns are checked even above the grid
        assert!(!engine.can_place(&o(-1, -5)));

        engine.board_mut().set(5, 10, Cell::Filled(PieceKind::J));
        assert!(!engine.can_place(&o(4, 9)));
        assert!(engine.can_place(&o(4, 8)));
    }

    #[test]
    fn test_single_line_clear() {
        let mut engine = engine();
        for x in (0..10).filter(|x| *x != 4 && *x != 5) {
            engine.board_mut().set(x, 19, Cell::Filled(PieceKind::L));
        }
        spawn_canonical(&mut engine, PieceKind::O, 4, 18);
        engine.place_piece();

        let state = engine.state();
        assert_eq!(state.score.points, 100);
        assert_eq!(state.score.lines, 1);
        assert_eq!(state.board.height(), 20);
        assert!(state.board.row(0).iter().all(Cell::is_empty));
        // Upper half of the O dropped into the cleared row
        assert_eq!(state.board.get(4, 19), Some(Cell::Filled(PieceKind::O)));
    }

    #[test]
    fn test_four_line_clear() {
        let mut engine = engine();
        for y in 16..20 {
            engine.board_mut().fill_row(y, PieceKind::S);
        }
        spawn_canonical(&mut engine, PieceKind::I, 3, 15);
        engine.place_piece();

        assert_eq!(engine.score().points, 800);
        assert_eq!(engine.score().last_clear, Some("Tetris"));
        for y in 0..4 {
            assert!(engine.board().row(y).iter().all(Cell::is_empty));
        }
        assert_eq!(engine.board().get(3, 19), Some(Cell::Filled(PieceKind::I)));
    }

    #[test]
    fn test_line_clear_table() {
        for (rows, expected) in [(1, 100), (2, 300), (3, 500), (4, 800)] {
            let mut engine = engine();
            for y in 20 - rows..20 {
                engine.board_mut().fill_row(y, PieceKind::T);
            }
            assert_eq!(engine.clear_lines(), rows);
            assert_eq!(engine.score().points, expected);
            assert!(engine.board().is_empty());
        }
    }

    #[test]
    fn test_lock_above_grid_ends_game() {
        let mut engine = engine();
        engine.spawn(PieceKind::I, PieceKind::I.shape(Rotation::East), 0, None);
        engine.place_piece();
        assert!(engine.is_game_over());
        assert!(engine.active_piece().is_none());
        assert_eq!(engine.board().get(0, 0), Some(Cell::Filled(PieceKind::I)));
    }

    #[test]
    fn test_game_over_blocks_play() {
        let mut engine = engine();
        engine.board_mut().set(5, 0, Cell::Filled(PieceKind::O));
        spawn_canonical(&mut engine, PieceKind::T, 4, 0);
        assert!(engine.is_game_over());

        // A piece restored into a finished game cannot move
        engine.active_piece = Some(Piece::canonical(PieceKind::O, Rotation::North, 0, 5));
        assert!(!engine.move_piece(Direction::Down));
        assert!(!engine.rotate_piece());
        assert_eq!(engine.hard_drop(), 0);

        engine.board_mut().fill_row(19, PieceKind::Z);
        assert_eq!(engine.clear_lines(), 0);
        assert_eq!(engine.score().points, 0);
    }

    #[test]
    fn test_full_game_from_source_terminates() {
        let mut engine = Engine::new(6, 8).unwrap();
        let mut source = SequenceSource::new(PieceKind::ALL.to_vec()).unwrap();
        let mut spawned = 0;
        while !engine.is_game_over() {
            if engine.active_piece().is_none() {
                engine.spawn_from(&mut source);
                spawned += 1;
                assert!(spawned < 100, "game never ended");
            }
            engine.move_piece(Direction::Down);
        }
        assert!(engine.active_piece().is_none());
        assert_eq!(engine.board().height(), 8);
    }
}
