//! Game board representation and line clearing

use crate::tetromino::PieceKind;

/// A cell on the board - either empty or filled by a locked piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(PieceKind),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }

    /// The kind that locked here, if any
    pub fn kind(&self) -> Option<PieceKind> {
        match self {
            Cell::Empty => None,
            Cell::Filled(kind) => Some(*kind),
        }
    }
}

impl From<Option<PieceKind>> for Cell {
    fn from(kind: Option<PieceKind>) -> Self {
        kind.map_or(Cell::Empty, Cell::Filled)
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// Row-major cells, `y * width + x`; row 0 is the top
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    ///
    /// Callers guarantee non-zero dimensions; the engine checks them.
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    /// Build a board from explicit rows
    ///
    /// Returns `None` if there are no rows, a row is empty, or rows differ in length.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Option<Self> {
        let height = rows.len();
        let width = rows.first()?.len();
        if width == 0 || rows.iter().any(|row| row.len() != width) {
            return None;
        }
        Some(Self {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Get the cell at (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Set a cell at (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Fill every cell of a row
    pub fn fill_row(&mut self, y: usize, kind: PieceKind) {
        if y < self.height {
            self.row_mut(y).fill(Cell::Filled(kind));
        }
    }

    pub fn row(&self, y: usize) -> &[Cell] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    fn row_mut(&mut self, y: usize) -> &mut [Cell] {
        &mut self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Iterate over rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    /// Check if a line is completely filled
    fn is_line_full(&self, y: usize) -> bool {
        self.row(y).iter().all(Cell::is_filled)
    }

    /// Clear completed lines and return the number cleared
    ///
    /// Surviving rows keep their order and sink to the bottom; the same number
    /// of empty rows appear at the top.
    pub fn clear_lines(&mut self) -> usize {
        let mut lines_cleared = 0;
        let mut write_row = self.height;

        for read_row in (0..self.height).rev() {
            if self.is_line_full(read_row) {
                lines_cleared += 1;
                continue;
            }
            write_row -= 1;
            if write_row != read_row {
                let width = self.width;
                self.cells
                    .copy_within(read_row * width..(read_row + 1) * width, write_row * width);
            }
        }

        // Fill the top with empty rows
        for y in 0..write_row {
            self.row_mut(y).fill(Cell::Empty);
        }

        lines_cleared
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(10, 20);
        assert!(board.is_empty());
        assert_eq!(board.rows().count(), 20);
        assert!(board.rows().all(|row| row.len() == 10));
    }

    #[test]
    fn test_set_and_get() {
        let mut board = Board::new(10, 20);
        assert!(board.set(5, 7, Cell::Filled(PieceKind::T)));
        assert_eq!(board.get(5, 7), Some(Cell::Filled(PieceKind::T)));
        assert_eq!(board.row(7)[5].kind(), Some(PieceKind::T));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut board = Board::new(10, 20);
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(0, -1), None);
        assert_eq!(board.get(10, 0), None);
        assert_eq!(board.get(0, 20), None);
        assert!(!board.set(10, 0, Cell::Filled(PieceKind::I)));
        assert!(board.is_empty());
    }

    #[test]
    fn test_clear_single_line() {
        let mut board = Board::new(10, 20);
        board.fill_row(19, PieceKind::I);
        // A block resting on the full row
        board.set(0, 18, Cell::Filled(PieceKind::Z));

        assert_eq!(board.clear_lines(), 1);
        // The block from row 18 should now be on row 19
        assert_eq!(board.get(0, 19), Some(Cell::Filled(PieceKind::Z)));
        assert!(board.row(0).iter().all(Cell::is_empty));
        assert_eq!(board.height(), 20);
    }

    #[test]
    fn test_clear_non_adjacent_lines_keeps_order() {
        let mut board = Board::new(4, 6);
        board.fill_row(5, PieceKind::I);
        board.set(1, 4, Cell::Filled(PieceKind::S));
        board.fill_row(3, PieceKind::O);
        board.set(2, 2, Cell::Filled(PieceKind::T));

        assert_eq!(board.clear_lines(), 2);
        assert_eq!(board.get(1, 5), Some(Cell::Filled(PieceKind::S)));
        assert_eq!(board.get(2, 4), Some(Cell::Filled(PieceKind::T)));
        for y in 0..2 {
            assert!(board.row(y).iter().all(Cell::is_empty));
        }
    }

    #[test]
    fn test_from_rows() {
        let rows = vec![
            vec![Cell::Empty, Cell::Filled(PieceKind::J)],
            vec![Cell::Empty, Cell::Empty],
        ];
        let board = Board::from_rows(rows).unwrap();
        assert_eq!((board.width(), board.height()), (2, 2));
        assert_eq!(board.get(1, 0), Some(Cell::Filled(PieceKind::J)));

        assert!(Board::from_rows(Vec::new()).is_none());
        assert!(Board::from_rows(vec![vec![Cell::Empty], vec![]]).is_none());
    }
}
