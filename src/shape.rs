//! Small rectangular occupancy matrices for piece shapes

/// Largest side length a shape may have
pub const MAX_SIDE: usize = 4;
const CAPACITY: usize = MAX_SIDE * MAX_SIDE;

/// Reasons a matrix cannot be used as a piece shape
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("shape has no rows or no columns")]
    Empty,
    #[display("shape row {row} has {len} cells, expected {expected}")]
    Ragged { row: usize, len: usize, expected: usize },
    #[display("shape is {rows}x{cols}, larger than 4x4")]
    TooLarge { rows: usize, cols: usize },
}

/// A rectangular boolean matrix, `true` = occupied sub-cell
///
/// Stored row-major in a fixed buffer; cells past `rows * cols` are always
/// `false` so that derived equality compares shapes by content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: u8,
    cols: u8,
    cells: [bool; CAPACITY],
}

impl Shape {
    /// Build a shape from rows of `'0'`/`'1'` characters
    ///
    /// Intended for static tables: an invalid pattern fails const evaluation.
    pub const fn from_pattern(pattern: &[&str]) -> Shape {
        assert!(!pattern.is_empty() && pattern.len() <= MAX_SIDE, "bad shape height");
        let cols = pattern[0].len();
        assert!(cols > 0 && cols <= MAX_SIDE, "bad shape width");

        let mut cells = [false; CAPACITY];
        let mut row = 0;
        while row < pattern.len() {
            let bytes = pattern[row].as_bytes();
            assert!(bytes.len() == cols, "ragged shape pattern");
            let mut col = 0;
            while col < cols {
                cells[row * cols + col] = bytes[col] == b'1';
                col += 1;
            }
            row += 1;
        }

        Shape {
            rows: pattern.len() as u8,
            cols: cols as u8,
            cells,
        }
    }

    /// Build a shape from a runtime matrix
    pub fn from_rows<R: AsRef<[bool]>>(matrix: &[R]) -> Result<Shape, ShapeError> {
        let rows = matrix.len();
        let cols = matrix.first().map_or(0, |row| row.as_ref().len());
        if rows == 0 || cols == 0 {
            return Err(ShapeError::Empty);
        }
        if rows > MAX_SIDE || cols > MAX_SIDE {
            return Err(ShapeError::TooLarge { rows, cols });
        }

        let mut cells = [false; CAPACITY];
        for (row, values) in matrix.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != cols {
                return Err(ShapeError::Ragged {
                    row,
                    len: values.len(),
                    expected: cols,
                });
            }
            cells[row * cols..(row + 1) * cols].copy_from_slice(values);
        }

        Ok(Shape {
            rows: rows as u8,
            cols: cols as u8,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows as usize
    }

    pub fn cols(&self) -> usize {
        self.cols as usize
    }

    /// Whether the sub-cell at (row, col) is occupied; false outside the matrix
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.rows() && col < self.cols() && self.cells[row * self.cols() + col]
    }

    /// Iterate over occupied sub-cells as (row, col) offsets
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols();
        self.cells[..self.rows() * cols]
            .iter()
            .enumerate()
            .filter(|(_, filled)| **filled)
            .map(move |(i, _)| (i / cols, i % cols))
    }

    /// Rotate 90° clockwise
    ///
    /// An R×C shape becomes C×R with `rotated[x][R-1-y] = original[y][x]`.
    pub fn rotated_cw(&self) -> Shape {
        let (rows, cols) = (self.rows(), self.cols());
        let mut cells = [false; CAPACITY];
        for y in 0..rows {
            for x in 0..cols {
                // Rotated shape has `rows` columns
                cells[x * rows + (rows - 1 - y)] = self.cells[y * cols + x];
            }
        }
        Shape {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }

    /// Copy out as nested rows
    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        (0..self.rows())
            .map(|row| (0..self.cols()).map(|col| self.get(row, col)).collect())
            .collect()
    }
}
