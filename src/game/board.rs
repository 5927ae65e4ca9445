use serde::{Deserialize, Serialize};

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// Number of aligned pieces needed to win.
pub const CONNECT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    PlayerOne,
    PlayerTwo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
    AscendingDiagonal,
    DescendingDiagonal,
}

/// Four aligned cells of the same owner, as `(column, row)` pairs with row 0 at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinningLine {
    pub axis: Axis,
    pub owner: Cell,
    pub cells: [(usize, usize); CONNECT],
}

impl WinningLine {
    pub fn contains(&self, column: usize, row: usize) -> bool {
        self.cells.contains(&(column, row))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("column {0} is full")]
    ColumnFull(usize),
    #[error("column {0} does not exist")]
    InvalidColumn(usize),
}

/// Column-major grid: `cells[column * rows + row]`, row 0 is the bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create an empty board of the given size
    pub fn new(rows: usize, columns: usize) -> Self {
        Board {
            rows,
            columns,
            cells: vec![Cell::Empty; rows * columns],
        }
    }

    /// The classic 6 rows by 7 columns board
    pub fn standard() -> Self {
        Self::new(ROWS, COLS)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Get the cell at a specific position.
    /// Row 0 is the bottom; out-of-range positions read as `Empty`.
    pub fn get(&self, column: usize, row: usize) -> Cell {
        if column >= self.columns || row >= self.rows {
            return Cell::Empty;
        }
        self.cells[column * self.rows + row]
    }

    /// Raw cells in storage order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Check if a column is full (missing columns count as full)
    pub fn is_column_full(&self, column: usize) -> bool {
        self.lowest_empty_row(column).is_none()
    }

    fn lowest_empty_row(&self, column: usize) -> Option<usize> {
        if column >= self.columns {
            return None;
        }
        (0..self.rows).find(|&row| self.cells[column * self.rows + row] == Cell::Empty)
    }

    /// Drop a piece in a zero-indexed column, returns the row where it landed
    pub fn drop_piece(&mut self, column: usize, cell: Cell) -> Result<usize, BoardError> {
        if column >= self.columns {
            return Err(BoardError::InvalidColumn(column));
        }
        let row = self
            .lowest_empty_row(column)
            .ok_or(BoardError::ColumnFull(column))?;
        self.cells[column * self.rows + row] = cell;
        Ok(row)
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&cell| cell != Cell::Empty)
    }

    /// Number of occupied cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != Cell::Empty).count()
    }

    /// Zero-indexed columns that can still take a piece
    pub fn legal_columns(&self) -> Vec<usize> {
        (0..self.columns)
            .filter(|&column| !self.is_column_full(column))
            .collect()
    }

    /// Scan the whole board for four in a row.
    ///
    /// Windows are checked horizontally, then vertically, then along ascending
    /// and descending diagonals; the first match is returned.
    pub fn winning_line(&self) -> Option<WinningLine> {
        const AXES: [(Axis, isize, isize); 4] = [
            (Axis::Horizontal, 1, 0),
            (Axis::Vertical, 0, 1),
            (Axis::AscendingDiagonal, 1, 1),
            (Axis::DescendingDiagonal, 1, -1),
        ];

        for (axis, d_col, d_row) in AXES {
            for row in 0..self.rows {
                for column in 0..self.columns {
                    if let Some(line) = self.window(axis, column, row, d_col, d_row) {
                        return Some(line);
                    }
                }
            }
        }
        None
    }

    /// Four cells starting at `(column, row)` stepping by `(d_col, d_row)`,
    /// if they all lie on the board and share one non-empty owner.
    fn window(
        &self,
        axis: Axis,
        column: usize,
        row: usize,
        d_col: isize,
        d_row: isize,
    ) -> Option<WinningLine> {
        let owner = self.get(column, row);
        if owner == Cell::Empty {
            return None;
        }

        let mut cells = [(0, 0); CONNECT];
        for (step, slot) in cells.iter_mut().enumerate() {
            let c = column as isize + d_col * step as isize;
            let r = row as isize + d_row * step as isize;
            if c < 0 || r < 0 || c >= self.columns as isize || r >= self.rows as isize {
                return None;
            }
            let (c, r) = (c as usize, r as usize);
            if self.get(c, r) != owner {
                return None;
            }
            *slot = (c, r);
        }

        Some(WinningLine { axis, owner, cells })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
