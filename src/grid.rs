use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A discrete (column, row) grid address.
///
/// Signed so that addresses left of or above the board are representable
/// and get rejected instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub col: i32,
    pub row: i32,
}

impl CellPos {
    pub const fn new(col: i32, row: i32) -> Self {
        CellPos { col, row }
    }

    /// Cell offset by (dcol, drow). Saturates, so huge deltas land off the board.
    pub const fn offset(self, dcol: i32, drow: i32) -> Self {
        CellPos::new(self.col.saturating_add(dcol), self.row.saturating_add(drow))
    }

    /// Euclidean distance to `other`, in cells
    pub fn distance(self, other: CellPos) -> f64 {
        let dcol = i64::from(other.col) - i64::from(self.col);
        let drow = i64::from(other.row) - i64::from(self.row);
        (dcol as f64).hypot(drow as f64)
    }
}

impl From<(i32, i32)> for CellPos {
    fn from((col, row): (i32, i32)) -> Self {
        CellPos::new(col, row)
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// What occupies a cell of the passability mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Floor,
    Wall,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("layout has no rows")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown glyph {glyph:?} at row {row}, column {col}")]
    UnknownGlyph { row: usize, col: usize, glyph: char },
    #[error("invalid mask value {value} at row {row}, column {col} (expected 0 or 1)")]
    InvalidValue { row: usize, col: usize, value: u8 },
    #[error("grid extent {cols}x{rows} is out of range (1..={max} cells)", max = MAX_CELLS)]
    Extent { cols: i32, rows: i32 },
}

/// Upper bound on the number of cells a board may hold
pub const MAX_CELLS: usize = 1 << 20;

/// Immutable board: a cols x rows extent plus a passability mask.
///
/// Anything outside the extent is impassable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: i32,
    rows: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Create a grid with every cell set to floor.
    ///
    /// # Panics
    ///
    /// If the extent is empty or exceeds [`MAX_CELLS`]. Use [`Grid::try_new`]
    /// for sizes that come from outside the program.
    pub fn new(cols: i32, rows: i32) -> Self {
        match Self::try_new(cols, rows) {
            Ok(grid) => grid,
            Err(e) => panic!("{e}"),
        }
    }

    /// Open board of `cols` x `rows`, rejecting empty or oversized extents
    pub fn try_new(cols: i32, rows: i32) -> Result<Self, GridError> {
        let extent = || GridError::Extent { cols, rows };
        let width = usize::try_from(cols).map_err(|_| extent())?;
        let height = usize::try_from(rows).map_err(|_| extent())?;
        let count = width.checked_mul(height).ok_or_else(extent)?;
        if count == 0 || count > MAX_CELLS {
            return Err(extent());
        }

        Ok(Grid {
            cols,
            rows,
            tiles: vec![Tile::Floor; count],
        })
    }

    /// Create a grid with specific wall cells. Walls outside the extent are ignored.
    pub fn with_walls(cols: i32, rows: i32, walls: &[CellPos]) -> Self {
        let mut grid = Self::new(cols, rows);
        for &cell in walls {
            if let Some(id) = grid.index_of(cell) {
                grid.tiles[id] = Tile::Wall;
            }
        }
        grid
    }

    /// Build from an obstacle matrix: 0 = floor, 1 = wall
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self, GridError> {
        Self::from_matrix(rows, |row, col, value| match value {
            0 => Ok(Tile::Floor),
            1 => Ok(Tile::Wall),
            _ => Err(GridError::InvalidValue { row, col, value }),
        })
    }

    /// Build from tilemap indices; every cell holding `wall_index` collides.
    pub fn from_tile_indices(rows: &[Vec<u32>], wall_index: u32) -> Result<Self, GridError> {
        Self::from_matrix(rows, |_, _, index| {
            Ok(if index == wall_index { Tile::Wall } else { Tile::Floor })
        })
    }

    /// Parse an ASCII layout: `#` wall, `.` floor. Blank lines are skipped.
    pub fn parse(layout: &str) -> Result<Self, GridError> {
        let lines: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        Self::from_lines(&lines)
    }

    /// Same as [`Grid::parse`] for layouts already split into rows
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, GridError> {
        let rows: Vec<Vec<char>> = lines.iter().map(|l| l.as_ref().chars().collect()).collect();
        Self::from_matrix(&rows, |row, col, glyph| match glyph {
            '.' => Ok(Tile::Floor),
            '#' => Ok(Tile::Wall),
            _ => Err(GridError::UnknownGlyph { row, col, glyph }),
        })
    }

    fn from_matrix<T: Copy>(
        rows: &[Vec<T>],
        mut tile_for: impl FnMut(usize, usize, T) -> Result<Tile, GridError>,
    ) -> Result<Self, GridError> {
        let expected = rows.first().map(Vec::len).ok_or(GridError::Empty)?;
        if expected == 0 {
            return Err(GridError::Empty);
        }

        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (row, values) in rows.iter().enumerate() {
            if values.len() != expected {
                return Err(GridError::Ragged {
                    row,
                    expected,
                    found: values.len(),
                });
            }
            for (col, &value) in values.iter().enumerate() {
                tiles.push(tile_for(row, col, value)?);
            }
        }

        Ok(Grid {
            cols: expected as i32,
            rows: rows.len() as i32,
            tiles,
        })
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Check if a cell lies inside the extent
    pub fn in_bounds(&self, cell: CellPos) -> bool {
        cell.col >= 0 && cell.col < self.cols && cell.row >= 0 && cell.row < self.rows
    }

    /// Row-major index of an in-bounds cell
    fn index_of(&self, cell: CellPos) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| (cell.col + cell.row * self.cols) as usize)
    }

    /// Tile at a cell. Out of bounds reads as wall.
    pub fn tile(&self, cell: CellPos) -> Tile {
        self.index_of(cell)
            .and_then(|id| self.tiles.get(id).copied())
            .unwrap_or(Tile::Wall)
    }

    /// Check if a cell is blocked (walls and everything off the board)
    pub fn is_blocked(&self, cell: CellPos) -> bool {
        self.tile(cell) == Tile::Wall
    }

    /// True iff the cell is inside the extent and marked floor
    pub fn is_passable(&self, cell: CellPos) -> bool {
        self.in_bounds(cell) && !self.is_blocked(cell)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = CellPos> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| CellPos::new(col, row)))
    }

    /// Wall cells in row-major order
    pub fn walls(&self) -> impl Iterator<Item = CellPos> + '_ {
        self.cells().filter(move |&cell| self.is_blocked(cell))
    }

    /// Render back to the `#`/`.` layout understood by [`Grid::parse`]
    pub fn to_ascii(&self) -> String {
        let mut result = String::with_capacity(((self.cols + 1) * self.rows) as usize);
        for row in 0..self.rows {
            for col in 0..self.cols {
                result.push(match self.tile(CellPos::new(col, row)) {
                    Tile::Floor => '.',
                    Tile::Wall => '#',
                });
            }
            result.push('\n');
        }
        result
    }
}

impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grid::parse(s)
    }
}
