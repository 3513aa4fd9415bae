use crate::grid::{CellPos, Grid};
use serde::{Deserialize, Serialize};

/// A pixel position on the board
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// Maps grid cells to pixels: square tiles inside a uniform margin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub tile: f32,
    pub margin: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            tile: 100.0,
            margin: 30.0,
        }
    }
}

impl Layout {
    pub const fn new(tile: f32, margin: f32) -> Self {
        Layout { tile, margin }
    }

    /// Top-left pixel of a cell
    pub fn cell_origin(&self, cell: CellPos) -> Point {
        Point::new(
            self.margin + cell.col as f32 * self.tile,
            self.margin + cell.row as f32 * self.tile,
        )
    }

    /// Center pixel of a cell
    pub fn cell_center(&self, cell: CellPos) -> Point {
        let origin = self.cell_origin(cell);
        Point::new(origin.x + self.tile / 2.0, origin.y + self.tile / 2.0)
    }

    /// Cell containing a pixel. May lie outside the board.
    pub fn cell_at(&self, point: Point) -> CellPos {
        CellPos::new(
            ((point.x - self.margin) / self.tile).floor() as i32,
            ((point.y - self.margin) / self.tile).floor() as i32,
        )
    }

    /// Window size needed to show the whole grid plus margins
    pub fn board_size(&self, grid: &Grid) -> (f32, f32) {
        (
            grid.cols() as f32 * self.tile + self.margin * 2.0,
            grid.rows() as f32 * self.tile + self.margin * 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_center() {
        let layout = Layout::new(100.0, 30.0);
        assert_eq!(layout.cell_center(CellPos::new(0, 0)), Point::new(80.0, 80.0));
        assert_eq!(layout.cell_origin(CellPos::new(2, 1)), Point::new(230.0, 130.0));
    }

    #[test]
    fn test_cell_at_round_trip() {
        let layout = Layout::new(64.0, 30.0);
        for cell in [CellPos::new(0, 0), CellPos::new(3, 5), CellPos::new(7, 7)] {
            assert_eq!(layout.cell_at(layout.cell_center(cell)), cell);
        }
        assert_eq!(layout.cell_at(Point::new(10.0, 10.0)), CellPos::new(-1, -1));
    }

    #[test]
    fn test_board_size() {
        let layout = Layout::default();
        assert_eq!(layout.board_size(&Grid::new(8, 6)), (860.0, 660.0));
    }
}
