//! Per-side cell partition used for wall placement and collision queries
//!
//! Each arena half owns one `Grid`. A cell holds at most one wall, and the
//! world/cell mapping depends only on the side offset and the cell size.

use serde::{Deserialize, Serialize};

use super::wall::Wall;
use super::{Bounds, Side, GRID_COLUMNS, GRID_ROWS};

/// A wall at a known cell, as exchanged between peers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedWall {
    pub side: Side,
    pub row: usize,
    pub col: usize,
    pub width: f32,
    pub height: f32,
}

/// Occupied cells of one grid. Positions are recomputed on apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub walls: Vec<PlacedWall>,
}

#[derive(Debug, Clone)]
pub struct Grid {
    side: Side,
    columns: usize,
    rows: usize,
    cell_width: f32,
    cell_height: f32,
    offset_x: f32,
    /// Row-major cells
    cells: Vec<Option<Wall>>,
}

impl Grid {
    pub fn new(side: Side, columns: usize, rows: usize, bounds: &Bounds) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            side,
            columns,
            rows,
            cell_width: bounds.width / 2.0 / columns as f32,
            cell_height: bounds.height / rows as f32,
            offset_x: match side {
                Side::Left => 0.0,
                Side::Right => bounds.width / 2.0,
            },
            cells: vec![None; columns * rows],
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> (f32, f32) {
        (self.cell_width, self.cell_height)
    }

    /// Cell containing a world point. May lie outside the grid.
    pub fn to_cell(&self, x: f32, y: f32) -> (i64, i64) {
        let row = (y / self.cell_height).floor() as i64;
        let col = ((x - self.offset_x) / self.cell_width).floor() as i64;
        (row, col)
    }

    /// World center of a cell
    pub fn to_world(&self, row: usize, col: usize) -> (f32, f32) {
        (
            self.offset_x + col as f32 * self.cell_width + self.cell_width / 2.0,
            row as f32 * self.cell_height + self.cell_height / 2.0,
        )
    }

    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.columns
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        self.is_valid(row, col).then(|| row * self.columns + col)
    }

    /// Place a wall, moving it to the cell center. Fails on an invalid or
    /// occupied cell and leaves the grid untouched.
    pub fn place(&mut self, mut wall: Wall, row: usize, col: usize) -> bool {
        let Some(idx) = self.index(row, col) else {
            return false;
        };
        if self.cells[idx].is_some() {
            return false;
        }

        let (x, y) = self.to_world(row, col);
        wall.x = x;
        wall.y = y;
        self.cells[idx] = Some(wall);
        true
    }

    pub fn remove(&mut self, row: usize, col: usize) -> Option<Wall> {
        let idx = self.index(row, col)?;
        self.cells[idx].take()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Wall> {
        let idx = self.index(row, col)?;
        self.cells[idx].as_ref()
    }

    pub fn is_empty_cell(&self, row: usize, col: usize) -> bool {
        self.index(row, col)
            .map(|idx| self.cells[idx].is_none())
            .unwrap_or(false)
    }

    /// `(row, col)` of every free cell, row-major
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(idx, _)| (idx / self.columns, idx % self.columns))
            .collect()
    }

    /// Occupied cells with their walls, row-major
    pub fn walls(&self) -> impl Iterator<Item = (usize, usize, &Wall)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            cell.as_ref()
                .map(|wall| (idx / self.columns, idx % self.columns, wall))
        })
    }

    /// Inclusive row/column window around two cells, clamped to the grid
    fn window(&self, a: (i64, i64), b: (i64, i64)) -> Option<(usize, usize, usize, usize)> {
        let min_row = a.0.min(b.0).saturating_sub(1).max(0);
        let max_row = a.0.max(b.0).saturating_add(1).min(self.rows as i64 - 1);
        let min_col = a.1.min(b.1).saturating_sub(1).max(0);
        let max_col = a.1.max(b.1).saturating_add(1).min(self.columns as i64 - 1);

        if min_row > max_row || min_col > max_col {
            return None;
        }
        Some((
            min_row as usize,
            max_row as usize,
            min_col as usize,
            max_col as usize,
        ))
    }

    /// Circle collision against the 3x3 neighborhood of the point's cell
    pub fn query_circle(&self, x: f32, y: f32, radius: f32) -> Option<&Wall> {
        let cell = self.to_cell(x, y);
        let (min_row, max_row, min_col, max_col) = self.window(cell, cell)?;

        for row in min_row..=max_row {
            for col in min_col..=max_col {
                if let Some(wall) = self.get(row, col) {
                    if wall.overlaps_circle(x, y, radius) {
                        return Some(wall);
                    }
                }
            }
        }
        None
    }

    /// Segment collision against every wall near either endpoint
    pub fn query_line(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
        let Some((min_row, max_row, min_col, max_col)) =
            self.window(self.to_cell(x1, y1), self.to_cell(x2, y2))
        else {
            return false;
        };

        for row in min_row..=max_row {
            for col in min_col..=max_col {
                if let Some(wall) = self.get(row, col) {
                    if wall.intersects_segment(x1, y1, x2, y2) {
                        return true;
                    }
                }
            }
        }
        false
    }

    pub fn layout(&self) -> GridLayout {
        GridLayout {
            walls: self
                .walls()
                .map(|(row, col, wall)| PlacedWall {
                    side: self.side,
                    row,
                    col,
                    width: wall.width,
                    height: wall.height,
                })
                .collect(),
        }
    }

    /// Place every wall of a layout that belongs to this side.
    /// Returns how many were newly placed.
    pub fn apply_layout(&mut self, layout: &GridLayout) -> usize {
        let side = self.side;
        let mut placed_count = 0;
        for placed in layout.walls.iter().filter(|placed| placed.side == side) {
            if self.place(Wall::new(placed.width, placed.height), placed.row, placed.col) {
                placed_count += 1;
            }
        }
        placed_count
    }
}

/// The pair of grids covering the arena
#[derive(Debug, Clone)]
pub struct Grids {
    pub left: Grid,
    pub right: Grid,
}

impl Grids {
    pub fn new(bounds: &Bounds) -> Self {
        Self {
            left: Grid::new(Side::Left, GRID_COLUMNS, GRID_ROWS, bounds),
            right: Grid::new(Side::Right, GRID_COLUMNS, GRID_ROWS, bounds),
        }
    }

    pub fn get(&self, side: Side) -> &Grid {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut Grid {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn place(&mut self, placed: &PlacedWall) -> bool {
        self.get_mut(placed.side)
            .place(Wall::new(placed.width, placed.height), placed.row, placed.col)
    }

    pub fn query_line(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
        self.left.query_line(x1, y1, x2, y2) || self.right.query_line(x1, y1, x2, y2)
    }

    /// Both grids' occupied cells in one layout
    pub fn layout(&self) -> GridLayout {
        let mut layout = self.left.layout();
        layout.walls.extend(self.right.layout().walls);
        layout
    }

    pub fn apply_layout(&mut self, layout: &GridLayout) -> usize {
        self.left.apply_layout(layout) + self.right.apply_layout(layout)
    }

    pub fn wall_count(&self) -> usize {
        self.left.walls().count() + self.right.walls().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right_grid() -> Grid {
        Grid::new(Side::Right, GRID_COLUMNS, GRID_ROWS, &Bounds::default())
    }

    #[test]
    fn cell_mapping_uses_side_offset() {
        let grid = right_grid();
        assert_eq!(grid.cell_size(), (100.0, 100.0));
        assert_eq!(grid.to_cell(650.0, 250.0), (2, 0));
        assert_eq!(grid.to_world(2, 0), (650.0, 250.0));
        // Points on the other half map to negative columns
        assert_eq!(grid.to_cell(550.0, 250.0), (2, -1));
    }

    #[test]
    fn place_moves_wall_to_cell_center() {
        let mut grid = right_grid();
        let wall = Wall {
            x: -999.0,
            y: 3.0,
            ..Wall::new(90.0, 90.0)
        };

        assert!(grid.place(wall, 3, 4));
        let placed = grid.get(3, 4).unwrap();
        assert_eq!((placed.x, placed.y), grid.to_world(3, 4));
    }

    #[test]
    fn place_into_all_valid_cells() {
        let mut grid = right_grid();
        for row in 0..grid.rows() {
            for col in 0..grid.columns() {
                assert!(grid.place(Wall::new(10.0, 10.0), row, col));
                let wall = grid.get(row, col).unwrap();
                assert_eq!((wall.x, wall.y), grid.to_world(row, col));
            }
        }
        assert!(grid.empty_cells().is_empty());
    }

    #[test]
    fn invalid_or_occupied_place_fails_without_change() {
        let mut grid = right_grid();
        assert!(!grid.place(Wall::new(90.0, 90.0), GRID_ROWS, 0));
        assert!(!grid.place(Wall::new(90.0, 90.0), 0, GRID_COLUMNS));
        assert_eq!(grid.walls().count(), 0);

        assert!(grid.place(Wall::new(90.0, 90.0), 1, 1));
        assert!(!grid.place(Wall::new(20.0, 20.0), 1, 1));
        assert_eq!(grid.get(1, 1).unwrap().width, 90.0);
        assert_eq!(grid.walls().count(), 1);
    }

    #[test]
    fn remove_returns_wall_once() {
        let mut grid = right_grid();
        grid.place(Wall::new(90.0, 90.0), 0, 0);
        assert!(grid.remove(0, 0).is_some());
        assert!(grid.remove(0, 0).is_none());
        assert!(grid.remove(99, 99).is_none());
    }

    #[test]
    fn circle_query_finds_neighbor_wall() {
        let mut grid = Grid::new(Side::Left, GRID_COLUMNS, GRID_ROWS, &Bounds::default());
        grid.place(Wall::new(90.0, 90.0), 2, 2); // spans 205..295 on both axes

        assert!(grid.query_circle(192.0, 250.0, 15.0).is_some());
        assert!(grid.query_circle(150.0, 250.0, 15.0).is_none());
        assert!(grid.query_circle(-500.0, -500.0, 15.0).is_none());
    }

    #[test]
    fn line_into_wall_center_intersects() {
        let mut grid = right_grid();
        grid.place(Wall::new(90.0, 90.0), 4, 2);
        let (cx, cy) = grid.to_world(4, 2);

        assert!(grid.query_line(cx - 120.0, cy, cx, cy));
        assert!(grid.query_line(cx, cy + 120.0, cx, cy));
        assert!(!grid.query_line(610.0, 10.0, 690.0, 10.0));
    }

    #[test]
    fn layout_round_trip_reproduces_cells() {
        let mut grid = right_grid();
        grid.place(Wall::new(90.0, 90.0), 0, 5);
        grid.place(Wall::new(90.0, 90.0), 7, 0);
        grid.place(Wall::new(45.0, 90.0), 3, 3);

        let layout = grid.layout();
        let json = serde_json::to_string(&layout).unwrap();
        let decoded: GridLayout = serde_json::from_str(&json).unwrap();

        let mut copy = right_grid();
        assert_eq!(copy.apply_layout(&decoded), 3);

        let cells = |g: &Grid| g.walls().map(|(r, c, w)| (r, c, w.width)).collect::<Vec<_>>();
        assert_eq!(cells(&grid), cells(&copy));
    }

    #[test]
    fn layout_for_other_side_is_ignored() {
        let mut grids = Grids::new(&Bounds::default());
        grids.left.place(Wall::new(90.0, 90.0), 1, 1);

        let mut right = right_grid();
        assert_eq!(right.apply_layout(&grids.layout()), 0);

        let mut copy = Grids::new(&Bounds::default());
        assert_eq!(copy.apply_layout(&grids.layout()), 1);
        assert!(copy.left.get(1, 1).is_some());
    }

    #[test]
    fn queries_far_outside_the_grid_find_nothing() {
        let mut grid = right_grid();
        grid.place(Wall::new(90.0, 90.0), 0, 0);

        assert!(grid.query_circle(f32::INFINITY, 50.0, 15.0).is_none());
        assert!(grid.query_circle(1e30, -1e30, 15.0).is_none());
        assert!(!grid.query_line(f32::NEG_INFINITY, 50.0, -1e30, 50.0));
        assert!(!grid.query_line(f32::NAN, f32::NAN, 1e30, 1e30));
    }
}
