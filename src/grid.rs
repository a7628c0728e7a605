use crate::pathfinding::Position;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Occupancy state of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    Free,
    Blocked,
}

/// Fixed-size occupancy grid.
///
/// Cells are stored row-major (`id = x + y * cols`). Protected cells (the
/// start and goal of a simulation) can never be blocked, so they stay free
/// for the lifetime of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMap {
    pub cols: i32,
    pub rows: i32,
    cells: Vec<CellState>,
    protected: Vec<Position>,
    /// Revision number - incremented whenever a cell actually changes
    revision: u64,
}

impl GridMap {
    /// Create a new grid with every cell free
    pub fn new(cols: i32, rows: i32) -> Self {
        let cols = cols.max(0);
        let rows = rows.max(0);
        GridMap {
            cols,
            rows,
            cells: vec![CellState::Free; (cols * rows) as usize],
            protected: Vec::new(),
            revision: 0,
        }
    }

    /// Create a grid with specific blocked cells
    pub fn with_blocked(cols: i32, rows: i32, blocked: &[Position]) -> Self {
        let mut grid = Self::new(cols, rows);
        for &cell in blocked {
            grid.set_blocked(cell);
        }
        grid
    }

    pub fn in_bounds(&self, cell: Position) -> bool {
        cell.x >= 0 && cell.x < self.cols && cell.y >= 0 && cell.y < self.rows
    }

    fn index(&self, cell: Position) -> usize {
        (cell.x + cell.y * self.cols) as usize
    }

    /// Occupancy of `cell`; out of bounds reads as blocked
    pub fn state(&self, cell: Position) -> CellState {
        if !self.in_bounds(cell) {
            return CellState::Blocked;
        }
        self.cells[self.index(cell)]
    }

    pub fn is_free(&self, cell: Position) -> bool {
        self.state(cell) == CellState::Free
    }

    pub fn is_blocked(&self, cell: Position) -> bool {
        !self.is_free(cell)
    }

    /// Mark a cell as one that must always stay free. Clears it if needed.
    pub fn protect(&mut self, cell: Position) {
        if !self.in_bounds(cell) || self.protected.contains(&cell) {
            return;
        }
        self.set_free(cell);
        self.protected.push(cell);
    }

    pub fn is_protected(&self, cell: Position) -> bool {
        self.protected.contains(&cell)
    }

    pub fn protected_cells(&self) -> &[Position] {
        &self.protected
    }

    /// Block a cell. Returns true if the grid changed.
    ///
    /// No-op for cells already blocked, out of bounds, or protected.
    pub fn set_blocked(&mut self, cell: Position) -> bool {
        if !self.in_bounds(cell) || self.is_protected(cell) {
            return false;
        }
        self.set_state(cell, CellState::Blocked)
    }

    /// Free a cell. Returns true if the grid changed.
    pub fn set_free(&mut self, cell: Position) -> bool {
        if !self.in_bounds(cell) {
            return false;
        }
        self.set_state(cell, CellState::Free)
    }

    fn set_state(&mut self, cell: Position, value: CellState) -> bool {
        let id = self.index(cell);
        if self.cells[id] == value {
            return false;
        }
        self.cells[id] = value;
        self.revision += 1;
        true
    }

    /// Uniformly random free cell that is not in `excluding`.
    ///
    /// Returns `None` when every cell is blocked or excluded.
    pub fn random_free_cell<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        excluding: &[Position],
    ) -> Option<Position> {
        let candidates: Vec<Position> = self
            .free_cells()
            .filter(|cell| !excluding.contains(cell))
            .collect();
        candidates.choose(rng).copied()
    }

    /// Block up to `count` random free cells outside `excluding` and the
    /// protected set. Returns how many were placed.
    pub fn populate_random<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        count: usize,
        excluding: &[Position],
    ) -> usize {
        let candidates: Vec<Position> = self
            .free_cells()
            .filter(|cell| !excluding.contains(cell) && !self.is_protected(*cell))
            .collect();

        let mut placed = 0;
        for &cell in candidates.choose_multiple(rng, count) {
            if self.set_blocked(cell) {
                placed += 1;
            }
        }
        placed
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |y| (0..self.cols).map(move |x| Position::new(x, y)))
    }

    pub fn free_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells().filter(move |&cell| self.is_free(cell))
    }

    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == CellState::Blocked).count()
    }

    /// Get current grid revision number
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Occupancy snapshot, comparable across revisions
    pub fn occupancy(&self) -> &[CellState] {
        &self.cells
    }

    /// ASCII rendering: `#` blocked, `.` free.
    ///
    /// `overlay` may replace the symbol of any cell (agent, goal, path).
    pub fn render(&self, overlay: impl Fn(Position) -> Option<char>) -> String {
        let mut result = String::new();
        for y in 0..self.rows {
            for x in 0..self.cols {
                let pos = Position::new(x, y);
                let symbol = overlay(pos).unwrap_or(if self.is_blocked(pos) { '#' } else { '.' });
                result.push(symbol);
            }
            result.push('\n');
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn set_blocked_is_idempotent() {
        let mut grid = GridMap::new(4, 3);
        let cell = Position::new(2, 1);

        assert!(grid.set_blocked(cell));
        let snapshot = grid.clone();
        assert!(!grid.set_blocked(cell));
        assert_eq!(grid, snapshot);
        assert_eq!(grid.revision(), 1);

        assert!(grid.set_free(cell));
        assert!(!grid.set_free(cell));
        assert_eq!(grid.revision(), 2);
    }

    #[test]
    fn out_of_bounds_reads_blocked_and_ignores_writes() {
        let mut grid = GridMap::new(3, 3);
        assert!(grid.is_blocked(Position::new(-1, 0)));
        assert!(grid.is_blocked(Position::new(3, 0)));
        assert!(!grid.set_blocked(Position::new(0, 5)));
        assert_eq!(grid.blocked_count(), 0);
    }

    #[test]
    fn protected_cells_stay_free() {
        let mut grid = GridMap::with_blocked(3, 3, &[Position::new(1, 1)]);
        grid.protect(Position::new(1, 1));
        assert!(grid.is_free(Position::new(1, 1)));
        assert!(!grid.set_blocked(Position::new(1, 1)));
        assert!(grid.is_free(Position::new(1, 1)));
    }

    #[test]
    fn random_free_cell_respects_exclusions() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut grid = GridMap::new(2, 2);
        grid.set_blocked(Position::new(0, 0));
        grid.set_blocked(Position::new(1, 0));
        let excluded = [Position::new(0, 1)];

        for _ in 0..20 {
            assert_eq!(
                grid.random_free_cell(&mut rng, &excluded),
                Some(Position::new(1, 1))
            );
        }
    }

    #[test]
    fn random_free_cell_returns_none_on_saturated_grid() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = GridMap::new(2, 1);
        grid.set_blocked(Position::new(0, 0));
        assert_eq!(grid.random_free_cell(&mut rng, &[Position::new(1, 0)]), None);
    }

    #[test]
    fn populate_random_caps_at_available_cells() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = GridMap::new(3, 3);
        grid.protect(Position::new(0, 0));
        grid.protect(Position::new(2, 2));

        let placed = grid.populate_random(&mut rng, 100, &[]);
        assert_eq!(placed, 7);
        assert_eq!(grid.blocked_count(), 7);
        assert!(grid.is_free(Position::new(0, 0)));
        assert!(grid.is_free(Position::new(2, 2)));
    }

    #[test]
    fn render_marks_blocked_cells() {
        let grid = GridMap::with_blocked(3, 2, &[Position::new(1, 0), Position::new(2, 1)]);
        assert_eq!(grid.render(|_| None), ".#.\n..#\n");
    }

    #[test]
    fn render_overlay_takes_precedence() {
        let grid = GridMap::with_blocked(3, 1, &[Position::new(1, 0)]);
        let goal = Position::new(2, 0);
        let layout = grid.render(|pos| (pos == goal).then_some('G'));
        assert_eq!(layout, ".#G\n");
    }
}
