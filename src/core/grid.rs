use serde::{Deserialize, Serialize};

/// A cell coordinate. `row` grows downward, `col` grows rightward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Open,
    Wall,
}

/// The four orthogonal moves. Index order (up, down, left, right) is fixed:
/// it is the neighbor discovery order for search and the action index order
/// for the value table, so changing it changes tie-breaks everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    pub fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Down => 1,
            Action::Left => 2,
            Action::Right => 3,
        }
    }

    pub fn delta(self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }
}

/// Manhattan distance. Admissible and consistent for 4-directional
/// unit-cost movement.
pub fn manhattan(a: Position, b: Position) -> usize {
    a.row.abs_diff(b.row) + a.col.abs_diff(b.col)
}

/// The maze cell matrix plus the two endpoints.
///
/// Invariants maintained by every mutator: `start` and `end` are always
/// `Open`, and `start != end`. Mutations that would break them are
/// advisory no-ops, not errors.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    start: Position,
    end: Position,
}

impl Grid {
    /// All-wall grid with the two corner endpoints opened so the
    /// endpoint invariant holds from the first moment.
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(2);
        let cols = cols.max(2);
        let cells = vec![Cell::Wall; rows * cols];
        let mut grid = Self {
            rows,
            cols,
            cells,
            start: Position::new(0, 0),
            end: Position::new(rows - 1, cols - 1),
        };
        let (s, e) = (grid.start, grid.end);
        grid.force_open(s);
        grid.force_open(e);
        grid
    }

    /// All-open grid. Convenience for hosts and fixtures that edit walls in
    /// by hand instead of carving.
    pub fn all_open(rows: usize, cols: usize) -> Self {
        let mut grid = Self::new(rows, cols);
        grid.cells.fill(Cell::Open);
        grid
    }

    pub(crate) fn from_cells(rows: usize, cols: usize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), rows * cols);
        let mut grid = Self {
            rows,
            cols,
            cells,
            start: Position::new(0, 0),
            end: Position::new(rows - 1, cols - 1),
        };
        let (s, e) = (grid.start, grid.end);
        grid.force_open(s);
        grid.force_open(e);
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Row-major state index, `row * cols + col`. Shared with the value
    /// table so both engines agree on cell identity.
    pub fn state_index(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    pub fn state_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Out-of-bounds reads as blocked.
    pub fn is_open(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.cells[self.state_index(pos)] == Cell::Open
    }

    pub fn cell(&self, pos: Position) -> Cell {
        if self.in_bounds(pos) {
            self.cells[self.state_index(pos)]
        } else {
            Cell::Wall
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The in-bounds cell one step in `action`'s direction, open or not.
    /// `None` when the move leaves the grid.
    pub fn step(&self, pos: Position, action: Action) -> Option<Position> {
        let (dr, dc) = action.delta();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        let next = Position::new(row, col);
        self.in_bounds(next).then_some(next)
    }

    /// Open orthogonal neighbors in fixed (up, down, left, right) order.
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        Action::ALL
            .iter()
            .filter_map(|&a| self.step(pos, a))
            .filter(|&p| self.is_open(p))
            .collect()
    }

    /// Flip a cell between open and wall. No-op on the endpoints, so the
    /// grid never enters a state where start or end is blocked.
    pub fn toggle_wall(&mut self, pos: Position) -> bool {
        if !self.in_bounds(pos) || pos == self.start || pos == self.end {
            return false;
        }
        let idx = self.state_index(pos);
        self.cells[idx] = match self.cells[idx] {
            Cell::Open => Cell::Wall,
            Cell::Wall => Cell::Open,
        };
        true
    }

    /// Relocate the start. Succeeds only onto an open cell that is not the
    /// end; anything else is a no-op.
    pub fn set_start(&mut self, pos: Position) -> bool {
        if self.is_open(pos) && pos != self.end {
            self.start = pos;
            true
        } else {
            false
        }
    }

    /// Relocate the end. Same rules as `set_start`, mirrored.
    pub fn set_end(&mut self, pos: Position) -> bool {
        if self.is_open(pos) && pos != self.start {
            self.end = pos;
            true
        } else {
            false
        }
    }

    fn force_open(&mut self, pos: Position) {
        let idx = self.state_index(pos);
        self.cells[idx] = Cell::Open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_opens_only_the_endpoints() {
        let g = Grid::new(4, 5);
        assert!(g.is_open(Position::new(0, 0)));
        assert!(g.is_open(Position::new(3, 4)));
        let open = g.cells().iter().filter(|&&c| c == Cell::Open).count();
        assert_eq!(open, 2);
    }

    #[test]
    fn toggle_wall_is_a_noop_on_endpoints() {
        let mut g = Grid::all_open(4, 4);
        assert!(!g.toggle_wall(g.start()));
        assert!(!g.toggle_wall(g.end()));
        assert!(g.is_open(g.start()));
        assert!(g.is_open(g.end()));

        assert!(g.toggle_wall(Position::new(1, 1)));
        assert!(!g.is_open(Position::new(1, 1)));
        assert!(g.toggle_wall(Position::new(1, 1)));
        assert!(g.is_open(Position::new(1, 1)));
    }

    #[test]
    fn endpoint_moves_reject_walls_and_each_other() {
        let mut g = Grid::all_open(4, 4);
        g.toggle_wall(Position::new(2, 2));

        assert!(!g.set_start(Position::new(2, 2)));
        assert!(!g.set_start(g.end()));
        assert!(!g.set_end(g.start()));
        assert!(!g.set_start(Position::new(9, 0)));

        assert!(g.set_start(Position::new(1, 0)));
        assert_eq!(g.start(), Position::new(1, 0));
    }

    #[test]
    fn neighbors_come_in_up_down_left_right_order() {
        let g = Grid::all_open(3, 3);
        let n = g.neighbors(Position::new(1, 1));
        assert_eq!(
            n,
            vec![
                Position::new(0, 1),
                Position::new(2, 1),
                Position::new(1, 0),
                Position::new(1, 2),
            ]
        );

        // Corner cell: out-of-bounds directions drop out, order holds.
        let n = g.neighbors(Position::new(0, 0));
        assert_eq!(n, vec![Position::new(1, 0), Position::new(0, 1)]);
    }

    #[test]
    fn manhattan_distance() {
        assert_eq!(manhattan(Position::new(0, 0), Position::new(4, 4)), 8);
        assert_eq!(manhattan(Position::new(2, 3), Position::new(2, 3)), 0);
        assert_eq!(manhattan(Position::new(3, 1), Position::new(0, 2)), 4);
    }
}
