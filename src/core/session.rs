//! The explicit context a host drives: one grid, at most one active run,
//! and the latest traces/paths for display.
//!
//! The original surface this replaces kept all of this in process-wide
//! mutable state; here it is an owned value, so independent sessions can
//! coexist (tests, multi-instance hosts). While a run is active the
//! `running` gate turns every edit and every second run request into an
//! advisory no-op; the grid is effectively read-only until the run
//! reaches a terminal event.

use crate::astar::AStarRun;
use crate::carve;
use crate::events::RunEvent;
use crate::grid::{Grid, Position};
use crate::qlearn::{QConfig, QLearningRun};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    AStar,
    QLearning,
}

enum ActiveRun {
    AStar(AStarRun),
    QLearning(QLearningRun),
}

impl ActiveRun {
    fn algorithm(&self) -> Algorithm {
        match self {
            ActiveRun::AStar(_) => Algorithm::AStar,
            ActiveRun::QLearning(_) => Algorithm::QLearning,
        }
    }

    fn next_event(&mut self) -> Option<RunEvent> {
        match self {
            ActiveRun::AStar(run) => run.next(),
            ActiveRun::QLearning(run) => run.next(),
        }
    }
}

pub struct Session {
    grid: Grid,
    active: Option<ActiveRun>,
    astar_explored: Vec<Position>,
    astar_path: Vec<Position>,
    q_explored: Vec<Position>,
    q_path: Vec<Position>,
    q_episode: Option<usize>,
    cursor: Option<Position>,
    status: String,
}

impl Session {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            active: None,
            astar_explored: Vec::new(),
            astar_path: Vec::new(),
            q_explored: Vec::new(),
            q_path: Vec::new(),
            q_episode: None,
            cursor: None,
            status: "Ready".to_string(),
        }
    }

    pub fn with_generated(rows: usize, cols: usize, seed: Option<u64>) -> Self {
        Self::new(carve::generate(rows, cols, seed))
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn running_algorithm(&self) -> Option<Algorithm> {
        self.active.as_ref().map(ActiveRun::algorithm)
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn astar_explored(&self) -> &[Position] {
        &self.astar_explored
    }

    pub fn astar_path(&self) -> &[Position] {
        &self.astar_path
    }

    pub fn q_explored(&self) -> &[Position] {
        &self.q_explored
    }

    pub fn q_path(&self) -> &[Position] {
        &self.q_path
    }

    /// Zero-based index of the last reported training episode.
    pub fn q_episode(&self) -> Option<usize> {
        self.q_episode
    }

    /// Position of the replay cursor while a found path is animated.
    pub fn cursor(&self) -> Option<Position> {
        self.cursor
    }

    /// Edits are advisory: rejected while a run is active, and a change
    /// that lands also clears stale traces so the display never shows a
    /// path through a wall that no longer matches the grid.
    pub fn toggle_wall(&mut self, pos: Position) -> bool {
        if self.is_running() {
            return false;
        }
        let changed = self.grid.toggle_wall(pos);
        if changed {
            self.reset_traces("Ready");
        }
        changed
    }

    pub fn set_start(&mut self, pos: Position) -> bool {
        if self.is_running() {
            return false;
        }
        let changed = self.grid.set_start(pos);
        if changed {
            self.reset_traces("Ready");
        }
        changed
    }

    pub fn set_end(&mut self, pos: Position) -> bool {
        if self.is_running() {
            return false;
        }
        let changed = self.grid.set_end(pos);
        if changed {
            self.reset_traces("Ready");
        }
        changed
    }

    /// Replace the maze wholesale; endpoints reset to the corners.
    pub fn new_maze(&mut self, rows: usize, cols: usize, seed: Option<u64>) -> bool {
        if self.is_running() {
            return false;
        }
        self.grid = carve::generate(rows, cols, seed);
        self.reset_traces("New maze generated");
        true
    }

    pub fn clear_paths(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.reset_traces("Paths cleared");
        true
    }

    /// Begin a search run. Rejected while another run is active.
    pub fn start_astar(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.reset_traces("Running A*...");
        self.active = Some(ActiveRun::AStar(AStarRun::new(&self.grid)));
        true
    }

    /// Begin a training run. Rejected while another run is active.
    pub fn start_q_learning(&mut self, cfg: QConfig) -> bool {
        if self.is_running() {
            return false;
        }
        self.reset_traces("Training...");
        self.active = Some(ActiveRun::QLearning(QLearningRun::new(&self.grid, cfg)));
        true
    }

    /// Advance the active run by one suspension step, folding the yielded
    /// event into the stored traces. Returns the event so hosts can
    /// forward it; `None` means no run is active (the previous tick
    /// delivered the terminal event and cleared the gate).
    pub fn tick(&mut self) -> Option<RunEvent> {
        let run = self.active.as_mut()?;
        let algorithm = run.algorithm();
        let event = match run.next_event() {
            Some(event) => event,
            None => {
                self.active = None;
                return None;
            }
        };
        self.apply(algorithm, &event);
        if event.is_terminal() {
            self.active = None;
        }
        Some(event)
    }

    /// Drain the active run. Hosts that pace rendering call `tick`
    /// instead.
    pub fn run_to_completion(&mut self) {
        while self.tick().is_some() {}
    }

    fn apply(&mut self, algorithm: Algorithm, event: &RunEvent) {
        match event {
            RunEvent::Explored { pos } => {
                self.astar_explored.push(*pos);
            }
            RunEvent::TrainingProgress { episode, explored } => {
                self.q_explored = explored.clone();
                self.q_episode = Some(*episode);
                self.status = format!(
                    "Training episode {}/{}",
                    episode + 1,
                    self.q_config_episodes()
                );
            }
            RunEvent::PathCell { pos } => {
                self.cursor = Some(*pos);
                match algorithm {
                    Algorithm::AStar => self.astar_path.push(*pos),
                    Algorithm::QLearning => self.q_path.push(*pos),
                }
            }
            RunEvent::PathFound { path, complete } => {
                self.cursor = None;
                self.status = match (algorithm, complete) {
                    (Algorithm::AStar, _) => {
                        format!("A* found a path ({} cells)", path.len())
                    }
                    (Algorithm::QLearning, true) => {
                        format!("Q-learning path found ({} cells)", path.len())
                    }
                    (Algorithm::QLearning, false) => {
                        format!("Q-learning path incomplete ({} cells)", path.len())
                    }
                };
            }
            RunEvent::NoPath => {
                self.cursor = None;
                self.status = "A* found no path".to_string();
            }
        }
    }

    fn q_config_episodes(&self) -> usize {
        match &self.active {
            Some(ActiveRun::QLearning(run)) => run.config().episodes,
            _ => 0,
        }
    }

    fn reset_traces(&mut self, status: &str) {
        self.astar_explored.clear();
        self.astar_path.clear();
        self.q_explored.clear();
        self.q_path.clear();
        self.q_episode = None;
        self.cursor = None;
        self.status = status.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_are_rejected_while_a_run_is_active() {
        let mut session = Session::new(Grid::all_open(4, 4));
        assert!(session.start_astar());
        assert!(session.is_running());

        assert!(!session.toggle_wall(Position::new(1, 1)));
        assert!(!session.set_start(Position::new(0, 1)));
        assert!(!session.set_end(Position::new(1, 0)));
        assert!(!session.clear_paths());
        assert!(!session.new_maze(5, 5, Some(1)));
        assert!(!session.start_astar());
        assert!(!session.start_q_learning(QConfig::default()));

        session.run_to_completion();
        assert!(!session.is_running());
        assert!(session.toggle_wall(Position::new(1, 1)));
    }

    #[test]
    fn astar_run_fills_traces_and_clears_the_gate() {
        let mut session = Session::new(Grid::all_open(4, 4));
        session.start_astar();
        session.run_to_completion();

        assert!(!session.is_running());
        assert!(!session.astar_explored().is_empty());
        assert_eq!(session.astar_path().first(), Some(&Position::new(0, 0)));
        assert_eq!(session.astar_path().last(), Some(&Position::new(3, 3)));
        assert!(session.q_path().is_empty());
        assert!(session.cursor().is_none());
        assert_eq!(session.status(), "A* found a path (7 cells)");
    }

    #[test]
    fn q_run_reports_progress_then_a_path() {
        let mut session = Session::new(Grid::all_open(3, 3));
        let cfg = QConfig {
            seed: Some(9),
            ..QConfig::default()
        };
        session.start_q_learning(cfg);
        session.run_to_completion();

        assert!(!session.is_running());
        assert_eq!(session.q_episode(), Some(195));
        assert!(!session.q_explored().is_empty());
        assert_eq!(session.q_path().first(), Some(&Position::new(0, 0)));
        assert!(session.astar_path().is_empty());
    }

    #[test]
    fn starting_a_run_clears_the_other_engines_traces() {
        let mut session = Session::new(Grid::all_open(3, 3));
        session.start_astar();
        session.run_to_completion();
        assert!(!session.astar_path().is_empty());

        session.start_q_learning(QConfig {
            seed: Some(2),
            ..QConfig::default()
        });
        assert!(session.astar_path().is_empty());
        assert!(session.astar_explored().is_empty());
        session.run_to_completion();
        assert!(!session.q_path().is_empty());
    }

    #[test]
    fn successful_edits_clear_stale_traces() {
        let mut session = Session::new(Grid::all_open(4, 4));
        session.start_astar();
        session.run_to_completion();
        assert!(!session.astar_path().is_empty());

        // A rejected edit (endpoint toggle) leaves traces alone.
        let start = session.grid().start();
        assert!(!session.toggle_wall(start));
        assert!(!session.astar_path().is_empty());

        assert!(session.toggle_wall(Position::new(2, 2)));
        assert!(session.astar_path().is_empty());
        assert_eq!(session.status(), "Ready");
    }

    #[test]
    fn new_maze_resets_endpoints_to_the_corners() {
        let mut session = Session::new(Grid::all_open(4, 4));
        session.set_start(Position::new(1, 1));
        assert!(session.new_maze(7, 7, Some(3)));
        assert_eq!(session.grid().start(), Position::new(0, 0));
        assert_eq!(session.grid().end(), Position::new(6, 6));
        assert_eq!(session.status(), "New maze generated");
    }

    #[test]
    fn ticks_after_completion_report_idle() {
        let mut session = Session::new(Grid::all_open(3, 3));
        session.start_astar();
        session.run_to_completion();
        assert!(session.tick().is_none());
    }
}
