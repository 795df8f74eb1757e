use serde::{Deserialize, Serialize};

use crate::grid::{Cell, Position};
use crate::session::{Algorithm, Session};

/// A read-only snapshot of a session, shaped for transport.
///
/// Design intent:
/// - Snapshot consumers cannot mutate or steer a run.
/// - Snapshotting is on-demand and can allocate; the engines' hot loops
///   stay unchanged.
/// - Everything a renderer needs is here: the cell matrix, endpoints,
///   both engines' traces, the replay cursor, and the status line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub rows: usize,
    pub cols: usize,
    /// Row-major cell states.
    pub cells: Vec<Cell>,
    pub start: Position,
    pub end: Position,
    pub running: bool,
    pub algorithm: Option<String>,
    pub status: String,
    pub astar_explored: Vec<Position>,
    pub astar_path: Vec<Position>,
    pub q_explored: Vec<Position>,
    pub q_path: Vec<Position>,
    pub q_episode: Option<usize>,
    pub cursor: Option<Position>,
}

pub struct SessionAdapter<'a> {
    session: &'a Session,
}

impl<'a> SessionAdapter<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let s = self.session;
        let grid = s.grid();
        SessionSnapshot {
            rows: grid.rows(),
            cols: grid.cols(),
            cells: grid.cells().to_vec(),
            start: grid.start(),
            end: grid.end(),
            running: s.is_running(),
            algorithm: s.running_algorithm().map(|a| {
                match a {
                    Algorithm::AStar => "astar",
                    Algorithm::QLearning => "qlearning",
                }
                .to_string()
            }),
            status: s.status().to_string(),
            astar_explored: s.astar_explored().to_vec(),
            astar_path: s.astar_path().to_vec(),
            q_explored: s.q_explored().to_vec(),
            q_path: s.q_path().to_vec(),
            q_episode: s.q_episode(),
            cursor: s.cursor(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn snapshot_mirrors_the_session() {
        let mut session = Session::new(Grid::all_open(3, 4));
        session.start_astar();
        session.run_to_completion();

        let snap = SessionAdapter::new(&session).snapshot();
        assert_eq!(snap.rows, 3);
        assert_eq!(snap.cols, 4);
        assert_eq!(snap.cells.len(), 12);
        assert_eq!(snap.start, session.grid().start());
        assert_eq!(snap.end, session.grid().end());
        assert!(!snap.running);
        assert_eq!(snap.algorithm, None);
        assert_eq!(snap.astar_path, session.astar_path());
        assert_eq!(snap.status, session.status());
    }

    #[test]
    fn snapshot_reports_the_active_algorithm() {
        let mut session = Session::new(Grid::all_open(3, 3));
        session.start_astar();
        let snap = SessionAdapter::new(&session).snapshot();
        assert!(snap.running);
        assert_eq!(snap.algorithm.as_deref(), Some("astar"));
        session.run_to_completion();
    }
}
