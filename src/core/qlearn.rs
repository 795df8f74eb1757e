//! Tabular Q-learning over the grid, plus the greedy rollout that turns a
//! learned table into a path.
//!
//! Illegal moves (wall or off-grid) are self-loops with the step penalty,
//! not rejected actions; the agent learns to avoid them instead of being
//! shielded from them. The table lives only for the duration of one run;
//! only the extracted path survives.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::events::RunEvent;
use crate::grid::{Action, Grid, Position};
use crate::prng::Prng;

const GOAL_REWARD: f32 = 100.0;
const STEP_REWARD: f32 = -1.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QConfig {
    pub episodes: usize,
    pub alpha: f32,
    pub gamma: f32,
    pub epsilon_start: f32,
    pub epsilon_decay: f32,
    pub epsilon_floor: f32,
    /// `None` scales with the grid: 3 * rows * cols.
    pub max_steps_per_episode: Option<usize>,
    pub progress_interval_episodes: usize,
    /// Fixing the seed makes training and the extracted path reproducible.
    pub seed: Option<u64>,
}

impl Default for QConfig {
    fn default() -> Self {
        Self {
            episodes: 200,
            alpha: 0.7,
            gamma: 0.95,
            epsilon_start: 0.9,
            epsilon_decay: 0.98,
            epsilon_floor: 0.1,
            max_steps_per_episode: None,
            progress_interval_episodes: 5,
            seed: None,
        }
    }
}

/// State-action value estimates, `(rows * cols) x 4`, all zeros at start.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: Vec<[f32; 4]>,
}

impl QTable {
    pub fn new(states: usize) -> Self {
        Self {
            values: vec![[0.0; 4]; states],
        }
    }

    pub fn get(&self, state: usize, action: Action) -> f32 {
        self.values[state][action.index()]
    }

    pub fn set(&mut self, state: usize, action: Action, value: f32) {
        self.values[state][action.index()] = value;
    }

    pub fn max_value(&self, state: usize) -> f32 {
        let row = &self.values[state];
        row.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Greedy action; the first index attaining the maximum wins ties, so
    /// an untrained row always answers `Up`.
    pub fn best_action(&self, state: usize) -> Action {
        let row = &self.values[state];
        let mut best = Action::ALL[0];
        let mut best_value = row[0];
        for &action in &Action::ALL[1..] {
            let value = row[action.index()];
            if value > best_value {
                best = action;
                best_value = value;
            }
        }
        best
    }
}

enum Phase {
    Train,
    Replay { path: Vec<Position>, next: usize },
    Done,
}

/// One training run: `episodes` episodes of epsilon-greedy TD(0), then a
/// greedy rollout replayed cell by cell.
///
/// Yields `TrainingProgress` after every `progress_interval_episodes`-th
/// episode (including episode 0); that emission is the sole suspension
/// point during training. Owns a copy of the grid like the search run, so
/// nothing leaks between runs.
pub struct QLearningRun {
    grid: Grid,
    cfg: QConfig,
    table: QTable,
    rng: Prng,
    epsilon: f32,
    episode: usize,
    max_steps: usize,
    explored: Vec<Position>,
    explored_seen: HashSet<Position>,
    phase: Phase,
}

impl QLearningRun {
    pub fn new(grid: &Grid, cfg: QConfig) -> Self {
        let grid = grid.clone();
        let mut cfg = cfg;
        cfg.progress_interval_episodes = cfg.progress_interval_episodes.max(1);
        let table = QTable::new(grid.state_count());
        let max_steps = cfg
            .max_steps_per_episode
            .unwrap_or(3 * grid.state_count());
        Self {
            table,
            rng: Prng::new(cfg.seed.unwrap_or(1)),
            epsilon: cfg.epsilon_start,
            episode: 0,
            max_steps,
            explored: Vec::new(),
            explored_seen: HashSet::new(),
            phase: Phase::Train,
            grid,
            cfg,
        }
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn config(&self) -> &QConfig {
        &self.cfg
    }

    /// Where the agent ends up after `action`: the target cell when it is
    /// in-bounds and open, otherwise the agent stays put.
    fn transition(&self, state: Position, action: Action) -> Position {
        match self.grid.step(state, action) {
            Some(next) if self.grid.is_open(next) => next,
            _ => state,
        }
    }

    fn run_episode(&mut self) {
        let end = self.grid.end();
        let mut state = self.grid.start();
        let mut steps = 0;

        while state != end && steps < self.max_steps {
            steps += 1;
            let s = self.grid.state_index(state);

            let action = if self.rng.next_f32_01() < self.epsilon {
                Action::ALL[self.rng.gen_range_usize(0, 4)]
            } else {
                self.table.best_action(s)
            };

            let next = self.transition(state, action);
            let reward = if next == end { GOAL_REWARD } else { STEP_REWARD };

            let old = self.table.get(s, action);
            let future = self.table.max_value(self.grid.state_index(next));
            self.table.set(
                s,
                action,
                old + self.cfg.alpha * (reward + self.cfg.gamma * future - old),
            );

            state = next;
            if self.explored_seen.insert(state) {
                self.explored.push(state);
            }
        }

        self.epsilon = (self.epsilon * self.cfg.epsilon_decay).max(self.cfg.epsilon_floor);
    }

    /// Greedy rollout from start. Stops at the end, on an illegal greedy
    /// move (the agent would not progress), or at the step cap. A cell is
    /// never appended twice even when the walk revisits it.
    fn extract_path(&self) -> Vec<Position> {
        let end = self.grid.end();
        let mut path = vec![self.grid.start()];
        let mut on_path: HashSet<Position> = path.iter().copied().collect();
        let mut state = self.grid.start();

        for _ in 0..2 * self.grid.state_count() {
            let action = self.table.best_action(self.grid.state_index(state));
            match self.grid.step(state, action) {
                Some(next) if self.grid.is_open(next) => {
                    state = next;
                    if on_path.insert(state) {
                        path.push(state);
                    }
                    if state == end {
                        break;
                    }
                }
                _ => break,
            }
        }
        path
    }

    fn train_step(&mut self) -> Option<RunEvent> {
        while self.episode < self.cfg.episodes {
            let episode = self.episode;
            self.run_episode();
            self.episode += 1;
            if episode % self.cfg.progress_interval_episodes == 0 {
                return Some(RunEvent::TrainingProgress {
                    episode,
                    explored: self.explored.clone(),
                });
            }
        }
        // Training exhausted without an emission due; fall through to
        // extraction.
        let path = self.extract_path();
        self.phase = Phase::Replay { path, next: 0 };
        None
    }
}

impl Iterator for QLearningRun {
    type Item = RunEvent;

    fn next(&mut self) -> Option<RunEvent> {
        loop {
            match &mut self.phase {
                Phase::Train => {
                    if let Some(event) = self.train_step() {
                        return Some(event);
                    }
                    // Phase advanced to Replay; loop around.
                }
                Phase::Replay { path, next } => {
                    if *next < path.len() {
                        let pos = path[*next];
                        *next += 1;
                        return Some(RunEvent::PathCell { pos });
                    }
                    let path = std::mem::take(path);
                    let complete = path.last() == Some(&self.grid.end());
                    self.phase = Phase::Done;
                    return Some(RunEvent::PathFound { path, complete });
                }
                Phase::Done => return None,
            }
        }
    }
}
