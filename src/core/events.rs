//! The emission contract between the engines and their host.
//!
//! Engines never render or sleep; they yield one `RunEvent` per discrete
//! unit of work (one node popped, one training interval, one path cell)
//! and the host consumes the stream at its own pace.

use serde::{Deserialize, Serialize};

use crate::grid::Position;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunEvent {
    /// A cell was expanded, in discovery order.
    Explored { pos: Position },
    /// Cumulative exploration after a training interval. `episode` is the
    /// zero-based index of the episode that just finished.
    TrainingProgress {
        episode: usize,
        explored: Vec<Position>,
    },
    /// One cell of the final path, in path order. Drives host animation.
    PathCell { pos: Position },
    /// Terminal: a path was produced. `complete` is false when a greedy
    /// rollout stopped before reaching the end; callers must check it
    /// rather than assume the last cell is the end.
    PathFound { path: Vec<Position>, complete: bool },
    /// Terminal: the frontier emptied without reaching the end.
    NoPath,
}

impl RunEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunEvent::PathFound { .. } | RunEvent::NoPath)
    }
}

/// Callback form of the same contract. All methods default to no-ops so a
/// host implements only what it renders.
pub trait RunObserver {
    fn on_explore(&mut self, _pos: Position) {}
    fn on_training_progress(&mut self, _episode: usize, _explored: &[Position]) {}
    fn on_animate_step(&mut self, _pos: Position) {}
    fn on_path_found(&mut self, _path: &[Position], _complete: bool) {}
    fn on_no_path(&mut self) {}
}

/// Route one event to the matching observer callback.
pub fn dispatch(event: &RunEvent, observer: &mut impl RunObserver) {
    match event {
        RunEvent::Explored { pos } => observer.on_explore(*pos),
        RunEvent::TrainingProgress { episode, explored } => {
            observer.on_training_progress(*episode, explored)
        }
        RunEvent::PathCell { pos } => observer.on_animate_step(*pos),
        RunEvent::PathFound { path, complete } => observer.on_path_found(path, *complete),
        RunEvent::NoPath => observer.on_no_path(),
    }
}

/// Drain a run into an observer. Convenience for hosts that do not pace.
pub fn drive(run: impl Iterator<Item = RunEvent>, observer: &mut impl RunObserver) {
    for event in run {
        dispatch(&event, observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counts {
        explored: usize,
        progress: usize,
        steps: usize,
        found: Option<bool>,
        no_path: bool,
    }

    impl RunObserver for Counts {
        fn on_explore(&mut self, _pos: Position) {
            self.explored += 1;
        }
        fn on_training_progress(&mut self, _episode: usize, _explored: &[Position]) {
            self.progress += 1;
        }
        fn on_animate_step(&mut self, _pos: Position) {
            self.steps += 1;
        }
        fn on_path_found(&mut self, _path: &[Position], complete: bool) {
            self.found = Some(complete);
        }
        fn on_no_path(&mut self) {
            self.no_path = true;
        }
    }

    #[test]
    fn dispatch_routes_every_variant() {
        let p = Position::new(1, 2);
        let events = [
            RunEvent::Explored { pos: p },
            RunEvent::TrainingProgress {
                episode: 0,
                explored: vec![p],
            },
            RunEvent::PathCell { pos: p },
            RunEvent::PathFound {
                path: vec![p],
                complete: true,
            },
            RunEvent::NoPath,
        ];
        let mut counts = Counts::default();
        drive(events.into_iter(), &mut counts);
        assert_eq!(counts.explored, 1);
        assert_eq!(counts.progress, 1);
        assert_eq!(counts.steps, 1);
        assert_eq!(counts.found, Some(true));
        assert!(counts.no_path);
    }

    #[test]
    fn only_results_are_terminal() {
        assert!(RunEvent::NoPath.is_terminal());
        assert!(RunEvent::PathFound {
            path: vec![],
            complete: false
        }
        .is_terminal());
        assert!(!RunEvent::Explored {
            pos: Position::new(0, 0)
        }
        .is_terminal());
    }
}
