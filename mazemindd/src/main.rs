//! Maze daemon - holds one editable maze session and paces algorithm
//! runs for UI clients.
//!
//! Clients speak newline-delimited JSON over TCP (127.0.0.1:9877). The
//! engines themselves never sleep; a background task advances the active
//! run one suspension step per tick, and the tick period is the "speed"
//! a client sets. Edits and run requests that arrive while a run is
//! active come back as errors at the protocol layer; the session
//! underneath treats them as advisory no-ops either way.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use mazemind::grid::Position;
use mazemind::observer::{SessionAdapter, SessionSnapshot};
use mazemind::qlearn::QConfig;
use mazemind::session::Session;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio::time;
use tracing::{error, info};

const LISTEN_ADDR: &str = "127.0.0.1:9877";

const DEFAULT_ROWS: usize = 21;
const DEFAULT_COLS: usize = 21;
const DEFAULT_STEP_DELAY_MS: u32 = 50;

// ═══════════════════════════════════════════════════════════════════════════
// Protocol Messages
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum Request {
    GetState,
    NewMaze {
        rows: usize,
        cols: usize,
        seed: Option<u64>,
    },
    ToggleWall {
        row: usize,
        col: usize,
    },
    SetStart {
        row: usize,
        col: usize,
    },
    SetEnd {
        row: usize,
        col: usize,
    },
    RunAstar,
    RunQLearning {
        seed: Option<u64>,
        episodes: Option<usize>,
    },
    ClearPaths,
    SetStepDelayMs {
        ms: u32,
    },
    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum Response {
    State(SessionSnapshot),
    Success { message: String },
    Error { message: String },
}

#[derive(Debug, Error)]
enum DaemonError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("protocol: {0}")]
    Protocol(#[from] serde_json::Error),
}

// ═══════════════════════════════════════════════════════════════════════════
// Daemon State
// ═══════════════════════════════════════════════════════════════════════════

struct DaemonState {
    session: Session,
    step_delay_ms: u32,
    frame: u64,
}

impl DaemonState {
    fn new() -> Self {
        Self {
            session: Session::with_generated(DEFAULT_ROWS, DEFAULT_COLS, Some(clock_seed())),
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
            frame: 0,
        }
    }

    /// One suspension step of the active run, if any.
    fn tick(&mut self) {
        if let Some(event) = self.session.tick() {
            self.frame += 1;
            if event.is_terminal() {
                info!("run finished: {}", self.session.status());
            }
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionAdapter::new(&self.session).snapshot()
    }

    fn busy(&self) -> Response {
        Response::Error {
            message: format!("busy: {}", self.session.status()),
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

// ═══════════════════════════════════════════════════════════════════════════
// Client Handler
// ═══════════════════════════════════════════════════════════════════════════

async fn handle_client(
    stream: TcpStream,
    state: Arc<RwLock<DaemonState>>,
) -> Result<(), DaemonError> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let request: Request = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                let resp = Response::Error {
                    message: format!("Invalid request: {}", e),
                };
                writer
                    .write_all(serde_json::to_string(&resp)?.as_bytes())
                    .await?;
                writer.write_all(b"\n").await?;
                continue;
            }
        };

        let response = match request {
            Request::GetState => {
                let s = state.read().await;
                Response::State(s.snapshot())
            }
            Request::NewMaze { rows, cols, seed } => {
                let mut s = state.write().await;
                let rows = rows.clamp(2, 101);
                let cols = cols.clamp(2, 101);
                let seed = seed.unwrap_or_else(clock_seed);
                if s.session.new_maze(rows, cols, Some(seed)) {
                    Response::Success {
                        message: format!("New {}x{} maze (seed {})", rows, cols, seed),
                    }
                } else {
                    s.busy()
                }
            }
            Request::ToggleWall { row, col } => {
                let mut s = state.write().await;
                if s.session.is_running() {
                    s.busy()
                } else if s.session.toggle_wall(Position::new(row, col)) {
                    Response::Success {
                        message: format!("Toggled ({}, {})", row, col),
                    }
                } else {
                    Response::Error {
                        message: format!("Cannot toggle ({}, {})", row, col),
                    }
                }
            }
            Request::SetStart { row, col } => {
                let mut s = state.write().await;
                if s.session.is_running() {
                    s.busy()
                } else if s.session.set_start(Position::new(row, col)) {
                    Response::Success {
                        message: format!("Start moved to ({}, {})", row, col),
                    }
                } else {
                    Response::Error {
                        message: format!("Cannot place start at ({}, {})", row, col),
                    }
                }
            }
            Request::SetEnd { row, col } => {
                let mut s = state.write().await;
                if s.session.is_running() {
                    s.busy()
                } else if s.session.set_end(Position::new(row, col)) {
                    Response::Success {
                        message: format!("End moved to ({}, {})", row, col),
                    }
                } else {
                    Response::Error {
                        message: format!("Cannot place end at ({}, {})", row, col),
                    }
                }
            }
            Request::RunAstar => {
                let mut s = state.write().await;
                if s.session.start_astar() {
                    info!("A* run started");
                    Response::Success {
                        message: "A* started".to_string(),
                    }
                } else {
                    s.busy()
                }
            }
            Request::RunQLearning { seed, episodes } => {
                let mut s = state.write().await;
                let mut cfg = QConfig {
                    seed: Some(seed.unwrap_or_else(clock_seed)),
                    ..QConfig::default()
                };
                if let Some(episodes) = episodes {
                    cfg.episodes = episodes.clamp(1, 10_000);
                }
                let episodes = cfg.episodes;
                if s.session.start_q_learning(cfg) {
                    info!("Q-learning run started ({} episodes)", episodes);
                    Response::Success {
                        message: format!("Q-learning started ({} episodes)", episodes),
                    }
                } else {
                    s.busy()
                }
            }
            Request::ClearPaths => {
                let mut s = state.write().await;
                if s.session.clear_paths() {
                    Response::Success {
                        message: "Paths cleared".to_string(),
                    }
                } else {
                    s.busy()
                }
            }
            Request::SetStepDelayMs { ms } => {
                let mut s = state.write().await;
                let clamped = ms.clamp(1, 60_000);
                s.step_delay_ms = clamped;
                info!("Step delay set to {} ms", clamped);
                Response::Success {
                    message: format!("Step delay set to {} ms", clamped),
                }
            }
            Request::Shutdown => {
                info!("Shutdown requested");
                tokio::spawn(async {
                    // Give the response a moment to flush before exiting.
                    time::sleep(Duration::from_millis(50)).await;
                    std::process::exit(0);
                });
                Response::Success {
                    message: "Shutting down".to_string(),
                }
            }
        };

        writer
            .write_all(serde_json::to_string(&response)?.as_bytes())
            .await?;
        writer.write_all(b"\n").await?;
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// Main
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    tracing_subscriber::fmt::init();

    let state = Arc::new(RwLock::new(DaemonState::new()));

    let listener = TcpListener::bind(LISTEN_ADDR).await?;
    info!("mazemind daemon listening on {}", LISTEN_ADDR);

    // Pacing task: one engine step per delay period. The delay is read
    // fresh each lap so speed changes apply mid-run.
    let state_clone = Arc::clone(&state);
    tokio::spawn(async move {
        loop {
            let delay_ms = {
                let s = state_clone.read().await;
                s.step_delay_ms
            };
            time::sleep(Duration::from_millis(delay_ms as u64)).await;

            let mut s = state_clone.write().await;
            s.tick();
        }
    });

    loop {
        let (stream, addr) = listener.accept().await?;
        info!("Client connected: {}", addr);
        let state_clone = Arc::clone(&state);

        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, state_clone).await {
                error!("Client handler error: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_parse_from_protocol_lines() {
        let req: Request =
            serde_json::from_str(r#"{"type":"NewMaze","rows":21,"cols":21,"seed":null}"#).unwrap();
        assert!(matches!(
            req,
            Request::NewMaze {
                rows: 21,
                cols: 21,
                seed: None
            }
        ));

        let req: Request = serde_json::from_str(r#"{"type":"ToggleWall","row":3,"col":4}"#).unwrap();
        assert!(matches!(req, Request::ToggleWall { row: 3, col: 4 }));

        let req: Request = serde_json::from_str(r#"{"type":"RunAstar"}"#).unwrap();
        assert!(matches!(req, Request::RunAstar));
    }

    #[test]
    fn ticking_an_idle_session_is_harmless() {
        let mut state = DaemonState::new();
        let frame = state.frame;
        state.tick();
        assert_eq!(state.frame, frame);
    }

    #[test]
    fn run_ticks_advance_frames_until_terminal() {
        let mut state = DaemonState::new();
        assert!(state.session.start_astar());
        while state.session.is_running() {
            state.tick();
        }
        assert!(state.frame > 0);
        assert!(!state.snapshot().running);
    }
}
