//! CLI client for the `mazemindd` daemon.
//!
//! Examples:
//!   mazemind-cli status
//!   mazemind-cli show
//!   mazemind-cli new 21 21
//!   mazemind-cli wall 3 4
//!   mazemind-cli run astar
//!   mazemind-cli run q 500
//!   mazemind-cli delay 20
//!
//! By default it talks to 127.0.0.1:9877; override with `--addr host:port`.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::process;
use std::time::Duration;

use mazemind::grid::{Cell, Position};
use mazemind::observer::SessionSnapshot;
use serde::{Deserialize, Serialize};

// Protocol mirror of the daemon's request/response types; the snapshot
// payload itself comes from the library.
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

fn usage() -> ! {
    eprintln!("mazemind-cli (talks to mazemindd @ 127.0.0.1:9877 by default)");
    eprintln!("Usage: mazemind-cli [--addr host:port] <command> [args]\n");
    eprintln!("Commands:");
    eprintln!("  status                      One-line session summary");
    eprintln!("  show                        Render the maze and traces");
    eprintln!("  new <rows> <cols> [seed]    Carve a fresh maze");
    eprintln!("  wall <row> <col>            Toggle a wall cell");
    eprintln!("  start <row> <col>           Move the start");
    eprintln!("  end <row> <col>             Move the end");
    eprintln!("  run astar                   Start an A* run");
    eprintln!("  run q [episodes]            Start a Q-learning run");
    eprintln!("  clear                       Clear traces and paths");
    eprintln!("  delay <ms>                  Set the per-step delay");
    eprintln!("  shutdown                    Stop the daemon");
    process::exit(1);
}

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }

    let mut addr = "127.0.0.1:9877".to_string();
    if args.len() >= 2 && args[0] == "--addr" {
        addr = args[1].clone();
        args.drain(0..2);
    }

    if args.is_empty() {
        usage();
    }

    (addr, args)
}

fn send_request(addr: &str, req: &Request) -> Result<Response, String> {
    let mut stream = TcpStream::connect(addr).map_err(|e| format!("connect: {e}"))?;
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .map_err(|e| format!("set_read_timeout: {e}"))?;
    let mut reader = BufReader::new(stream.try_clone().map_err(|e| format!("clone: {e}"))?);

    let line = serde_json::to_string(req).map_err(|e| format!("serialize: {e}"))?;
    stream
        .write_all(line.as_bytes())
        .and_then(|_| stream.write_all(b"\n"))
        .map_err(|e| format!("send: {e}"))?;

    let mut resp_line = String::new();
    reader
        .read_line(&mut resp_line)
        .map_err(|e| format!("recv: {e}"))?;
    serde_json::from_str(&resp_line).map_err(|e| format!("parse response: {e}"))
}

fn print_status(s: &SessionSnapshot) {
    println!(
        "{}x{} start=({},{}) end=({},{}) running={} algorithm={}",
        s.rows,
        s.cols,
        s.start.row,
        s.start.col,
        s.end.row,
        s.end.col,
        s.running,
        s.algorithm.as_deref().unwrap_or("-"),
    );
    println!(
        "status: {} | astar: {} explored / {} path | q: {} explored / {} path{}",
        s.status,
        s.astar_explored.len(),
        s.astar_path.len(),
        s.q_explored.len(),
        s.q_path.len(),
        s.q_episode
            .map(|e| format!(" (episode {})", e + 1))
            .unwrap_or_default(),
    );
}

fn print_maze(s: &SessionSnapshot) {
    use std::collections::HashSet;
    let astar_path: HashSet<Position> = s.astar_path.iter().copied().collect();
    let q_path: HashSet<Position> = s.q_path.iter().copied().collect();
    let astar_explored: HashSet<Position> = s.astar_explored.iter().copied().collect();
    let q_explored: HashSet<Position> = s.q_explored.iter().copied().collect();

    for row in 0..s.rows {
        let mut line = String::with_capacity(s.cols);
        for col in 0..s.cols {
            let pos = Position::new(row, col);
            let ch = if s.cursor == Some(pos) {
                '@'
            } else if pos == s.start {
                'S'
            } else if pos == s.end {
                'E'
            } else if astar_path.contains(&pos) {
                'o'
            } else if q_path.contains(&pos) {
                'q'
            } else if astar_explored.contains(&pos) || q_explored.contains(&pos) {
                '.'
            } else if s.cells[row * s.cols + col] == Cell::Wall {
                '#'
            } else {
                ' '
            };
            line.push(ch);
        }
        println!("{}", line);
    }
    println!("{}", s.status);
}

fn parse_coord(args: &[String]) -> (usize, usize) {
    let make_error = |msg: &str| -> ! {
        eprintln!("{}", msg);
        process::exit(1);
    };
    if args.len() < 3 {
        usage();
    }
    let row = args[1]
        .parse()
        .unwrap_or_else(|_| make_error("row must be a number"));
    let col = args[2]
        .parse()
        .unwrap_or_else(|_| make_error("col must be a number"));
    (row, col)
}

fn main() {
    let (addr, args) = parse_args();
    let cmd = &args[0];

    let make_error = |msg: &str| -> ! {
        eprintln!("{}", msg);
        process::exit(1);
    };

    let mut render = false;
    let req = match cmd.as_str() {
        "status" => Request::GetState,
        "show" => {
            render = true;
            Request::GetState
        }
        "new" => {
            if args.len() < 3 {
                usage();
            }
            let rows = args[1]
                .parse()
                .unwrap_or_else(|_| make_error("rows must be a number"));
            let cols = args[2]
                .parse()
                .unwrap_or_else(|_| make_error("cols must be a number"));
            let seed = match args.get(3) {
                Some(raw) => Some(
                    raw.parse()
                        .unwrap_or_else(|_| make_error("seed must be a number")),
                ),
                None => None,
            };
            Request::NewMaze { rows, cols, seed }
        }
        "wall" => {
            let (row, col) = parse_coord(&args);
            Request::ToggleWall { row, col }
        }
        "start" => {
            let (row, col) = parse_coord(&args);
            Request::SetStart { row, col }
        }
        "end" => {
            let (row, col) = parse_coord(&args);
            Request::SetEnd { row, col }
        }
        "run" => {
            if args.len() < 2 {
                usage();
            }
            match args[1].as_str() {
                "astar" => Request::RunAstar,
                "q" => {
                    let episodes = match args.get(2) {
                        Some(raw) => Some(
                            raw.parse()
                                .unwrap_or_else(|_| make_error("episodes must be a number")),
                        ),
                        None => None,
                    };
                    Request::RunQLearning {
                        seed: None,
                        episodes,
                    }
                }
                _ => make_error("run takes 'astar' or 'q'"),
            }
        }
        "clear" => Request::ClearPaths,
        "delay" => {
            if args.len() < 2 {
                usage();
            }
            let ms: u32 = args[1]
                .parse()
                .unwrap_or_else(|_| make_error("delay must be a number of milliseconds"));
            Request::SetStepDelayMs { ms }
        }
        "shutdown" => Request::Shutdown,
        _ => usage(),
    };

    match send_request(&addr, &req) {
        Ok(Response::State(s)) => {
            if render {
                print_maze(&s);
            } else {
                print_status(&s);
            }
        }
        Ok(Response::Success { message }) => println!("{message}"),
        Ok(Response::Error { message }) => {
            eprintln!("Error: {message}");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed: {e}");
            process::exit(1);
        }
    }
}
