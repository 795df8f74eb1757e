use std::time::{SystemTime, UNIX_EPOCH};

use mazemind::grid::{Cell, Grid, Position};
use mazemind::qlearn::QConfig;
use mazemind::session::Session;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h" || args[1] == "help") {
        print_help();
        return;
    }

    let rows: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(21);
    let cols: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(21);
    let seed: u64 = args
        .get(3)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(clock_seed);

    // Side-by-side demo:
    // - carve one maze
    // - let A* search it to optimality
    // - train a value table on the same maze and extract its greedy path
    // Both engines talk only through the event seam; all rendering here is
    // host code reading session state between runs.

    println!("maze {}x{} (seed {})", rows, cols, seed);
    let mut session = Session::with_generated(rows, cols, Some(seed));

    session.start_astar();
    session.run_to_completion();
    println!("\n== A* ==");
    print_grid(
        session.grid(),
        session.astar_explored(),
        session.astar_path(),
    );
    println!(
        "{} (explored {} cells)",
        session.status(),
        session.astar_explored().len()
    );
    let astar_len = session.astar_path().len();

    let cfg = QConfig {
        seed: Some(seed ^ 0x5DEECE66D),
        ..QConfig::default()
    };
    let episodes = cfg.episodes;
    session.start_q_learning(cfg);
    session.run_to_completion();
    println!("\n== Q-learning ({} episodes) ==", episodes);
    print_grid(session.grid(), session.q_explored(), session.q_path());
    println!(
        "{} (visited {} distinct cells during training)",
        session.status(),
        session.q_explored().len()
    );

    let q_len = session.q_path().len();
    let q_complete = session.q_path().last() == Some(&session.grid().end());
    println!();
    match (astar_len, q_complete) {
        (0, _) => println!("summary: no path exists for this maze"),
        (_, false) => println!(
            "summary: A* path {} cells; greedy policy stalled after {} cells",
            astar_len, q_len
        ),
        (_, true) if q_len == astar_len => {
            println!("summary: both engines agree on {} cells", astar_len)
        }
        (_, true) => println!(
            "summary: A* path {} cells, learned path {} cells",
            astar_len, q_len
        ),
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

/// Plain-character rendering: walls '#', explored '.', path 'o', start
/// 'S', end 'E'.
fn print_grid(grid: &Grid, explored: &[Position], path: &[Position]) {
    use std::collections::HashSet;
    let explored: HashSet<Position> = explored.iter().copied().collect();
    let path: HashSet<Position> = path.iter().copied().collect();

    for row in 0..grid.rows() {
        let mut line = String::with_capacity(grid.cols());
        for col in 0..grid.cols() {
            let pos = Position::new(row, col);
            let ch = if pos == grid.start() {
                'S'
            } else if pos == grid.end() {
                'E'
            } else if path.contains(&pos) {
                'o'
            } else if explored.contains(&pos) {
                '.'
            } else if grid.cell(pos) == Cell::Wall {
                '#'
            } else {
                ' '
            };
            line.push(ch);
        }
        println!("{}", line);
    }
}

fn print_help() {
    println!("mazemind (maze carving + A* vs Q-learning comparison)");
    println!("usage:");
    println!("  cargo run [-- ROWS COLS [SEED]]");
    println!("  cargo run -- --help");
    println!();
    println!("Odd ROWS/COLS keep the far corner on the carve lattice;");
    println!("even sizes can leave it sealed until you edit walls.");
}
