#[path = "core/astar.rs"]
pub mod astar;

#[path = "core/carve.rs"]
pub mod carve;

#[path = "core/events.rs"]
pub mod events;

#[path = "core/grid.rs"]
pub mod grid;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/qlearn.rs"]
pub mod qlearn;

#[path = "core/session.rs"]
pub mod session;

pub mod observer;
