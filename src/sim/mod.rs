//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - One fixed step per host frame
//! - Seeded RNG only
//! - Stable iteration order (spawn order for balls, lattice order for pins)
//! - No rendering or platform dependencies

pub mod classify;
pub mod collision;
pub mod integrate;
pub mod layout;
pub mod spawn;
pub mod state;
pub mod tick;

pub use classify::{Classification, bin_index, classify};
pub use collision::{CollisionResult, ball_pin_collision, resolve_pin_collisions, resolve_wall_collisions};
pub use integrate::integrate;
pub use layout::{Bin, Board, BoardConfig, LayoutError, Pin};
pub use spawn::spawn_ball;
pub use state::{Ball, RunPhase, SimEvent, SimulationState};
pub use tick::{SimulationEngine, spawn_interval, step};
