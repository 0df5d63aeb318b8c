//! Ball creation at the top of the board

use rand::Rng;

use super::state::{Ball, SimEvent, SimulationState};
use crate::consts::*;

/// Drop a new ball at the spawn point with jittered x and a random palette color.
///
/// Counts the ball as dropped and returns its ID.
pub fn spawn_ball<R: Rng + ?Sized>(state: &mut SimulationState, rng: &mut R) -> u32 {
    let mut pos = state.board.spawn_point();
    pos.x += rng.random_range(-SPAWN_JITTER..SPAWN_JITTER);
    let color = PALETTE[rng.random_range(0..PALETTE.len())];

    let id = state.next_entity_id();
    state.active.push(Ball::new(id, pos, color));
    state.dropped_count += 1;
    state.events.push(SimEvent::BallSpawned { id });

    log::debug!("Spawned ball {} at x={:.1}", id, pos.x);
    id
}
