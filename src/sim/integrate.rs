//! Per-tick kinematics for a single ball

use super::state::Ball;
use crate::consts::*;

/// Apply gravity, move, then apply drag. Records the new position to the trail.
#[inline]
pub fn integrate(ball: &mut Ball) {
    ball.vel.y += GRAVITY;
    ball.pos += ball.vel;
    ball.vel.x *= DRAG_X;
    ball.vel.y *= DRAG_Y;
    ball.record_trail();
}
