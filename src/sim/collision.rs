//! Collision detection and response for pins and side walls
//!
//! Pin bounces are deliberately noisy: the rebound direction is the
//! center-to-center angle plus a small random jitter, which is what spreads
//! the balls into a binomial-looking pile.

use glam::Vec2;
use rand::Rng;

use super::layout::Pin;
use super::state::Ball;
use crate::consts::*;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the obstacle surface (if hit)
    pub point: Vec2,
    /// Unit vector from obstacle toward ball center
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between a ball and a pin
pub fn ball_pin_collision(ball_pos: Vec2, ball_radius: f32, pin: &Pin) -> CollisionResult {
    let delta = ball_pos - pin.pos;
    let distance = delta.length();
    let reach = ball_radius + pin.radius;

    if distance >= reach {
        return CollisionResult::miss();
    }

    // Coincident centers resolve along +x, as atan2(0, 0) does
    let normal = Vec2::from_angle(delta.y.atan2(delta.x));
    CollisionResult {
        hit: true,
        point: pin.pos + normal * pin.radius,
        normal,
        penetration: reach - distance,
    }
}

/// Push the ball out of the pin and give it a damped, jittered rebound
pub fn bounce_off_pin<R: Rng + ?Sized>(ball: &mut Ball, hit: &CollisionResult, rng: &mut R) {
    ball.pos += hit.normal * hit.penetration;

    let angle = hit.normal.y.atan2(hit.normal.x)
        + rng.random_range(-BOUNCE_ANGLE_JITTER..BOUNCE_ANGLE_JITTER);
    let speed = ball.vel.length() * BOUNCE_DAMPING;
    ball.vel = Vec2::from_angle(angle) * speed;

    // Keep balls from balancing in the channel between pins
    if ball.vel.x.abs() < MIN_HORIZONTAL_SPEED {
        ball.vel.x = if rng.random_bool(0.5) {
            STALL_KICK_SPEED
        } else {
            -STALL_KICK_SPEED
        };
    }

    ball.bounces += 1;
}

/// Test the ball against every pin in order, resolving each overlap independently.
///
/// Returns the number of pins hit this tick.
pub fn resolve_pin_collisions<R: Rng + ?Sized>(ball: &mut Ball, pins: &[Pin], rng: &mut R) -> u32 {
    let mut hits = 0;
    for pin in pins {
        let result = ball_pin_collision(ball.pos, ball.radius, pin);
        if result.hit {
            bounce_off_pin(ball, &result, rng);
            hits += 1;
        }
    }
    hits
}

/// Lossy bounce off the two vertical walls. Returns true if a wall was hit.
pub fn resolve_wall_collisions(ball: &mut Ball, left_wall: f32, right_wall: f32) -> bool {
    if ball.pos.x - ball.radius < left_wall {
        ball.pos.x = left_wall + ball.radius;
        ball.vel.x = ball.vel.x.abs() * WALL_RESTITUTION;
        return true;
    }
    if ball.pos.x + ball.radius > right_wall {
        ball.pos.x = right_wall - ball.radius;
        ball.vel.x = -ball.vel.x.abs() * WALL_RESTITUTION;
        return true;
    }
    false
}
