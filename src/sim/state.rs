//! Simulation state and core types
//!
//! Everything a host needs to render a frame lives in [`SimulationState`].

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::layout::Board;
use crate::consts::*;

/// Run control state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunPhase {
    /// Nothing dropped yet, waiting for start
    #[default]
    Idle,
    /// Spawning and simulating balls
    Running,
    /// Physics frozen
    Paused,
    /// Every requested ball has been binned or discarded
    Complete,
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    BallSpawned { id: u32 },
    BallBinned { id: u32, bin: usize },
    BallDiscarded { id: u32 },
    RunComplete,
}

/// A falling (or collected) ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// 0xRRGGBB from the palette
    pub color: u32,
    /// Pin collisions so far
    pub bounces: u32,
    /// Recent positions for rendering (oldest first)
    #[serde(skip)]
    pub trail: VecDeque<Vec2>,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, color: u32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            color,
            bounces: 0,
            trail: VecDeque::with_capacity(TRAIL_LENGTH + 1),
        }
    }

    /// Record current position to the trail, evicting the oldest entry when full
    pub fn record_trail(&mut self) {
        self.trail.push_back(self.pos);
        while self.trail.len() > TRAIL_LENGTH {
            self.trail.pop_front();
        }
    }
}

/// Complete simulation state, owned by the engine and read by the host between ticks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    /// Pins and bins (bins hold collected balls)
    pub board: Board,
    /// Balls still falling, in spawn order
    pub active: Vec<Ball>,
    pub phase: RunPhase,
    /// Balls spawned this run
    pub dropped_count: u32,
    /// Balls requested for this run
    pub total_balls: u32,
    /// Spawn pacing for this run (balls per second at 60 ticks/s)
    pub speed: u32,
    /// Balls that left the playfield without reaching a bin
    pub discarded_count: u32,
    /// Ticks since the last spawn
    pub spawn_timer: u32,
    /// Ticks simulated this run
    pub time_ticks: u64,
    /// Events from the most recent tick
    pub events: Vec<SimEvent>,
    next_id: u32,
}

impl SimulationState {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            active: Vec::new(),
            phase: RunPhase::Idle,
            dropped_count: 0,
            total_balls: 0,
            speed: 1,
            discarded_count: 0,
            spawn_timer: 0,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new ball ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Balls sitting in bins
    pub fn binned_count(&self) -> u32 {
        self.board.binned_count() as u32
    }

    /// Every dropped ball is accounted for exactly once
    pub fn is_conserved(&self) -> bool {
        self.dropped_count
            == self.active.len() as u32 + self.binned_count() + self.discarded_count
    }

    /// All requested balls dropped and none still falling
    pub fn run_finished(&self) -> bool {
        self.dropped_count == self.total_balls && self.active.is_empty()
    }

    /// Drop all transient run state, keeping board geometry
    pub fn clear_run(&mut self) {
        self.active.clear();
        self.board.clear_bins();
        self.dropped_count = 0;
        self.total_balls = 0;
        self.discarded_count = 0;
        self.spawn_timer = 0;
        self.time_ticks = 0;
        self.events.clear();
        self.next_id = 1;
    }
}
