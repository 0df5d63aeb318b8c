//! Fixed-step simulation tick and run control
//!
//! The host calls [`SimulationEngine::tick`] once per animation frame. All
//! randomness comes from the engine's own generator, so a run is fully
//! reproducible from its seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::classify::{Classification, classify};
use super::collision::{resolve_pin_collisions, resolve_wall_collisions};
use super::integrate::integrate;
use super::layout::{Bin, Board, Pin};
use super::spawn::spawn_ball;
use super::state::{Ball, RunPhase, SimEvent, SimulationState};
use crate::consts::TICKS_PER_SECOND;
use crate::settings::{Settings, SettingsError};

/// Ticks between spawns for a pacing speed (fractional)
#[inline]
pub fn spawn_interval(speed: u32) -> f32 {
    TICKS_PER_SECOND / speed.max(1) as f32
}

/// Advance a running simulation by one step: pace spawns, then move, collide
/// and classify every active ball.
pub fn step<R: Rng + ?Sized>(state: &mut SimulationState, rng: &mut R) {
    state.time_ticks += 1;

    if state.dropped_count < state.total_balls {
        state.spawn_timer += 1;
        if state.spawn_timer as f32 >= spawn_interval(state.speed) {
            spawn_ball(state, rng);
            state.spawn_timer = 0;
        }
    }

    // Balls move to their destination by value, so removal never disturbs iteration
    let falling = std::mem::take(&mut state.active);
    let mut still_falling = Vec::with_capacity(falling.len());
    for mut ball in falling {
        integrate(&mut ball);
        resolve_pin_collisions(&mut ball, &state.board.pins, rng);
        resolve_wall_collisions(&mut ball, state.board.left_wall, state.board.right_wall);

        match classify(&ball, &state.board) {
            Classification::Falling => still_falling.push(ball),
            Classification::Binned(bin) => {
                log::debug!(
                    "Ball {} -> bin {} after {} bounces",
                    ball.id,
                    bin,
                    ball.bounces
                );
                state.events.push(SimEvent::BallBinned { id: ball.id, bin });
                state.board.bins[bin].balls.push(ball);
            }
            Classification::Discarded => {
                log::warn!("Ball {} left the board at x={:.1}", ball.id, ball.pos.x);
                state.events.push(SimEvent::BallDiscarded { id: ball.id });
                state.discarded_count += 1;
            }
        }
    }
    state.active = still_falling;
}

/// Owns the simulation state and drives the run state machine
#[derive(Debug, Clone)]
pub struct SimulationEngine<R = Pcg32> {
    state: SimulationState,
    rng: R,
    /// Ball count for the next run
    ball_count: u32,
    /// Speed for the next run
    speed: u32,
}

impl SimulationEngine<Pcg32> {
    /// Engine with a seeded PCG generator
    pub fn new(board: Board, seed: u64) -> Self {
        Self::with_rng(board, Pcg32::seed_from_u64(seed))
    }

    /// Validate settings and build a configured engine
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let board = Board::new(settings.board.clone())?;
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("Engine seeded with {}", seed);

        let mut engine = Self::new(board, seed);
        engine.configure(settings.ball_count, settings.speed);
        Ok(engine)
    }
}

impl<R: Rng> SimulationEngine<R> {
    /// Engine driven by a caller-supplied generator
    pub fn with_rng(board: Board, rng: R) -> Self {
        Self {
            state: SimulationState::new(board),
            rng,
            ball_count: 0,
            speed: 1,
        }
    }

    /// Set run parameters; they take effect on the next `start`
    pub fn configure(&mut self, ball_count: u32, speed: u32) {
        self.ball_count = ball_count;
        self.speed = speed;
    }

    /// Begin a run. Ignored while a run is in progress.
    pub fn start(&mut self) {
        match self.state.phase {
            RunPhase::Running | RunPhase::Paused => return,
            RunPhase::Idle | RunPhase::Complete => {}
        }

        self.state.clear_run();
        self.state.total_balls = self.ball_count;
        self.state.speed = self.speed;
        self.state.phase = RunPhase::Running;
        log::info!(
            "Run started: {} balls at speed {}",
            self.ball_count,
            self.speed
        );

        self.check_complete();
    }

    /// Freeze physics. Only valid while running.
    pub fn pause(&mut self) {
        if self.state.phase == RunPhase::Running {
            self.state.phase = RunPhase::Paused;
            log::info!("Paused at tick {}", self.state.time_ticks);
        }
    }

    /// Unfreeze physics. Only valid while paused.
    pub fn resume(&mut self) {
        if self.state.phase == RunPhase::Paused {
            self.state.phase = RunPhase::Running;
            log::info!("Resumed at tick {}", self.state.time_ticks);
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state.phase {
            RunPhase::Running => self.pause(),
            RunPhase::Paused => self.resume(),
            RunPhase::Idle | RunPhase::Complete => {}
        }
    }

    /// Discard the run and return to idle
    pub fn reset(&mut self) {
        self.state.clear_run();
        self.state.phase = RunPhase::Idle;
        log::info!("Simulation reset");
    }

    /// Advance by one frame. Does nothing unless running.
    pub fn tick(&mut self) {
        if self.state.phase != RunPhase::Running {
            return;
        }

        self.state.events.clear();
        step(&mut self.state, &mut self.rng);
        self.check_complete();
    }

    fn check_complete(&mut self) {
        if self.state.phase == RunPhase::Running && self.state.run_finished() {
            self.state.phase = RunPhase::Complete;
            self.state.events.push(SimEvent::RunComplete);
            log::info!(
                "Run complete after {} ticks: {} binned, {} discarded",
                self.state.time_ticks,
                self.state.binned_count(),
                self.state.discarded_count
            );
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn phase(&self) -> RunPhase {
        self.state.phase
    }

    pub fn is_complete(&self) -> bool {
        self.state.phase == RunPhase::Complete
    }

    pub fn pins(&self) -> &[Pin] {
        &self.state.board.pins
    }

    pub fn bins(&self) -> &[Bin] {
        &self.state.board.bins
    }

    pub fn active(&self) -> &[Ball] {
        &self.state.active
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.state.events
    }

    pub fn dropped_count(&self) -> u32 {
        self.state.dropped_count
    }

    pub fn total_balls(&self) -> u32 {
        self.state.total_balls
    }

    pub fn discarded_count(&self) -> u32 {
        self.state.discarded_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::classify::bin_index;
    use crate::sim::layout::BoardConfig;
    use proptest::prelude::*;

    const MAX_TICKS: u64 = 50_000;

    fn engine(rows: u32, seed: u64) -> SimulationEngine {
        let board = Board::new(BoardConfig {
            rows,
            ..Default::default()
        })
        .unwrap();
        SimulationEngine::new(board, seed)
    }

    /// Run to completion, returning the bin assignment sequence
    fn run_to_end(engine: &mut SimulationEngine) -> Vec<(u32, usize)> {
        let mut assignments = Vec::new();
        while !engine.is_complete() && engine.state().time_ticks < MAX_TICKS {
            engine.tick();
            for event in engine.events() {
                if let SimEvent::BallBinned { id, bin } = *event {
                    assignments.push((id, bin));
                }
            }
        }
        assignments
    }

    #[test]
    fn test_spawn_interval() {
        assert_eq!(spawn_interval(1), 60.0);
        assert_eq!(spawn_interval(3), 20.0);
        assert_eq!(spawn_interval(7), 60.0 / 7.0);
        // Zero is treated as the slowest pacing
        assert_eq!(spawn_interval(0), 60.0);
    }

    #[test]
    fn test_single_ball_no_pins() {
        let mut engine = engine(0, 12345);
        engine.configure(1, 3);
        engine.start();
        assert_eq!(engine.phase(), RunPhase::Running);

        let assignments = run_to_end(&mut engine);
        assert_eq!(engine.phase(), RunPhase::Complete);
        assert_eq!(assignments.len(), 1);
        assert_eq!(engine.bins().len(), 1);
        assert_eq!(engine.bins()[0].count(), 1);
        assert!(engine.active().is_empty());
        assert_eq!(engine.discarded_count(), 0);

        // Fell straight: no sideways motion without pins
        let ball = &engine.bins()[0].balls[0];
        assert_eq!(ball.bounces, 0);
        assert_eq!(ball.vel.x, 0.0);
        assert!((ball.pos.x - 400.0).abs() <= SPAWN_JITTER);
    }

    #[test]
    fn test_zero_balls_completes_on_start() {
        let mut engine = engine(12, 1);
        engine.configure(0, 5);
        engine.start();
        assert_eq!(engine.phase(), RunPhase::Complete);
        assert!(engine.bins().iter().all(|b| b.count() == 0));
        assert_eq!(engine.events(), &[SimEvent::RunComplete]);
    }

    #[test]
    fn test_first_spawn_paced() {
        let mut engine = engine(12, 3);
        engine.configure(5, 3);
        engine.start();
        for _ in 0..19 {
            engine.tick();
            assert_eq!(engine.dropped_count(), 0);
        }
        engine.tick();
        assert_eq!(engine.dropped_count(), 1);
        assert!(matches!(engine.events()[0], SimEvent::BallSpawned { id: 1 }));
    }

    #[test]
    fn test_configure_applies_on_next_start() {
        let mut engine = engine(12, 3);
        engine.configure(5, 3);
        engine.start();
        engine.configure(9, 10);
        assert_eq!(engine.total_balls(), 5);
        assert_eq!(engine.state().speed, 3);

        engine.reset();
        engine.start();
        assert_eq!(engine.total_balls(), 9);
        assert_eq!(engine.state().speed, 10);
    }

    #[test]
    fn test_pause_freezes_state() {
        let mut engine = engine(12, 8);
        engine.configure(3, 10);
        engine.start();
        // One spawn every 6 ticks
        for _ in 0..6 {
            engine.tick();
        }
        assert_eq!(engine.active().len(), 1);
        assert_eq!(engine.events(), &[SimEvent::BallSpawned { id: 1 }]);

        engine.pause();
        assert_eq!(engine.phase(), RunPhase::Paused);
        let frozen_pos = engine.active()[0].pos;
        let frozen_ticks = engine.state().time_ticks;
        for _ in 0..10 {
            engine.tick();
        }
        assert_eq!(engine.active()[0].pos, frozen_pos);
        assert_eq!(engine.state().time_ticks, frozen_ticks);
        // Last running tick's events stay readable while paused
        assert_eq!(engine.events(), &[SimEvent::BallSpawned { id: 1 }]);

        // Start while paused is ignored
        engine.start();
        assert_eq!(engine.phase(), RunPhase::Paused);

        engine.toggle_pause();
        assert_eq!(engine.phase(), RunPhase::Running);
        engine.tick();
        assert_ne!(engine.active()[0].pos, frozen_pos);
    }

    #[test]
    fn test_invalid_transitions_are_noops() {
        let mut engine = engine(12, 8);
        engine.pause();
        engine.resume();
        engine.toggle_pause();
        assert_eq!(engine.phase(), RunPhase::Idle);

        // Ticking while idle does nothing
        engine.tick();
        assert_eq!(engine.state().time_ticks, 0);

        engine.configure(2, 10);
        engine.start();
        for _ in 0..20 {
            engine.tick();
        }
        let dropped = engine.dropped_count();
        engine.start();
        assert_eq!(engine.dropped_count(), dropped);

        run_to_end(&mut engine);
        assert!(engine.is_complete());
        engine.pause();
        engine.toggle_pause();
        assert!(engine.is_complete());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut engine = engine(12, 21);
        engine.configure(4, 10);
        engine.start();
        for _ in 0..40 {
            engine.tick();
        }
        engine.pause();
        engine.reset();

        assert_eq!(engine.phase(), RunPhase::Idle);
        assert!(engine.active().is_empty());
        assert!(engine.bins().iter().all(|b| b.count() == 0));
        assert_eq!(engine.dropped_count(), 0);
        assert_eq!(engine.total_balls(), 0);
        assert_eq!(engine.discarded_count(), 0);
        assert_eq!(engine.pins().len(), 78);
    }

    #[test]
    fn test_restart_after_complete() {
        let mut engine = engine(6, 77);
        engine.configure(3, 10);
        engine.start();
        run_to_end(&mut engine);
        assert!(engine.is_complete());
        assert_eq!(engine.state().binned_count(), 3);

        engine.start();
        assert_eq!(engine.phase(), RunPhase::Running);
        assert_eq!(engine.state().binned_count(), 0);
        run_to_end(&mut engine);
        assert!(engine.is_complete());
        assert!(engine.state().is_conserved());
        assert_eq!(engine.state().binned_count() + engine.discarded_count(), 3);
    }

    #[test]
    fn test_escaped_ball_is_discarded() {
        let mut engine = engine(0, 5);
        engine.configure(1, 10);
        engine.start();
        for _ in 0..6 {
            engine.tick();
        }
        assert_eq!(engine.active().len(), 1);

        // Launch it past both thresholds in a single step
        let discard_y = engine.state().board.discard_y;
        engine.state.active[0].pos.y = discard_y - 1.0;
        engine.state.active[0].vel.y = 50.0;
        engine.tick();

        assert_eq!(engine.discarded_count(), 1);
        assert!(engine.active().is_empty());
        assert!(engine.state().is_conserved());
        assert!(engine.events().contains(&SimEvent::BallDiscarded { id: 1 }));
        assert!(engine.is_complete());
    }

    #[test]
    fn test_bin_assignment_matches_position() {
        let mut engine = engine(12, 4242);
        engine.configure(40, 10);
        engine.start();
        run_to_end(&mut engine);
        assert!(engine.is_complete());

        let board = &engine.state().board;
        for (i, bin) in board.bins.iter().enumerate() {
            for ball in &bin.balls {
                assert_eq!(bin_index(ball.pos.x, board), i);
            }
        }
    }

    #[test]
    fn test_balls_spread_across_bins() {
        let mut engine = engine(12, 2024);
        engine.configure(200, 10);
        engine.start();
        run_to_end(&mut engine);
        assert!(engine.is_complete());

        let used = engine.bins().iter().filter(|b| b.count() > 0).count();
        assert!(used >= 3, "only {} bins used", used);
        assert!(engine.bins().iter().any(|b| b.balls.iter().any(|ball| ball.bounces > 0)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn prop_run_invariants(seed in any::<u64>(), balls in 1u32..16, speed in 1u32..=10) {
            let mut engine = engine(12, seed);
            engine.configure(balls, speed);
            engine.start();

            let mut last_dropped = 0;
            while !engine.is_complete() {
                prop_assert!(engine.state().time_ticks < MAX_TICKS, "run stalled");
                engine.tick();

                let state = engine.state();
                prop_assert!(state.is_conserved());
                prop_assert!(state.dropped_count >= last_dropped);
                prop_assert!(state.dropped_count <= state.total_balls);
                last_dropped = state.dropped_count;

                for ball in &state.active {
                    prop_assert!(ball.pos.x >= state.board.left_wall + ball.radius);
                    prop_assert!(ball.pos.x <= state.board.right_wall - ball.radius);
                }
            }

            prop_assert_eq!(engine.dropped_count(), balls);
            prop_assert!(engine.active().is_empty());
        }

        #[test]
        fn prop_walls_contain_fast_balls(seed in any::<u64>(), kick in 20.0f32..60.0, leftward: bool) {
            let mut engine = engine(12, seed);
            engine.configure(1, 10);
            engine.start();
            while engine.active().is_empty() {
                engine.tick();
            }
            engine.state.active[0].vel.x = if leftward { -kick } else { kick };

            let (left, right) = (engine.state().board.left_wall, engine.state().board.right_wall);
            let mut touched_wall = false;
            while !engine.is_complete() {
                prop_assert!(engine.state().time_ticks < MAX_TICKS, "run stalled");
                engine.tick();
                for ball in engine.active() {
                    prop_assert!(ball.pos.x >= left + ball.radius);
                    prop_assert!(ball.pos.x <= right - ball.radius);
                    if ball.pos.x == left + ball.radius || ball.pos.x == right - ball.radius {
                        touched_wall = true;
                        // Rebounds away from the wall it hit
                        let rebounds_away = if ball.pos.x < 400.0 { ball.vel.x >= 0.0 } else { ball.vel.x <= 0.0 };
                        prop_assert!(rebounds_away);
                    }
                }
            }

            prop_assert!(touched_wall);
            prop_assert!(engine.state().is_conserved());
        }

        #[test]
        fn prop_deterministic_given_seed(seed in any::<u64>(), balls in 1u32..12) {
            let mut a = engine(12, seed);
            let mut b = engine(12, seed);
            a.configure(balls, 10);
            b.configure(balls, 10);
            a.start();
            b.start();

            prop_assert_eq!(run_to_end(&mut a), run_to_end(&mut b));
        }
    }
}
