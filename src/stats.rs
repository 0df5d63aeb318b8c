//! Run statistics for a host display
//!
//! Computed from a state snapshot; never mutates the simulation.

use serde::{Deserialize, Serialize};

use crate::sim::SimulationState;

/// Snapshot of run progress and the bin distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub dropped: u32,
    pub total: u32,
    pub active: u32,
    pub binned: u32,
    pub discarded: u32,
    /// Dropped / total as a percentage (0 when nothing was requested)
    pub progress_percent: f32,
    pub bin_counts: Vec<u32>,
    /// Mean bin index of binned balls
    pub mean_bin: Option<f32>,
    /// Variance of the bin index of binned balls
    pub variance: Option<f32>,
    /// Share of balls each bin would get on an ideal board
    pub expected_share: Vec<f64>,
}

impl RunStats {
    pub fn from_state(state: &SimulationState) -> Self {
        let bin_counts: Vec<u32> = state.board.bins.iter().map(|b| b.count() as u32).collect();
        let binned: u32 = bin_counts.iter().sum();

        let progress_percent = if state.total_balls > 0 {
            state.dropped_count as f32 / state.total_balls as f32 * 100.0
        } else {
            0.0
        };

        let (mean_bin, variance) = if binned > 0 {
            let n = binned as f32;
            let mean = bin_counts
                .iter()
                .enumerate()
                .map(|(i, &c)| i as f32 * c as f32)
                .sum::<f32>()
                / n;
            let var = bin_counts
                .iter()
                .enumerate()
                .map(|(i, &c)| (i as f32 - mean).powi(2) * c as f32)
                .sum::<f32>()
                / n;
            (Some(mean), Some(var))
        } else {
            (None, None)
        };

        Self {
            dropped: state.dropped_count,
            total: state.total_balls,
            active: state.active.len() as u32,
            binned,
            discarded: state.discarded_count,
            progress_percent,
            expected_share: binomial_shares(state.board.config.rows),
            bin_counts,
            mean_bin,
            variance,
        }
    }
}

/// C(rows, k) / 2^rows for k in 0..=rows
pub fn binomial_shares(rows: u32) -> Vec<f64> {
    let mut shares = Vec::with_capacity(rows as usize + 1);
    let mut coeff = 1.0_f64;
    let total = 2.0_f64.powf(rows as f64);
    for k in 0..=rows {
        shares.push(coeff / total);
        coeff = coeff * (rows - k) as f64 / (k + 1) as f64;
    }
    shares
}
