//! Deciding when a ball leaves the active set, and where it goes

use super::layout::Board;
use super::state::Ball;

/// Where a ball belongs after this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Still above the collection line
    Falling,
    /// Reached the collection line over the given bin
    Binned(usize),
    /// Fell past the bottom of the playfield without being collected
    Discarded,
}

/// Bin under horizontal position `x`, clamped into the bin row
pub fn bin_index(x: f32, board: &Board) -> usize {
    let last = board.bins.len().saturating_sub(1);
    let raw = ((x - board.bins_left()) / board.config.bin_width).floor();
    if raw.is_nan() || raw <= 0.0 {
        0
    } else {
        (raw as usize).min(last)
    }
}

/// Classify a ball against the collection and discard thresholds.
///
/// A ball already past the discard line escaped collection (it crossed both
/// lines within a single tick) and is discarded rather than binned.
pub fn classify(ball: &Ball, board: &Board) -> Classification {
    if ball.pos.y > board.discard_y {
        Classification::Discarded
    } else if ball.pos.y > board.collect_y {
        Classification::Binned(bin_index(ball.pos.x, board))
    } else {
        Classification::Falling
    }
}
