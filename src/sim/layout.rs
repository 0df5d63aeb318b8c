//! Board geometry: the pin lattice, collection bins and side walls
//!
//! Built once from a [`BoardConfig`]. Pins and bin rectangles never move after
//! construction; only the bins' collected ball lists grow during a run.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::Ball;
use crate::consts::*;

/// Distance from the bottom of the board up to the top edge of the bins
pub const BIN_TOP_MARGIN: f32 = 100.0;
/// Largest lattice a board may hold
pub const MAX_ROWS: u32 = 64;

/// Invalid board configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("board dimension `{name}` must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("top offset must be non-negative and finite, got {0}")]
    NegativeTopOffset(f32),

    #[error("wall inset {inset} leaves no room on a board {width} wide")]
    WallsOverlap { inset: f32, width: f32 },

    #[error("{rows} pin rows exceeds the maximum of {max}", max = MAX_ROWS)]
    TooManyRows { rows: u32 },

    #[error("bin row {span} wide does not fit between walls {inner} apart")]
    BinsExceedWalls { span: f32, inner: f32 },
}

/// Static board parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: f32,
    pub height: f32,
    /// Number of pin rows (row r holds r + 1 pins)
    pub rows: u32,
    /// Horizontal distance between neighbouring pins in a row
    pub pin_spacing: f32,
    /// Vertical distance between rows
    pub row_spacing: f32,
    /// Y of the first pin row
    pub top_offset: f32,
    pub bin_width: f32,
    pub bin_height: f32,
    /// Distance of each side wall from the board edge
    pub wall_inset: f32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 700.0,
            rows: 12,
            pin_spacing: 50.0,
            row_spacing: 40.0,
            top_offset: 100.0,
            bin_width: 50.0,
            bin_height: 80.0,
            wall_inset: 50.0,
        }
    }
}

impl BoardConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        let dims = [
            ("width", self.width),
            ("height", self.height),
            ("pin_spacing", self.pin_spacing),
            ("row_spacing", self.row_spacing),
            ("bin_width", self.bin_width),
            ("bin_height", self.bin_height),
        ];
        for (name, value) in dims {
            if !(value.is_finite() && value > 0.0) {
                return Err(LayoutError::NonPositive { name, value });
            }
        }
        if !(self.top_offset.is_finite() && self.top_offset >= 0.0) {
            return Err(LayoutError::NegativeTopOffset(self.top_offset));
        }
        if !(self.wall_inset.is_finite() && self.wall_inset >= 0.0)
            || self.width - 2.0 * self.wall_inset <= 2.0 * BALL_RADIUS
        {
            return Err(LayoutError::WallsOverlap {
                inset: self.wall_inset,
                width: self.width,
            });
        }
        if self.rows > MAX_ROWS {
            return Err(LayoutError::TooManyRows { rows: self.rows });
        }
        let span = (self.rows + 1) as f32 * self.bin_width;
        let inner = self.width - 2.0 * self.wall_inset;
        if span > inner {
            return Err(LayoutError::BinsExceedWalls { span, inner });
        }
        Ok(())
    }
}

/// A fixed circular obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub pos: Vec2,
    pub radius: f32,
    pub row: u32,
    pub col: u32,
}

/// A collector at the bottom of the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bin {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Collected balls, oldest at the bottom of the stack
    pub balls: Vec<Ball>,
}

impl Bin {
    pub fn count(&self) -> usize {
        self.balls.len()
    }

    /// Render center of the ball at `slot` in the stack (0 = bottom)
    pub fn stack_position(&self, slot: usize, ball_radius: f32) -> Vec2 {
        Vec2::new(
            self.pos.x + self.width / 2.0,
            self.pos.y + self.height - 2.0 * ball_radius * (slot as f32 + 1.0),
        )
    }
}

/// Complete board geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub config: BoardConfig,
    pub pins: Vec<Pin>,
    pub bins: Vec<Bin>,
    /// X of the left wall surface
    pub left_wall: f32,
    /// X of the right wall surface
    pub right_wall: f32,
    /// Balls below this y are sorted into a bin
    pub collect_y: f32,
    /// Balls below this y are dropped from the simulation
    pub discard_y: f32,
}

impl Board {
    /// Generate the pin lattice and bins for a configuration
    pub fn new(config: BoardConfig) -> Result<Self, LayoutError> {
        config.validate()?;

        let center_x = config.width / 2.0;

        let mut pins = Vec::new();
        for row in 0..config.rows {
            let pins_in_row = row + 1;
            let start_x = center_x - (pins_in_row - 1) as f32 * config.pin_spacing / 2.0;
            let y = config.top_offset + row as f32 * config.row_spacing;
            for col in 0..pins_in_row {
                pins.push(Pin {
                    pos: Vec2::new(start_x + col as f32 * config.pin_spacing, y),
                    radius: PIN_RADIUS,
                    row,
                    col,
                });
            }
        }

        let bin_count = config.rows as usize + 1;
        let bins_left = center_x - bin_count as f32 * config.bin_width / 2.0;
        let bin_top = config.height - BIN_TOP_MARGIN;
        let bins = (0..bin_count)
            .map(|i| Bin {
                pos: Vec2::new(bins_left + i as f32 * config.bin_width, bin_top),
                width: config.bin_width,
                height: config.bin_height,
                balls: Vec::new(),
            })
            .collect();

        log::info!(
            "Board {}x{}: {} rows, {} pins, {} bins",
            config.width,
            config.height,
            config.rows,
            pins.len(),
            bin_count
        );

        Ok(Self {
            left_wall: config.wall_inset,
            right_wall: config.width - config.wall_inset,
            collect_y: config.height - COLLECT_MARGIN,
            discard_y: config.height + DISCARD_MARGIN,
            pins,
            bins,
            config,
        })
    }

    /// Where new balls appear (before jitter)
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(self.config.width / 2.0, SPAWN_Y)
    }

    /// X of the left edge of the bin row
    pub fn bins_left(&self) -> f32 {
        self.bins.first().map(|b| b.pos.x).unwrap_or(self.config.width / 2.0)
    }

    /// Total balls currently held in bins
    pub fn binned_count(&self) -> usize {
        self.bins.iter().map(Bin::count).sum()
    }

    /// Empty every bin, keeping geometry
    pub fn clear_bins(&mut self) {
        for bin in &mut self.bins {
            bin.balls.clear();
        }
    }
}
