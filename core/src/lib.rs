#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use analysis::*;
pub use board::*;
pub use booster::*;
pub use error::*;
pub use generator::*;
pub use piece::*;
pub use profile::*;
pub use round::*;
pub use types::*;

mod analysis;
mod board;
mod booster;
mod error;
mod generator;
mod piece;
mod profile;
mod round;
mod types;

/// Score awarded for every cleared cell.
pub const POINTS_PER_CELL: u32 = 10;

pub const DEFAULT_BOARD_SIZE: Coord = 8;
pub const DEFAULT_STARTING_MOVES: u16 = 30;
pub const DEFAULT_STARTING_TARGET: u32 = 1000;
pub const DEFAULT_TARGET_INCREMENT: u32 = 500;
pub const DEFAULT_CASCADE_PASSES: u32 = 1000;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub size: Coord,
    pub starting_moves: u16,
    /// Target score of level 1.
    pub starting_target: u32,
    /// Added to the target on every level.
    pub target_increment: u32,
    pub max_generation_attempts: u32,
    /// Safety bound on passes of a single cascade.
    pub max_cascade_passes: u32,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord, starting_moves: u16, starting_target: u32) -> Self {
        Self {
            size,
            starting_moves,
            starting_target,
            target_increment: DEFAULT_TARGET_INCREMENT,
            max_generation_attempts: DEFAULT_GENERATION_ATTEMPTS,
            max_cascade_passes: DEFAULT_CASCADE_PASSES,
        }
    }

    pub fn new(size: Coord, starting_moves: u16, starting_target: u32) -> Self {
        let size = size.clamp(MIN_BOARD_SIZE, Coord::MAX);
        let starting_moves = starting_moves.max(1);
        let starting_target = starting_target.max(1);
        Self::new_unchecked(size, starting_moves, starting_target)
    }

    /// Target score for a 1-based level number.
    pub const fn target_for_level(&self, level: u32) -> u32 {
        let raises = level.saturating_sub(1);
        self.starting_target
            .saturating_add(raises.saturating_mul(self.target_increment))
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size, self.size)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked(
            DEFAULT_BOARD_SIZE,
            DEFAULT_STARTING_MOVES,
            DEFAULT_STARTING_TARGET,
        )
    }
}
