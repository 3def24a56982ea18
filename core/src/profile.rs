use serde::{Deserialize, Serialize};

use crate::*;

/// Stars for a completed level: above 150% of the target earns 3, above 120% earns 2.
pub const fn star_rating(score: u32, target: u32) -> u8 {
    // compare score / target against 1.5 and 1.2 without floats
    let scaled = score as u64 * 10;
    let target = if target == 0 { 1 } else { target as u64 };
    if scaled > target * 15 {
        3
    } else if scaled > target * 12 {
        2
    } else {
        1
    }
}

/// Gems granted per earned star.
pub const GEMS_PER_STAR: u32 = 25;

/// Gems a host should credit for completing a level with `stars`.
pub const fn level_reward(stars: u8) -> u32 {
    GEMS_PER_STAR * stars as u32
}

/// Player state kept across levels. Persisting it is up to the host.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProfile {
    pub completed_levels: u32,
    pub total_stars: u32,
    pub best_score: u32,
    pub boosters: BoosterInventory,
}

impl PlayerProfile {
    pub fn record_completion(&mut self, score: u32, stars: u8) {
        self.completed_levels = self.completed_levels.saturating_add(1);
        self.total_stars = self.total_stars.saturating_add(stars.into());
        self.best_score = self.best_score.max(score);
    }
}

/// Notifications for collaborators outside the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    LevelCompleted {
        level: u32,
        stars: u8,
        score: u32,
        reward_gems: u32,
    },
    BoosterConsumed { kind: BoosterKind, remaining: u16 },
}
