use anyhow::{Result, bail};
use gemquest_core::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;

/// What happened in one simulated level.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameSummary {
    pub seed: u64,
    pub level: u32,
    pub phase: Phase,
    pub score: u32,
    pub target: u32,
    pub moves_left: u16,
    pub stars: u8,
    pub swaps: u32,
    pub cascade_passes: u32,
    pub boosters_used: u32,
    /// Set when the board went dead with no shuffle charge left.
    pub stuck: bool,
    pub board: String,
}

/// Greedy player: always takes the swap with the biggest immediate match and shuffles dead boards.
pub fn play_level(
    level: u32,
    config: GameConfig,
    profile: PlayerProfile,
    seed: u64,
) -> Result<(GameSummary, PlayerProfile)> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut round = Round::new_game(level, config, profile, &mut rng)?;
    let mut swaps = 0;
    let mut cascade_passes = 0;
    let mut boosters_used = 0;
    let mut stuck = false;

    while round.phase() == Phase::Playing {
        match best_move(round.board()) {
            Some(best) => {
                round.tap(best.from)?;
                if !round.tap(best.to)?.has_update() {
                    bail!("legal move {:?} -> {:?} was not accepted", best.from, best.to);
                }
                swaps += 1;
            }
            None => match round.use_booster(BoosterKind::Shuffle, &mut rng)? {
                BoosterOutcome::Applied(_) => boosters_used += 1,
                _ => {
                    stuck = true;
                    break;
                }
            },
        }
        let resolution = round.resolve(&mut rng)?;
        cascade_passes += resolution.steps.len() as u32;
    }

    let state = round.state();
    let summary = GameSummary {
        seed,
        level: state.level,
        phase: state.phase,
        score: state.score,
        target: state.target,
        moves_left: state.moves_left,
        stars: state.stars,
        swaps,
        cascade_passes,
        boosters_used,
        stuck,
        board: round.board().to_string(),
    };
    Ok((summary, round.into_profile()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greedy_play_reaches_an_end() {
        let (summary, profile) =
            play_level(1, GameConfig::default(), PlayerProfile::default(), 3).unwrap();

        assert!(summary.stuck || summary.phase.is_finished());
        assert_eq!(summary.board.lines().count(), 8);
        if summary.phase == Phase::LevelComplete {
            assert_eq!(profile.completed_levels, 1);
        }
    }

    #[test]
    fn same_seed_replays_identically() {
        let first = play_level(2, GameConfig::default(), PlayerProfile::default(), 17).unwrap();
        let second = play_level(2, GameConfig::default(), PlayerProfile::default(), 17).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn easy_target_completes_on_first_swap() {
        let config = GameConfig::new(8, 5, 10);

        let (summary, _) = play_level(1, config, PlayerProfile::default(), 8).unwrap();

        assert_eq!(summary.phase, Phase::LevelComplete);
        assert!(summary.swaps + summary.boosters_used >= 1);
        assert_eq!(summary.stars, 3);
    }
}
