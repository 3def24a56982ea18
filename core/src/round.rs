use alloc::vec::Vec;
use core::mem;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Playing -> Playing (selection changes, rejected swaps)
/// - Playing -> Resolving (committed swap or applied booster)
/// - Resolving -> Playing
/// - Resolving -> LevelComplete
/// - Resolving -> GameOver
///
/// Pausing is tracked separately and never changes the phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for player input
    Playing,
    /// Sub-phase of playing while a cascade runs, input is dropped
    Resolving,
    /// Out of moves below the target
    GameOver,
    /// Target reached
    LevelComplete,
}

impl Phase {
    pub const fn accepts_input(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing | Self::Resolving)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::GameOver | Self::LevelComplete)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::Playing
    }
}

/// Read-only snapshot of the round for a presentation layer.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    pub level: u32,
    pub score: u32,
    pub moves_left: u16,
    pub target: u32,
    pub selection: Option<Coord2>,
    pub phase: Phase,
    pub stars: u8,
    pub paused: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TapOutcome {
    /// Paused, resolving, or finished
    Ignored,
    Selected(Coord2),
    Deselected,
    /// Swap matched, the round is now resolving
    Swapped { from: Coord2, to: Coord2 },
    /// Swap did not match and was undone
    Rejected { from: Coord2, to: Coord2 },
}

impl TapOutcome {
    /// Whether the board changed
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Swapped { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum BoosterOutcome {
    /// Paused, resolving, or finished
    Ignored,
    /// No charges left
    Unavailable,
    /// Charge consumed, the round is now resolving
    Applied(BoosterEffect),
}

impl BoosterOutcome {
    pub const fn has_update(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// One match-clear-refill pass of a cascade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CascadeStep {
    /// 1-based pass number within the cascade
    pub pass: u32,
    pub cleared: MatchSet,
    pub points: u32,
    /// Board after the refill
    pub board: Board,
}

/// Ordered log of a fully resolved cascade.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub steps: Vec<CascadeStep>,
    pub phase: Phase,
}

impl Resolution {
    pub fn points(&self) -> u32 {
        self.steps
            .iter()
            .fold(0, |total, step| total.saturating_add(step.points))
    }
}

/// A level in play: board, score, move budget, and the player profile for the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Round {
    config: GameConfig,
    level: u32,
    board: Board,
    score: u32,
    moves_left: u16,
    target: u32,
    selection: Option<Coord2>,
    phase: Phase,
    stars: u8,
    paused: bool,
    passes: u32,
    profile: PlayerProfile,
    events: Vec<RoundEvent>,
}

impl Round {
    /// Starts `level` (1-based) on a freshly generated board.
    pub fn new_game<R: Rng + ?Sized>(
        level: u32,
        config: GameConfig,
        profile: PlayerProfile,
        rng: &mut R,
    ) -> Result<Self> {
        let board = generate_board(&config, rng)?;
        Self::with_board(level, config, profile, board)
    }

    /// Starts `level` on a given settled board of the configured size.
    pub fn with_board(
        level: u32,
        config: GameConfig,
        profile: PlayerProfile,
        board: Board,
    ) -> Result<Self> {
        if board.size() != config.size {
            return Err(GameError::InvalidBoardShape);
        }
        if !board.is_settled() {
            return Err(GameError::UnsettledBoard);
        }
        let level = level.max(1);
        log::debug!("Level {} started", level);
        Ok(Self {
            config,
            level,
            board,
            score: 0,
            moves_left: config.starting_moves,
            target: config.target_for_level(level),
            selection: None,
            phase: Phase::Playing,
            stars: 0,
            paused: false,
            passes: 0,
            profile,
            events: Vec::new(),
        })
    }

    pub fn state(&self) -> RoundState {
        RoundState {
            level: self.level,
            score: self.score,
            moves_left: self.moves_left,
            target: self.target,
            selection: self.selection,
            phase: self.phase,
            stars: self.stars,
            paused: self.paused,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece_at(&self, coords: Coord2) -> Option<Piece> {
        self.board.piece_at(coords)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves_left(&self) -> u16 {
        self.moves_left
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn selection(&self) -> Option<Coord2> {
        self.selection
    }

    pub fn stars(&self) -> u8 {
        self.stars
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn boosters(&self) -> &BoosterInventory {
        &self.profile.boosters
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn into_profile(self) -> PlayerProfile {
        self.profile
    }

    /// Takes the events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        mem::take(&mut self.events)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    fn accepts_input(&self) -> bool {
        !self.paused && self.phase.accepts_input()
    }

    /// Tap-to-swap: select, deselect, reselect, or swap with the selected neighbor.
    pub fn tap(&mut self, coords: Coord2) -> Result<TapOutcome> {
        use TapOutcome::*;

        let coords = self.board.validate_coords(coords)?;
        if !self.accepts_input() {
            log::trace!("Tap at {:?} ignored in {:?}", coords, self.phase);
            return Ok(Ignored);
        }

        Ok(match self.selection {
            None => {
                self.selection = Some(coords);
                Selected(coords)
            }
            Some(selected) if selected == coords => {
                self.selection = None;
                Deselected
            }
            Some(selected) if is_adjacent(selected, coords) => {
                self.attempt_swap(selected, coords)?
            }
            Some(_) => {
                self.selection = Some(coords);
                Selected(coords)
            }
        })
    }

    fn attempt_swap(&mut self, from: Coord2, to: Coord2) -> Result<TapOutcome> {
        self.selection = None;
        self.board.swap(from, to)?;

        if self.board.has_matches() {
            self.moves_left = self.moves_left.saturating_sub(1);
            log::debug!(
                "Swap {:?} <-> {:?} committed, {} moves left",
                from,
                to,
                self.moves_left
            );
            self.begin_resolving();
            Ok(TapOutcome::Swapped { from, to })
        } else {
            self.board.swap(from, to)?;
            log::debug!("Swap {:?} <-> {:?} rejected", from, to);
            Ok(TapOutcome::Rejected { from, to })
        }
    }

    /// Spends one charge of `kind` and applies it. Booster-cleared cells score like matches.
    pub fn use_booster<R: Rng + ?Sized>(
        &mut self,
        kind: BoosterKind,
        rng: &mut R,
    ) -> Result<BoosterOutcome> {
        if !self.accepts_input() {
            log::trace!("{:?} booster ignored in {:?}", kind, self.phase);
            return Ok(BoosterOutcome::Ignored);
        }
        if !self.profile.boosters.try_consume(kind) {
            return Ok(BoosterOutcome::Unavailable);
        }

        let selection = self.selection.take();
        let effect = resolve_booster(kind, &mut self.board, selection, rng);
        self.score = self.score.saturating_add(effect.points());
        self.events.push(RoundEvent::BoosterConsumed {
            kind,
            remaining: self.profile.boosters.count(kind),
        });

        self.begin_resolving();
        Ok(BoosterOutcome::Applied(effect))
    }

    fn begin_resolving(&mut self) {
        self.phase = Phase::Resolving;
        self.passes = 0;
    }

    /// Advances a running cascade by one pass.
    ///
    /// Returns `None` once the board is settled, after the terminal phase has been decided.
    /// Does nothing while paused or when no cascade is running.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Option<CascadeStep>> {
        if self.paused || self.phase != Phase::Resolving {
            return Ok(None);
        }

        let matches = self.board.find_matches();
        if matches.is_empty() {
            self.settle();
            return Ok(None);
        }

        if self.passes >= self.config.max_cascade_passes {
            log::error!(
                "Cascade exceeded {} passes without settling",
                self.config.max_cascade_passes
            );
            return Err(GameError::CascadeLimitExceeded(self.config.max_cascade_passes));
        }
        self.passes += 1;

        let points = matches.points();
        self.score = self.score.saturating_add(points);
        self.board.remove_and_collapse(&matches, rng);
        log::trace!(
            "Cascade pass {} cleared {} cells for {} points",
            self.passes,
            matches.len(),
            points
        );

        Ok(Some(CascadeStep {
            pass: self.passes,
            cleared: matches,
            points,
            board: self.board.clone(),
        }))
    }

    /// Runs the current cascade to completion.
    pub fn resolve<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Resolution> {
        let mut steps = Vec::new();
        while let Some(step) = self.step(rng)? {
            steps.push(step);
        }
        Ok(Resolution {
            steps,
            phase: self.phase,
        })
    }

    /// Terminal evaluation. Reaching the target wins even when the last move was spent.
    fn settle(&mut self) {
        self.phase = if self.score >= self.target {
            self.stars = star_rating(self.score, self.target);
            self.profile.record_completion(self.score, self.stars);
            self.events.push(RoundEvent::LevelCompleted {
                level: self.level,
                stars: self.stars,
                score: self.score,
                reward_gems: level_reward(self.stars),
            });
            Phase::LevelComplete
        } else if self.moves_left == 0 {
            Phase::GameOver
        } else {
            Phase::Playing
        };
        log::debug!(
            "Cascade settled after {} passes: {:?}, score {}/{}",
            self.passes,
            self.phase,
            self.score,
            self.target
        );
    }

    /// Same level and target on a new board, score and moves reset.
    pub fn restart_level<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let board = generate_board(&self.config, rng)?;
        self.reset_with(board);
        log::debug!("Level {} restarted", self.level);
        Ok(())
    }

    /// Advances the level counter, raises the target, and restarts.
    pub fn next_level<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let board = generate_board(&self.config, rng)?;
        self.level = self.level.saturating_add(1);
        self.target = self.target.saturating_add(self.config.target_increment);
        self.reset_with(board);
        log::debug!("Level {} started, target {}", self.level, self.target);
        Ok(())
    }

    fn reset_with(&mut self, board: Board) {
        self.board = board;
        self.score = 0;
        self.moves_left = self.config.starting_moves;
        self.selection = None;
        self.phase = Phase::Playing;
        self.stars = 0;
        self.passes = 0;
        self.paused = false;
    }
}

fn generate_board<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Result<Board> {
    RandomBoardGenerator::new(config.max_generation_attempts).generate(config.size, rng)
}
