use alloc::vec::Vec;

use super::*;

pub const DEFAULT_GENERATION_ATTEMPTS: u32 = 64;

/// Rejection sampling over uniformly random fills, with a bounded number of attempts before
/// falling back to repairing the last fill in place.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    max_attempts: u32,
}

impl RandomBoardGenerator {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }
}

impl Default for RandomBoardGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_GENERATION_ATTEMPTS)
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate<R: Rng + ?Sized>(&self, size: Coord, rng: &mut R) -> Result<Board> {
        let mut board = Board::empty(size)?;

        for attempt in 1..=self.max_attempts {
            for coords in board.positions() {
                board.place(coords, PieceKind::random(rng));
            }
            if !board.has_matches() {
                log::debug!("Generated {}x{} board after {} attempt(s)", size, size, attempt);
                return Ok(board);
            }
        }

        log::warn!(
            "No clean {}x{} board after {} attempts, repairing in place",
            size,
            size,
            self.max_attempts
        );
        if board.empty_count() > 0 {
            // zero attempts configured, start from a random fill
            for coords in board.positions() {
                board.place(coords, PieceKind::random(rng));
            }
        }
        repair_matches(&mut board, rng)?;

        if board.has_matches() {
            log::error!("Board still has matches after repair");
            return Err(GameError::GenerationExhausted);
        }
        Ok(board)
    }
}

/// Walks the board in row-major order and re-rolls any cell that would complete a run with
/// the two cells before it on its row or column.
fn repair_matches<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> Result<()> {
    let mut excluded: Vec<PieceKind> = Vec::with_capacity(2);

    for (row, col) in board.positions() {
        excluded.clear();
        if col >= 2 {
            push_if_pair(board, &mut excluded, (row, col - 1), (row, col - 2));
        }
        if row >= 2 {
            push_if_pair(board, &mut excluded, (row - 1, col), (row - 2, col));
        }

        let current = board.kind_at((row, col));
        if current.is_some_and(|kind| !excluded.contains(&kind)) {
            continue;
        }
        let kind =
            PieceKind::random_except(rng, &excluded).ok_or(GameError::GenerationExhausted)?;
        board.place((row, col), kind);
    }
    Ok(())
}

fn push_if_pair(board: &Board, excluded: &mut Vec<PieceKind>, a: Coord2, b: Coord2) {
    if let (Some(first), Some(second)) = (board.kind_at(a), board.kind_at(b)) {
        if first == second && !excluded.contains(&first) {
            excluded.push(first);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn generated_boards_are_settled() {
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let board = initialize_board(8, &mut rng).unwrap();

            assert!(board.is_full());
            assert!(board.find_matches().is_empty(), "seed {seed}:\n{board}");
        }
    }

    #[test]
    fn same_seed_gives_same_board() {
        let a = initialize_board(8, &mut SmallRng::seed_from_u64(42)).unwrap();
        let b = initialize_board(8, &mut SmallRng::seed_from_u64(42)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn repair_fallback_produces_settled_board() {
        let generator = RandomBoardGenerator::new(0);

        for seed in 0..20 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let board = generator.generate(8, &mut rng).unwrap();

            assert!(board.is_settled());
        }
    }

    #[test]
    fn repair_clears_uniform_board() {
        let mut board = Board::parse(&[
            "GGGGG", //
            "GGGGG", //
            "GGGGG", //
            "GGGGG", //
            "GGGGG", //
        ])
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(9);

        repair_matches(&mut board, &mut rng).unwrap();

        assert!(board.is_settled());
    }

    #[test]
    fn rejects_boards_too_small_to_match() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            initialize_board(2, &mut rng),
            Err(GameError::InvalidBoardShape)
        );
    }
}
