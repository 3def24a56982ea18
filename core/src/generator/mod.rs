use rand::Rng;

use crate::*;
pub use random::*;

mod random;

pub trait BoardGenerator {
    /// Produces a settled board: every cell filled and no matches.
    fn generate<R: Rng + ?Sized>(&self, size: Coord, rng: &mut R) -> Result<Board>;
}

/// Settled random board using the default generator settings.
pub fn initialize_board<R: Rng + ?Sized>(size: Coord, rng: &mut R) -> Result<Board> {
    RandomBoardGenerator::default().generate(size, rng)
}
