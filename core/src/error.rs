use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Swap positions are not adjacent")]
    InvalidSwap,
    #[error("Board shape must be square and at least 3 cells wide")]
    InvalidBoardShape,
    #[error("Board has empty cells or matches")]
    UnsettledBoard,
    #[error("Could not generate a board without matches")]
    GenerationExhausted,
    #[error("Cascade did not settle within {0} passes")]
    CascadeLimitExceeded(u32),
}

pub type Result<T> = core::result::Result<T, GameError>;
