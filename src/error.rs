use thiserror::Error;

/// Errors raised by the board engine and the environment around it.
///
/// None of these are transient: each one is either bad caller input or a
/// broken internal invariant, so callers should not retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("cell ({row}, {col}) is outside a {size}x{size} board")]
    IndexOutOfRange { row: usize, col: usize, size: usize },
    #[error("no empty cell left to spawn a tile")]
    BoardFull,
}

pub type Result<T> = std::result::Result<T, EngineError>;
