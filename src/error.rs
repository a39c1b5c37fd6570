use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("level numbers start at 1")]
    InvalidLevel,
    #[error("position outside the grid")]
    InvalidPos,
    #[error("stored board does not describe a valid paired grid")]
    InvalidBoardShape,
}

pub type Result<T> = core::result::Result<T, GameError>;
