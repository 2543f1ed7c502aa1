use std::fmt;

/// Rejection reasons for engine operations. All of these are recoverable:
/// the caller reports the reason and keeps the session going.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameError {
    InvalidBoardSize { size: usize },
    InvalidIndex { index: usize, cell_count: usize },
    CellOccupied { index: usize },
    SessionInactive,
    NotYourTurn,
    NoLegalMove,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidBoardSize { size } => {
                write!(f, "Board size {} is not supported", size)
            }
            GameError::InvalidIndex { index, cell_count } => {
                write!(f, "Cell index {} is outside the board (0..{})", index, cell_count)
            }
            GameError::CellOccupied { index } => {
                write!(f, "Cell {} is already marked", index)
            }
            GameError::SessionInactive => write!(f, "Game is already over"),
            GameError::NotYourTurn => write!(f, "Not your turn"),
            GameError::NoLegalMove => write!(f, "No empty cell left to play"),
        }
    }
}

impl std::error::Error for GameError {}
