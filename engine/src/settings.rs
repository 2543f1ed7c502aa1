use crate::error::GameError;
use crate::types::{GameMode, Mark, ScoringMode};

pub const MIN_BOARD_SIZE: usize = 3;
/// Upper bound keeps a single minimax move tractable; see the depth limits
/// in the opponent engine.
pub const MAX_BOARD_SIZE: usize = 20;

/// Display names shown next to the marks in status lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerNames {
    pub x: String,
    pub o: String,
}

impl Default for PlayerNames {
    fn default() -> Self {
        Self {
            x: "Player X".to_string(),
            o: "Player O".to_string(),
        }
    }
}

impl PlayerNames {
    pub fn of(&self, mark: Mark) -> &str {
        match mark {
            Mark::X => &self.x,
            Mark::O => &self.o,
            Mark::Empty => "-",
        }
    }
}

#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub board_size: usize,
    pub mode: GameMode,
    pub scoring: ScoringMode,
    pub names: PlayerNames,
    /// Fixes every random decision of the session; `None` draws a fresh
    /// seed.
    pub seed: Option<u64>,
}

impl SessionSettings {
    pub fn new(board_size: usize, mode: GameMode) -> Self {
        Self {
            board_size,
            mode,
            scoring: ScoringMode::default(),
            names: PlayerNames::default(),
            seed: None,
        }
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.board_size < MIN_BOARD_SIZE || self.board_size > MAX_BOARD_SIZE {
            return Err(GameError::InvalidBoardSize {
                size: self.board_size,
            });
        }
        Ok(())
    }
}
