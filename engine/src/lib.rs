pub mod logger;

mod board;
mod bot_controller;
mod error;
mod game_state;
mod patterns;
mod rng;
mod scoreboard;
mod session;
mod settings;
mod types;
mod win_detector;

pub use board::Board;
pub use bot_controller::{BotInput, minimax_move, select_move};
pub use error::GameError;
pub use game_state::GameState;
pub use patterns::{Pattern, PatternSet, generate_patterns, pattern_count};
pub use rng::SessionRng;
pub use scoreboard::{
    FileScoreProvider, MemoryScoreProvider, ScoreContentProvider, ScoreSerializer, ScoreStore,
    Scoreboard, YamlScoreSerializer,
};
pub use session::{BOT_MOVE_DELAY, GameSession, MoveOutcome};
pub use settings::{MAX_BOARD_SIZE, MIN_BOARD_SIZE, PlayerNames, SessionSettings};
pub use types::{Difficulty, GameMode, GameStatus, Mark, Position, ScoringMode};
pub use win_detector::{DetectedWin, first_win, scan, win_through};
