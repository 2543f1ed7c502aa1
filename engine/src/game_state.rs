use std::collections::HashSet;
use std::sync::Arc;

use crate::board::Board;
use crate::error::GameError;
use crate::patterns::PatternSet;
use crate::types::{GameStatus, Mark, ScoringMode};
use crate::win_detector::{self, DetectedWin};

/// The synchronous rules core of one session: board, scored-pattern set,
/// turn state and terminal detection. Scheduling, scores and the bot all
/// live above this in the session controller.
#[derive(Debug)]
pub struct GameState {
    board: Board,
    patterns: Arc<PatternSet>,
    scored: HashSet<usize>,
    scoring: ScoringMode,
    current_mark: Mark,
    status: GameStatus,
    x_lines: u32,
    o_lines: u32,
    last_move: Option<usize>,
}

impl GameState {
    pub fn new(patterns: Arc<PatternSet>, scoring: ScoringMode) -> Self {
        let board = Board::new(patterns.board_size());
        Self {
            board,
            patterns,
            scored: HashSet::new(),
            scoring,
            current_mark: Mark::X,
            status: GameStatus::InProgress,
            x_lines: 0,
            o_lines: 0,
            last_move: None,
        }
    }

    /// Applies one validated move: place, detect newly completed lines,
    /// check for the end of the session, and hand the turn over if it is
    /// still running. Returns every line this move completed.
    pub fn place_mark(&mut self, index: usize, mark: Mark) -> Result<Vec<DetectedWin>, GameError> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::SessionInactive);
        }
        if mark != self.current_mark {
            return Err(GameError::NotYourTurn);
        }

        self.board.place(index, mark)?;
        self.last_move = Some(index);

        let wins = win_detector::scan(self.board.cells(), &self.patterns, &mut self.scored);
        for win in &wins {
            match win.winner {
                Mark::X => self.x_lines += 1,
                Mark::O => self.o_lines += 1,
                Mark::Empty => {}
            }
        }

        self.check_game_over(&wins);
        if self.status == GameStatus::InProgress {
            self.switch_turn();
        }

        Ok(wins)
    }

    fn check_game_over(&mut self, new_wins: &[DetectedWin]) {
        match self.scoring {
            ScoringMode::SingleWinner => {
                if let Some(first) = new_wins.first() {
                    self.status = match first.winner {
                        Mark::X => GameStatus::XWon,
                        Mark::O => GameStatus::OWon,
                        Mark::Empty => unreachable!(),
                    };
                    return;
                }
                if self.board.is_full() {
                    self.status = GameStatus::Draw;
                }
            }
            ScoringMode::ContinuousMultiWin => {
                if self.board.is_full() {
                    self.status = if self.x_lines > self.o_lines {
                        GameStatus::XWon
                    } else if self.o_lines > self.x_lines {
                        GameStatus::OWon
                    } else {
                        GameStatus::Draw
                    };
                }
            }
        }
    }

    fn switch_turn(&mut self) {
        if let Some(next) = self.current_mark.opponent() {
            self.current_mark = next;
        }
    }

    /// Back to an empty board and a fresh scored set; X opens, as always.
    pub fn restart(&mut self) {
        self.board.clear();
        self.scored.clear();
        self.current_mark = Mark::X;
        self.status = GameStatus::InProgress;
        self.x_lines = 0;
        self.o_lines = 0;
        self.last_move = None;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn patterns(&self) -> &Arc<PatternSet> {
        &self.patterns
    }

    pub fn scoring(&self) -> ScoringMode {
        self.scoring
    }

    pub fn current_mark(&self) -> Mark {
        self.current_mark
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn last_move(&self) -> Option<usize> {
        self.last_move
    }

    /// Lines each side completed in this session.
    pub fn line_tally(&self) -> (u32, u32) {
        (self.x_lines, self.o_lines)
    }
}
