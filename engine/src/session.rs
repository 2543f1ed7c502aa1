use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;

use crate::bot_controller::{self, BotInput};
use crate::error::GameError;
use crate::game_state::GameState;
use crate::log;
use crate::patterns::PatternSet;
use crate::rng::SessionRng;
use crate::scoreboard::{ScoreStore, Scoreboard};
use crate::settings::SessionSettings;
use crate::types::{GameMode, GameStatus, Mark};
use crate::win_detector::DetectedWin;

/// Pause between a move and the bot's reply, so a renderer gets a frame in
/// before the answer lands. Scheduling only; never needed for correctness.
pub const BOT_MOVE_DELAY: Duration = Duration::from_millis(300);

/// What one accepted move did to the session.
#[derive(Clone, Debug)]
pub struct MoveOutcome {
    pub new_wins: Vec<DetectedWin>,
    pub status: GameStatus,
    pub current_mark: Mark,
}

/// One running game. Owns the board, the scored-pattern set and the turn
/// state; shares the score ledger with the rest of the process. In vs-bot
/// mode the bot's replies are applied through the same acceptance path as
/// human moves, after a short deferred delay.
///
/// Cloning hands out another handle to the same session. Vs-bot sessions
/// must be created inside a Tokio runtime, since the bot plays from a
/// spawned task.
#[derive(Clone)]
pub struct GameSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    settings: SessionSettings,
    store: Arc<ScoreStore>,
    state: Mutex<GameState>,
    rng: Mutex<SessionRng>,
    pending_wins: Mutex<Vec<DetectedWin>>,
    /// Bumped on every restart; a deferred bot task from an older epoch
    /// must not touch the board.
    epoch: AtomicU64,
}

enum Mover {
    Human,
    Bot { epoch: u64 },
}

impl GameSession {
    pub fn start(settings: SessionSettings, store: Arc<ScoreStore>) -> Result<Self, GameError> {
        settings.validate()?;
        if let GameMode::VsBot { bot_mark, .. } = settings.mode {
            assert!(bot_mark != Mark::Empty, "the bot must play X or O");
        }

        let patterns = Arc::new(PatternSet::new(settings.board_size));
        let rng = match settings.seed {
            Some(seed) => SessionRng::new(seed),
            None => SessionRng::from_random(),
        };
        log!(
            "Session started: {0}x{0} board, {1} winning lines, seed {2}",
            settings.board_size,
            patterns.len(),
            rng.seed()
        );

        let state = GameState::new(patterns, settings.scoring);
        let session = Self {
            inner: Arc::new(SessionInner {
                settings,
                store,
                state: Mutex::new(state),
                rng: Mutex::new(rng),
                pending_wins: Mutex::new(Vec::new()),
                epoch: AtomicU64::new(0),
            }),
        };

        // X opens; when the bot holds X it must play without waiting for
        // a human move.
        schedule_bot_turn(&session.inner, Mark::X);
        Ok(session)
    }

    /// Entry point for moves from outside the session. In vs-bot mode the
    /// bot's turn is closed to outside moves.
    pub async fn submit_move(&self, index: usize) -> Result<MoveOutcome, GameError> {
        apply_move(&self.inner, index, Mover::Human).await
    }

    /// Newly completed lines since the previous call (or since the session
    /// started), in detection order. Draining, so a polling collaborator
    /// reports each line exactly once.
    pub async fn winning_lines_found(&self) -> Vec<DetectedWin> {
        std::mem::take(&mut *self.inner.pending_wins.lock().await)
    }

    pub async fn status(&self) -> GameStatus {
        self.inner.state.lock().await.status()
    }

    pub async fn is_terminal(&self) -> bool {
        self.status().await.is_terminal()
    }

    pub async fn current_mark(&self) -> Mark {
        self.inner.state.lock().await.current_mark()
    }

    pub async fn board_cells(&self) -> Vec<Mark> {
        self.inner.state.lock().await.board().cells().to_vec()
    }

    /// Lines each side completed in this session (not the ledger).
    pub async fn line_tally(&self) -> (u32, u32) {
        self.inner.state.lock().await.line_tally()
    }

    pub fn scores(&self) -> Scoreboard {
        self.inner.store.scores()
    }

    /// Zeroes the ledger. Independent of any board reset.
    pub fn reset_scores(&self) -> Scoreboard {
        self.inner.store.reset()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.inner.settings
    }

    pub fn board_size(&self) -> usize {
        self.inner.settings.board_size
    }

    /// Clears the board and the scored-pattern set for a fresh game with
    /// the same settings. The ledger is untouched. Any bot move still in
    /// flight is invalidated.
    pub async fn restart(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.state.lock().await.restart();
        self.inner.pending_wins.lock().await.clear();
        log!("Session restarted");
        schedule_bot_turn(&self.inner, Mark::X);
    }
}

async fn apply_move(
    inner: &Arc<SessionInner>,
    index: usize,
    mover: Mover,
) -> Result<MoveOutcome, GameError> {
    let outcome = {
        let mut state = inner.state.lock().await;

        match mover {
            Mover::Human => {
                if let Some(bot_mark) = inner.settings.mode.bot_mark()
                    && state.current_mark() == bot_mark
                    && state.status() == GameStatus::InProgress
                {
                    return Err(GameError::NotYourTurn);
                }
            }
            Mover::Bot { epoch } => {
                // The session may have been restarted while the bot was
                // thinking; its move belongs to a board that is gone.
                if inner.epoch.load(Ordering::SeqCst) != epoch {
                    return Err(GameError::SessionInactive);
                }
            }
        }

        let mark = state.current_mark();
        let new_wins = state.place_mark(index, mark)?;

        for win in &new_wins {
            inner.store.credit_win(win.winner);
        }
        if state.status() == GameStatus::Draw {
            inner.store.credit_draw();
        }

        MoveOutcome {
            new_wins,
            status: state.status(),
            current_mark: state.current_mark(),
        }
    };

    if !outcome.new_wins.is_empty() {
        let mut pending = inner.pending_wins.lock().await;
        pending.extend(outcome.new_wins.iter().copied());
    }

    if outcome.status.is_terminal() {
        log!("Session over: {:?}", outcome.status);
    } else {
        schedule_bot_turn(inner, outcome.current_mark);
    }

    Ok(outcome)
}

/// Defers the bot's reply when it is the bot's turn; a no-op otherwise.
fn schedule_bot_turn(inner: &Arc<SessionInner>, current_mark: Mark) {
    let GameMode::VsBot {
        difficulty,
        bot_mark,
    } = inner.settings.mode
    else {
        return;
    };
    if current_mark != bot_mark {
        return;
    }

    let inner = inner.clone();
    let epoch = inner.epoch.load(Ordering::SeqCst);
    tokio::spawn(async move {
        tokio::time::sleep(BOT_MOVE_DELAY).await;

        if inner.epoch.load(Ordering::SeqCst) != epoch {
            return;
        }

        let input = {
            let state = inner.state.lock().await;
            if state.status() != GameStatus::InProgress || state.current_mark() != bot_mark {
                return;
            }
            BotInput::new(
                state.board().cells().to_vec(),
                state.patterns().clone(),
                bot_mark,
            )
        };

        // The search can take a while on wide boards; keep it off the
        // async workers, with an RNG forked from the session's.
        let fork_seed = inner.rng.lock().await.fork_seed();
        let selected = tokio::task::spawn_blocking(move || {
            let mut rng = SessionRng::new(fork_seed);
            bot_controller::select_move(difficulty, &input, &mut rng)
        })
        .await;

        let index = match selected {
            Ok(Ok(index)) => index,
            Ok(Err(e)) => {
                log!("Bot could not move: {}", e);
                return;
            }
            Err(e) => {
                log!("Bot task failed: {}", e);
                return;
            }
        };

        if let Err(e) = apply_move(&inner, index, Mover::Bot { epoch }).await {
            log!("Bot move at {} was discarded: {}", index, e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Difficulty, ScoringMode};

    fn two_player(size: usize, scoring: ScoringMode) -> GameSession {
        let mut settings = SessionSettings::new(size, GameMode::TwoPlayer);
        settings.scoring = scoring;
        GameSession::start(settings, Arc::new(ScoreStore::in_memory())).unwrap()
    }

    fn vs_bot(difficulty: Difficulty, bot_mark: Mark) -> GameSession {
        let mut settings = SessionSettings::new(
            3,
            GameMode::VsBot {
                difficulty,
                bot_mark,
            },
        );
        settings.seed = Some(7);
        GameSession::start(settings, Arc::new(ScoreStore::in_memory())).unwrap()
    }

    async fn settle_bot(_session: &GameSession) {
        tokio::time::sleep(BOT_MOVE_DELAY + Duration::from_millis(300)).await;
    }

    #[tokio::test]
    async fn test_rejected_board_sizes() {
        let settings = SessionSettings::new(2, GameMode::TwoPlayer);
        let result = GameSession::start(settings, Arc::new(ScoreStore::in_memory()));
        assert!(matches!(
            result.map(|_| ()),
            Err(GameError::InvalidBoardSize { size: 2 })
        ));
    }

    #[tokio::test]
    async fn test_column_win_scenario() {
        let session = two_player(3, ScoringMode::ContinuousMultiWin);

        session.submit_move(4).await.unwrap();
        session.submit_move(0).await.unwrap();

        let cells_before = session.board_cells().await;
        assert_eq!(
            session.submit_move(0).await.map(|_| ()),
            Err(GameError::CellOccupied { index: 0 })
        );
        assert_eq!(session.board_cells().await, cells_before);

        session.submit_move(1).await.unwrap();
        session.submit_move(3).await.unwrap();
        assert!(session.winning_lines_found().await.is_empty());

        let outcome = session.submit_move(7).await.unwrap();
        assert_eq!(outcome.new_wins.len(), 1);
        assert_eq!(outcome.new_wins[0].pattern.cells(), [1, 4, 7]);
        assert_eq!(outcome.new_wins[0].winner, Mark::X);
        assert_eq!(session.scores().x, 1);
    }

    #[tokio::test]
    async fn test_winning_lines_query_drains() {
        let session = two_player(3, ScoringMode::ContinuousMultiWin);
        session.submit_move(4).await.unwrap();
        session.submit_move(0).await.unwrap();
        session.submit_move(1).await.unwrap();
        session.submit_move(3).await.unwrap();
        session.submit_move(7).await.unwrap();

        let lines = session.winning_lines_found().await;
        assert_eq!(lines.len(), 1);
        assert!(session.winning_lines_found().await.is_empty());
    }

    #[tokio::test]
    async fn test_single_winner_session_goes_terminal() {
        let session = two_player(3, ScoringMode::SingleWinner);
        session.submit_move(0).await.unwrap();
        session.submit_move(3).await.unwrap();
        session.submit_move(1).await.unwrap();
        session.submit_move(4).await.unwrap();
        let outcome = session.submit_move(2).await.unwrap();

        assert_eq!(outcome.status, GameStatus::XWon);
        assert!(session.is_terminal().await);
        assert_eq!(
            session.submit_move(5).await.map(|_| ()),
            Err(GameError::SessionInactive)
        );
        assert_eq!(session.scores().x, 1);
    }

    #[tokio::test]
    async fn test_score_reset_round_trip() {
        let session = two_player(3, ScoringMode::SingleWinner);
        session.submit_move(0).await.unwrap();
        session.submit_move(3).await.unwrap();
        session.submit_move(1).await.unwrap();
        session.submit_move(4).await.unwrap();
        session.submit_move(2).await.unwrap();
        assert_eq!(session.scores().x, 1);

        let scores = session.reset_scores();
        assert_eq!(scores, Scoreboard::default());
        assert_eq!(session.scores(), Scoreboard::default());
    }

    #[tokio::test]
    async fn test_bot_replies_after_the_delay() {
        let session = vs_bot(Difficulty::Hard, Mark::O);
        session.submit_move(4).await.unwrap();

        // The bot's cell is closed while its reply is pending.
        assert_eq!(
            session.submit_move(0).await.map(|_| ()),
            Err(GameError::NotYourTurn)
        );

        settle_bot(&session).await;
        let cells = session.board_cells().await;
        assert_eq!(cells.iter().filter(|c| **c == Mark::O).count(), 1);
        assert_eq!(session.current_mark().await, Mark::X);
    }

    #[tokio::test]
    async fn test_bot_holding_x_opens_the_game() {
        let session = vs_bot(Difficulty::Easy, Mark::X);
        settle_bot(&session).await;

        let cells = session.board_cells().await;
        assert_eq!(cells.iter().filter(|c| **c == Mark::X).count(), 1);
        assert_eq!(session.current_mark().await, Mark::O);
    }

    #[tokio::test]
    async fn test_stale_bot_move_is_discarded_after_restart() {
        let session = vs_bot(Difficulty::Hard, Mark::O);
        session.submit_move(4).await.unwrap();
        // Restart lands while the bot reply is still deferred.
        session.restart().await;

        settle_bot(&session).await;
        let cells = session.board_cells().await;
        assert!(
            cells.iter().all(|c| *c == Mark::Empty),
            "stale bot move reached a fresh board: {:?}",
            cells
        );
    }

    #[tokio::test]
    async fn test_restart_keeps_ledger() {
        let session = two_player(3, ScoringMode::SingleWinner);
        session.submit_move(0).await.unwrap();
        session.submit_move(3).await.unwrap();
        session.submit_move(1).await.unwrap();
        session.submit_move(4).await.unwrap();
        session.submit_move(2).await.unwrap();
        assert_eq!(session.scores().x, 1);

        session.restart().await;
        assert!(!session.is_terminal().await);
        assert!(session.winning_lines_found().await.is_empty());
        assert_eq!(session.scores().x, 1);
    }

    #[tokio::test]
    async fn test_continuous_draw_credits_the_ledger() {
        let session = two_player(3, ScoringMode::ContinuousMultiWin);
        for index in [0, 1, 2, 3, 5, 4, 6, 8, 7] {
            session.submit_move(index).await.unwrap();
        }
        assert_eq!(session.status().await, GameStatus::Draw);
        let scores = session.scores();
        assert_eq!((scores.x, scores.o, scores.draws), (0, 0, 1));
    }
}
