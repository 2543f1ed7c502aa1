use std::sync::Arc;

use crate::error::GameError;
use crate::patterns::PatternSet;
use crate::rng::SessionRng;
use crate::types::{Difficulty, Mark};
use crate::win_detector::win_through;

const WIN_SCORE: i32 = 10;
const MEDIUM_RANDOM_CHANCE: f64 = 0.25;

/// Snapshot handed to the opponent engine. The engine only ever mutates
/// this copy during search; the live board is owned by the session.
#[derive(Clone)]
pub struct BotInput {
    pub cells: Vec<Mark>,
    pub patterns: Arc<PatternSet>,
    pub bot_mark: Mark,
}

impl BotInput {
    pub fn new(cells: Vec<Mark>, patterns: Arc<PatternSet>, bot_mark: Mark) -> Self {
        Self {
            cells,
            patterns,
            bot_mark,
        }
    }
}

/// Picks the bot's next cell. `easy` plays uniformly at random, `medium`
/// plays randomly with probability 0.25 and optimally otherwise, `hard`
/// always searches. Fails only when the board has no empty cell.
pub fn select_move(
    difficulty: Difficulty,
    input: &BotInput,
    rng: &mut SessionRng,
) -> Result<usize, GameError> {
    let chosen = match difficulty {
        Difficulty::Easy => random_move(input, rng),
        Difficulty::Medium => {
            if rng.random::<f64>() < MEDIUM_RANDOM_CHANCE {
                random_move(input, rng)
            } else {
                minimax_move(input)
            }
        }
        Difficulty::Hard => minimax_move(input),
    };
    chosen.ok_or(GameError::NoLegalMove)
}

fn available_moves(cells: &[Mark]) -> Vec<usize> {
    cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| **cell == Mark::Empty)
        .map(|(index, _)| index)
        .collect()
}

fn random_move(input: &BotInput, rng: &mut SessionRng) -> Option<usize> {
    let moves = available_moves(&input.cells);
    if moves.is_empty() {
        return None;
    }
    Some(moves[rng.random_range(0..moves.len())])
}

/// Adversarial search over a scratch copy of the board. The game is treated
/// as decided the instant any line completes, whatever the session's
/// scoring mode: a won search position has no further play.
///
/// Ties between equally scored moves go to the lowest cell index, so the
/// choice is deterministic.
pub fn minimax_move(input: &BotInput) -> Option<usize> {
    let moves = available_moves(&input.cells);
    if moves.is_empty() {
        return None;
    }

    let bot_mark = input.bot_mark;
    let mut cells = input.cells.clone();
    let max_depth = search_depth_limit(moves.len());
    let initial_score = evaluate(&cells, &input.patterns, bot_mark);

    let mut best_move = None;
    let mut best_score = i32::MIN;
    let mut alpha = i32::MIN;

    for &index in &moves {
        let delta = eval_delta(&cells, &input.patterns, bot_mark, index, bot_mark);
        cells[index] = bot_mark;

        let score = minimax(
            &mut cells,
            &input.patterns,
            bot_mark,
            1,
            max_depth,
            false,
            alpha,
            i32::MAX,
            index,
            initial_score + delta,
        );

        cells[index] = Mark::Empty;

        if score > best_score {
            best_score = score;
            best_move = Some(index);
        }
        alpha = alpha.max(score);
    }

    best_move
}

/// Exhaustive search is kept for endgames; wider boards get a shallower
/// horizon so a single move stays interactive.
fn search_depth_limit(moves_count: usize) -> usize {
    match moves_count {
        0..=9 => moves_count,
        10..=16 => 6,
        17..=36 => 5,
        37..=100 => 4,
        _ => 3,
    }
}

fn minimax(
    cells: &mut [Mark],
    patterns: &PatternSet,
    bot_mark: Mark,
    depth: usize,
    max_depth: usize,
    is_maximizing: bool,
    mut alpha: i32,
    mut beta: i32,
    last_move: usize,
    current_score: i32,
) -> i32 {
    if let Some(winner) = win_through(cells, patterns, last_move) {
        return if winner == bot_mark {
            WIN_SCORE
        } else {
            -WIN_SCORE
        };
    }

    let moves = available_moves(cells);
    if moves.is_empty() {
        return 0;
    }

    if depth >= max_depth {
        return current_score.clamp(-(WIN_SCORE - 1), WIN_SCORE - 1);
    }

    if is_maximizing {
        let mut max_eval = i32::MIN;
        for index in moves {
            let delta = eval_delta(cells, patterns, bot_mark, index, bot_mark);
            cells[index] = bot_mark;
            let eval = minimax(
                cells,
                patterns,
                bot_mark,
                depth + 1,
                max_depth,
                false,
                alpha,
                beta,
                index,
                current_score + delta,
            );
            cells[index] = Mark::Empty;

            max_eval = max_eval.max(eval);
            alpha = alpha.max(eval);
            if beta <= alpha {
                break;
            }
        }
        max_eval
    } else {
        let opponent_mark = bot_mark.opponent().unwrap_or(Mark::X);
        let mut min_eval = i32::MAX;
        for index in moves {
            let delta = eval_delta(cells, patterns, bot_mark, index, opponent_mark);
            cells[index] = opponent_mark;
            let eval = minimax(
                cells,
                patterns,
                bot_mark,
                depth + 1,
                max_depth,
                true,
                alpha,
                beta,
                index,
                current_score + delta,
            );
            cells[index] = Mark::Empty;

            min_eval = min_eval.min(eval);
            beta = beta.min(eval);
            if beta <= alpha {
                break;
            }
        }
        min_eval
    }
}

fn window_balance(bot_count: i32, opponent_count: i32) -> i32 {
    if opponent_count == 0 {
        bot_count * bot_count
    } else if bot_count == 0 {
        -(opponent_count * opponent_count)
    } else {
        0
    }
}

/// Positional balance over every line window: windows holding only bot
/// marks count for the bot, windows holding only opponent marks count
/// against it, contested windows are dead. Saturated into the open
/// interval between the win scores so a heuristic value can never outrank
/// a proven result.
fn evaluate(cells: &[Mark], patterns: &PatternSet, bot_mark: Mark) -> i32 {
    let mut balance = 0;
    for pattern in patterns.patterns() {
        let mut bot_count = 0;
        let mut opponent_count = 0;
        for cell in pattern.cells() {
            match cells[cell] {
                Mark::Empty => {}
                mark if mark == bot_mark => bot_count += 1,
                _ => opponent_count += 1,
            }
        }
        balance += window_balance(bot_count, opponent_count);
    }
    balance
}

/// Score change caused by placing `move_mark` at `index`, computed from
/// just the windows through that cell. Lets the search carry a running
/// evaluation instead of rescanning the board at every horizon leaf.
fn eval_delta(
    cells: &[Mark],
    patterns: &PatternSet,
    bot_mark: Mark,
    index: usize,
    move_mark: Mark,
) -> i32 {
    let mut delta = 0;
    for &pattern_index in patterns.through(index) {
        let pattern = &patterns.patterns()[pattern_index];
        let mut bot_count = 0;
        let mut opponent_count = 0;
        for cell in pattern.cells() {
            match cells[cell] {
                Mark::Empty => {}
                mark if mark == bot_mark => bot_count += 1,
                _ => opponent_count += 1,
            }
        }

        let old_score = window_balance(bot_count, opponent_count);
        let new_score = if move_mark == bot_mark {
            window_balance(bot_count + 1, opponent_count)
        } else {
            window_balance(bot_count, opponent_count + 1)
        };

        delta += new_score - old_score;
    }
    delta
}
