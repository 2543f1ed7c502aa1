use std::collections::HashSet;

use crate::patterns::{Pattern, PatternSet};
use crate::types::{Mark, Position};

/// A newly completed line: the pattern that matched and the mark that
/// filled it. `pattern_index` is the pattern's position in the session's
/// pattern list and doubles as its identity in the scored set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetectedWin {
    pub pattern_index: usize,
    pub pattern: Pattern,
    pub winner: Mark,
}

impl DetectedWin {
    /// Line endpoints in grid coordinates, for collaborators that draw the
    /// line over the board.
    pub fn endpoints(&self, board_size: usize) -> (Position, Position) {
        (self.pattern.start(board_size), self.pattern.end(board_size))
    }
}

fn pattern_winner(cells: &[Mark], pattern: &Pattern) -> Option<Mark> {
    let [a, b, c] = pattern.cells();
    let mark = cells[a];
    if mark != Mark::Empty && cells[b] == mark && cells[c] == mark {
        Some(mark)
    } else {
        None
    }
}

/// Tests every pattern not yet in `scored` against the board, in pattern
/// order. Each match is emitted once and added to `scored`, so a line can
/// never be credited twice in a session no matter how often the board is
/// rescanned. A single move may complete several lines at once; all of
/// them come back from the same call.
pub fn scan(cells: &[Mark], patterns: &PatternSet, scored: &mut HashSet<usize>) -> Vec<DetectedWin> {
    let mut wins = Vec::new();
    for (pattern_index, pattern) in patterns.patterns().iter().enumerate() {
        if scored.contains(&pattern_index) {
            continue;
        }
        if let Some(winner) = pattern_winner(cells, pattern) {
            scored.insert(pattern_index);
            wins.push(DetectedWin {
                pattern_index,
                pattern: *pattern,
                winner,
            });
        }
    }
    wins
}

/// Single-winner terminal test: the first completed line on the board,
/// independent of what has already been scored. This is the rule the
/// minimax search plays by, since search must treat the game as decided
/// the instant any line completes.
pub fn first_win(cells: &[Mark], patterns: &PatternSet) -> Option<Mark> {
    patterns
        .patterns()
        .iter()
        .find_map(|pattern| pattern_winner(cells, pattern))
}

/// Like `first_win`, but only looks at lines through `last_move`. After a
/// single placement those are the only lines that can have changed.
pub fn win_through(cells: &[Mark], patterns: &PatternSet, last_move: usize) -> Option<Mark> {
    patterns
        .through(last_move)
        .iter()
        .find_map(|&pattern_index| pattern_winner(cells, &patterns.patterns()[pattern_index]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(size: usize, marks: &[(usize, Mark)]) -> Vec<Mark> {
        let mut cells = vec![Mark::Empty; size * size];
        for &(index, mark) in marks {
            cells[index] = mark;
        }
        cells
    }

    #[test]
    fn test_no_win_on_mixed_line() {
        let patterns = PatternSet::new(3);
        let cells = board_from(3, &[(0, Mark::X), (1, Mark::O), (2, Mark::X)]);
        let mut scored = HashSet::new();
        assert!(scan(&cells, &patterns, &mut scored).is_empty());
        assert_eq!(first_win(&cells, &patterns), None);
    }

    #[test]
    fn test_single_column_win() {
        let patterns = PatternSet::new(3);
        let cells = board_from(3, &[(1, Mark::X), (4, Mark::X), (7, Mark::X)]);
        let mut scored = HashSet::new();

        let wins = scan(&cells, &patterns, &mut scored);
        assert_eq!(wins.len(), 1);
        assert_eq!(wins[0].pattern.cells(), [1, 4, 7]);
        assert_eq!(wins[0].winner, Mark::X);
        assert!(scored.contains(&wins[0].pattern_index));
    }

    #[test]
    fn test_scored_pattern_is_never_reemitted() {
        let patterns = PatternSet::new(3);
        let cells = board_from(3, &[(0, Mark::O), (1, Mark::O), (2, Mark::O)]);
        let mut scored = HashSet::new();

        assert_eq!(scan(&cells, &patterns, &mut scored).len(), 1);
        // The cells still match, but the pattern is already credited.
        assert!(scan(&cells, &patterns, &mut scored).is_empty());
    }

    #[test]
    fn test_one_move_completes_two_lines_at_once() {
        let patterns = PatternSet::new(3);
        // X on the full middle row and the full down-right diagonal; the
        // center cell is shared, so placing it last completes both.
        let cells = board_from(
            3,
            &[
                (3, Mark::X),
                (5, Mark::X),
                (0, Mark::X),
                (8, Mark::X),
                (4, Mark::X),
            ],
        );
        let mut scored = HashSet::new();

        let wins = scan(&cells, &patterns, &mut scored);
        assert_eq!(wins.len(), 2);
        let lines: Vec<[usize; 3]> = wins.iter().map(|w| w.pattern.cells()).collect();
        assert!(lines.contains(&[3, 4, 5]));
        assert!(lines.contains(&[0, 4, 8]));
        assert!(wins.iter().all(|w| w.winner == Mark::X));
    }

    #[test]
    fn test_emission_follows_pattern_order() {
        let patterns = PatternSet::new(3);
        let cells = board_from(
            3,
            &[
                (3, Mark::X),
                (5, Mark::X),
                (0, Mark::X),
                (8, Mark::X),
                (4, Mark::X),
            ],
        );
        let mut scored = HashSet::new();

        let wins = scan(&cells, &patterns, &mut scored);
        // The middle row is enumerated before the diagonal.
        assert_eq!(wins[0].pattern.cells(), [3, 4, 5]);
        assert_eq!(wins[1].pattern.cells(), [0, 4, 8]);
        assert!(wins[0].pattern_index < wins[1].pattern_index);
    }

    #[test]
    fn test_win_through_only_sees_lines_over_last_move() {
        let patterns = PatternSet::new(3);
        let cells = board_from(3, &[(0, Mark::O), (1, Mark::O), (2, Mark::O)]);
        assert_eq!(win_through(&cells, &patterns, 1), Some(Mark::O));
        assert_eq!(win_through(&cells, &patterns, 8), None);
    }

    #[test]
    fn test_endpoints_of_detected_win() {
        let patterns = PatternSet::new(3);
        let cells = board_from(3, &[(2, Mark::X), (4, Mark::X), (6, Mark::X)]);
        let mut scored = HashSet::new();

        let wins = scan(&cells, &patterns, &mut scored);
        let (start, end) = wins[0].endpoints(3);
        assert_eq!(start, Position::new(0, 2));
        assert_eq!(end, Position::new(2, 0));
    }
}
