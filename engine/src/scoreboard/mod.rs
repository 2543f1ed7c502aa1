mod content_provider;
mod serializer;
mod store;

pub use content_provider::{FileScoreProvider, MemoryScoreProvider, ScoreContentProvider};
pub use serializer::{ScoreSerializer, YamlScoreSerializer};
pub use store::ScoreStore;

use serde::{Deserialize, Serialize};

use crate::types::Mark;

/// Win and draw counters. These survive session resets and only go back
/// to zero through an explicit score reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scoreboard {
    pub x: u32,
    pub o: u32,
    pub draws: u32,
}

impl Scoreboard {
    pub fn credit_win(&mut self, winner: Mark) {
        match winner {
            Mark::X => self.x += 1,
            Mark::O => self.o += 1,
            Mark::Empty => {}
        }
    }

    pub fn credit_draw(&mut self) {
        self.draws += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_win_per_mark() {
        let mut scores = Scoreboard::default();
        scores.credit_win(Mark::X);
        scores.credit_win(Mark::X);
        scores.credit_win(Mark::O);
        scores.credit_draw();
        assert_eq!(
            scores,
            Scoreboard {
                x: 2,
                o: 1,
                draws: 1
            }
        );
    }

    #[test]
    fn test_empty_mark_is_not_credited() {
        let mut scores = Scoreboard::default();
        scores.credit_win(Mark::Empty);
        assert_eq!(scores, Scoreboard::default());
    }
}
