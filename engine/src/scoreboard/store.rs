use std::sync::Mutex;

use super::{
    FileScoreProvider, MemoryScoreProvider, ScoreContentProvider, ScoreSerializer, Scoreboard,
    YamlScoreSerializer,
};
use crate::log;
use crate::types::Mark;

/// Load-on-open, write-through score ledger. A missing or unreadable
/// record loads as all zeros; a failed write is logged and the in-memory
/// counters stay authoritative for the rest of the process.
pub struct ScoreStore {
    provider: Box<dyn ScoreContentProvider>,
    serializer: Box<dyn ScoreSerializer>,
    scores: Mutex<Scoreboard>,
}

impl ScoreStore {
    pub fn open(
        provider: Box<dyn ScoreContentProvider>,
        serializer: Box<dyn ScoreSerializer>,
    ) -> Self {
        let scores = match provider.read() {
            Ok(Some(content)) => match serializer.deserialize(&content) {
                Ok(scores) => scores,
                Err(e) => {
                    log!("Stored scores are unreadable, starting from zero: {}", e);
                    Scoreboard::default()
                }
            },
            Ok(None) => Scoreboard::default(),
            Err(e) => {
                log!("Stored scores are unavailable, starting from zero: {}", e);
                Scoreboard::default()
            }
        };

        Self {
            provider,
            serializer,
            scores: Mutex::new(scores),
        }
    }

    pub fn yaml_file(path: impl Into<std::path::PathBuf>) -> Self {
        Self::open(
            Box::new(FileScoreProvider::new(path)),
            Box::new(YamlScoreSerializer::new()),
        )
    }

    pub fn in_memory() -> Self {
        Self::open(
            Box::new(MemoryScoreProvider::new()),
            Box::new(YamlScoreSerializer::new()),
        )
    }

    pub fn scores(&self) -> Scoreboard {
        *self.scores.lock().unwrap()
    }

    pub fn credit_win(&self, winner: Mark) -> Scoreboard {
        self.update(|scores| scores.credit_win(winner))
    }

    pub fn credit_draw(&self) -> Scoreboard {
        self.update(|scores| scores.credit_draw())
    }

    pub fn reset(&self) -> Scoreboard {
        self.update(|scores| *scores = Scoreboard::default())
    }

    fn update(&self, apply: impl FnOnce(&mut Scoreboard)) -> Scoreboard {
        let mut scores = self.scores.lock().unwrap();
        apply(&mut scores);
        let updated = *scores;
        drop(scores);
        self.persist(updated);
        updated
    }

    fn persist(&self, scores: Scoreboard) {
        let result = self
            .serializer
            .serialize(&scores)
            .and_then(|content| self.provider.write(&content));
        if let Err(e) = result {
            log!("Failed to persist scores: {}", e);
        }
    }
}
