use super::Scoreboard;

pub trait ScoreSerializer: Send + Sync {
    fn serialize(&self, scores: &Scoreboard) -> Result<String, String>;
    fn deserialize(&self, content: &str) -> Result<Scoreboard, String>;
}

/// Persists the record as a three-field YAML document.
#[derive(Default)]
pub struct YamlScoreSerializer;

impl YamlScoreSerializer {
    pub fn new() -> Self {
        Self {}
    }
}

impl ScoreSerializer for YamlScoreSerializer {
    fn serialize(&self, scores: &Scoreboard) -> Result<String, String> {
        serde_yaml_ng::to_string(scores).map_err(|e| format!("Failed to serialize scores: {}", e))
    }

    fn deserialize(&self, content: &str) -> Result<Scoreboard, String> {
        serde_yaml_ng::from_str(content).map_err(|e| format!("Failed to deserialize scores: {}", e))
    }
}
