use std::path::PathBuf;
use std::sync::Mutex;

/// Storage backend for the persisted score record.
pub trait ScoreContentProvider: Send + Sync {
    /// `Ok(None)` means no record exists yet.
    fn read(&self) -> Result<Option<String>, String>;
    fn write(&self, content: &str) -> Result<(), String>;
}

pub struct FileScoreProvider {
    path: PathBuf,
}

impl FileScoreProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ScoreContentProvider for FileScoreProvider {
    fn read(&self) -> Result<Option<String>, String> {
        if !self.path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|e| format!("Failed to read scores from {}: {}", self.path.display(), e))
    }

    fn write(&self, content: &str) -> Result<(), String> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        std::fs::write(&self.path, content)
            .map_err(|e| format!("Failed to write scores to {}: {}", self.path.display(), e))
    }
}

/// Keeps the record in memory only. Used by tests and by embedders that
/// do not want anything touching the filesystem.
#[derive(Default)]
pub struct MemoryScoreProvider {
    content: Mutex<Option<String>>,
}

impl MemoryScoreProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(content: &str) -> Self {
        Self {
            content: Mutex::new(Some(content.to_string())),
        }
    }
}

impl ScoreContentProvider for MemoryScoreProvider {
    fn read(&self) -> Result<Option<String>, String> {
        Ok(self.content.lock().unwrap().clone())
    }

    fn write(&self, content: &str) -> Result<(), String> {
        *self.content.lock().unwrap() = Some(content.to_string());
        Ok(())
    }
}
