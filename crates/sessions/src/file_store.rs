//! File-based session store — one JSON file per session.
//!
//! Storage layout: `<dir>/<session_id>.json`, pretty-printed so the
//! records stay human-inspectable. The directory is created on the
//! first write.

use async_trait::async_trait;
use docent_core::error::StoreError;
use docent_core::message::{Session, SessionId};
use docent_core::store::SessionStore;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given directory. The directory is
    /// not required to exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default location: `~/.docent/sessions`
    pub fn default_dir() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".docent").join("sessions")
    }

    fn path_for(&self, id: &SessionId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        let path = self.path_for(id);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        let session = serde_json::from_str(&content).map_err(|e| {
            StoreError::Corrupt(format!("{}: {e}", path.display()))
        })?;
        Ok(Some(session))
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            StoreError::Storage(format!("failed to create session directory: {e}"))
        })?;

        let content = serde_json::to_string_pretty(session)
            .map_err(|e| StoreError::Storage(format!("failed to serialize session: {e}")))?;

        let path = self.path_for(&session.session_id);
        std::fs::write(&path, content).map_err(|e| {
            StoreError::Storage(format!("failed to write {}: {e}", path.display()))
        })?;

        debug!(session = %session.session_id, messages = session.len(), "session saved");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SessionId>, StoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            // no directory yet means no sessions yet
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Storage(format!(
                    "failed to read session directory: {e}"
                )));
            }
        };

        let mut ids: Vec<SessionId> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
            .filter_map(|path| stem_of(&path).map(SessionId::from))
            .collect();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(ids)
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, StoreError> {
        let path = self.path_for(id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Storage(format!(
                "failed to delete {}: {e}",
                path.display()
            ))),
        }
    }
}

fn stem_of(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().to_string())
}
