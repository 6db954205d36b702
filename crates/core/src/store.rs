//! SessionStore trait — the seam to session persistence.

use crate::error::StoreError;
use crate::message::{Session, SessionId};
use async_trait::async_trait;

/// Persists session records keyed by session id.
///
/// Records are append-only from the engine's point of view: the engine
/// loads, appends the turn's messages, and saves the whole record back.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session. An unknown id is `Ok(None)`, never an error.
    async fn load(&self, id: &SessionId)
    -> std::result::Result<Option<Session>, StoreError>;

    /// Persist a session record, replacing any previous version.
    async fn save(&self, session: &Session) -> std::result::Result<(), StoreError>;

    /// Ids of every persisted session.
    async fn list(&self) -> std::result::Result<Vec<SessionId>, StoreError>;

    /// Remove a session. Returns whether it existed.
    async fn delete(&self, id: &SessionId) -> std::result::Result<bool, StoreError>;
}
