pub mod schema;
pub mod sql_store;

use async_trait::async_trait;

use crate::error::SessionResult;
use crate::model::SessionRecord;

/// Persistence contract for session documents.
///
/// Every operation is keyed by username; implementations resolve it to the
/// internal user id themselves. Payloads are opaque strings and are never
/// parsed here.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// `false` for an unknown username, never an error.
    async fn is_user(&self, username: &str) -> SessionResult<bool>;

    /// `true` iff the user has a record with a non-empty session value.
    async fn has_session(&self, username: &str) -> SessionResult<bool>;

    /// All records for the user, most recently updated first. Empty when the
    /// user or the record is absent.
    async fn get_sessions(&self, username: &str) -> SessionResult<Vec<SessionRecord>>;

    /// Fails with `UnknownUser` when the username does not resolve.
    async fn insert_session(&self, username: &str, session: &str) -> SessionResult<()>;

    /// Overwrites the user's record. Affecting zero rows is not an error.
    async fn update_session(&self, username: &str, session: &str) -> SessionResult<()>;

    /// Idempotent; succeeds whether or not anything was removed.
    async fn delete_session(&self, username: &str) -> SessionResult<()>;
}
