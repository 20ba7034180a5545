use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::document::{self, Document, Envelope};
use crate::error::{SessionError, SessionResult};
use crate::model::{SessionRecord, WriteOutcome};
use crate::store::SessionStore;

/// Request-level session operations on top of a [`SessionStore`].
///
/// Holds no state of its own besides the injected store, so it is cheap to
/// clone into every request handler.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Canonical document for `username`, or `None` when there is nothing to
    /// return.
    ///
    /// An unknown user reads exactly like a known user without a session. Only
    /// writes distinguish the two.
    #[instrument(skip(self), target = "session")]
    pub async fn fetch(&self, username: &str) -> SessionResult<Option<Vec<u8>>> {
        if !self.store.has_session(username).await? {
            debug!("no session stored");
            return Ok(None);
        }

        let Some(record) = self.latest_record(username).await? else {
            // deleted between the two queries
            debug!("session vanished before load");
            return Ok(None);
        };

        Ok(Some(document::convert_for_wire(&record.session, Envelope::Bare)?))
    }

    /// Most recent stored session for `username`, rendered with `envelope`.
    /// A missing record renders as an empty document.
    #[instrument(skip(self), target = "session")]
    pub async fn session_for_request(
        &self,
        username: &str,
        envelope: Envelope,
    ) -> SessionResult<Vec<u8>> {
        let doc = match self.latest_record(username).await? {
            Some(record) => document::convert(&record.session)?,
            None => Document::new(),
        };

        Ok(document::render(doc, envelope))
    }

    /// Store `raw` as the user's session and echo back what was stored,
    /// wrapped under `"session"`.
    ///
    /// Inserts on the first write and updates afterwards. The existence check
    /// and the write are separate store calls, so two concurrent first writes
    /// can both choose insert; stores are expected to tolerate that.
    #[instrument(skip(self, raw), target = "session", fields(bytes = raw.len()))]
    pub async fn replace(
        &self,
        username: &str,
        raw: &str,
    ) -> SessionResult<(WriteOutcome, Vec<u8>)> {
        if !self.store.is_user(username).await? {
            return Err(SessionError::UnknownUser(username.to_string()));
        }

        let outcome = if self.store.has_session(username).await? {
            self.store.update_session(username, raw).await?;
            WriteOutcome::Updated
        } else {
            self.store.insert_session(username, raw).await?;
            WriteOutcome::Inserted
        };

        info!(outcome = outcome.as_str(), "session written");

        let body = document::convert_for_wire(raw, Envelope::Wrapped)?;
        Ok((outcome, body))
    }

    /// Remove the user's session. Succeeds whether or not one existed.
    #[instrument(skip(self), target = "session")]
    pub async fn delete(&self, username: &str) -> SessionResult<()> {
        self.store.delete_session(username).await?;
        info!("session deleted");
        Ok(())
    }

    async fn latest_record(&self, username: &str) -> SessionResult<Option<SessionRecord>> {
        let records = self.store.get_sessions(username).await?;
        if records.len() > 1 {
            debug!(count = records.len(), "multiple session rows; using most recent");
        }
        Ok(records.into_iter().next())
    }
}
