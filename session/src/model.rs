use serde::{Deserialize, Serialize};

/// Identifier of a stored session row. Opaque text; new rows get a UUID v4,
/// but rows written by other tools may carry any id.
pub type RecordId = String;

/// Internal identifier of a user row. Opaque to this service; it is only ever
/// read from the users table and used as a foreign key.
pub type UserId = String;

/// One stored session row.
///
/// `session` holds the client's JSON document exactly as it was written; it is
/// only interpreted by [`crate::document::convert`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: RecordId,
    pub user_id: UserId,
    pub session: String,

    /// Last write, Unix milliseconds.
    pub updated_at_ms: i64,
}

impl SessionRecord {
    pub fn is_blank(&self) -> bool {
        self.session.is_empty()
    }
}

/// Which branch a write took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted,
    Updated,
}

impl WriteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteOutcome::Inserted => "inserted",
            WriteOutcome::Updated => "updated",
        }
    }
}
