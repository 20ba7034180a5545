use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("user {0} does not exist")]
    UnknownUser(String),

    #[error("stored session is not a valid JSON object: {0}")]
    MalformedSession(#[source] serde_json::Error),

    /// Displays the full cause chain, outermost context first.
    #[error("{0:#}")]
    StoreFailure(anyhow::Error),
}

impl From<anyhow::Error> for SessionError {
    fn from(e: anyhow::Error) -> Self {
        SessionError::StoreFailure(e)
    }
}

impl SessionError {
    /// Whether the caller, rather than this service or its data, is at fault.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, SessionError::UnknownUser(_))
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
