use thiserror::Error;

/// Every way a backend call can fail, collapsed to one user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self::new(format!("request failed with status {status}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Type {expected} to confirm deletion")]
pub struct ConfirmationMismatch {
    pub expected: &'static str,
}
