//! Single-line status board with sticky errors.

use std::sync::{Arc, Mutex};

use crate::error::CurrentsError;

/// Most recent status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Message(String),
    Error(String),
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Status::Idle => "",
            Status::Message(s) | Status::Error(s) => s,
        }
    }
}

/// Shared status board.
///
/// Once an error has been shown, plain messages are ignored until
/// [`StatusBoard::clear`] is called. Errors always replace the current line.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    inner: Arc<Mutex<Status>>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Status::Idle)),
        }
    }

    /// Show a progress or informational message. Returns false if suppressed.
    pub fn report(&self, message: impl Into<String>) -> bool {
        let mut status = self.lock();
        if status.is_error() {
            return false;
        }
        let message = message.into();
        tracing::debug!(status = %message, "Status");
        *status = Status::Message(message);
        true
    }

    /// Show an error. Later plain messages are suppressed.
    pub fn error(&self, err: &CurrentsError) {
        tracing::warn!(error = %err, "Status error");
        *self.lock() = Status::Error(err.to_string());
    }

    pub fn clear(&self) {
        *self.lock() = Status::Idle;
    }

    pub fn current(&self) -> Status {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Status> {
        // A poisoned lock still holds a valid Status.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_sticky_until_clear() {
        let board = StatusBoard::new();
        assert!(board.report("loading..."));
        board.error(&CurrentsError::data_load("2024-03-02.json", "404"));
        assert!(!board.report("building: 10/200"));
        assert!(board.current().is_error());

        board.clear();
        assert_eq!(board.current(), Status::Idle);
        assert!(board.report("ready"));
        assert_eq!(board.current().text(), "ready");
    }

    #[test]
    fn test_clones_share_state() {
        let board = StatusBoard::new();
        let other = board.clone();
        other.report("hello");
        assert_eq!(board.current(), Status::Message("hello".into()));
    }
}
