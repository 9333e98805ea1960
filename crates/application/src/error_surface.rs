//! User-visible error slot.
//!
//! Holds at most one message. It is independent of the time store and the
//! subscription: setting or clearing it never touches either.

use std::sync::Arc;

use tokio::sync::watch;

/// Message raised by the "Create an error" control.
pub const SAMPLE_ERROR: &str = "Why did you create problems on purpose?";

/// Shared error message slot.
#[derive(Debug, Clone)]
pub struct ErrorSurface {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl ErrorSurface {
    /// Creates an empty error surface.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Replaces the current message.
    pub fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "error surface set");
        self.tx.send_replace(Some(message));
    }

    /// Raises the fixed demonstration message.
    pub fn raise_sample(&self) {
        self.set_error(SAMPLE_ERROR);
    }

    /// Empties the slot.
    pub fn clear(&self) {
        self.tx.send_if_modified(|current| current.take().is_some());
    }

    /// The current message, if any.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Subscribes to message changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

impl Default for ErrorSurface {
    fn default() -> Self {
        Self::new()
    }
}
