//! Push channel port
//!
//! A push channel is opened once per subscription generation and yields
//! inbound events until it is closed by either side.

use async_trait::async_trait;
use thiserror::Error;
use tickwatch_domain::ChannelEvent;

/// Push channel errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// The server refused the namespace connection.
    #[error("Connection rejected: {0}")]
    Rejected(String),
    /// Connection closed.
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),
    /// A frame could not be understood.
    #[error("Protocol error: {0}")]
    Protocol(String),
    /// Send failed.
    #[error("Failed to send message: {0}")]
    SendFailed(String),
    /// Timeout.
    #[error("Connection timeout")]
    Timeout,
}

/// Factory for push channel sessions.
#[async_trait]
pub trait PushChannel: Send + Sync + 'static {
    /// Establishes a new channel.
    ///
    /// # Errors
    ///
    /// Returns a [`ChannelError`] if the channel cannot be established.
    async fn connect(&self) -> Result<Box<dyn ChannelSession>, ChannelError>;
}

/// One established channel.
#[async_trait]
pub trait ChannelSession: Send {
    /// Waits for the next inbound event.
    ///
    /// Returns `None` once the remote side has closed the channel.
    async fn next_event(&mut self) -> Option<Result<ChannelEvent, ChannelError>>;

    /// Closes the channel and releases its resources.
    ///
    /// # Errors
    ///
    /// Returns a [`ChannelError`] if the close handshake fails; the channel
    /// is considered closed either way.
    async fn close(&mut self) -> Result<(), ChannelError>;
}
