//! Push subscription state and inbound channel events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle state of the push subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    /// No channel exists.
    #[default]
    Closed,
    /// A channel is live (or being established) for the current generation.
    Open,
}

impl SubscriptionState {
    /// Check if the subscription is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// The state reached by flipping the watching toggle.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }

    /// Get a human-readable status string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "Closed",
            Self::Open => "Open",
        }
    }
}

impl From<bool> for SubscriptionState {
    fn from(watching: bool) -> Self {
        if watching { Self::Open } else { Self::Closed }
    }
}

/// Name of the event carrying a new canonical time.
pub const TICK_EVENT: &str = "tick";

/// Name of the legacy count event.
pub const COUNT_EVENT: &str = "count";

/// An event received over the push channel, before payload validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEvent {
    /// Event name, e.g. `tick`.
    pub name: String,
    /// Raw JSON payload.
    #[serde(default)]
    pub payload: Value,
}

impl ChannelEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Creates a `tick` event.
    #[must_use]
    pub fn tick(payload: Value) -> Self {
        Self::new(TICK_EVENT, payload)
    }
}
