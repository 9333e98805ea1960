//! Canonical time store.
//!
//! The store is the only shared mutable state of the clock. It holds the
//! latest canonical time and watcher count behind a `tokio::sync::watch`
//! channel: every mutation runs under the channel's lock, so readers always
//! observe a whole snapshot, and a reader created after a write sees that
//! write immediately.
//!
//! Writes come from exactly two places. The baseline fetcher writes through
//! [`TimeWriter::set_baseline`]; the subscription manager brackets each open
//! period with [`TimeWriter::begin_subscription`] /
//! [`TimeWriter::end_subscription`] and applies ticks tagged with that
//! period's generation. A tick whose generation is no longer live is
//! rejected under the same lock, which is what makes "no update after close"
//! hold even on a multi-threaded runtime.

use std::sync::Arc;

use tickwatch_domain::{CanonicalTime, WatcherCount};
use tokio::sync::watch;

/// A consistent view of the store at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeSnapshot {
    /// Latest canonical time, `None` until the first successful write.
    pub now: Option<CanonicalTime>,
    /// Latest watcher count; zero while no subscription is open.
    pub watchers: WatcherCount,
    /// Whether a subscription is currently open.
    pub watching: bool,
}

impl TimeSnapshot {
    /// The watcher count to display, suppressed while not watching.
    #[must_use]
    pub const fn watcher_display(&self) -> Option<WatcherCount> {
        if self.watching {
            Some(self.watchers)
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    snapshot: TimeSnapshot,
    live_generation: Option<u64>,
}

/// Owner of the canonical time cell. Hands out writer and reader handles.
#[derive(Debug, Clone)]
pub struct TimeStore {
    tx: Arc<watch::Sender<StoreState>>,
}

impl TimeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StoreState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Returns a write handle.
    #[must_use]
    pub fn writer(&self) -> TimeWriter {
        TimeWriter {
            tx: Arc::clone(&self.tx),
        }
    }

    /// Returns a read handle.
    #[must_use]
    pub fn reader(&self) -> TimeReader {
        TimeReader {
            rx: self.tx.subscribe(),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> TimeSnapshot {
        self.tx.borrow().snapshot
    }
}

impl Default for TimeStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Write handle held by the baseline fetcher and the subscription manager.
#[derive(Debug, Clone)]
pub struct TimeWriter {
    tx: Arc<watch::Sender<StoreState>>,
}

impl TimeWriter {
    /// Initializes the canonical time from the baseline read.
    ///
    /// Only applies while no canonical time is known, so a slow baseline can
    /// never roll back a time already delivered by the push channel.
    /// Returns whether the value was written.
    pub fn set_baseline(&self, time: CanonicalTime) -> bool {
        self.tx.send_if_modified(|state| {
            if state.snapshot.now.is_some() {
                return false;
            }
            state.snapshot.now = Some(time);
            true
        })
    }

    /// Marks `generation` as the live subscription.
    ///
    /// The watcher count restarts at zero until the first tick arrives.
    pub fn begin_subscription(&self, generation: u64) {
        self.tx.send_modify(|state| {
            state.live_generation = Some(generation);
            state.snapshot.watching = true;
            state.snapshot.watchers = WatcherCount::ZERO;
        });
    }

    /// Retires `generation`. After this returns, no tick tagged with it is applied.
    ///
    /// Does nothing if a different generation is live.
    pub fn end_subscription(&self, generation: u64) {
        self.tx.send_if_modified(|state| {
            if state.live_generation != Some(generation) {
                return false;
            }
            state.live_generation = None;
            state.snapshot.watching = false;
            state.snapshot.watchers = WatcherCount::ZERO;
            true
        });
    }

    /// Applies a tick from subscription `generation`.
    ///
    /// Overwrites time and watcher count unconditionally when the generation
    /// is live. Returns `false` for superseded generations and for ticks
    /// identical to the current state; readers are only notified on change.
    pub fn apply_tick(&self, generation: u64, time: CanonicalTime, watchers: WatcherCount) -> bool {
        self.tx.send_if_modified(|state| {
            if state.live_generation != Some(generation) {
                return false;
            }
            let next = TimeSnapshot {
                now: Some(time),
                watchers,
                watching: true,
            };
            if state.snapshot == next {
                return false;
            }
            state.snapshot = next;
            true
        })
    }
}

/// Read handle for views.
#[derive(Debug, Clone)]
pub struct TimeReader {
    rx: watch::Receiver<StoreState>,
}

impl TimeReader {
    /// Current snapshot. Marks it as seen for [`TimeReader::changed`].
    pub fn snapshot(&mut self) -> TimeSnapshot {
        self.rx.borrow_and_update().snapshot
    }

    /// Waits until the store changes after the last [`TimeReader::snapshot`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreClosed`] once every writer and the store are gone.
    pub async fn changed(&mut self) -> Result<(), StoreClosed> {
        self.rx.changed().await.map_err(|_| StoreClosed)
    }
}

/// The store has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("time store closed")]
pub struct StoreClosed;
