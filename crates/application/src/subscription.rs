//! Push subscription lifecycle.
//!
//! The manager is a two-state machine driven by the "watching" toggle:
//!
//! ```text
//! Closed --[watch=true]--> Open    (establish channel, subscribe)
//! Open   --[watch=false]--> Closed (unsubscribe, close channel)
//! Open   --[teardown]--> Closed    (same cleanup, on shutdown or drop)
//! ```
//!
//! Every Open period gets a fresh generation number. The generation is
//! registered as live in the [`TimeStore`](crate::store::TimeStore) before
//! the channel task starts and retired before the task is asked to stop, so
//! a tick that is already in flight when watching is turned off is rejected
//! by the store instead of racing the teardown. Exactly one task exists per
//! Open period, and any reconnects happen inside that task, so there is
//! never more than one live channel.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tickwatch_domain::subscription::{COUNT_EVENT, TICK_EVENT};
use tickwatch_domain::{ChannelEvent, ReconnectPolicy, SubscriptionState, decode_count, decode_tick};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::ports::{ChannelSession, PushChannel};
use crate::store::TimeWriter;

/// Upper bound on the goodbye handshake with the server.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(3);

struct ActiveSubscription {
    generation: u64,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Owns the push channel and opens/closes it on the watching toggle.
pub struct SubscriptionManager<C: PushChannel> {
    channel: Arc<C>,
    writer: TimeWriter,
    policy: ReconnectPolicy,
    next_generation: u64,
    active: Option<ActiveSubscription>,
}

impl<C: PushChannel> SubscriptionManager<C> {
    /// Creates a closed manager. Reconnecting is disabled by default.
    pub fn new(channel: Arc<C>, writer: TimeWriter) -> Self {
        Self {
            channel,
            writer,
            policy: ReconnectPolicy::disabled(),
            next_generation: 1,
            active: None,
        }
    }

    /// Sets the reconnect policy used for subsequent Open periods.
    #[must_use]
    pub const fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SubscriptionState {
        if self.active.is_some() {
            SubscriptionState::Open
        } else {
            SubscriptionState::Closed
        }
    }

    /// Returns true while the subscription is open.
    #[must_use]
    pub const fn is_watching(&self) -> bool {
        self.active.is_some()
    }

    /// Applies the watching intent. Setting the current state is a no-op.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn set_watching(&mut self, watching: bool) {
        if watching {
            self.open();
        } else {
            self.close().await;
        }
    }

    /// Flips the watching intent and returns the new state.
    pub async fn toggle(&mut self) -> SubscriptionState {
        let next = self.state().toggled();
        self.set_watching(next.is_open()).await;
        next
    }

    /// Closes the subscription, if open, and waits until the channel is
    /// fully closed. Closing while closed does nothing.
    pub async fn close(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        self.writer.end_subscription(active.generation);
        let _ = active.shutdown.send(());
        if let Err(e) = active.task.await {
            if e.is_panic() {
                warn!(generation = active.generation, "subscription task panicked");
            }
        }
        info!(generation = active.generation, "subscription closed");
    }

    /// Tears the subscription down before the manager goes away.
    pub async fn shutdown(mut self) {
        self.close().await;
    }

    fn open(&mut self) {
        if self.active.is_some() {
            return;
        }
        let generation = self.next_generation;
        self.next_generation += 1;

        self.writer.begin_subscription(generation);
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_subscription(
            Arc::clone(&self.channel),
            self.writer.clone(),
            generation,
            self.policy,
            shutdown_rx,
        ));
        info!(generation, "subscription opened");
        self.active = Some(ActiveSubscription {
            generation,
            shutdown,
            task,
        });
    }
}

impl<C: PushChannel> Drop for SubscriptionManager<C> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            // Dropping the sender wakes the task, which closes its channel.
            self.writer.end_subscription(active.generation);
            debug!(generation = active.generation, "subscription dropped while open");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PumpEnd {
    Shutdown,
    Dropped,
}

async fn run_subscription<C: PushChannel>(
    channel: Arc<C>,
    writer: TimeWriter,
    generation: u64,
    policy: ReconnectPolicy,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut attempt = 0u32;
    loop {
        let connected = tokio::select! {
            biased;
            _ = &mut shutdown => return,
            result = channel.connect() => result,
        };

        match connected {
            Ok(mut session) => {
                info!(generation, "push channel established");
                attempt = 0;
                let end = pump_events(session.as_mut(), &writer, generation, &mut shutdown).await;
                match tokio::time::timeout(CLOSE_TIMEOUT, session.close()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => debug!(generation, error = %e, "push channel close failed"),
                    Err(_) => warn!(generation, "push channel close timed out"),
                }
                if end == PumpEnd::Shutdown {
                    return;
                }
                warn!(generation, "push channel dropped");
            }
            Err(e) => warn!(generation, error = %e, "failed to establish push channel"),
        }

        let Some(delay) = policy.base_delay(attempt) else {
            debug!(generation, "not reconnecting");
            return;
        };
        attempt = attempt.saturating_add(1);
        let delay = jittered(delay, policy.jitter);
        debug!(generation, attempt, ?delay, "reconnecting after backoff");
        tokio::select! {
            biased;
            _ = &mut shutdown => return,
            () = tokio::time::sleep(delay) => {}
        }
    }
}

async fn pump_events(
    session: &mut dyn ChannelSession,
    writer: &TimeWriter,
    generation: u64,
    shutdown: &mut oneshot::Receiver<()>,
) -> PumpEnd {
    loop {
        tokio::select! {
            biased;
            _ = &mut *shutdown => return PumpEnd::Shutdown,
            event = session.next_event() => match event {
                Some(Ok(event)) => apply_event(writer, generation, &event),
                Some(Err(e)) => {
                    warn!(generation, error = %e, "push channel failed");
                    return PumpEnd::Dropped;
                }
                None => return PumpEnd::Dropped,
            },
        }
    }
}

fn apply_event(writer: &TimeWriter, generation: u64, event: &ChannelEvent) {
    match event.name.as_str() {
        TICK_EVENT => match decode_tick(&event.payload) {
            Ok(tick) => {
                if writer.apply_tick(generation, tick.time, tick.watchers) {
                    trace!(generation, time = %tick.time, watchers = %tick.watchers, "tick applied");
                }
            }
            Err(e) => warn!(generation, error = %e, "dropping malformed tick"),
        },
        COUNT_EVENT => match decode_count(&event.payload) {
            Ok(count) => trace!(count = count.count, watchers = %count.watchers, "count event ignored"),
            Err(e) => debug!(error = %e, "malformed count event ignored"),
        },
        other => trace!(event = other, "ignoring unknown event"),
    }
}

fn jittered(delay: Duration, jitter: bool) -> Duration {
    if !jitter || delay.is_zero() {
        return delay;
    }
    let factor: f64 = rand::rng().random_range(0.5..=1.0);
    delay.mul_f64(factor)
}
