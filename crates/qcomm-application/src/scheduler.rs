//! Periodic tick scheduling.
//!
//! Drift logic never sleeps on its own. A [`Clock`] hands out [`TickSource`]s,
//! [`spawn_periodic`] drives a callback from one, and the returned
//! [`TimerHandle`] cancels the task explicitly or when dropped.

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// The two periodic timers the dashboard runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Connection,
    Stability,
}

/// A stream of ticks.
#[async_trait]
pub trait TickSource: Send {
    /// Waits for the next tick. Returns `false` once the source is exhausted.
    async fn next_tick(&mut self) -> bool;
}

/// Factory for tick sources.
pub trait Clock: Send + Sync {
    fn ticks(&self, kind: TimerKind, period: Duration) -> Box<dyn TickSource>;
}

/// What a tick callback wants to happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

// ============================================================================
// Wall clock
// ============================================================================

/// Ticks on a tokio interval; the first tick fires one period after creation.
pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl TickSource for IntervalTicks {
    async fn next_tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

#[derive(Debug, Default, Clone)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn ticks(&self, _kind: TimerKind, period: Duration) -> Box<dyn TickSource> {
        Box::new(IntervalTicks::new(period))
    }
}

// ============================================================================
// Manual clock
// ============================================================================

type Ack = oneshot::Sender<()>;

/// Tick source fed by [`ManualClock::fire`].
pub struct ManualTicks {
    rx: mpsc::UnboundedReceiver<Ack>,
    /// Acknowledges the previous tick once the consumer asks for the next one.
    pending: Option<Ack>,
}

#[async_trait]
impl TickSource for ManualTicks {
    async fn next_tick(&mut self) -> bool {
        if let Some(ack) = self.pending.take() {
            let _ = ack.send(());
        }
        match self.rx.recv().await {
            Some(ack) => {
                self.pending = Some(ack);
                true
            }
            None => false,
        }
    }
}

/// Clock whose ticks are fired by hand, for driving timers without waiting.
#[derive(Default)]
pub struct ManualClock {
    senders: Mutex<HashMap<TimerKind, mpsc::UnboundedSender<Ack>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers one tick to the timer of `kind` and waits until it is processed.
    ///
    /// Returns `false` when no live timer of that kind exists.
    pub async fn fire(&self, kind: TimerKind) -> bool {
        let sender = match self.senders.lock() {
            Ok(senders) => senders.get(&kind).cloned(),
            Err(_) => None,
        };
        let Some(sender) = sender else {
            return false;
        };

        let (ack_tx, ack_rx) = oneshot::channel();
        if sender.send(ack_tx).is_err() {
            return false;
        }
        // Resolves when the timer asks for its next tick or shuts down
        let _ = ack_rx.await;
        true
    }

    /// Whether a timer of `kind` is still consuming ticks.
    pub fn is_live(&self, kind: TimerKind) -> bool {
        self.senders
            .lock()
            .map(|senders| senders.get(&kind).is_some_and(|tx| !tx.is_closed()))
            .unwrap_or(false)
    }
}

impl Clock for ManualClock {
    fn ticks(&self, kind: TimerKind, _period: Duration) -> Box<dyn TickSource> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut senders) = self.senders.lock() {
            senders.insert(kind, tx);
        }
        Box::new(ManualTicks { rx, pending: None })
    }
}

// ============================================================================
// Timer handle
// ============================================================================

/// Owner of a running periodic task. Dropping the handle cancels the task.
pub struct TimerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once the task has exited (stopped, cancelled or exhausted).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Spawns a task that calls `on_tick` for every tick until the callback
/// returns [`TickControl::Stop`], the source is exhausted, or the handle is
/// cancelled.
pub fn spawn_periodic<F, Fut>(
    name: &'static str,
    mut source: Box<dyn TickSource>,
    mut on_tick: F,
) -> TimerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = TickControl> + Send + 'static,
{
    let token = CancellationToken::new();
    let child = token.clone();

    let task = tokio::spawn(async move {
        tracing::debug!(target: "scheduler", timer = name, "Timer started");
        loop {
            tokio::select! {
                biased;
                _ = child.cancelled() => {
                    tracing::debug!(target: "scheduler", timer = name, "Timer cancelled");
                    break;
                }
                ticked = source.next_tick() => {
                    if !ticked {
                        break;
                    }
                    if on_tick().await == TickControl::Stop {
                        tracing::debug!(target: "scheduler", timer = name, "Timer stopped by callback");
                        break;
                    }
                }
            }
        }
    });

    TimerHandle { token, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: Arc<AtomicUsize>, stop_at: usize) -> impl FnMut() -> std::future::Ready<TickControl> {
        move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n >= stop_at {
                TickControl::Stop
            } else {
                TickControl::Continue
            })
        }
    }

    #[tokio::test]
    async fn test_manual_ticks_drive_callback() {
        let clock = ManualClock::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let _handle = spawn_periodic(
            "test",
            clock.ticks(TimerKind::Stability, Duration::from_secs(1)),
            counting(counter.clone(), usize::MAX),
        );

        for _ in 0..3 {
            assert!(clock.fire(TimerKind::Stability).await);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_callback_stop_ends_timer() {
        let clock = ManualClock::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let _handle = spawn_periodic(
            "test",
            clock.ticks(TimerKind::Connection, Duration::from_secs(1)),
            counting(counter.clone(), 2),
        );

        assert!(clock.fire(TimerKind::Connection).await);
        assert!(clock.fire(TimerKind::Connection).await);
        assert!(!clock.fire(TimerKind::Connection).await);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(!clock.is_live(TimerKind::Connection));
    }

    #[tokio::test]
    async fn test_dropping_handle_cancels_timer() {
        let clock = ManualClock::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = spawn_periodic(
            "test",
            clock.ticks(TimerKind::Stability, Duration::from_secs(1)),
            counting(counter.clone(), usize::MAX),
        );
        assert!(clock.fire(TimerKind::Stability).await);

        drop(handle);
        for _ in 0..10 {
            if !clock.is_live(TimerKind::Stability) {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert!(!clock.is_live(TimerKind::Stability));
        assert!(!clock.fire(TimerKind::Stability).await);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fire_without_timer_is_false() {
        let clock = ManualClock::new();
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        assert!(!rt.block_on(clock.fire(TimerKind::Connection)));
    }
}
