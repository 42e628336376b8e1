//! Process-scoped latch that starts the periodic sweep exactly once.

use super::EventProcessor;
use crate::audit::ports::{AdminInbox, SystemEventStore};
use mockable::Clock;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Result of [`SweepBootstrap::ensure_started`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStart {
    /// The sweep loop was spawned by this call.
    Started,
    /// A sweep loop was already running; nothing changed.
    AlreadyRunning,
}

/// Errors raised while starting the sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    /// Called outside a tokio runtime.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(#[from] TryCurrentError),
    /// The latch mutex was poisoned by a panicking thread.
    #[error("sweep latch poisoned")]
    Poisoned,
}

struct SweepHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Owns the lifecycle of the periodic sweep.
///
/// The first [`ensure_started`](Self::ensure_started) spawns a loop that
/// sweeps once immediately and then every `interval`; later calls are
/// no-ops. [`shutdown`](Self::shutdown) stops the loop and resets the latch.
pub struct SweepBootstrap<S, I, C>
where
    S: SystemEventStore + ?Sized + 'static,
    I: AdminInbox + ?Sized + 'static,
    C: Clock + Send + Sync + 'static,
{
    processor: Arc<EventProcessor<S, I, C>>,
    interval: Duration,
    running: Mutex<Option<SweepHandle>>,
}

impl<S, I, C> SweepBootstrap<S, I, C>
where
    S: SystemEventStore + ?Sized + 'static,
    I: AdminInbox + ?Sized + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates an idle latch.
    #[must_use]
    pub fn new(processor: Arc<EventProcessor<S, I, C>>, interval: Duration) -> Self {
        Self {
            processor,
            interval: interval.max(MIN_PERIOD),
            running: Mutex::new(None),
        }
    }

    fn latch(&self) -> Result<MutexGuard<'_, Option<SweepHandle>>, SweepError> {
        self.running.lock().map_err(|_| SweepError::Poisoned)
    }

    /// Starts the sweep loop unless it is already running.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::NoRuntime`] outside a tokio runtime, or
    /// [`SweepError::Poisoned`].
    pub fn ensure_started(&self) -> Result<SweepStart, SweepError> {
        let mut running = self.latch()?;
        if running.as_ref().is_some_and(|handle| !handle.task.is_finished()) {
            tracing::info!("event sweep already initialized");
            return Ok(SweepStart::AlreadyRunning);
        }
        let runtime = Handle::try_current()?;
        let (stop, stopped) = watch::channel(false);
        let task = runtime.spawn(sweep_loop(
            Arc::clone(&self.processor),
            self.interval,
            stopped,
        ));
        *running = Some(SweepHandle { stop, task });
        tracing::info!(interval_secs = self.interval.as_secs(), "event sweep started");
        Ok(SweepStart::Started)
    }

    /// Returns `true` while a sweep loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.latch().is_ok_and(|running| {
            running
                .as_ref()
                .is_some_and(|handle| !handle.task.is_finished())
        })
    }

    /// Stops the sweep loop, waits for it to finish and resets the latch.
    ///
    /// Returns `false` when no loop was running.
    pub async fn shutdown(&self) -> bool {
        let handle = match self.latch() {
            Ok(mut running) => running.take(),
            Err(err) => {
                tracing::error!(error = %err, "cannot stop event sweep");
                None
            }
        };
        let Some(SweepHandle { stop, task }) = handle else {
            return false;
        };
        if stop.send(true).is_err() {
            tracing::debug!("event sweep loop already gone");
        }
        if let Err(err) = task.await {
            tracing::error!(error = %err, "event sweep loop ended abnormally");
        }
        tracing::info!("event sweep stopped");
        true
    }
}

async fn sweep_loop<S, I, C>(
    processor: Arc<EventProcessor<S, I, C>>,
    period: Duration,
    mut stopped: watch::Receiver<bool>,
) where
    S: SystemEventStore + ?Sized + 'static,
    I: AdminInbox + ?Sized + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = processor.run_once().await;
                tracing::debug!(fetched = report.fetched, "sweep tick complete");
            }
            changed = stopped.changed() => {
                if changed.is_err() || *stopped.borrow() {
                    break;
                }
            }
        }
    }
}
