use chrono::Utc;
use tokio::sync::{watch, Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;

use super::*;

/// What happened to a single tick of the schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Ran(CycleState),
    /// The previous cycle was still running.
    Skipped,
}

#[derive(Debug)]
struct Runner {
    updater: GeolocationUpdater,
    in_flight: Arc<Mutex<()>>,
}

impl Runner {
    fn try_begin(&self) -> Option<OwnedMutexGuard<()>> {
        Arc::clone(&self.in_flight).try_lock_owned().ok()
    }

    async fn run(&self, _in_flight: OwnedMutexGuard<()>) -> CycleState {
        self.updater.update().await
    }

    async fn tick(&self) -> TickOutcome {
        match self.try_begin() {
            Some(in_flight) => TickOutcome::Ran(self.run(in_flight).await),
            None => {
                self.skipped();
                TickOutcome::Skipped
            }
        }
    }

    fn skipped(&self) {
        let node = self.updater.node_name();
        tracing::warn!(node, "Previous geolocation update still running, skipping this one");
    }
}

#[derive(Debug)]
struct Running {
    shutdown: watch::Sender<bool>,
    ticker: JoinHandle<()>,
}

/// Runs the geolocation update once on start and then on every occurrence
/// of its [`Recurrence`].
///
/// At most one cycle is in flight at any time. A tick that comes due while
/// the previous cycle is still running is skipped, not queued.
#[derive(Debug)]
pub struct Scheduler {
    recurrence: Recurrence,
    runner: Arc<Runner>,
    lifecycle: Arc<LifecycleState>,
    running: Option<Running>,
}

impl Scheduler {
    /// Fails if `spec` is not a valid [`Recurrence`].
    pub fn new(
        spec: &str,
        updater: GeolocationUpdater,
        lifecycle: Arc<LifecycleState>,
    ) -> Result<Self, ConfigurationError> {
        let recurrence = spec.parse()?;
        Ok(Self::with_recurrence(recurrence, updater, lifecycle))
    }

    pub fn with_recurrence(
        recurrence: Recurrence,
        updater: GeolocationUpdater,
        lifecycle: Arc<LifecycleState>,
    ) -> Self {
        let runner = Arc::new(Runner {
            updater,
            in_flight: Arc::default(),
        });
        Self {
            recurrence,
            runner,
            lifecycle,
            running: None,
        }
    }

    pub fn lifecycle(&self) -> &Arc<LifecycleState> {
        &self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Runs the first cycle, then arms the schedule and marks the updater
    /// live and ready.
    ///
    /// The first cycle completes before the timer exists, so it cannot
    /// overlap the first scheduled tick.
    pub async fn start(&mut self) -> Result<(), SchedulerError> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyStarted);
        }

        let node = self.runner.updater.node_name();
        tracing::info!(node, recurrence = ?self.recurrence, "Geolocation updater started");

        self.runner.tick().await;

        let (shutdown, rx) = watch::channel(false);
        let ticker = tokio::spawn(run_ticker(
            Arc::clone(&self.runner),
            self.recurrence.clone(),
            rx,
        ));
        self.running = Some(Running { shutdown, ticker });

        self.lifecycle.set_live(true);
        self.lifecycle.set_ready(true);
        Ok(())
    }

    /// Marks the updater down and cancels future ticks.
    ///
    /// A cycle that is already running is not interrupted. `stop` returns once
    /// it has finished, which the cycle deadline bounds.
    pub async fn stop(&mut self) -> Result<(), SchedulerError> {
        let Running { shutdown, ticker } = self.running.take().ok_or(SchedulerError::NotStarted)?;

        self.lifecycle.set_live(false);
        self.lifecycle.set_ready(false);

        shutdown.send_replace(true);
        if let Err(err) = ticker.await {
            tracing::error!(?err, "Geolocation updater ticker failed");
        }
        let _finished = self.runner.in_flight.lock().await;

        let node = self.runner.updater.node_name();
        tracing::info!(node, "Geolocation updater stopped");
        Ok(())
    }

    /// Runs one cycle now, unless one is already in flight.
    pub async fn tick(&self) -> TickOutcome {
        self.runner.tick().await
    }
}

async fn run_ticker(
    runner: Arc<Runner>,
    recurrence: Recurrence,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let Some(wait) = recurrence.until_next(&Utc::now()) else {
            tracing::warn!(?recurrence, "No further occurrences, geolocation updates end here");
            break;
        };

        tokio::select! {
            () = tokio::time::sleep(wait) => {}
            _ = shutdown.changed() => break,
        }

        match runner.try_begin() {
            Some(in_flight) => {
                let runner = Arc::clone(&runner);
                tokio::spawn(async move {
                    runner.run(in_flight).await;
                });
            }
            None => runner.skipped(),
        }
    }
}
