//! The poll-filter-group manager for one configuration entry.

use std::ops::ControlFlow;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use futures::future::join_all;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, trace, warn};

use crate::alert::{AlertReceiver, AlertSender, ArrivalAlert};
use crate::domain::{ScanInterval, StopConfig, StopId};
use crate::process::{filter_and_group, is_active};
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::tfl::{DEFAULT_TIMEOUT_SECS, FetchError, RawArrival};

use super::source::ArrivalSource;
use super::task::{PollHandle, spawn_poll_loop};

/// Hard bound on a single stop's fetch, on top of any client timeout.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// Outcome counts for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    /// Stops fetched successfully (snapshot replaced).
    pub polled: usize,
    /// Stops skipped by the day/time gate.
    pub inactive: usize,
    /// Stops whose fetch failed (snapshot kept).
    pub failed: usize,
    /// Alerts published.
    pub alerted: usize,
    /// Results dropped because the stop was removed mid-cycle.
    pub discarded: usize,
}

/// Periodically polls a set of stops and publishes their arrivals.
///
/// Cloning is cheap; clones share the same stops, snapshots and schedule.
pub struct PollScheduler<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for PollScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<S> {
    source: S,
    interval: ScanInterval,
    stops: RwLock<Vec<StopConfig>>,
    snapshots: SnapshotStore,
    alerts: AlertSender,
    /// Held for the whole of a cycle so cycles never overlap.
    cycle_lock: Mutex<()>,
    task: Mutex<Option<PollHandle>>,
}

impl<S: ArrivalSource> PollScheduler<S> {
    /// Create a stopped scheduler.
    ///
    /// Stops sharing an id are collapsed with the same replace rule as
    /// [`PollScheduler::add_stop`].
    pub fn new(
        source: S,
        stops: Vec<StopConfig>,
        interval: ScanInterval,
        alerts: AlertSender,
    ) -> Self {
        let mut unique = Vec::with_capacity(stops.len());
        for stop in stops {
            insert_or_replace(&mut unique, stop);
        }

        Self {
            inner: Arc::new(Inner {
                source,
                interval,
                stops: RwLock::new(unique),
                snapshots: SnapshotStore::new(),
                alerts,
                cycle_lock: Mutex::new(()),
                task: Mutex::new(None),
            }),
        }
    }

    /// Begin polling every interval.
    ///
    /// Calling this while already running cancels the existing schedule and
    /// starts a fresh one, so there is never more than one timer.
    pub async fn start(&self) {
        let mut task = self.inner.task.lock().await;
        if let Some(previous) = task.take() {
            previous.cancel();
            debug!("Restarting bus arrival poller");
        }

        let weak: Weak<Inner<S>> = Arc::downgrade(&self.inner);
        *task = Some(spawn_poll_loop(self.inner.interval.as_duration(), move || {
            let weak = weak.clone();
            async move {
                // The loop must not keep its manager alive.
                let Some(inner) = weak.upgrade() else {
                    return ControlFlow::Break(());
                };
                inner.run_cycle_at(Local::now().naive_local()).await;
                ControlFlow::Continue(())
            }
        }));

        info!(
            interval_secs = self.inner.interval.as_secs(),
            "Bus arrival poller started"
        );
    }

    /// Cancel the schedule. Does nothing when not running.
    pub async fn stop(&self) {
        let mut task = self.inner.task.lock().await;
        if let Some(handle) = task.take() {
            handle.cancel();
            info!("Bus arrival poller stopped");
        }
    }

    /// Whether a schedule is currently active.
    pub async fn is_running(&self) -> bool {
        let task = self.inner.task.lock().await;
        task.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Add a stop, replacing any existing stop with the same id.
    ///
    /// Takes effect from the next cycle. Returns `true` if it replaced.
    pub async fn add_stop(&self, stop: StopConfig) -> bool {
        let mut stops = self.inner.stops.write().await;
        let replaced = insert_or_replace(&mut stops, stop);
        debug!(replaced, stops = stops.len(), "Stop added");
        replaced
    }

    /// Remove the stop with the same id as `stop`.
    pub async fn remove_stop(&self, stop: &StopConfig) -> bool {
        self.remove_stop_id(stop.stop_id()).await
    }

    /// Remove a stop by id and forget its snapshot.
    pub async fn remove_stop_id(&self, stop_id: &StopId) -> bool {
        let removed = {
            let mut stops = self.inner.stops.write().await;
            let before = stops.len();
            stops.retain(|s| s.stop_id() != stop_id);
            stops.len() != before
        };

        if removed {
            self.inner.snapshots.remove(stop_id).await;
            debug!(stop_id = %stop_id, "Stop removed");
        }
        removed
    }

    /// The current stop set, in insertion order.
    pub async fn stops(&self) -> Vec<StopConfig> {
        self.inner.stops.read().await.clone()
    }

    pub fn interval(&self) -> ScanInterval {
        self.inner.interval
    }

    /// Shared handle to this scheduler's snapshots.
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.inner.snapshots
    }

    /// The latest arrivals for a stop, or `None` if never polled.
    pub async fn get_latest(&self, stop_id: &StopId) -> Option<Snapshot> {
        self.inner.snapshots.get(stop_id).await
    }

    /// Receive alerts published by this scheduler.
    pub fn subscribe(&self) -> AlertReceiver {
        self.inner.alerts.subscribe()
    }

    /// Run one cycle now, using the local wall clock for the activity gate.
    pub async fn run_cycle(&self) -> CycleReport {
        self.inner.run_cycle_at(Local::now().naive_local()).await
    }

    /// Run one cycle as if the local time were `now`.
    pub async fn run_cycle_at(&self, now: NaiveDateTime) -> CycleReport {
        self.inner.run_cycle_at(now).await
    }
}

impl<S: ArrivalSource> Inner<S> {
    async fn run_cycle_at(&self, now: NaiveDateTime) -> CycleReport {
        let _cycle = self.cycle_lock.lock().await;

        // Copy the stop set so no lock is held across network calls.
        let stops = self.stops.read().await.clone();
        let mut report = CycleReport::default();

        let mut active = Vec::with_capacity(stops.len());
        for stop in &stops {
            if is_active(stop, now) {
                active.push(stop);
            } else {
                trace!(stop_id = %stop.stop_id(), "Stop outside active window, skipping");
                report.inactive += 1;
            }
        }

        let fetches: Vec<_> = active
            .into_iter()
            .map(|stop| async move {
                let result = self.fetch_bounded(stop.stop_id()).await;
                (stop, result)
            })
            .collect();
        let results = join_all(fetches).await;

        // Held while results are applied, so a concurrent remove either
        // lands first (and the result is dropped) or evicts what we write.
        let current = self.stops.read().await;

        for (stop, result) in results {
            if !current.iter().any(|s| s.stop_id() == stop.stop_id()) {
                debug!(stop_id = %stop.stop_id(), "Stop removed during fetch, discarding result");
                report.discarded += 1;
                continue;
            }

            let raw = match result {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(
                        stop_id = %stop.stop_id(),
                        kind = e.kind(),
                        error = %e,
                        "Failed to fetch arrivals, keeping previous snapshot"
                    );
                    report.failed += 1;
                    continue;
                }
            };

            report.polled += 1;
            let processed = filter_and_group(stop, &raw);
            self.snapshots
                .update(stop.stop_id().clone(), processed.arrivals.clone())
                .await;

            if processed.arrivals.is_empty() {
                debug!(stop_id = %stop.stop_id(), "No buses arriving");
                continue;
            }

            info!(
                stop_id = %stop.stop_id(),
                name = stop.display_name(),
                arrivals = processed.arrivals.len(),
                groups = processed.grouped.len(),
                "Buses arriving"
            );

            let alert = ArrivalAlert::new(stop.stop_id().clone(), processed);
            if self.alerts.send(alert).is_err() {
                trace!("No alert subscribers");
            }
            report.alerted += 1;
        }

        debug!(
            polled = report.polled,
            inactive = report.inactive,
            failed = report.failed,
            alerted = report.alerted,
            discarded = report.discarded,
            "Poll cycle complete"
        );

        report
    }

    async fn fetch_bounded(&self, stop_id: &StopId) -> Result<Vec<RawArrival>, FetchError> {
        match tokio::time::timeout(FETCH_TIMEOUT, self.source.fetch_arrivals(stop_id)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        }
    }
}

/// Insert `stop`, or overwrite the entry with the same id in place.
fn insert_or_replace(stops: &mut Vec<StopConfig>, stop: StopConfig) -> bool {
    match stops.iter_mut().find(|s| s.stop_id() == stop.stop_id()) {
        Some(existing) => {
            *existing = stop;
            true
        }
        None => {
            stops.push(stop);
            false
        }
    }
}
