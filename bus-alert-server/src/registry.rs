//! Owned map from configuration entry to its poller.
//!
//! Each entry gets its own [`PollScheduler`], created and started on setup
//! and stopped on unload. All managers share one arrivals source and one
//! alert channel.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::info;

use crate::alert::{AlertReceiver, AlertSender, alert_channel};
use crate::config::{EntryConfig, EntryId};
use crate::scheduler::{ArrivalSource, PollScheduler};

pub struct ManagerRegistry<S> {
    source: S,
    alerts: AlertSender,
    managers: RwLock<HashMap<EntryId, PollScheduler<S>>>,
}

impl<S: ArrivalSource + Clone> ManagerRegistry<S> {
    pub fn new(source: S) -> Self {
        let (alerts, _) = alert_channel();
        Self {
            source,
            alerts,
            managers: RwLock::new(HashMap::new()),
        }
    }

    /// Create and start the manager for an entry.
    ///
    /// A manager already registered under the same id is stopped and
    /// replaced.
    pub async fn setup(&self, entry: &EntryConfig) -> PollScheduler<S> {
        let manager = PollScheduler::new(
            self.source.clone(),
            entry.stops.clone(),
            entry.scan_interval,
            self.alerts.clone(),
        );
        manager.start().await;

        let previous = {
            let mut managers = self.managers.write().await;
            managers.insert(entry.id.clone(), manager.clone())
        };

        if let Some(previous) = previous {
            previous.stop().await;
            info!(entry = %entry.id, "Replaced existing manager");
        }

        info!(
            entry = %entry.id,
            stops = entry.stops.len(),
            interval_secs = entry.scan_interval.as_secs(),
            "Entry set up"
        );
        manager
    }

    /// Stop and remove an entry's manager. Returns whether one existed.
    pub async fn unload(&self, id: &EntryId) -> bool {
        let removed = self.managers.write().await.remove(id);
        match removed {
            Some(manager) => {
                manager.stop().await;
                info!(entry = %id, "Entry unloaded");
                true
            }
            None => false,
        }
    }

    /// Stop and remove every manager.
    pub async fn unload_all(&self) {
        let managers: Vec<_> = self.managers.write().await.drain().collect();
        for (id, manager) in managers {
            manager.stop().await;
            info!(entry = %id, "Entry unloaded");
        }
    }

    pub async fn get(&self, id: &EntryId) -> Option<PollScheduler<S>> {
        self.managers.read().await.get(id).cloned()
    }

    /// Registered entry ids, sorted.
    pub async fn entry_ids(&self) -> Vec<EntryId> {
        let mut ids: Vec<EntryId> = self.managers.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Receive alerts from every manager in this registry.
    pub fn subscribe(&self) -> AlertReceiver {
        self.alerts.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ScanInterval, StopConfig, StopId};
    use crate::tfl::{MockArrivalSource, MockResponse, RawArrival};

    fn entry(id: &str, stops: &[&str]) -> EntryConfig {
        EntryConfig {
            id: EntryId::new(id),
            scan_interval: ScanInterval::default(),
            stops: stops
                .iter()
                .map(|s| StopConfig::new(StopId::parse(s).unwrap()))
                .collect(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn setup_then_unload() {
        let registry = ManagerRegistry::new(MockArrivalSource::new());

        let manager = registry.setup(&entry("home", &["A"])).await;
        assert!(manager.is_running().await);
        assert_eq!(registry.entry_ids().await, vec![EntryId::new("home")]);
        assert!(registry.get(&EntryId::new("home")).await.is_some());

        assert!(registry.unload(&EntryId::new("home")).await);
        assert!(!manager.is_running().await);
        assert!(registry.get(&EntryId::new("home")).await.is_none());
        assert!(!registry.unload(&EntryId::new("home")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn setup_again_replaces_and_stops_previous() {
        let registry = ManagerRegistry::new(MockArrivalSource::new());

        let first = registry.setup(&entry("home", &["A"])).await;
        let second = registry.setup(&entry("home", &["B", "C"])).await;

        assert!(!first.is_running().await);
        assert!(second.is_running().await);
        assert_eq!(registry.entry_ids().await.len(), 1);

        let current = registry.get(&EntryId::new("home")).await.unwrap();
        assert_eq!(current.stops().await.len(), 2);

        registry.unload_all().await;
    }

    #[tokio::test(start_paused = true)]
    async fn entries_are_independent() {
        let source = MockArrivalSource::new();
        source
            .set(
                StopId::parse("A").unwrap(),
                MockResponse::Arrivals(vec![RawArrival::new("25", "X", "Y", 60)]),
            )
            .await;

        let registry = ManagerRegistry::new(source.clone());
        let home = registry.setup(&entry("home", &["A"])).await;
        let work = registry.setup(&entry("work", &["A"])).await;
        let mut alerts = registry.subscribe();

        home.run_cycle().await;

        let stop = StopId::parse("A").unwrap();
        assert!(home.get_latest(&stop).await.is_some());
        assert!(work.get_latest(&stop).await.is_none());
        assert_eq!(alerts.try_recv().unwrap().stop_id, stop);

        registry.unload_all().await;
        assert!(registry.entry_ids().await.is_empty());
        assert!(!home.is_running().await);
        assert!(!work.is_running().await);
    }
}
