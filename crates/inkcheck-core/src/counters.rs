//! Persisted usage counters with daily rollover.
//!
//! Owned by the background context. Every update is a read-modify-write of
//! the stored counters serialized behind one async mutex, with the day
//! rollover applied inside the same critical section.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use inkcheck_protocols::{
    Clock, Counters, Endpoint, KeyValueStore, Request, StatsEvent, StorageError,
};
use inkcheck_storage::{load_counters, save_counters};

use crate::router::MessageRouter;

pub struct CountersStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    router: MessageRouter,
    write_lock: Mutex<()>,
}

impl CountersStore {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, router: MessageRouter) -> Self {
        Self {
            store,
            clock,
            router,
            write_lock: Mutex::new(()),
        }
    }

    /// Count one completed action and tell the settings UI.
    pub async fn record_event(
        &self,
        event: StatsEvent,
        issues_found: u64,
    ) -> Result<Counters, StorageError> {
        let next = {
            let _guard = self.write_lock.lock().await;
            let current = load_counters(self.store.as_ref()).await?;
            let next = current.record(event, issues_found, self.clock.today());
            save_counters(self.store.as_ref(), &next).await?;
            next
        };

        debug!(
            ?event,
            issues_found,
            daily = next.daily_count,
            total = next.total_count,
            "Recorded event"
        );
        self.publish(&next).await;
        Ok(next)
    }

    /// Apply a pending day rollover to the stored counters.
    ///
    /// Run once when the background context starts. Also writes zeroed
    /// counters on first run.
    pub async fn initialize(&self) -> Result<Counters, StorageError> {
        let _guard = self.write_lock.lock().await;
        let current = load_counters(self.store.as_ref()).await?;
        let today = self.clock.today();
        if !current.needs_rollover(today) {
            return Ok(current);
        }

        let next = current.rolled_over(today);
        save_counters(self.store.as_ref(), &next).await?;
        info!(%today, "Daily counters reset");
        Ok(next)
    }

    /// Counters as they read today, without writing anything.
    pub async fn snapshot(&self) -> Result<Counters, StorageError> {
        let current = load_counters(self.store.as_ref()).await?;
        Ok(current.rolled_over(self.clock.today()))
    }

    async fn publish(&self, counters: &Counters) {
        let update = Request::StatsUpdated {
            counters: counters.clone(),
        };
        if let Err(e) = self
            .router
            .notify(Endpoint::Background, Endpoint::SettingsUi, update)
            .await
        {
            // The settings UI is usually closed.
            debug!(error = %e, "Stats update not delivered");
        }
    }
}

#[cfg(test)]
#[path = "counters_tests.rs"]
mod tests;
