//! Background context.
//!
//! Long-lived owner of the context menu, the orchestrator and the counters
//! store. Reacts to install/startup lifecycle events and storage changes,
//! and answers `updateStats` / `getSettings` requests from other contexts.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use inkcheck_protocols::{
    AgentOutcome, Endpoint, KeyValueStore, MenuClick, MessageHandler, OrchestratorError, Request,
    Response, RouterError, StorageChange, keys,
};
use inkcheck_storage::{load_settings, populate_defaults};

use crate::counters::CountersStore;
use crate::error::LifecycleError;
use crate::menu::{MenuManager, MenuState, intent_for_menu_id};
use crate::orchestrator::Orchestrator;
use crate::router::{MessageRouter, Registration};

/// Why the extension lifecycle `installed` event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallReason {
    Install,
    Update,
}

pub struct BackgroundService {
    store: Arc<dyn KeyValueStore>,
    router: MessageRouter,
    menu: MenuManager,
    counters: Arc<CountersStore>,
    orchestrator: Orchestrator,
}

impl BackgroundService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        router: MessageRouter,
        menu: MenuManager,
        counters: Arc<CountersStore>,
        orchestrator: Orchestrator,
    ) -> Self {
        Self {
            store,
            router,
            menu,
            counters,
            orchestrator,
        }
    }

    pub fn counters(&self) -> &Arc<CountersStore> {
        &self.counters
    }

    pub async fn menu_state(&self) -> MenuState {
        self.menu.state().await
    }

    /// First install populates default settings; both install and update
    /// rebuild the menu.
    pub async fn on_installed(&self, reason: InstallReason) -> Result<MenuState, LifecycleError> {
        if reason == InstallReason::Install {
            populate_defaults(self.store.as_ref()).await?;
            self.counters.initialize().await?;
        }
        info!(?reason, "Installed");
        self.rebuild_menu().await
    }

    /// Browser startup: apply a pending counters rollover and rebuild the menu.
    pub async fn on_startup(&self) -> Result<MenuState, LifecycleError> {
        self.counters.initialize().await?;
        self.rebuild_menu().await
    }

    /// React to a persisted store change.
    ///
    /// Settings changes are pushed to every live agent; `enabled` and `mode`
    /// changes also rebuild the menu.
    pub async fn on_storage_changed(&self, change: &StorageChange) -> Result<(), LifecycleError> {
        if change.touches(keys::SETTINGS) {
            let changed_keys: Vec<String> = change
                .changed_keys()
                .into_iter()
                .filter(|k| keys::SETTINGS.contains(&k.as_str()))
                .collect();
            let reached = self
                .router
                .broadcast_pages(Endpoint::Background, Request::SettingsChanged { changed_keys })
                .await;
            debug!(reached, "Settings change broadcast");
        }

        if change.touches(keys::MENU) {
            self.rebuild_menu().await?;
        }
        Ok(())
    }

    /// Handle a click on a menu entry. Clicks on entries we do not own are
    /// ignored and yield `None`.
    pub async fn on_menu_click(
        &self,
        click: &MenuClick,
    ) -> Option<Result<AgentOutcome, OrchestratorError>> {
        let Some(intent) = intent_for_menu_id(&click.menu_item_id) else {
            debug!(id = %click.menu_item_id, "Ignoring foreign menu click");
            return None;
        };

        Some(
            self.orchestrator
                .handle_trigger(intent, click.selection_text.as_deref(), click.page)
                .await,
        )
    }

    /// Bind the background endpoint on the router.
    pub fn register(self: &Arc<Self>) -> Registration {
        self.router.register(Endpoint::Background, self.clone())
    }

    /// Follow store changes until the store goes away.
    pub fn spawn_storage_watcher(self: &Arc<Self>) -> JoinHandle<()> {
        let service = self.clone();
        let mut changes = self.store.subscribe();

        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        if let Err(e) = service.on_storage_changed(&change).await {
                            warn!(error = %e, "Storage change handling failed");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Storage watcher lagged, rebuilding menu");
                        if let Err(e) = service.rebuild_menu().await {
                            warn!(error = %e, "Menu rebuild failed");
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Storage watcher stopped");
        })
    }

    async fn rebuild_menu(&self) -> Result<MenuState, LifecycleError> {
        let settings = load_settings(self.store.as_ref()).await?;
        Ok(self.menu.rebuild(&settings).await?)
    }
}

#[async_trait]
impl MessageHandler for BackgroundService {
    async fn handle(&self, from: Endpoint, request: Request) -> Result<Response, RouterError> {
        match request {
            Request::UpdateStats {
                event,
                issues_found,
            } => {
                debug!(%from, ?event, issues_found, "Stats update");
                let counters = self.counters.record_event(event, issues_found).await?;
                Ok(Response::Stats { counters })
            }
            Request::GetSettings => {
                let settings = load_settings(self.store.as_ref()).await?;
                Ok(Response::Settings { settings })
            }
            other => Err(RouterError::Unsupported {
                endpoint: Endpoint::Background.to_string(),
                action: other.action().to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "background_tests.rs"]
mod tests;
