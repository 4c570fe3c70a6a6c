//! Wiring of the three contexts into one process.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use inkcheck_config::{Config, ConfigError, ConfigValidator};
use inkcheck_core::{
    AgentInjector, BackgroundService, CountersStore, InstallReason, LifecycleError, MenuManager,
    MenuState, MessageRouter, Orchestrator, Registration, SettingsPanel,
};
use inkcheck_host_memory::{AgentEnvironment, MenuRegistry, NotificationLog, SimulatedBrowser};
use inkcheck_protocols::{
    AgentOutcome, CapabilityError, Clock, ContextId, HostError, KeyValueStore, OrchestratorError,
    StorageError, SystemClock, TextGenerator,
};
use inkcheck_provider_gemini::GeminiGenerator;
use inkcheck_storage::{FileStore, MemoryStore};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Menu item {0} does not belong to inkcheck")]
    ForeignMenuItem(String),

    #[error(transparent)]
    Trigger(#[from] OrchestratorError),
}

/// Builder for [`InkcheckRuntime`].
pub struct RuntimeBuilder {
    config: Config,
    store: Option<Arc<dyn KeyValueStore>>,
    generator: Option<Arc<dyn TextGenerator>>,
    clock: Option<Arc<dyn Clock>>,
}

impl RuntimeBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: None,
            generator: None,
            clock: None,
        }
    }

    /// Use this store instead of the configured one.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use this generator instead of Gemini.
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate the configuration and start the background context.
    pub async fn build(self) -> Result<InkcheckRuntime, RuntimeError> {
        let warnings = ConfigValidator::validate(&self.config).into_result()?;
        for warning in warnings {
            warn!(path = %warning.path, "{}", warning.message);
        }

        let config = self.config;
        let store: Arc<dyn KeyValueStore> = match (self.store, &config.storage.path) {
            (Some(store), _) => store,
            (None, Some(path)) => Arc::new(FileStore::open(path.clone()).await?),
            (None, None) => Arc::new(MemoryStore::new()),
        };
        let generator: Arc<dyn TextGenerator> = match self.generator {
            Some(generator) => generator,
            None => Arc::new(GeminiGenerator::new(&config.provider)?),
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let router = MessageRouter::new(&config.router);
        let browser = Arc::new(SimulatedBrowser::new(AgentEnvironment {
            store: store.clone(),
            generator: generator.clone(),
            router: router.clone(),
            provider: config.provider.clone(),
            min_convert_length: config.orchestrator.min_convert_length,
        }));
        let menus = Arc::new(MenuRegistry::default());
        let notifications = Arc::new(NotificationLog::default());

        let injector = AgentInjector::new(browser.clone(), router.clone(), config.injection.clone());
        let orchestrator = Orchestrator::new(
            store.clone(),
            injector,
            router.clone(),
            notifications.clone(),
            config.orchestrator.clone(),
        );
        let counters = Arc::new(CountersStore::new(store.clone(), clock.clone(), router.clone()));
        let background = Arc::new(BackgroundService::new(
            store.clone(),
            router.clone(),
            MenuManager::new(menus.clone()),
            counters,
            orchestrator,
        ));

        let registration = background.register();
        let watcher = background.spawn_storage_watcher();
        info!("Background context started");

        Ok(InkcheckRuntime {
            config,
            store,
            generator,
            clock,
            router,
            browser,
            menus,
            notifications,
            background,
            _registration: registration,
            watcher,
        })
    }
}

/// A running background context with its in-process host.
pub struct InkcheckRuntime {
    config: Config,
    store: Arc<dyn KeyValueStore>,
    generator: Arc<dyn TextGenerator>,
    clock: Arc<dyn Clock>,
    router: MessageRouter,
    browser: Arc<SimulatedBrowser>,
    menus: Arc<MenuRegistry>,
    notifications: Arc<NotificationLog>,
    background: Arc<BackgroundService>,
    _registration: Registration,
    watcher: JoinHandle<()>,
}

impl InkcheckRuntime {
    pub fn builder(config: Config) -> RuntimeBuilder {
        RuntimeBuilder::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    pub fn browser(&self) -> &Arc<SimulatedBrowser> {
        &self.browser
    }

    pub fn menus(&self) -> &Arc<MenuRegistry> {
        &self.menus
    }

    pub fn notifications(&self) -> &Arc<NotificationLog> {
        &self.notifications
    }

    pub fn background(&self) -> &Arc<BackgroundService> {
        &self.background
    }

    /// Extension installed or updated.
    pub async fn install(&self, reason: InstallReason) -> Result<MenuState, RuntimeError> {
        Ok(self.background.on_installed(reason).await?)
    }

    /// Browser started with the extension already installed.
    pub async fn startup(&self) -> Result<MenuState, RuntimeError> {
        Ok(self.background.on_startup().await?)
    }

    /// Click a context menu entry over `selection` in `page`.
    pub async fn click_menu(
        &self,
        menu_item_id: &str,
        selection: Option<&str>,
        page: ContextId,
    ) -> Result<AgentOutcome, RuntimeError> {
        let click = self.menus.click(menu_item_id, selection, page)?;
        match self.background.on_menu_click(&click).await {
            Some(outcome) => Ok(outcome?),
            None => Err(RuntimeError::ForeignMenuItem(menu_item_id.to_string())),
        }
    }

    /// Open the settings UI. It stays registered until the session drops.
    pub fn open_settings(&self) -> SettingsSession {
        let panel = Arc::new(SettingsPanel::new(
            self.store.clone(),
            self.generator.clone(),
            self.browser.clone(),
            self.router.clone(),
            self.clock.clone(),
        ));
        let registration = panel.register();
        SettingsSession {
            panel,
            _registration: registration,
        }
    }

    /// Stop the storage watcher and invalidate every context.
    pub fn shutdown(self) {
        self.watcher.abort();
        self.router.close();
        info!("Runtime stopped");
    }
}

/// An open settings UI.
pub struct SettingsSession {
    panel: Arc<SettingsPanel>,
    _registration: Registration,
}

impl SettingsSession {
    pub fn panel(&self) -> &SettingsPanel {
        &self.panel
    }
}
