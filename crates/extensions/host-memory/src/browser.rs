//! Simulated browser tabs.
//!
//! Pages are plain records in a concurrent map. Installing the agent script
//! builds a [`ContentAgent`] for the page and binds it on the router, which
//! is what a content script registering its message listener amounts to.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use inkcheck_config::ProviderConfig;
use inkcheck_core::{ContentAgent, MessageRouter, Registration, is_supported_url};
use inkcheck_protocols::{
    AgentHandle, ContextId, Endpoint, HostError, KeyValueStore, LoadState, MessageHandler,
    PageHost, Request, Response, RouterError, TextGenerator, TransportError, WindowKind,
};

use crate::view::PageView;

/// Everything an installed agent needs from its surroundings.
#[derive(Clone)]
pub struct AgentEnvironment {
    pub store: Arc<dyn KeyValueStore>,
    pub generator: Arc<dyn TextGenerator>,
    pub router: MessageRouter,
    pub provider: ProviderConfig,
    pub min_convert_length: usize,
}

/// Whether messages can reach the agent in a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageAccess {
    #[default]
    Open,
    /// The tab cannot be edited right now, e.g. while it is being dragged.
    ReadOnly,
    /// The document was replaced by a browser-internal page.
    Restricted,
}

struct Tab {
    handle: AgentHandle,
    view: Arc<PageView>,
    agent: Option<(Arc<ContentAgent>, Registration)>,
    /// Installs succeed but no agent starts, like a page whose policy
    /// blocks extension scripts.
    blocked: bool,
    access: PageAccess,
    installs: usize,
    styles: usize,
}

/// In-memory [`PageHost`].
pub struct SimulatedBrowser {
    env: AgentEnvironment,
    tabs: Arc<DashMap<ContextId, Tab>>,
    active: RwLock<Option<ContextId>>,
    next_id: AtomicU64,
    install_failure: Mutex<Option<HostError>>,
}

impl SimulatedBrowser {
    pub fn new(env: AgentEnvironment) -> Self {
        Self {
            env,
            tabs: Arc::new(DashMap::new()),
            active: RwLock::new(None),
            next_id: AtomicU64::new(1),
            install_failure: Mutex::new(None),
        }
    }

    /// Open a loaded tab and focus it.
    pub fn open(&self, url: &str) -> ContextId {
        self.open_with(url, LoadState::Complete, WindowKind::Normal)
    }

    /// Open a tab in the given state and focus it.
    pub fn open_with(&self, url: &str, load_state: LoadState, kind: WindowKind) -> ContextId {
        let id = ContextId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let handle = AgentHandle::new(id, url)
            .with_load_state(load_state)
            .with_window_kind(kind);

        self.tabs.insert(
            id,
            Tab {
                handle,
                view: Arc::new(PageView::default()),
                agent: None,
                blocked: false,
                access: PageAccess::Open,
                installs: 0,
                styles: 0,
            },
        );
        *self.active.write() = Some(id);
        debug!(page = %id, url, %kind, "Opened page");
        id
    }

    /// Close a tab. Its agent goes with it.
    pub fn close(&self, id: ContextId) {
        if self.tabs.remove(&id).is_some() {
            debug!(page = %id, "Closed page");
        }
        let mut active = self.active.write();
        if *active == Some(id) {
            *active = None;
        }
    }

    pub fn activate(&self, id: ContextId) {
        if self.tabs.contains_key(&id) {
            *self.active.write() = Some(id);
        }
    }

    /// Load a new address. The page starts loading and loses its agent.
    pub fn navigate(&self, id: ContextId, url: &str) -> Result<(), HostError> {
        let mut tab = self.tabs.get_mut(&id).ok_or(HostError::PageClosed(id))?;
        tab.handle.url = url.to_string();
        tab.handle.load_state = LoadState::Loading;
        tab.agent = None;
        tab.view = Arc::new(PageView::default());
        debug!(page = %id, url, "Navigated");
        Ok(())
    }

    pub fn finish_loading(&self, id: ContextId) {
        if let Some(mut tab) = self.tabs.get_mut(&id) {
            tab.handle.load_state = LoadState::Complete;
        }
    }

    /// Mark the page loaded after `delay`.
    pub fn finish_loading_after(&self, id: ContextId, delay: Duration) {
        let tabs = self.tabs.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(mut tab) = tabs.get_mut(&id) {
                tab.handle.load_state = LoadState::Complete;
            }
        });
    }

    /// Let script installs into this page succeed without starting an agent.
    pub fn block_agent(&self, id: ContextId) {
        if let Some(mut tab) = self.tabs.get_mut(&id) {
            tab.blocked = true;
        }
    }

    /// Change whether messages reach this page's agent.
    pub fn set_access(&self, id: ContextId, access: PageAccess) {
        if let Some(mut tab) = self.tabs.get_mut(&id) {
            tab.access = access;
            debug!(page = %id, ?access, "Page access changed");
        }
    }

    /// Fail every later script install with `error`.
    pub fn fail_installs(&self, error: HostError) {
        *self.install_failure.lock() = Some(error);
    }

    pub fn agent(&self, id: ContextId) -> Option<Arc<ContentAgent>> {
        self.tabs
            .get(&id)
            .and_then(|tab| tab.agent.as_ref().map(|(agent, _)| agent.clone()))
    }

    /// View rendering results in this page.
    pub fn view(&self, id: ContextId) -> Option<Arc<PageView>> {
        self.tabs.get(&id).map(|tab| tab.view.clone())
    }

    /// Script installs attempted on this page.
    pub fn install_count(&self, id: ContextId) -> usize {
        self.tabs.get(&id).map(|tab| tab.installs).unwrap_or(0)
    }

    pub fn style_count(&self, id: ContextId) -> usize {
        self.tabs.get(&id).map(|tab| tab.styles).unwrap_or(0)
    }
}

#[async_trait]
impl PageHost for SimulatedBrowser {
    async fn page(&self, id: ContextId) -> Result<AgentHandle, HostError> {
        self.tabs
            .get(&id)
            .map(|tab| tab.handle.clone())
            .ok_or(HostError::PageClosed(id))
    }

    async fn pages(&self) -> Vec<AgentHandle> {
        let mut pages: Vec<AgentHandle> = self.tabs.iter().map(|tab| tab.handle.clone()).collect();
        pages.sort_by_key(|p| p.context_id);
        pages
    }

    async fn active_page(&self) -> Option<AgentHandle> {
        let id = (*self.active.read())?;
        self.tabs.get(&id).map(|tab| tab.handle.clone())
    }

    async fn install_script(&self, id: ContextId, resource: &str) -> Result<(), HostError> {
        if let Some(error) = self.install_failure.lock().clone() {
            return Err(error);
        }

        let mut tab = self.tabs.get_mut(&id).ok_or(HostError::PageClosed(id))?;
        if !is_supported_url(&tab.handle.url) {
            return Err(HostError::Restricted(tab.handle.url.clone()));
        }
        tab.installs += 1;

        if tab.blocked {
            debug!(page = %id, resource, "Agent blocked by page");
            return Ok(());
        }
        // A second install into a page that already runs the agent is a no-op.
        if tab.agent.is_some() {
            debug!(page = %id, resource, "Agent already installed");
            return Ok(());
        }

        let agent = Arc::new(ContentAgent::new(
            id,
            tab.handle.url.clone(),
            self.env.store.clone(),
            self.env.generator.clone(),
            tab.view.clone(),
            self.env.router.clone(),
            self.env.provider.clone(),
            self.env.min_convert_length,
        ));
        let endpoint = TabEndpoint {
            id,
            tabs: self.tabs.clone(),
            agent: agent.clone(),
        };
        let registration = self.env.router.register(Endpoint::Page(id), Arc::new(endpoint));
        tab.agent = Some((agent, registration));

        info!(page = %id, resource, "Agent started");
        Ok(())
    }

    async fn install_style(&self, id: ContextId, _resource: &str) -> Result<(), HostError> {
        let mut tab = self.tabs.get_mut(&id).ok_or(HostError::PageClosed(id))?;
        tab.styles += 1;
        Ok(())
    }
}

/// Router binding of a page's agent. Delivery fails with a typed transport
/// error while the page is not [`PageAccess::Open`].
struct TabEndpoint {
    id: ContextId,
    tabs: Arc<DashMap<ContextId, Tab>>,
    agent: Arc<ContentAgent>,
}

#[async_trait]
impl MessageHandler for TabEndpoint {
    async fn handle(&self, from: Endpoint, request: Request) -> Result<Response, RouterError> {
        let access = self.tabs.get(&self.id).map(|tab| tab.access);
        match access {
            None => Err(TransportError::ConnectionLost(format!("page {} closed", self.id)).into()),
            Some(PageAccess::ReadOnly) => Err(TransportError::ReadOnlyPage.into()),
            Some(PageAccess::Restricted) => Err(TransportError::RestrictedPage.into()),
            Some(PageAccess::Open) => self.agent.handle(from, request).await,
        }
    }
}

#[cfg(test)]
#[path = "browser_tests.rs"]
mod tests;
