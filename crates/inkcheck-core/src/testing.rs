//! Test doubles for host interfaces.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use inkcheck_config::RouterConfig;
use inkcheck_protocols::{
    AgentHandle, CapabilityError, ContextId, CorrectionResult, Endpoint, GenerationConfig,
    HostError, Intent, LoadState, MenuHost, MenuItem, MessageHandler, Notifier, PageHost, Request,
    Response, ResultView, RouterError, TextGenerator, TransformResult,
};

use crate::router::MessageRouter;

pub fn router() -> MessageRouter {
    MessageRouter::new(&RouterConfig::default())
}

/// Handler that answers pings and acknowledges everything else.
#[derive(Default)]
pub struct CountingHandler {
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<Request>>,
    pub delay: Option<Duration>,
}

impl CountingHandler {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageHandler for CountingHandler {
    async fn handle(&self, _from: Endpoint, request: Request) -> Result<Response, RouterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match request {
            Request::Ping => Ok(Response::ready()),
            Request::GetSettings => Err(RouterError::Unsupported {
                endpoint: "test".to_string(),
                action: request.action().to_string(),
            }),
            _ => Ok(Response::Ack),
        }
    }
}

type InstallHook = Box<dyn Fn(ContextId, usize) + Send + Sync>;

/// Scriptable page host.
#[derive(Default)]
pub struct FakePages {
    pages: Mutex<HashMap<ContextId, AgentHandle>>,
    active: Mutex<Option<ContextId>>,
    /// Lookups after which a loading page reports complete.
    complete_after: Mutex<HashMap<ContextId, usize>>,
    install_error: Mutex<Option<HostError>>,
    on_install: Mutex<Option<InstallHook>>,
    pub lookups: AtomicUsize,
    pub scripts: AtomicUsize,
    pub styles: AtomicUsize,
}

impl FakePages {
    pub fn with_page(handle: AgentHandle) -> Arc<Self> {
        let pages = Arc::new(Self::default());
        pages.add(handle);
        pages
    }

    pub fn add(&self, handle: AgentHandle) {
        self.pages.lock().insert(handle.context_id, handle);
    }

    pub fn close(&self, id: ContextId) {
        self.pages.lock().remove(&id);
    }

    pub fn set_active(&self, id: ContextId) {
        *self.active.lock() = Some(id);
    }

    pub fn complete_after(&self, id: ContextId, lookups: usize) {
        self.complete_after.lock().insert(id, lookups);
    }

    pub fn fail_installs(&self, error: HostError) {
        *self.install_error.lock() = Some(error);
    }

    /// Called with the page and the 1-based install count.
    pub fn on_install(&self, hook: impl Fn(ContextId, usize) + Send + Sync + 'static) {
        *self.on_install.lock() = Some(Box::new(hook));
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn scripts(&self) -> usize {
        self.scripts.load(Ordering::SeqCst)
    }

    pub fn styles(&self) -> usize {
        self.styles.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageHost for FakePages {
    async fn page(&self, id: ContextId) -> Result<AgentHandle, HostError> {
        let n = self.lookups.fetch_add(1, Ordering::SeqCst) + 1;
        let mut pages = self.pages.lock();
        let handle = pages.get_mut(&id).ok_or(HostError::PageClosed(id))?;
        if let Some(after) = self.complete_after.lock().get(&id) {
            if n > *after {
                handle.load_state = LoadState::Complete;
            }
        }
        Ok(handle.clone())
    }

    async fn pages(&self) -> Vec<AgentHandle> {
        self.pages.lock().values().cloned().collect()
    }

    async fn active_page(&self) -> Option<AgentHandle> {
        let active = (*self.active.lock())?;
        self.pages.lock().get(&active).cloned()
    }

    async fn install_script(&self, id: ContextId, _resource: &str) -> Result<(), HostError> {
        if let Some(error) = self.install_error.lock().clone() {
            return Err(error);
        }
        if !self.pages.lock().contains_key(&id) {
            return Err(HostError::PageClosed(id));
        }
        let n = self.scripts.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(hook) = self.on_install.lock().as_ref() {
            hook(id, n);
        }
        Ok(())
    }

    async fn install_style(&self, _id: ContextId, _resource: &str) -> Result<(), HostError> {
        self.styles.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Generator returning queued replies, then a fixed fallback.
#[derive(Default)]
pub struct FakeGenerator {
    replies: Mutex<VecDeque<Result<String, CapabilityError>>>,
    pub calls: Mutex<Vec<(String, String, GenerationConfig)>>,
}

impl FakeGenerator {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        let generator = Arc::new(Self::default());
        generator.push(Ok(reply.into()));
        generator
    }

    pub fn failing(error: CapabilityError) -> Arc<Self> {
        let generator = Arc::new(Self::default());
        generator.push(Err(error));
        generator
    }

    pub fn push(&self, reply: Result<String, CapabilityError>) {
        self.replies.lock().push_back(reply);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last_call(&self) -> Option<(String, String, GenerationConfig)> {
        self.calls.lock().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(
        &self,
        api_key: &str,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, CapabilityError> {
        self.calls
            .lock()
            .push((api_key.to_string(), prompt.to_string(), *config));
        self.replies
            .lock()
            .pop_front()
            .unwrap_or(Err(CapabilityError::EmptyResponse))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notes: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(String, String)> {
        self.notes.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.notes.lock().push((title.to_string(), message.to_string()));
    }
}

/// What a [`RecordingView`] was asked to show.
#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    Progress(Intent),
    Correction(String, CorrectionResult),
    Prompt(TransformResult),
    Error(String),
}

#[derive(Default)]
pub struct RecordingView {
    pub shown: Mutex<Vec<Shown>>,
}

impl RecordingView {
    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().clone()
    }
}

impl ResultView for RecordingView {
    fn show_progress(&self, intent: Intent) {
        self.shown.lock().push(Shown::Progress(intent));
    }

    fn show_correction(&self, original: &str, result: &CorrectionResult) {
        self.shown
            .lock()
            .push(Shown::Correction(original.to_string(), result.clone()));
    }

    fn show_prompt(&self, result: &TransformResult) {
        self.shown.lock().push(Shown::Prompt(result.clone()));
    }

    fn show_error(&self, message: &str) {
        self.shown.lock().push(Shown::Error(message.to_string()));
    }
}

#[derive(Default)]
pub struct FakeMenuHost {
    pub items: Mutex<Vec<MenuItem>>,
    pub removals: AtomicUsize,
    pub log: Mutex<Vec<String>>,
}

impl FakeMenuHost {
    pub fn ids(&self) -> Vec<String> {
        self.items.lock().iter().map(|i| i.id.clone()).collect()
    }
}

#[async_trait]
impl MenuHost for FakeMenuHost {
    async fn remove_all(&self) -> Result<(), HostError> {
        self.removals.fetch_add(1, Ordering::SeqCst);
        self.items.lock().clear();
        self.log.lock().push("remove_all".to_string());
        Ok(())
    }

    async fn create(&self, item: MenuItem) -> Result<(), HostError> {
        let mut items = self.items.lock();
        if items.iter().any(|i| i.id == item.id) {
            return Err(HostError::Failed(format!("duplicate menu id {}", item.id)));
        }
        self.log.lock().push(format!("create:{}", item.id));
        items.push(item);
        Ok(())
    }
}
