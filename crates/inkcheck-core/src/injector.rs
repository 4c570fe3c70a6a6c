//! Agent injection and liveness.
//!
//! [`AgentInjector::ensure_live_agent`] makes sure a page has an agent that
//! answers pings before a command is sent to it:
//!
//! ```text
//! lookup ─▶ supported? ─▶ wait for load ─▶ ping ──ok──▶ done
//!                                            │
//!                                            ▼ no reply
//!                          ┌──▶ install ─▶ settle ─▶ ping ──ok──▶ done
//!                          └──── retry while attempts remain
//! ```
//!
//! Timings come from the window kind's [`LivenessPolicy`].

use std::sync::Arc;

use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};
use url::Url;

use inkcheck_config::{InjectionConfig, LivenessPolicy};
use inkcheck_protocols::{
    ContextId, Endpoint, HostError, InjectionError, PageHost, Request, Response, WindowKind,
};

use crate::router::MessageRouter;

/// URL schemes agents can never be installed into.
pub const RESTRICTED_SCHEMES: &[&str] = &[
    "chrome",
    "chrome-extension",
    "moz-extension",
    "about",
    "file",
    "edge",
    "opera",
];

/// Whether an agent may run on a page with this address.
pub fn is_supported_url(url: &str) -> bool {
    if url.trim().is_empty() {
        return false;
    }
    match Url::parse(url) {
        Ok(parsed) => !RESTRICTED_SCHEMES.contains(&parsed.scheme()),
        Err(_) => false,
    }
}

fn from_host(error: HostError) -> InjectionError {
    match error {
        HostError::PageClosed(id) => InjectionError::PageClosed(id),
        HostError::Restricted(url) => InjectionError::UnsupportedPage { url },
        HostError::Failed(reason) => InjectionError::InstallFailed(reason),
    }
}

/// Installs agents on demand and verifies they respond.
pub struct AgentInjector {
    pages: Arc<dyn PageHost>,
    router: MessageRouter,
    config: InjectionConfig,
}

impl AgentInjector {
    pub fn new(pages: Arc<dyn PageHost>, router: MessageRouter, config: InjectionConfig) -> Self {
        Self {
            pages,
            router,
            config,
        }
    }

    /// Policy applied to a window kind.
    pub fn policy_for(&self, kind: WindowKind) -> &LivenessPolicy {
        if kind.is_detached() {
            &self.config.detached
        } else {
            &self.config.normal
        }
    }

    /// Make sure the page has a responsive agent.
    ///
    /// A final probe that still gets no answer after the last install is
    /// logged, and the caller proceeds to send anyway.
    pub async fn ensure_live_agent(&self, id: ContextId) -> Result<(), InjectionError> {
        let handle = self.pages.page(id).await.map_err(from_host)?;

        if !is_supported_url(&handle.url) {
            debug!(page = %id, url = %handle.url, "Unsupported page");
            return Err(InjectionError::UnsupportedPage { url: handle.url });
        }

        let policy = self.policy_for(handle.window_kind).clone();

        if !handle.is_complete() {
            self.wait_for_load(id, &policy).await?;
        }

        if self.probe(id).await {
            debug!(page = %id, "Agent already live");
            return Ok(());
        }

        let attempts = policy.max_install_attempts.max(1);
        for attempt in 1..=attempts {
            let delay = if attempt == 1 {
                policy.install_delay()
            } else {
                policy.retry_delay()
            };
            if !delay.is_zero() {
                sleep(delay).await;
            }

            match self.install(id).await {
                Ok(()) => {}
                Err(e) if attempt == 1 => return Err(e),
                Err(e) => {
                    warn!(page = %id, attempt, error = %e, "Retry install failed");
                    break;
                }
            }
            sleep(policy.settle_delay()).await;

            if self.probe(id).await {
                info!(page = %id, attempt, kind = %handle.window_kind, "Agent installed");
                return Ok(());
            }
            debug!(page = %id, attempt, "Agent not answering after install");
        }

        warn!(
            page = %id,
            attempts,
            "Agent did not answer after installation, continuing"
        );
        Ok(())
    }

    async fn wait_for_load(&self, id: ContextId, policy: &LivenessPolicy) -> Result<(), InjectionError> {
        let started = Instant::now();
        let deadline = started + policy.load_timeout();

        loop {
            sleep(policy.poll_interval()).await;

            let handle = self.pages.page(id).await.map_err(from_host)?;
            if handle.is_complete() {
                debug!(page = %id, waited_ms = started.elapsed().as_millis() as u64, "Page loaded");
                return Ok(());
            }

            if Instant::now() >= deadline {
                let waited_ms = started.elapsed().as_millis() as u64;
                warn!(page = %id, waited_ms, "Page did not finish loading");
                return Err(InjectionError::Timeout { waited_ms });
            }
        }
    }

    async fn probe(&self, id: ContextId) -> bool {
        let reply = self
            .router
            .request_with_timeout(
                Endpoint::Background,
                Endpoint::Page(id),
                Request::Ping,
                self.router.ping_timeout(),
            )
            .await;

        matches!(reply, Ok(Response::Ready { .. }))
    }

    async fn install(&self, id: ContextId) -> Result<(), InjectionError> {
        self.pages
            .install_script(id, &self.config.script_resource)
            .await
            .map_err(from_host)?;

        // Stylesheet failures are not fatal.
        if let Err(e) = self
            .pages
            .install_style(id, &self.config.style_resource)
            .await
        {
            warn!(page = %id, error = %e, "Stylesheet installation failed");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "injector_tests.rs"]
mod tests;
