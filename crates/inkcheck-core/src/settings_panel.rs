//! Settings UI context.
//!
//! Loads and validates settings, verifies the API key against the
//! capability before persisting, and keeps a live view of the usage
//! counters fed by `statsUpdated` notifications.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use inkcheck_protocols::{
    Clock, Counters, Endpoint, GenerationConfig, KeyValueStore, MessageHandler, PageHost, Request,
    Response, RouterError, Settings, SettingsError, TextGenerator, keys,
};
use inkcheck_storage::{load_counters, load_settings, save_settings};

use crate::router::{MessageRouter, Registration};

/// Accepted range for the minimum selection length.
pub const MIN_LENGTH_RANGE: std::ops::RangeInclusive<u32> = 10..=1000;

const KEY_PROBE_PROMPT: &str = "Hello";

pub struct SettingsPanel {
    store: Arc<dyn KeyValueStore>,
    generator: Arc<dyn TextGenerator>,
    pages: Arc<dyn PageHost>,
    router: MessageRouter,
    clock: Arc<dyn Clock>,
    stats: watch::Sender<Counters>,
}

impl SettingsPanel {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        generator: Arc<dyn TextGenerator>,
        pages: Arc<dyn PageHost>,
        router: MessageRouter,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (stats, _) = watch::channel(Counters::default());
        Self {
            store,
            generator,
            pages,
            router,
            clock,
            stats,
        }
    }

    pub async fn load_settings(&self) -> Result<Settings, SettingsError> {
        Ok(load_settings(self.store.as_ref()).await?)
    }

    /// Counters as they should read today. A stale daily count shows as 0
    /// without touching the store.
    pub async fn load_stats(&self) -> Result<Counters, SettingsError> {
        let stored = load_counters(self.store.as_ref()).await?;
        let counters = stored.rolled_over(self.clock.today());
        self.stats.send_replace(counters.clone());
        Ok(counters)
    }

    /// Live counters view.
    pub fn stats(&self) -> watch::Receiver<Counters> {
        self.stats.subscribe()
    }

    /// Validate, verify and persist a settings draft.
    ///
    /// Returns the settings as stored. Nothing is written when validation
    /// or key verification fails.
    pub async fn save_settings(&self, draft: Settings) -> Result<Settings, SettingsError> {
        let mut settings = draft;
        settings.api_key = settings.api_key.trim().to_string();

        validate(&settings)?;

        if settings.has_api_key() {
            self.verify_api_key(&settings.api_key).await?;
        }

        save_settings(self.store.as_ref(), &settings).await?;
        info!(enabled = settings.enabled, mode = settings.mode.as_str(), "Settings saved");

        self.notify_active_page().await;
        Ok(settings)
    }

    /// Bind the settings UI endpoint on the router.
    pub fn register(self: &Arc<Self>) -> Registration {
        self.router.register(Endpoint::SettingsUi, self.clone())
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<(), SettingsError> {
        self.generator
            .generate(api_key, KEY_PROBE_PROMPT, &GenerationConfig::key_probe())
            .await
            .map(|_| ())
            .map_err(|e| {
                warn!(error = %e, "API key verification failed");
                SettingsError::ApiKeyRejected
            })
    }

    async fn notify_active_page(&self) {
        let Some(page) = self.pages.active_page().await else {
            return;
        };
        let update = Request::SettingsChanged {
            changed_keys: keys::SETTINGS.iter().map(|k| k.to_string()).collect(),
        };
        // No agent is the common case.
        if let Err(e) = self
            .router
            .notify(Endpoint::SettingsUi, Endpoint::Page(page.context_id), update)
            .await
        {
            debug!(page = %page.context_id, error = %e, "Active page not notified");
        }
    }
}

fn validate(settings: &Settings) -> Result<(), SettingsError> {
    if !MIN_LENGTH_RANGE.contains(&settings.min_selection_length) {
        return Err(SettingsError::Validation {
            field: keys::MIN_LENGTH.to_string(),
            message: format!(
                "Minimum length must be between {} and {}.",
                MIN_LENGTH_RANGE.start(),
                MIN_LENGTH_RANGE.end()
            ),
        });
    }
    if settings.enabled && !settings.has_api_key() {
        return Err(SettingsError::Validation {
            field: keys::API_KEY.to_string(),
            message: "Enter an API key to enable the extension.".to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl MessageHandler for SettingsPanel {
    async fn handle(&self, _from: Endpoint, request: Request) -> Result<Response, RouterError> {
        match request {
            Request::StatsUpdated { counters } => {
                self.stats.send_replace(counters);
                Ok(Response::Ack)
            }
            other => Err(RouterError::Unsupported {
                endpoint: Endpoint::SettingsUi.to_string(),
                action: other.action().to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "settings_panel_tests.rs"]
mod tests;
