//! Per-page content agent.
//!
//! Installed into a page by the injector, the agent answers liveness pings,
//! runs the capability call for a command, renders the result and reports
//! completion to the background context.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use inkcheck_config::ProviderConfig;
use inkcheck_protocols::{
    AgentError, AgentOutcome, ContextId, Endpoint, GenerationConfig, Intent, KeyValueStore,
    MessageHandler, Request, Response, ResultView, RouterError, Settings, StatsEvent,
    TextGenerator,
};
use inkcheck_storage::load_settings;

use crate::extract::{extract_correction, extract_transform};
use crate::prompt::{correction_prompt, transform_prompt};
use crate::router::MessageRouter;

/// Kind of page the selected text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageContext {
    Email,
    Chat,
    Form,
    #[default]
    Default,
}

impl PageContext {
    /// Guess the page kind from its address.
    pub fn detect(url: &str) -> Self {
        let url = url.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| url.contains(n));

        if has(&["mail", "outlook", "gmail"]) {
            PageContext::Email
        } else if has(&["teams", "slack", "discord", "chat"]) {
            PageContext::Chat
        } else if has(&["form"]) {
            PageContext::Form
        } else {
            PageContext::Default
        }
    }
}

/// Agent living in one page.
pub struct ContentAgent {
    page: ContextId,
    url: String,
    store: Arc<dyn KeyValueStore>,
    generator: Arc<dyn TextGenerator>,
    view: Arc<dyn ResultView>,
    router: MessageRouter,
    provider: ProviderConfig,
    min_convert_length: usize,
    settings: RwLock<Settings>,
}

impl ContentAgent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        page: ContextId,
        url: impl Into<String>,
        store: Arc<dyn KeyValueStore>,
        generator: Arc<dyn TextGenerator>,
        view: Arc<dyn ResultView>,
        router: MessageRouter,
        provider: ProviderConfig,
        min_convert_length: usize,
    ) -> Self {
        Self {
            page,
            url: url.into(),
            store,
            generator,
            view,
            router,
            provider,
            min_convert_length,
            settings: RwLock::new(Settings::default()),
        }
    }

    pub fn page(&self) -> ContextId {
        self.page
    }

    /// Settings as last loaded.
    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    /// Re-read settings from the store.
    pub async fn reload_settings(&self) -> Result<Settings, AgentError> {
        let settings = load_settings(self.store.as_ref())
            .await
            .map_err(|e| AgentError::Storage(e.to_string()))?;
        *self.settings.write() = settings.clone();
        Ok(settings)
    }

    /// Correct the selected text.
    pub async fn check_text(&self, selected: &str) -> Result<AgentOutcome, AgentError> {
        let outcome = self.run(Intent::CheckText, selected).await;
        self.finish(outcome)
    }

    /// Turn the selected text into an image prompt.
    pub async fn convert_prompt(&self, selected: &str) -> Result<AgentOutcome, AgentError> {
        let outcome = self.run(Intent::ConvertPrompt, selected).await;
        self.finish(outcome)
    }

    async fn run(&self, intent: Intent, selected: &str) -> Result<AgentOutcome, AgentError> {
        let settings = self.reload_settings().await?;
        if !settings.has_api_key() {
            return Err(AgentError::MissingApiKey);
        }

        let text = selected.trim();
        let required = match intent {
            Intent::ConvertPrompt => self.min_convert_length,
            _ => settings.min_selection_length as usize,
        };
        let actual = text.chars().count();
        if actual < required {
            return Err(AgentError::SelectionTooShort { actual, required });
        }

        self.view.show_progress(intent);

        match intent {
            Intent::ConvertPrompt => {
                let prompt = transform_prompt(
                    text,
                    settings.prompt_style,
                    settings.prompt_length,
                    settings.learning_enabled,
                );
                let config = GenerationConfig::new(
                    self.provider.transform_temperature,
                    self.provider.max_output_tokens,
                );
                let raw = self
                    .generator
                    .generate(&settings.api_key, &prompt, &config)
                    .await?;

                let result = extract_transform(
                    &raw,
                    text,
                    settings.prompt_style,
                    settings.learning_enabled,
                );
                self.view.show_prompt(&result);
                self.report(StatsEvent::PromptConverted, 0);
                Ok(AgentOutcome::Converted(result))
            }
            _ => {
                let prompt = correction_prompt(text, PageContext::detect(&self.url));
                let config = GenerationConfig::new(
                    self.provider.correction_temperature,
                    self.provider.max_output_tokens,
                );
                let raw = self
                    .generator
                    .generate(&settings.api_key, &prompt, &config)
                    .await?;

                let result = extract_correction(&raw, text);
                self.view.show_correction(text, &result);
                self.report(StatsEvent::CheckCompleted, result.reported_issue_count());
                Ok(AgentOutcome::Corrected(result))
            }
        }
    }

    fn finish(&self, outcome: Result<AgentOutcome, AgentError>) -> Result<AgentOutcome, AgentError> {
        if let Err(e) = &outcome {
            error!(page = %self.page, error = %e, "Command failed");
            self.view.show_error(&e.user_message());
        }
        outcome
    }

    /// Report a completed action without waiting for the counters update.
    fn report(&self, event: StatsEvent, issues_found: u64) {
        let router = self.router.clone();
        let from = Endpoint::Page(self.page);
        tokio::spawn(async move {
            let update = Request::UpdateStats {
                event,
                issues_found,
            };
            match router.request(from, Endpoint::Background, update).await {
                Ok(_) => debug!(%from, ?event, "Stats reported"),
                Err(e) => warn!(%from, error = %e, "Stats update failed"),
            }
        });
    }
}

#[async_trait]
impl MessageHandler for ContentAgent {
    async fn handle(&self, from: Endpoint, request: Request) -> Result<Response, RouterError> {
        match request {
            Request::Ping => Ok(Response::ready()),
            Request::CheckSelectedText { selected_text } => {
                let outcome = self
                    .check_text(selected_text.as_deref().unwrap_or_default())
                    .await?;
                Ok(Response::Outcome { outcome })
            }
            Request::ConvertToPrompt { selected_text } => {
                let outcome = self
                    .convert_prompt(selected_text.as_deref().unwrap_or_default())
                    .await?;
                Ok(Response::Outcome { outcome })
            }
            Request::SettingsChanged { changed_keys } => {
                let settings = self.reload_settings().await?;
                info!(page = %self.page, %from, ?changed_keys, mode = settings.mode.as_str(), "Settings reloaded");
                Ok(Response::Ack)
            }
            other => Err(RouterError::Unsupported {
                endpoint: Endpoint::Page(self.page).to_string(),
                action: other.action().to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
