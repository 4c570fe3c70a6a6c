//! Trigger handling in the background context.
//!
//! A trigger (menu click) goes through: selection check, live-agent
//! injection, one command round trip. Failures are surfaced through the
//! notifier and returned; the orchestrator stays usable.

use std::sync::Arc;

use tracing::{debug, error, info};

use inkcheck_config::OrchestratorConfig;
use inkcheck_protocols::{
    AgentOutcome, Command, ContextId, Endpoint, Intent, KeyValueStore, Notifier, OrchestratorError,
    Request, Response,
};
use inkcheck_storage::load_settings;

use crate::injector::AgentInjector;
use crate::router::MessageRouter;

pub struct Orchestrator {
    store: Arc<dyn KeyValueStore>,
    injector: AgentInjector,
    router: MessageRouter,
    notifier: Arc<dyn Notifier>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        injector: AgentInjector,
        router: MessageRouter,
        notifier: Arc<dyn Notifier>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            injector,
            router,
            notifier,
            config,
        }
    }

    /// Deliver a user trigger to the page's agent and return its outcome.
    pub async fn handle_trigger(
        &self,
        intent: Intent,
        selected_text: Option<&str>,
        target: ContextId,
    ) -> Result<AgentOutcome, OrchestratorError> {
        let result = self.dispatch(intent, selected_text, target).await;

        match &result {
            Ok(_) => info!(page = %target, %intent, "Trigger completed"),
            Err(e) => {
                error!(page = %target, %intent, error = %e, "Trigger failed");
                self.notifier.notify(e.title(), &e.user_message());
            }
        }
        result
    }

    async fn dispatch(
        &self,
        intent: Intent,
        selected_text: Option<&str>,
        target: ContextId,
    ) -> Result<AgentOutcome, OrchestratorError> {
        let text = selected_text.map(str::trim).unwrap_or_default();
        let required = self.minimum_length(intent).await?;
        let actual = text.chars().count();
        if actual < required {
            return Err(OrchestratorError::SelectionTooShort { actual, required });
        }

        self.injector.ensure_live_agent(target).await?;

        let command = Command::new(intent, target).with_text(text);
        let to = Endpoint::Page(command.target);
        let request = Request::from(command);
        debug!(page = %target, action = request.action(), "Sending command");

        match self
            .router
            .request(Endpoint::Background, to, request)
            .await?
        {
            Response::Outcome { outcome } => Ok(outcome),
            other => Err(OrchestratorError::Protocol(format!(
                "expected an outcome, got {:?}",
                other
            ))),
        }
    }

    /// Inclusive minimum selection length for an intent.
    async fn minimum_length(&self, intent: Intent) -> Result<usize, OrchestratorError> {
        match intent {
            Intent::CheckText => {
                let settings = load_settings(self.store.as_ref())
                    .await
                    .map_err(|e| OrchestratorError::Storage(e.to_string()))?;
                Ok(settings.min_selection_length as usize)
            }
            Intent::ConvertPrompt => Ok(self.config.min_convert_length),
            Intent::Ping => Err(OrchestratorError::Protocol(
                "ping is not a user trigger".to_string(),
            )),
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
