//! Cross-context message contract.
//!
//! Requests are a tagged union keyed by `action`; every handler matches on
//! the variants it serves and rejects the rest with a typed error.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RouterError;
use crate::types::{AgentOutcome, Command, ContextId, Counters, Intent, Settings, StatsEvent};

/// Addressable context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Background,
    SettingsUi,
    Page(ContextId),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Background => write!(f, "background"),
            Endpoint::SettingsUi => write!(f, "settings-ui"),
            Endpoint::Page(id) => write!(f, "page({})", id),
        }
    }
}

/// Request sent between contexts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    /// Liveness probe; carries no payload.
    Ping,
    CheckSelectedText {
        #[serde(default)]
        selected_text: Option<String>,
    },
    ConvertToPrompt {
        #[serde(default)]
        selected_text: Option<String>,
    },
    /// Fire-and-forget: settings were saved.
    SettingsChanged {
        #[serde(default)]
        changed_keys: Vec<String>,
    },
    UpdateStats {
        event: StatsEvent,
        #[serde(default)]
        issues_found: u64,
    },
    GetSettings,
    /// Fire-and-forget: counters changed.
    StatsUpdated { counters: Counters },
}

impl From<Command> for Request {
    fn from(command: Command) -> Self {
        Request::for_intent(command.intent, command.selected_text)
    }
}

impl Request {
    const ACTIONS: &'static [&'static str] = &[
        "ping",
        "checkSelectedText",
        "convertToPrompt",
        "settingsChanged",
        "updateStats",
        "getSettings",
        "statsUpdated",
    ];

    /// Build the agent request for an intent.
    pub fn for_intent(intent: Intent, selected_text: Option<String>) -> Self {
        match intent {
            Intent::CheckText => Request::CheckSelectedText { selected_text },
            Intent::ConvertPrompt => Request::ConvertToPrompt { selected_text },
            Intent::Ping => Request::Ping,
        }
    }

    /// Wire name of the action.
    pub fn action(&self) -> &'static str {
        match self {
            Request::Ping => "ping",
            Request::CheckSelectedText { .. } => "checkSelectedText",
            Request::ConvertToPrompt { .. } => "convertToPrompt",
            Request::SettingsChanged { .. } => "settingsChanged",
            Request::UpdateStats { .. } => "updateStats",
            Request::GetSettings => "getSettings",
            Request::StatsUpdated { .. } => "statsUpdated",
        }
    }

    /// Notifications never get a reply.
    pub fn expects_reply(&self) -> bool {
        !matches!(
            self,
            Request::SettingsChanged { .. } | Request::StatsUpdated { .. }
        )
    }

    /// Decode a loosely typed message from a host transport.
    pub fn decode(raw: Value) -> Result<Self, RouterError> {
        let action = raw
            .get("action")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RouterError::UnknownCommand("<missing action>".to_string()))?;

        if !Self::ACTIONS.contains(&action.as_str()) {
            return Err(RouterError::UnknownCommand(action));
        }

        serde_json::from_value(raw).map_err(|e| RouterError::MalformedPayload {
            action,
            message: e.to_string(),
        })
    }
}

/// Successful reply to a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Response {
    Ready { status: String },
    Outcome { outcome: AgentOutcome },
    Stats { counters: Counters },
    Settings { settings: Settings },
    Ack,
}

impl Response {
    pub fn ready() -> Self {
        Response::Ready {
            status: "ready".to_string(),
        }
    }
}

/// Handler bound to one endpoint.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle one request. Notifications are handled the same way; their
    /// result is discarded by the router.
    async fn handle(&self, from: Endpoint, request: Request) -> Result<Response, RouterError>;
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
