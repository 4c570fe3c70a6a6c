//! Configuration schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub injection: InjectionConfig,

    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Bounded retry policy used while making sure a page has a live agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivenessPolicy {
    /// Interval between load-state polls.
    pub poll_interval_ms: u64,

    /// Ceiling for waiting on the page to finish loading.
    pub load_timeout_ms: u64,

    /// Wait before the first installation.
    pub install_delay_ms: u64,

    /// Wait between installation and the verification probe.
    pub settle_delay_ms: u64,

    /// Wait before a repeated installation.
    pub retry_delay_ms: u64,

    /// Installations attempted before giving up on verification.
    pub max_install_attempts: u32,
}

impl LivenessPolicy {
    /// Policy for normal top-level tabs.
    pub fn normal() -> Self {
        Self {
            poll_interval_ms: 100,
            load_timeout_ms: 5_000,
            install_delay_ms: 0,
            settle_delay_ms: 300,
            retry_delay_ms: 500,
            max_install_attempts: 1,
        }
    }

    /// Policy for popup and framed windows, which initialise more slowly.
    pub fn detached() -> Self {
        Self {
            poll_interval_ms: 100,
            load_timeout_ms: 10_000,
            install_delay_ms: 500,
            settle_delay_ms: 800,
            retry_delay_ms: 500,
            max_install_attempts: 2,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn install_delay(&self) -> Duration {
        Duration::from_millis(self.install_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Injection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectionConfig {
    #[serde(default = "LivenessPolicy::normal")]
    pub normal: LivenessPolicy,

    #[serde(default = "LivenessPolicy::detached")]
    pub detached: LivenessPolicy,

    /// Agent script resource handed to the page host.
    #[serde(default = "default_script_resource")]
    pub script_resource: String,

    /// Stylesheet resource handed to the page host.
    #[serde(default = "default_style_resource")]
    pub style_resource: String,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            normal: LivenessPolicy::normal(),
            detached: LivenessPolicy::detached(),
            script_resource: default_script_resource(),
            style_resource: default_style_resource(),
        }
    }
}

fn default_script_resource() -> String {
    "content.js".to_string()
}

fn default_style_resource() -> String {
    "styles.css".to_string()
}

/// Message router configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Per-probe timeout for liveness pings.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_ms: u64,

    /// Timeout for a full command round trip, including the capability call.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Queue depth of each endpoint's mailbox.
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
}

impl RouterConfig {
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            ping_timeout_ms: default_ping_timeout(),
            command_timeout_secs: default_command_timeout(),
            mailbox_capacity: default_mailbox_capacity(),
        }
    }
}

fn default_ping_timeout() -> u64 {
    1_000
}

fn default_command_timeout() -> u64 {
    120
}

fn default_mailbox_capacity() -> usize {
    64
}

/// Orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Minimum selection length for prompt conversion. Correction mode uses
    /// the persisted user setting instead.
    #[serde(default = "default_min_convert_length")]
    pub min_convert_length: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            min_convert_length: default_min_convert_length(),
        }
    }
}

fn default_min_convert_length() -> usize {
    5
}

/// AI capability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_correction_temperature")]
    pub correction_temperature: f32,

    #[serde(default = "default_transform_temperature")]
    pub transform_temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            correction_temperature: default_correction_temperature(),
            transform_temperature: default_transform_temperature(),
            max_output_tokens: default_max_output_tokens(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}

fn default_correction_temperature() -> f32 {
    0.1
}

fn default_transform_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    1000
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    60
}

/// Persisted store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file backing the store. In-memory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for daily-rolling log files. Console only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    #[serde(default = "default_ansi")]
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
            ansi: default_ansi(),
        }
    }
}

impl LoggingConfig {
    /// Default log directory under the user's home.
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".inkcheck").join("logs"))
            .unwrap_or_else(|| PathBuf::from(".inkcheck/logs"))
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_ansi() -> bool {
    true
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
