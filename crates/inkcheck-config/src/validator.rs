//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{Config, LivenessPolicy};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// First error as a `ConfigError`, if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(ConfigError::InvalidValue {
                field: e.path,
                message: e.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_policy("injection.normal", &config.injection.normal, &mut result);
        Self::validate_policy("injection.detached", &config.injection.detached, &mut result);
        Self::validate_resources(config, &mut result);
        Self::validate_router(config, &mut result);
        Self::validate_orchestrator(config, &mut result);
        Self::validate_provider(config, &mut result);

        result
    }

    fn validate_policy(path: &str, policy: &LivenessPolicy, result: &mut ValidationResult) {
        if policy.poll_interval_ms == 0 {
            result.add_error(ValidationError::new(
                format!("{}.poll_interval_ms", path),
                "poll_interval_ms must be greater than 0",
            ));
        }

        if policy.load_timeout_ms < policy.poll_interval_ms {
            result.add_error(ValidationError::new(
                format!("{}.load_timeout_ms", path),
                "load_timeout_ms must not be shorter than poll_interval_ms",
            ));
        }

        if policy.max_install_attempts == 0 {
            result.add_error(ValidationError::new(
                format!("{}.max_install_attempts", path),
                "max_install_attempts must be at least 1",
            ));
        }

        if policy.max_install_attempts > 3 {
            result.add_warning(ValidationWarning::new(
                format!("{}.max_install_attempts", path),
                "more than 3 install attempts may load the agent several times",
            ));
        }

        if policy.settle_delay_ms > 5_000 {
            result.add_warning(ValidationWarning::new(
                format!("{}.settle_delay_ms", path),
                "settle_delay_ms over 5s makes every first command noticeably slow",
            ));
        }
    }

    fn validate_resources(config: &Config, result: &mut ValidationResult) {
        if config.injection.script_resource.trim().is_empty() {
            result.add_error(ValidationError::new(
                "injection.script_resource",
                "Script resource cannot be empty",
            ));
        }
    }

    fn validate_router(config: &Config, result: &mut ValidationResult) {
        if config.router.ping_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "router.ping_timeout_ms",
                "ping_timeout_ms must be greater than 0",
            ));
        }

        if config.router.command_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "router.command_timeout_secs",
                "command_timeout_secs must be greater than 0",
            ));
        }

        if config.router.mailbox_capacity == 0 {
            result.add_error(ValidationError::new(
                "router.mailbox_capacity",
                "mailbox_capacity must be greater than 0",
            ));
        }
    }

    fn validate_orchestrator(config: &Config, result: &mut ValidationResult) {
        if config.orchestrator.min_convert_length == 0 {
            result.add_error(ValidationError::new(
                "orchestrator.min_convert_length",
                "min_convert_length must be greater than 0",
            ));
        }
    }

    fn validate_provider(config: &Config, result: &mut ValidationResult) {
        let provider = &config.provider;

        if !provider.base_url.starts_with("http://") && !provider.base_url.starts_with("https://")
        {
            result.add_error(ValidationError::new(
                "provider.base_url",
                "base_url must start with http:// or https://",
            ));
        }

        if provider.model.trim().is_empty() {
            result.add_error(ValidationError::new(
                "provider.model",
                "Model cannot be empty",
            ));
        }

        if provider.max_output_tokens == 0 {
            result.add_error(ValidationError::new(
                "provider.max_output_tokens",
                "max_output_tokens must be greater than 0",
            ));
        }

        for (field, value) in [
            ("provider.correction_temperature", provider.correction_temperature),
            ("provider.transform_temperature", provider.transform_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                result.add_error(ValidationError::new(field, "temperature must be within 0.0..=2.0"));
            } else if value > 1.0 {
                result.add_warning(ValidationWarning::new(
                    field,
                    "temperature above 1.0 makes structured replies unreliable",
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
