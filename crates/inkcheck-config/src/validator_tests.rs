use super::*;

#[test]
fn test_default_config_is_valid() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_zero_poll_interval() {
    let mut config = Config::default();
    config.injection.normal.poll_interval_ms = 0;
    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result
        .errors
        .iter()
        .any(|e| e.path == "injection.normal.poll_interval_ms"));
}

#[test]
fn test_load_timeout_shorter_than_poll() {
    let mut config = Config::default();
    config.injection.detached.load_timeout_ms = 50;
    let result = ConfigValidator::validate(&config);
    assert!(result
        .errors
        .iter()
        .any(|e| e.path == "injection.detached.load_timeout_ms"));
}

#[test]
fn test_zero_install_attempts() {
    let mut config = Config::default();
    config.injection.detached.max_install_attempts = 0;
    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
}

#[test]
fn test_many_install_attempts_warns() {
    let mut config = Config::default();
    config.injection.normal.max_install_attempts = 5;
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_router_zero_values() {
    let mut config = Config::default();
    config.router.ping_timeout_ms = 0;
    config.router.command_timeout_secs = 0;
    config.router.mailbox_capacity = 0;
    let result = ConfigValidator::validate(&config);
    assert_eq!(result.errors.len(), 3);
}

#[test]
fn test_zero_min_convert_length() {
    let mut config = Config::default();
    config.orchestrator.min_convert_length = 0;
    assert!(!ConfigValidator::validate(&config).is_valid());
}

#[test]
fn test_bad_base_url() {
    let mut config = Config::default();
    config.provider.base_url = "generativelanguage.googleapis.com".to_string();
    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "provider.base_url"));
}

#[test]
fn test_temperature_bounds() {
    let mut config = Config::default();
    config.provider.transform_temperature = 1.5;
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 1);

    config.provider.correction_temperature = -0.5;
    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
}

#[test]
fn test_into_result_reports_first_error() {
    let mut config = Config::default();
    config.provider.model = " ".to_string();
    let err = ConfigValidator::validate(&config).into_result().unwrap_err();
    assert!(err.to_string().contains("provider.model"));
}

#[test]
fn test_into_result_passes_warnings() {
    let mut config = Config::default();
    config.injection.normal.settle_delay_ms = 6_000;
    let warnings = ConfigValidator::validate(&config).into_result().unwrap();
    assert_eq!(warnings.len(), 1);
}
