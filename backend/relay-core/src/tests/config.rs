// Unit tests for config loading, validation and overrides

use crate::config::{ENV_HOST, ENV_LOG_FILE, ENV_PORT, RelayConfig};
use crate::error::config::ConfigError;

use std::collections::HashMap;
use std::path::PathBuf;

use tempfile::TempDir;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

/// **VALUE**: Verifies a first run without a config file works.
///
/// **WHY THIS MATTERS**: Nobody should have to write `relay.json` to try the relay.
///
/// **BUG THIS CATCHES**: Would catch `load()` returning an error for a missing file.
#[test]
fn given_no_config_file_when_loaded_then_returns_defaults() {
    // GIVEN: An empty config directory
    let temp_dir = TempDir::new().unwrap();

    // WHEN: Loading
    let config = RelayConfig::load(temp_dir.path()).unwrap();

    // THEN: Defaults match the wire defaults
    assert_eq!(config, RelayConfig::default());
    assert_eq!(config.endpoint.address(), "127.0.0.1:8080");
    assert_eq!(config.server.buffer_size, 1024);
    assert_eq!(config.server.log_file, PathBuf::from("server_log.csv"));
    assert_eq!(config.client.health_check_interval_ms, 2000);
}

/// **VALUE**: Verifies partial files are filled in with defaults.
///
/// **WHY THIS MATTERS**: Users typically set only the port or only the log path.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[serde(default)]` on a section or field.
#[test]
fn given_partial_config_when_loaded_then_missing_fields_use_defaults() {
    // GIVEN: A config that only sets the port
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("relay.json"),
        r#"{ "endpoint": { "port": 9090 } }"#,
    )
    .unwrap();

    // WHEN: Loading
    let config = RelayConfig::load(temp_dir.path()).unwrap();

    // THEN: Port is taken from the file, everything else is default
    assert_eq!(config.endpoint.port, 9090);
    assert_eq!(config.endpoint.host, "127.0.0.1");
    assert_eq!(config.client.buffer_size, 1024);
}

/// **VALUE**: Verifies a corrupt file is reported rather than silently ignored.
///
/// **WHY THIS MATTERS**: Silently falling back to defaults would make a typo send the
/// client to the wrong port with no hint why.
///
/// **BUG THIS CATCHES**: Would catch parse errors being swallowed.
#[test]
fn given_invalid_json_when_loaded_then_returns_parse_error() {
    // GIVEN: A malformed config file
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("relay.json"), "{ not json").unwrap();

    // WHEN: Loading
    let result = RelayConfig::load(temp_dir.path());

    // THEN: ParseError naming the file
    let err = result.unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert!(err.to_string().contains("relay.json"));
}

/// **VALUE**: Verifies a zero buffer size is rejected.
///
/// **WHY THIS MATTERS**: A zero-length read returns 0 immediately, which the session
/// loop treats as "peer closed": every connection would end instantly.
///
/// **BUG THIS CATCHES**: Would catch removal of the buffer size check.
#[test]
fn given_zero_buffer_size_when_validated_then_returns_validation_error() {
    // GIVEN: A config with a zero server buffer
    let mut config = RelayConfig::default();
    config.server.buffer_size = 0;

    // WHEN: Validating
    let result = config.validate();

    // THEN: ValidationError
    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

/// **VALUE**: Verifies a zero health interval is rejected.
///
/// **WHY THIS MATTERS**: `tokio::time::interval` panics on a zero period.
///
/// **BUG THIS CATCHES**: Would catch removal of the interval check.
#[test]
fn given_zero_health_interval_when_validated_then_returns_validation_error() {
    // GIVEN: A config with a zero interval
    let mut config = RelayConfig::default();
    config.client.health_check_interval_ms = 0;

    // WHEN / THEN: Validation fails
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError { .. })
    ));
}

/// **VALUE**: Verifies environment overrides win over file values.
///
/// **WHY THIS MATTERS**: Deployments point the relay at a different host/port/log path
/// without editing files.
///
/// **BUG THIS CATCHES**: Would catch an override key being ignored or misspelled.
#[test]
fn given_overrides_when_applied_then_replace_config_values() {
    // GIVEN: Default config and overrides for every key
    let mut config = RelayConfig::default();
    let overrides = lookup(&[
        (ENV_HOST, "0.0.0.0"),
        (ENV_PORT, "9999"),
        (ENV_LOG_FILE, "/tmp/relay.csv"),
    ]);

    // WHEN: Applying overrides
    config.apply_overrides(overrides).unwrap();

    // THEN: All three values are replaced
    assert_eq!(config.endpoint.address(), "0.0.0.0:9999");
    assert_eq!(config.server.log_file, PathBuf::from("/tmp/relay.csv"));
}

/// **VALUE**: Verifies a non-numeric port override is rejected.
///
/// **WHY THIS MATTERS**: A typo in `RELAY_PORT` must fail startup with a clear message.
///
/// **BUG THIS CATCHES**: Would catch the override falling back to a default port.
#[test]
fn given_invalid_port_override_when_applied_then_returns_validation_error() {
    // GIVEN: A bad port override
    let mut config = RelayConfig::default();

    // WHEN: Applying it
    let result = config.apply_overrides(lookup(&[(ENV_PORT, "eighty")]));

    // THEN: ValidationError mentioning the variable
    let err = result.unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
    assert!(err.to_string().contains(ENV_PORT));
}
