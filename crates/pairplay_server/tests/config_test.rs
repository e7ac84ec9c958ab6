//! Tests for layered server configuration.

use pairplay_server::{HOST_ENV, PORT_ENV, ServerConfig};
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write config");
    file
}

#[test]
fn test_defaults() {
    let config = ServerConfig::default();
    assert_eq!(config.host(), "127.0.0.1");
    assert_eq!(*config.port(), 3000);
    assert_eq!(config.bind_addr(), "127.0.0.1:3000");
}

#[test]
fn test_from_file_partial_keeps_defaults() {
    let file = config_file("port = 8080\n");
    let config = ServerConfig::from_file(file.path()).expect("Load failed");
    assert_eq!(config, ServerConfig::new("127.0.0.1", 8080));
}

#[test]
fn test_from_file_full() {
    let file = config_file("host = \"0.0.0.0\"\nport = 9000\n");
    let config = ServerConfig::from_file(file.path()).expect("Load failed");
    assert_eq!(config.bind_addr(), "0.0.0.0:9000");
}

#[test]
fn test_from_file_invalid_toml() {
    let file = config_file("port = \"not a number\"\n");
    let err = ServerConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_from_missing_file() {
    let err = ServerConfig::from_file("/nonexistent/pairplay.toml").unwrap_err();
    assert!(err.message.contains("Failed to read config file"));
}

#[test]
fn test_env_overrides_file() {
    let config = ServerConfig::new("127.0.0.1", 8080)
        .with_env_from(|key| match key {
            k if k == HOST_ENV => Some("10.0.0.1".to_string()),
            k if k == PORT_ENV => Some("4000".to_string()),
            _ => None,
        })
        .expect("Valid env");
    assert_eq!(config, ServerConfig::new("10.0.0.1", 4000));
}

#[test]
fn test_invalid_env_port() {
    let result = ServerConfig::default().with_env_from(|key| {
        (key == PORT_ENV).then(|| "eighty".to_string())
    });
    assert!(result.is_err());
}

#[test]
fn test_cli_overrides_win() {
    let config = ServerConfig::new("10.0.0.1", 4000).with_overrides(None, Some(5000));
    assert_eq!(config, ServerConfig::new("10.0.0.1", 5000));
}
