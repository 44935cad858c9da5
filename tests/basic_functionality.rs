//! Basic functionality tests to ensure the build is working

use selclip::config::Config;
use selclip::orchestrator::Timings;
use selclip::selection::ClassifierSettings;

#[test]
fn test_version() {
    assert_eq!(selclip::VERSION, "0.1.0");
}

#[test]
fn test_default_config_matches_component_defaults() {
    let config = Config::default();
    assert_eq!(config.timings(), Timings::default());
    assert_eq!(config.classifier_settings(), ClassifierSettings::default());
}

#[test]
fn test_example_config_is_valid() {
    let example = Config::generate_example();
    assert!(Config::from_toml(&example).is_ok());
}

#[test]
fn test_config_error_converts_into_crate_error() {
    let err = Config::from_toml("clipboard_timeout = -1").unwrap_err();
    let err: selclip::Error = err.into();
    assert!(err.to_string().starts_with("Configuration error"));
}

#[tokio::test]
#[cfg(feature = "integration-tests")]
async fn test_native_clipboard_roundtrip() {
    use selclip::clipboard::{create_provider, ClipboardGateway};

    let gateway = ClipboardGateway::new(create_provider().unwrap());
    let before = gateway.read().await;

    gateway.write("selclip integration test").await;
    assert_eq!(gateway.read().await, "selclip integration test");

    gateway.write(&before).await;
}
