//! Configuration file loading tests

use hytest_config::{ConfigError, HarnessConfig};
use rstest::rstest;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn create_config_file(dir: &Path, content: &str) -> std::path::PathBuf {
    let config_path = dir.join("harness.toml");
    fs::write(&config_path, content).unwrap();
    config_path
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_full_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(
        temp_dir.path(),
        r##"
timeout_secs = 5
extension = "hyd"
marker = "# => "
"##,
    );

    let config = HarnessConfig::load_from_file(&path).unwrap();
    assert_eq!(config.timeout(), Duration::from_secs(5));
    assert_eq!(config.extension, "hyd");
    assert_eq!(config.marker, "# => ");
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");

    let err = HarnessConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(p) if p == path));
}

#[test]
fn test_load_invalid_toml_names_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), "timeout_secs = = 3");

    let err = HarnessConfig::load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("harness.toml"));
}

#[test]
fn test_marker_whitespace_is_kept() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), "marker = \"--> \"\n");

    let config = HarnessConfig::load_from_file(&path).unwrap();
    assert_eq!(config.marker, "--> ");
}

// ============================================================================
// Validation
// ============================================================================

#[rstest]
#[case("timeout_secs = 0", "timeout_secs")]
#[case(r#"extension = """#, "extension")]
#[case(r#"extension = ".""#, "extension")]
#[case(r#"extension = "a/b""#, "extension")]
#[case(r#"extension = "..hy""#, "extension")]
#[case(r#"marker = """#, "marker")]
fn test_invalid_values(#[case] content: &str, #[case] expected_field: &str) {
    let err = HarnessConfig::from_toml_str(content).unwrap_err();
    match err {
        ConfigError::InvalidValue { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn test_wrong_type_rejected() {
    let err = HarnessConfig::from_toml_str(r#"timeout_secs = "two""#).unwrap_err();
    assert!(matches!(err, ConfigError::TomlParseError { .. }));
}
