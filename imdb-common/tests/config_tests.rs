//! Unit tests for configuration and graceful degradation
//!
//! Covers:
//! - Missing TOML files do not cause termination
//! - Missing configs fall back to compiled defaults
//! - Priority order for root folder resolution
//! - Automatic working folder creation
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate IMDB_ETL_ROOT_FOLDER or IMDB_ETL_ROOT are marked with #[serial]
//! to ensure they run sequentially, not in parallel.

use imdb_common::config::{
    load_toml_config, CompiledDefaults, LoggingConfig, RootFolderInitializer, RootFolderResolver,
    TomlConfig, ENV_ROOT, ENV_ROOT_FOLDER,
};
use imdb_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_root_env() {
    env::remove_var(ENV_ROOT_FOLDER);
    env::remove_var(ENV_ROOT);
}

/// Resolve the root folder the way a service does at startup
fn resolve(resolver: &RootFolderResolver) -> PathBuf {
    resolver.resolve_with_config(&resolver.load_config())
}

/// Resolver pointed at a config file that does not exist
fn resolver_without_config(temp_dir: &TempDir) -> RootFolderResolver {
    RootFolderResolver::new("test-module")
        .with_config_path(Some(temp_dir.path().join("absent.toml")))
}

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert!(defaults.root_folder.ends_with("imdb-etl") || defaults.root_folder.ends_with("imdb_etl_data"));
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    clear_root_env();
    let temp_dir = TempDir::new().unwrap();

    let root_folder = resolve(&resolver_without_config(&temp_dir));

    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(root_folder, defaults.root_folder);
}

#[test]
#[serial]
fn test_resolver_cli_arg_has_highest_priority() {
    env::set_var(ENV_ROOT_FOLDER, "/tmp/imdb-env-folder");

    let resolver = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/imdb-cli-folder")));

    assert_eq!(resolve(&resolver), PathBuf::from("/tmp/imdb-cli-folder"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_env_var_root_folder() {
    clear_root_env();
    env::set_var(ENV_ROOT_FOLDER, "/tmp/imdb-test-env-folder");

    let root_folder = resolve(&RootFolderResolver::new("test-module"));
    assert_eq!(root_folder, PathBuf::from("/tmp/imdb-test-env-folder"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_root_folder_takes_precedence_over_root() {
    clear_root_env();
    env::set_var(ENV_ROOT_FOLDER, "/tmp/imdb-priority-1");
    env::set_var(ENV_ROOT, "/tmp/imdb-priority-2");

    let root_folder = resolve(&RootFolderResolver::new("test-module"));
    assert_eq!(root_folder, PathBuf::from("/tmp/imdb-priority-1"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_uses_toml_root_folder() {
    clear_root_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("etl.toml");
    std::fs::write(&config_path, "root_folder = \"/data/imdb\"\n").unwrap();

    let resolver = RootFolderResolver::new("test-module").with_config_path(Some(config_path));

    assert_eq!(resolve(&resolver), PathBuf::from("/data/imdb"));
}

#[test]
#[serial]
fn test_resolver_malformed_config_degrades_to_default() {
    clear_root_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("broken.toml");
    std::fs::write(&config_path, "root_folder = [not toml").unwrap();

    let resolver = RootFolderResolver::new("test-module").with_config_path(Some(config_path));

    // Should not panic - falls back to compiled default
    assert_eq!(resolver.load_config(), TomlConfig::default());
    assert_eq!(resolve(&resolver), CompiledDefaults::for_current_platform().root_folder);
}

#[test]
fn test_load_toml_config_missing_file_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let result = load_toml_config(&temp_dir.path().join("nope.toml"));

    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[test]
fn test_config_file_path_contains_module_name() {
    let resolver = RootFolderResolver::new("interactive");

    if let Some(path) = resolver.config_file_path() {
        assert!(path.ends_with("imdb-etl/interactive.toml"));
    }
}

#[test]
fn test_initializer_creates_working_folders() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("level1").join("level2");

    let initializer = RootFolderInitializer::new(root.clone());
    let result = initializer.ensure_working_folders();

    assert!(result.is_ok(), "Failed to create folders: {:?}", result.err());
    assert!(root.is_dir());
    assert!(initializer.raw_folder().is_dir());
    assert!(initializer.result_folder().is_dir());
}

#[test]
fn test_initializer_idempotent_directory_creation() {
    let temp_dir = TempDir::new().unwrap();
    let initializer = RootFolderInitializer::new(temp_dir.path().join("root"));

    // First call - should create
    assert!(initializer.ensure_working_folders().is_ok());
    // Second call - should succeed (idempotent)
    assert!(initializer.ensure_working_folders().is_ok());

    assert!(initializer.root_folder().exists());
    assert!(initializer.result_folder().is_dir());
}

#[test]
fn test_toml_roundtrip_with_ranking_section() {
    let mut config = TomlConfig {
        root_folder: Some(PathBuf::from("/data")),
        logging: LoggingConfig::default(),
        ..Default::default()
    };
    config.ranking.tie_break = "num_votes".to_string();

    let toml_str = toml::to_string(&config).unwrap();
    let parsed: TomlConfig = toml::from_str(&toml_str).unwrap();

    assert_eq!(parsed, config);
}

#[test]
fn test_logging_section_parses() {
    let toml_str = r#"
        [logging]
        level = "debug"
        file = "/var/log/imdb-etl.log"
    "#;

    let config: TomlConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file, Some(PathBuf::from("/var/log/imdb-etl.log")));
    assert!(config.root_folder.is_none());
}

#[test]
fn test_initializer_rejects_file_in_place_of_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("root");
    std::fs::write(&root, "not a folder").unwrap();

    let result = RootFolderInitializer::new(root).ensure_working_folders();

    assert!(matches!(result, Err(Error::Io(_))));
}
