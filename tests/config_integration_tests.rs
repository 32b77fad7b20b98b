//! Configuration and property loading from the command line and project files
use clap::Parser;
use tempfile::TempDir;

use uss_language_server::config::{Args, Config, PROJECT_CONFIG_FILE};
use uss_language_server::lsp::server::load_properties;
use uss_language_server::properties::PropertyKnowledge;

#[test]
fn test_args_parsing() {
    let args = Args::parse_from([
        "uss-ls",
        "--property-dir",
        "/tmp/props",
        "--log-level",
        "debug",
        "--no-validation",
    ]);

    assert_eq!(args.property_dir.as_deref(), Some(std::path::Path::new("/tmp/props")));
    assert_eq!(args.log_level, "debug");
    assert!(args.no_validation);
}

#[test]
fn test_args_defaults() {
    let args = Args::parse_from(["uss-ls"]);
    assert!(args.property_dir.is_none());
    assert_eq!(args.log_level, "info");
    assert!(!args.no_validation);
}

#[test]
fn test_config_from_args_puts_cli_directory_last() {
    let args = Args::parse_from(["uss-ls", "--property-dir", "/tmp/props"]);
    let config = Config::from_args(args).expect("create config");

    assert_eq!(
        config.property_dirs.last().map(|p| p.as_path()),
        Some(std::path::Path::new("/tmp/props"))
    );
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_project_file_settings() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join(PROJECT_CONFIG_FILE),
        r#"
        [validation]
        properties = false

        [intellisense]
        enabled = false

        [workspace]
        pattern = "Assets/**/*.uss"
        "#,
    )
    .unwrap();

    let mut config = Config::default();
    assert!(config.load_project_config(temp_dir.path()).expect("load config"));

    assert!(config.validation_enabled());
    assert!(!config.property_validation_enabled());
    assert!(!config.intellisense_enabled());
    assert_eq!(config.project.workspace.pattern, "Assets/**/*.uss");
    assert_eq!(config.project.workspace.exclude.len(), 3);
}

#[tokio::test]
async fn test_load_properties_from_configured_directory() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("team.toml"),
        r#"
        [knowledge]
        name = "team"

        [[properties]]
        name = "-team-accent"
        description = "Accent color used by the team theme"
        unity_specific = true
        "#,
    )
    .unwrap();

    let config = Config {
        property_dirs: vec![temp_dir.path().to_path_buf()],
        ..Config::default()
    };

    let registry = load_properties(&config).await;
    assert!(registry.is_known_property("-team-accent"));
    assert!(registry.is_known_property("background-color"));
}
