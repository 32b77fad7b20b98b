//! Configuration management for the USS language server.
//!
//! Handles:
//! - Command-line argument parsing
//! - Property directory configuration
//! - Project settings from `.uss-ls.toml`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::core::STYLESHEET_PATTERN;

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = ".uss-ls.toml";

/// Command-line arguments for the USS language server
#[derive(Debug, Parser)]
#[command(name = "uss-language-server")]
#[command(about = "Language server for Unity USS style sheets")]
#[command(version)]
pub struct Args {
    /// Extra directory of property TOML files
    #[arg(long, help = "Directory containing property TOML files")]
    pub property_dir: Option<PathBuf>,

    /// Log level for the language server
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,

    /// Disable diagnostics regardless of project settings
    #[arg(long)]
    pub no_validation: bool,
}

/// `[validation]` section
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationSettings {
    /// Publish diagnostics at all
    pub enabled: bool,
    /// Check property names and keyword values against the knowledge base
    pub properties: bool,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            properties: true,
        }
    }
}

/// `[intellisense]` section
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntellisenseSettings {
    /// Hover and completion
    pub enabled: bool,
}

impl Default for IntellisenseSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// `[workspace]` section
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkspaceSettings {
    /// Glob listing the stylesheets of the workspace
    pub pattern: String,
    /// Globs excluded from listing
    pub exclude: Vec<String>,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            pattern: STYLESHEET_PATTERN.to_string(),
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/Library/**".to_string(),
                "**/Temp/**".to_string(),
            ],
        }
    }
}

/// Contents of `.uss-ls.toml`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectConfig {
    pub validation: ValidationSettings,
    pub intellisense: IntellisenseSettings,
    pub workspace: WorkspaceSettings,
}

impl ProjectConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse project configuration")
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Property directories, lowest priority first
    pub property_dirs: Vec<PathBuf>,
    /// Log level
    pub log_level: String,
    /// Set by `--no-validation`
    pub cli_no_validation: bool,
    /// Project settings, defaults when no file was found
    pub project: ProjectConfig,
    /// Where the project settings were read from
    pub project_config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            property_dirs: Vec::new(),
            log_level: "info".to_string(),
            cli_no_validation: false,
            project: ProjectConfig::default(),
            project_config_path: None,
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        let mut property_dirs = Vec::new();

        // User config directory first so an explicit --property-dir wins
        if let Some(config_dir) = dirs::config_dir() {
            property_dirs.push(config_dir.join("uss-ls").join("properties"));
        }

        if let Some(custom_dir) = args.property_dir {
            property_dirs.push(custom_dir);
        }

        let mut config = Config {
            property_dirs,
            log_level: args.log_level,
            cli_no_validation: args.no_validation,
            ..Config::default()
        };

        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        config.load_project_config(&cwd)?;

        Ok(config)
    }

    /// Read `.uss-ls.toml` from a directory, if present
    ///
    /// Returns whether a file was loaded. A file that fails to parse is an
    /// error; a missing file keeps the current settings.
    pub fn load_project_config(&mut self, dir: &Path) -> Result<bool> {
        let path = dir.join(PROJECT_CONFIG_FILE);
        if !path.is_file() {
            return Ok(false);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read project config: {}", path.display()))?;
        self.project = ProjectConfig::from_toml(&content)
            .with_context(|| format!("Invalid project config: {}", path.display()))?;
        self.project_config_path = Some(path);

        Ok(true)
    }

    pub fn validation_enabled(&self) -> bool {
        !self.cli_no_validation && self.project.validation.enabled
    }

    pub fn property_validation_enabled(&self) -> bool {
        self.validation_enabled() && self.project.validation.properties
    }

    pub fn intellisense_enabled(&self) -> bool {
        self.project.intellisense.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_project_config_defaults() {
        let config = ProjectConfig::from_toml("").unwrap();
        assert!(config.validation.enabled);
        assert!(config.validation.properties);
        assert!(config.intellisense.enabled);
        assert_eq!(config.workspace.pattern, "**/*.uss");
        assert!(config.workspace.exclude.contains(&"**/Library/**".to_string()));
    }

    #[test]
    fn test_partial_sections() {
        let config = ProjectConfig::from_toml(
            r#"
            [validation]
            properties = false

            [workspace]
            exclude = []
            "#,
        )
        .unwrap();

        assert!(config.validation.enabled);
        assert!(!config.validation.properties);
        assert_eq!(config.workspace.pattern, "**/*.uss");
        assert!(config.workspace.exclude.is_empty());
    }

    #[test]
    fn test_load_project_config() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        assert!(!config.load_project_config(temp_dir.path()).unwrap());

        std::fs::write(
            temp_dir.path().join(PROJECT_CONFIG_FILE),
            "[validation]\nenabled = false\n",
        )
        .unwrap();

        assert!(config.load_project_config(temp_dir.path()).unwrap());
        assert!(!config.validation_enabled());
        assert!(!config.property_validation_enabled());
        assert!(config.project_config_path.is_some());
    }

    #[test]
    fn test_invalid_project_config() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(PROJECT_CONFIG_FILE), "[validation\n").unwrap();

        let mut config = Config::default();
        assert!(config.load_project_config(temp_dir.path()).is_err());
    }

    #[test]
    fn test_cli_no_validation_wins() {
        let config = Config {
            cli_no_validation: true,
            ..Config::default()
        };
        assert!(!config.validation_enabled());
        assert!(config.intellisense_enabled());
    }
}
