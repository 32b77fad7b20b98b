//! Property Registry
//!
//! In-memory table of property definitions: the built-in knowledge base,
//! optionally extended or overridden by user TOML files.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use super::schema::{PropertyDef, PropertyFile};
use super::PropertyKnowledge;

const BUILTIN_PROPERTIES: &str = include_str!("../../resources/properties/uss.properties.toml");

/// Property definitions keyed by name
#[derive(Debug, Clone)]
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
    version: Option<String>,
}

impl Default for PropertyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            properties: HashMap::new(),
            version: None,
        }
    }

    /// Registry holding the built-in knowledge base
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.add_builtin();
        registry
    }

    /// Load the embedded knowledge base
    pub fn add_builtin(&mut self) {
        match parse_property_content(BUILTIN_PROPERTIES, None) {
            Ok(file) => self.add_file(file),
            Err(e) => log::warn!("Failed to parse built-in properties: {:#}", e),
        }
    }

    /// Add every property of a file, replacing same-named entries
    pub fn add_file(&mut self, file: PropertyFile) {
        if let Some(meta) = file.knowledge {
            if meta.version.is_some() {
                self.version = meta.version;
            }
        }
        for property in file.properties {
            self.add_property(property);
        }
    }

    pub fn add_property(&mut self, property: PropertyDef) {
        self.properties.insert(property.name.clone(), property);
    }

    /// Load a single TOML property file
    pub async fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read property file: {}", path.display()))?;

        let file = parse_property_content(&content, Some(path))?;
        log::debug!(
            "Loaded {} properties from {}",
            file.properties.len(),
            path.display()
        );
        self.add_file(file);
        Ok(())
    }

    /// Load every `*.toml` file of a directory, in file name order
    ///
    /// A missing directory is not an error. Files that fail to load are
    /// logged and skipped.
    pub async fn load_directory(&mut self, dir: &Path) -> Result<usize> {
        if !dir.exists() {
            return Ok(0);
        }

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("Failed to read property directory: {}", dir.display()))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("toml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match self.load_file(&path).await {
                Ok(()) => loaded += 1,
                Err(e) => log::warn!("Skipping property file {}: {:#}", path.display(), e),
            }
        }

        Ok(loaded)
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Property names, sorted
    pub fn property_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.properties.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// All definitions, sorted by name
    pub fn properties(&self) -> Vec<&PropertyDef> {
        let mut properties: Vec<&PropertyDef> = self.properties.values().collect();
        properties.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        properties
    }
}

impl PropertyKnowledge for PropertyRegistry {
    fn is_known_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    fn allowed_values(&self, name: &str) -> Option<&[String]> {
        self.properties.get(name)?.values.as_deref()
    }

    fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }
}

fn parse_property_content(content: &str, source_path: Option<&Path>) -> Result<PropertyFile> {
    toml::from_str(content).with_context(|| match source_path {
        Some(path) => format!("Failed to parse property TOML: {}", path.display()),
        None => "Failed to parse built-in property TOML".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_registry_creation() {
        let registry = PropertyRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.is_known_property("color"));
    }

    #[test]
    fn test_builtin_knowledge() {
        let registry = PropertyRegistry::with_builtin();
        assert!(registry.len() > 80);
        assert_eq!(registry.version(), Some("6.1"));

        assert!(registry.is_known_property("color"));
        assert!(registry.is_known_property("-unity-font-style"));
        assert!(!registry.is_known_property("float"));

        let values = registry.allowed_values("flex-direction").unwrap();
        assert!(values.iter().any(|v| v == "column-reverse"));
        assert!(registry.allowed_values("width").is_none());
    }

    #[test]
    fn test_property_names_sorted() {
        let registry = PropertyRegistry::with_builtin();
        let names = registry.property_names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn test_load_directory_overrides_builtin() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("extra.toml"),
            r#"
            [[properties]]
            name = "color"
            description = "Overridden color"

            [[properties]]
            name = "-my-extension"
            description = "Project extension"
            values = ["on", "off"]
            "#,
        )
        .unwrap();
        std::fs::write(temp_dir.path().join("broken.toml"), "[[properties]\nname=").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let mut registry = PropertyRegistry::with_builtin();
        let loaded = registry.load_directory(temp_dir.path()).await.unwrap();

        assert_eq!(loaded, 1);
        assert_eq!(
            registry.property("color").unwrap().description,
            "Overridden color"
        );
        assert_eq!(
            registry.allowed_values("-my-extension").unwrap(),
            &["on".to_string(), "off".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_directory_is_not_an_error() {
        let mut registry = PropertyRegistry::new();
        let loaded = registry
            .load_directory(Path::new("/nonexistent/uss-ls/properties"))
            .await
            .unwrap();
        assert_eq!(loaded, 0);
    }
}
