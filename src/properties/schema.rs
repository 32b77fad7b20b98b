//! Property Schema Types
//!
//! Types for property knowledge files (TOML).

use std::collections::BTreeMap;

use serde::Deserialize;

/// Root property file structure (matches TOML)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PropertyFile {
    #[serde(default)]
    pub knowledge: Option<KnowledgeMeta>,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
}

/// Knowledge base metadata
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct KnowledgeMeta {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
}

/// How a property behaves under transitions
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Animatable {
    Fully,
    Discrete,
    #[default]
    NonAnimatable,
}

impl Animatable {
    pub fn label(&self) -> &'static str {
        match self {
            Animatable::Fully => "Fully animatable",
            Animatable::Discrete => "Discrete",
            Animatable::NonAnimatable => "Not animatable",
        }
    }
}

/// Style property definition
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PropertyDef {
    pub name: String,
    /// Value grammar as shown to the user, e.g. `<length> | auto`
    pub syntax: Option<String>,
    pub description: String,
    #[serde(default)]
    pub inherited: bool,
    #[serde(default)]
    pub animatable: Animatable,
    /// Unity-only property with no CSS counterpart
    #[serde(default)]
    pub unity_specific: bool,
    /// Closed set of keyword values, when the property only takes keywords
    pub values: Option<Vec<String>>,
    /// Descriptions of individual keyword values
    #[serde(default)]
    pub value_docs: BTreeMap<String, String>,
}

impl PropertyDef {
    /// Check a value against the keyword set. Properties without one accept
    /// any value.
    pub fn accepts(&self, value: &str) -> bool {
        match &self.values {
            Some(values) => values.iter().any(|v| v == value),
            None => true,
        }
    }

    /// Markdown documentation for one keyword value, when described
    pub fn value_documentation(&self, value: &str) -> Option<String> {
        let description = self.value_docs.get(value)?;
        Some(format!("`{}`\n\n{}", value, description))
    }

    /// True when the value grammar mentions a data type such as `<length>`
    pub fn accepts_type(&self, data_type: &str) -> bool {
        self.syntax
            .as_deref()
            .is_some_and(|syntax| syntax.contains(&format!("<{}>", data_type)))
    }

    /// Markdown documentation used for hover
    pub fn documentation(&self) -> String {
        let mut doc = format!("**{}**\n\n{}", self.name, self.description);

        if let Some(syntax) = &self.syntax {
            doc.push_str(&format!("\n\n**Syntax:** `{}`", syntax));
        }
        if let Some(values) = &self.values {
            doc.push_str(&format!("\n\n**Values:** {}", values.join(" | ")));
        }

        let mut flags = vec![self.animatable.label().to_string()];
        if self.inherited {
            flags.push("Inherited".to_string());
        }
        if self.unity_specific {
            flags.push("Unity-specific".to_string());
        }
        doc.push_str(&format!("\n\n*{}*", flags.join(" · ")));

        doc
    }
}
