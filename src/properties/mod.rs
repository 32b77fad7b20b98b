//! Property Knowledge
//!
//! What the validator and the language server know about style properties:
//! which names exist, their documentation, and their keyword values.

pub mod registry;
pub mod schema;

pub use registry::PropertyRegistry;
pub use schema::{Animatable, KnowledgeMeta, PropertyDef, PropertyFile};

/// Read access to a property knowledge base
pub trait PropertyKnowledge: Send + Sync {
    fn is_known_property(&self, name: &str) -> bool;

    /// Keyword values accepted by a property, when it only takes keywords
    fn allowed_values(&self, name: &str) -> Option<&[String]>;

    fn property(&self, name: &str) -> Option<&PropertyDef>;
}
