//! Serialized form of the class catalogue as produced by the metadata component.
//!
//! These records are loosely typed (type names are plain strings); they are turned
//! into a validated [`Catalogue`](super::Catalogue) by [`Catalogue::from_document`](super::Catalogue::from_document).

use serde::{Deserialize, Serialize};

use super::catalogue::Modifier;

/// Top-level catalogue document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogueDocument {
    /// Opaque terminal types that fields may refer to without further expansion.
    #[serde(default)]
    pub leaf_types: Vec<String>,
    /// Class descriptors in declaration order.
    pub classes: Vec<ClassDescriptor>,
    /// Named namespaces, each an ordered list of class names.
    #[serde(default)]
    pub namespaces: Vec<NamespaceDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Qualified name, e.g. `state_formulas::and_`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
    /// Explicit declaration index; defaults to the position in `classes`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Marks the optional time attribute, only present when `has_time()` holds.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional_time: bool,
    /// Immutable fields are copied verbatim when a node is rebuilt.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub immutable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDescriptor {
    pub name: String,
    /// Class names, qualified with `name` unless they already contain `::`.
    pub classes: Vec<String>,
}
