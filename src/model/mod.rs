//! Class model: the catalogue of AST node types the generator works from.

pub mod catalogue;
pub mod descriptor;
pub mod type_ref;

pub use catalogue::{Catalogue, Field, Modifier, Namespace, NodeId, NodeType};
pub use descriptor::{CatalogueDocument, ClassDescriptor, FieldDescriptor, NamespaceDescriptor};
pub use type_ref::TypeRef;
