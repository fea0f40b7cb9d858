//! Resolution of field type names against the catalogue.

use std::collections::{BTreeSet, HashMap};

use super::catalogue::NodeId;

/// Container suffixes used by the toolkit's list typedefs (`variable_list`, ...).
const CONTAINER_SUFFIXES: [&str; 3] = ["_list", "_vector", "_set"];

/// What a field's declared type refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Another node type.
    Node(NodeId),
    /// A container whose elements are a node type, e.g. `term_list<T>` or `T_list`.
    Container { container: String, element: NodeId },
    /// Opaque terminal type, never expanded.
    Leaf(String),
}

impl TypeRef {
    /// The node type a value of this type can hold, directly or as container element.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            TypeRef::Node(id) => Some(*id),
            TypeRef::Container { element, .. } => Some(*element),
            TypeRef::Leaf(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TypeRef::Leaf(_))
    }
}

/// Name lookup used while the catalogue is being assembled.
pub(crate) struct TypeResolver<'a> {
    pub classes: &'a HashMap<String, NodeId>,
    pub leaf_types: &'a BTreeSet<String>,
}

impl TypeResolver<'_> {
    /// Finds a class by exact qualified name, then relative to `namespace`.
    pub fn class(&self, name: &str, namespace: &str) -> Option<NodeId> {
        if let Some(id) = self.classes.get(name) {
            return Some(*id);
        }
        if name.contains("::") {
            return None;
        }
        self.classes.get(&format!("{}::{}", namespace, name)).copied()
    }

    fn leaf(&self, name: &str, namespace: &str) -> Option<String> {
        if self.leaf_types.contains(name) {
            return Some(name.to_string());
        }
        let qualified = format!("{}::{}", namespace, name);
        if !name.contains("::") && self.leaf_types.contains(&qualified) {
            return Some(qualified);
        }
        None
    }

    /// Resolves `type_name` as written in a field of a class living in `namespace`.
    ///
    /// Order: class, angle-bracket container, suffix container, leaf type.
    pub fn resolve(&self, type_name: &str, namespace: &str) -> Option<TypeRef> {
        let name = type_name.trim();

        if let Some(id) = self.class(name, namespace) {
            return Some(TypeRef::Node(id));
        }

        if let Some((container, inner)) = split_generic(name) {
            if let Some(element) = self.class(inner, namespace) {
                return Some(TypeRef::Container {
                    container: container.to_string(),
                    element,
                });
            }
            // A container of leaves is itself opaque.
            if self.leaf(inner, namespace).is_some() {
                return Some(TypeRef::Leaf(name.to_string()));
            }
        }

        for suffix in CONTAINER_SUFFIXES {
            if let Some(stem) = name.strip_suffix(suffix) {
                if let Some(element) = self.class(stem, namespace) {
                    return Some(TypeRef::Container {
                        container: suffix.trim_start_matches('_').to_string(),
                        element,
                    });
                }
            }
        }

        self.leaf(name, namespace).map(TypeRef::Leaf)
    }
}

/// Splits `std::vector<T>` into (`std::vector`, `T`).
fn split_generic(name: &str) -> Option<(&str, &str)> {
    let open = name.find('<')?;
    let inner = name.strip_suffix('>')?.get(open + 1..)?;
    Some((name[..open].trim(), inner.trim()))
}
