use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CatalogueError;

use super::descriptor::CatalogueDocument;
use super::type_ref::{TypeRef, TypeResolver};

/// Index of a node type within its [`Catalogue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Class-level flags carried by the metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    /// Base type of an expression family; never constructed directly.
    Abstract,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    /// Type name as written in the metadata.
    pub type_name: String,
    pub type_ref: TypeRef,
    pub optional_time: bool,
    /// False when the metadata marks the field immutable.
    pub declared_modifiable: bool,
}

impl Field {
    /// Accessor expression on the node variable `x`.
    pub fn accessor(&self) -> String {
        format!("x.{}()", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeType {
    pub id: NodeId,
    pub qualified_name: String,
    pub namespace: String,
    /// Unqualified name.
    pub name: String,
    pub modifiers: BTreeSet<Modifier>,
    pub fields: Vec<Field>,
    pub source_index: usize,
    pub base: Option<NodeId>,
}

impl NodeType {
    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(&Modifier::Abstract)
    }

    pub fn has_optional_time(&self) -> bool {
        self.fields.iter().any(|f| f.optional_time)
    }

    /// Recogniser function name, e.g. `state_formulas::is_and` for `state_formulas::and_`.
    pub fn recognizer(&self) -> String {
        format!("{}::is_{}", self.namespace, self.name.trim_end_matches('_'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub name: String,
    pub members: Vec<NodeId>,
}

/// Immutable, validated class model.
///
/// Every field type, base type and namespace entry has been resolved; lookups by
/// [`NodeId`] are infallible for ids handed out by the same catalogue.
#[derive(Debug, Clone)]
pub struct Catalogue {
    nodes: Vec<NodeType>,
    by_name: HashMap<String, NodeId>,
    namespaces: Vec<Namespace>,
    subtypes: Vec<Vec<NodeId>>,
}

impl Catalogue {
    /// Reads and validates a JSON catalogue document.
    pub fn load(path: &Path) -> Result<Self, CatalogueError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogueError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalogue = Self::from_json_str(&text)?;
        info!(
            "Loaded catalogue {:?}: {} classes in {} namespaces",
            path,
            catalogue.len(),
            catalogue.namespaces.len()
        );
        Ok(catalogue)
    }

    pub fn from_json_str(text: &str) -> Result<Self, CatalogueError> {
        let document: CatalogueDocument = serde_json::from_str(text)?;
        Self::from_document(document)
    }

    /// Validates referential integrity and builds the typed model.
    pub fn from_document(document: CatalogueDocument) -> Result<Self, CatalogueError> {
        let leaf_types: BTreeSet<String> = document.leaf_types.into_iter().collect();

        // First pass: names, so that fields may refer to classes declared later.
        let mut by_name = HashMap::with_capacity(document.classes.len());
        for (position, class) in document.classes.iter().enumerate() {
            if !class.name.contains("::") {
                return Err(CatalogueError::UnqualifiedName(class.name.clone()));
            }
            if by_name.insert(class.name.clone(), NodeId(position)).is_some() {
                return Err(CatalogueError::DuplicateClass(class.name.clone()));
            }
        }

        let resolver = TypeResolver {
            classes: &by_name,
            leaf_types: &leaf_types,
        };

        let mut nodes = Vec::with_capacity(document.classes.len());
        for (position, class) in document.classes.into_iter().enumerate() {
            let (namespace, name) = class
                .name
                .rsplit_once("::")
                .map(|(ns, n)| (ns.to_string(), n.to_string()))
                .ok_or_else(|| CatalogueError::UnqualifiedName(class.name.clone()))?;

            let base = match &class.base {
                Some(base) => Some(resolver.class(base, &namespace).ok_or_else(|| {
                    CatalogueError::UnknownBase {
                        class: class.name.clone(),
                        base: base.clone(),
                    }
                })?),
                None => None,
            };

            let mut fields = Vec::with_capacity(class.fields.len());
            for field in class.fields {
                let type_ref = resolver.resolve(&field.type_name, &namespace).ok_or_else(|| {
                    CatalogueError::UnresolvedFieldType {
                        class: class.name.clone(),
                        field: field.name.clone(),
                        type_name: field.type_name.clone(),
                    }
                })?;
                fields.push(Field {
                    name: field.name,
                    type_name: field.type_name,
                    type_ref,
                    optional_time: field.optional_time,
                    declared_modifiable: !field.immutable,
                });
            }

            nodes.push(NodeType {
                id: NodeId(position),
                qualified_name: class.name,
                namespace,
                name,
                modifiers: class.modifiers.into_iter().collect(),
                fields,
                source_index: class.index.unwrap_or(position),
                base,
            });
        }

        let mut subtypes = vec![Vec::new(); nodes.len()];
        for node in &nodes {
            if let Some(base) = node.base {
                subtypes[base.0].push(node.id);
            }
        }

        let mut seen = HashSet::new();
        let mut namespaces = Vec::with_capacity(document.namespaces.len());
        for namespace in document.namespaces {
            if !seen.insert(namespace.name.clone()) {
                return Err(CatalogueError::DuplicateNamespace(namespace.name));
            }
            let mut members = Vec::with_capacity(namespace.classes.len());
            for class in &namespace.classes {
                let id = resolver.class(class, &namespace.name).ok_or_else(|| {
                    CatalogueError::UnknownClass {
                        namespace: namespace.name.clone(),
                        class: class.clone(),
                    }
                })?;
                members.push(id);
            }
            debug!("Namespace {} lists {} classes", namespace.name, members.len());
            namespaces.push(Namespace {
                name: namespace.name,
                members,
            });
        }

        Ok(Self {
            nodes,
            by_name,
            namespaces,
            subtypes,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &NodeType {
        &self.nodes[id.0]
    }

    /// All node types in declaration order.
    pub fn nodes(&self) -> std::slice::Iter<'_, NodeType> {
        self.nodes.iter()
    }

    pub fn lookup(&self, qualified_name: &str) -> Option<NodeId> {
        self.by_name.get(qualified_name).copied()
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|ns| ns.name == name)
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    /// Node types of a namespace in list order.
    pub fn namespace_nodes(&self, namespace: &Namespace) -> Vec<&NodeType> {
        namespace.members.iter().map(|id| self.node(*id)).collect()
    }

    /// Direct subtypes (classes naming `id` as their base) in declaration order.
    pub fn subtypes(&self, id: NodeId) -> &[NodeId] {
        &self.subtypes[id.0]
    }

    /// Display name of a type reference (qualified class name or leaf name).
    #[cfg(test)]
    pub(crate) fn type_display(&self, type_ref: &TypeRef) -> String {
        match type_ref {
            TypeRef::Node(id) => self.node(*id).qualified_name.clone(),
            TypeRef::Container { container, element } => {
                format!("{}<{}>", container, self.node(*element).qualified_name)
            }
            TypeRef::Leaf(name) => name.clone(),
        }
    }
}
