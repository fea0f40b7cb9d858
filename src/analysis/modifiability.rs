use std::collections::HashMap;

use tracing::debug;

use crate::model::{Catalogue, NodeId};

/// Per-field record of whether a rebuild may substitute the field's value.
///
/// A field is modifiable unless the metadata marks it immutable or its type is an
/// opaque leaf (leaves have no rebuild function to substitute with).
#[derive(Debug, Clone, Default)]
pub struct ModifiabilityMap {
    entries: HashMap<(NodeId, String), bool>,
}

impl ModifiabilityMap {
    pub fn from_catalogue(catalogue: &Catalogue) -> Self {
        let mut entries = HashMap::new();
        for node in catalogue.nodes() {
            for field in &node.fields {
                let modifiable = field.declared_modifiable && !field.type_ref.is_leaf();
                entries.insert((node.id, field.name.clone()), modifiable);
            }
        }

        let map = Self { entries };
        debug!(
            "Modifiability map: {} fields, {} immutable",
            map.entries.len(),
            map.immutable_count()
        );
        map
    }

    /// Unknown fields are treated as immutable.
    pub fn is_modifiable(&self, node: NodeId, field: &str) -> bool {
        self.entries
            .get(&(node, field.to_string()))
            .copied()
            .unwrap_or(false)
    }

    pub fn immutable_count(&self) -> usize {
        self.entries.values().filter(|modifiable| !**modifiable).count()
    }
}
