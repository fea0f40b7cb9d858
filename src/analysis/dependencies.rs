//! Dependency analysis over the node-type graph.
//!
//! The graph has an edge `A → B` whenever a value of `A` can hold a `B`: a field of `A`
//! has type `B` (directly or as a container element), or `A` is the abstract base of `B`,
//! since a value of an abstract base is always one of its subtypes. The dependency set of a
//! target `T` is every node type with a path to `T`, plus `T` itself: exactly the node
//! types a builder specialised for `T` has to rebuild. Everything outside the set
//! provably cannot contain a `T` and is left out of the generated builder.
//!
//! # Architecture
//!
//! - **Graph**: petgraph `DiGraph`, one node per catalogue entry, parallel edges collapsed
//! - **Dependents**: BFS from the target over the reversed graph; BFS keeps its own
//!   discovered set, so recursive definitions terminate
//! - **Cache**: one [`DependencySet`] per target, shared across namespaces building
//!   against the same target
//!
//! # Usage
//!
//! ```ignore
//! let cache = DependencyCache::new(&catalogue);
//! let deps = cache.get(catalogue.lookup("data::data_expression").unwrap());
//! for node in ordered_nodes.iter().filter(|n| deps.contains(n.id)) {
//!     // emit a rebuild function
//! }
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed};
use tracing::debug;

use crate::model::{Catalogue, NodeId};

/// Node types that can transitively hold a value of `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySet {
    target: NodeId,
    members: BTreeSet<NodeId>,
}

impl DependencySet {
    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in id order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().copied()
    }
}

/// "A value of A can hold a B" graph over a catalogue.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<NodeId, ()>,
    /// Graph index of each catalogue node, indexed by `NodeId`.
    indices: Vec<NodeIndex>,
}

impl DependencyGraph {
    pub fn new(catalogue: &Catalogue) -> Self {
        let mut graph = DiGraph::with_capacity(catalogue.len(), catalogue.len());
        let indices: Vec<NodeIndex> = catalogue
            .nodes()
            .map(|node| graph.add_node(node.id))
            .collect();

        for node in catalogue.nodes() {
            for field in &node.fields {
                if let Some(held) = field.type_ref.node() {
                    // update_edge keeps at most one edge per (holder, held) pair
                    graph.update_edge(indices[node.id.0], indices[held.0], ());
                }
            }
            // A value of an abstract base is always one of its subtypes. A concrete base
            // stands on its own and only holds what its fields hold.
            if let Some(base) = node.base.filter(|base| catalogue.node(*base).is_abstract()) {
                graph.update_edge(indices[base.0], indices[node.id.0], ());
            }
        }

        debug!(
            "Built dependency graph: {} node types, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Self { graph, indices }
    }

    /// Computes the dependency set of `target`.
    pub fn dependents(&self, target: NodeId) -> DependencySet {
        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, self.indices[target.0]);
        let mut members = BTreeSet::new();
        while let Some(index) = bfs.next(reversed) {
            members.insert(self.graph[index]);
        }
        DependencySet { target, members }
    }

    /// Node types a value of `id` directly holds (field types and subtypes), in id order.
    #[cfg(test)]
    pub(crate) fn holds(&self, id: NodeId) -> Vec<NodeId> {
        let mut held: Vec<NodeId> = self
            .graph
            .neighbors(self.indices[id.0])
            .map(|index| self.graph[index])
            .collect();
        held.sort();
        held
    }
}

/// Read-through cache of dependency sets keyed by target.
///
/// A missing entry is computed under the DashMap shard lock, so concurrent callers asking
/// for the same target see either nothing or the complete set.
#[derive(Debug)]
pub struct DependencyCache {
    graph: DependencyGraph,
    sets: DashMap<NodeId, Arc<DependencySet>>,
}

impl DependencyCache {
    pub fn new(catalogue: &Catalogue) -> Self {
        Self {
            graph: DependencyGraph::new(catalogue),
            sets: DashMap::new(),
        }
    }

    pub fn get(&self, target: NodeId) -> Arc<DependencySet> {
        if let Some(set) = self.sets.get(&target) {
            return Arc::clone(set.value());
        }
        let entry = self.sets.entry(target).or_insert_with(|| {
            let set = self.graph.dependents(target);
            debug!("Computed dependency set for {:?}: {} members", target, set.len());
            Arc::new(set)
        });
        Arc::clone(entry.value())
    }

    /// Number of targets computed so far.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn graph(&self) -> &DependencyGraph {
        &self.graph
    }
}

/// One-shot convenience over [`DependencyGraph`].
pub fn dependents(catalogue: &Catalogue, target: NodeId) -> DependencySet {
    DependencyGraph::new(catalogue).dependents(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr_catalogue() -> Catalogue {
        Catalogue::from_json_str(
            r#"{
              "leaf_types": ["leaf"],
              "classes": [
                { "name": "e::Expr", "modifiers": ["abstract"] },
                { "name": "e::Const", "base": "Expr", "fields": [ { "name": "value", "type": "leaf" } ] },
                { "name": "e::Plus", "base": "Expr",
                  "fields": [ { "name": "left", "type": "Expr" }, { "name": "right", "type": "Expr" } ] }
              ]
            }"#,
        )
        .unwrap()
    }

    fn member_names(catalogue: &Catalogue, set: &DependencySet) -> Vec<String> {
        set.iter().map(|id| catalogue.node(id).qualified_name.clone()).collect()
    }

    #[test]
    fn test_constant_without_expression_field_is_not_dependent() {
        let catalogue = expr_catalogue();
        let expr = catalogue.lookup("e::Expr").unwrap();
        let set = dependents(&catalogue, expr);
        assert_eq!(member_names(&catalogue, &set), vec!["e::Expr", "e::Plus"]);
        assert_eq!(set.target(), expr);
    }

    #[test]
    fn test_transitive_holders_through_containers() {
        let catalogue = Catalogue::from_json_str(
            r#"{ "classes": [
                { "name": "t::target" },
                { "name": "t::direct", "fields": [ { "name": "t", "type": "target" } ] },
                { "name": "t::listed", "fields": [ { "name": "ds", "type": "direct_list" } ] },
                { "name": "t::outer", "fields": [ { "name": "l", "type": "std::vector<t::listed>" } ] },
                { "name": "t::unrelated", "fields": [ { "name": "o", "type": "unrelated" } ] }
            ] }"#,
        )
        .unwrap();

        let set = dependents(&catalogue, catalogue.lookup("t::target").unwrap());
        assert_eq!(
            member_names(&catalogue, &set),
            vec!["t::target", "t::direct", "t::listed", "t::outer"]
        );
    }

    #[test]
    fn test_cycles_terminate() {
        let catalogue = Catalogue::from_json_str(
            r#"{ "classes": [
                { "name": "c::a", "fields": [ { "name": "b", "type": "b" } ] },
                { "name": "c::b", "fields": [ { "name": "a", "type": "a" }, { "name": "t", "type": "t" } ] },
                { "name": "c::t", "fields": [ { "name": "me", "type": "t" } ] },
                { "name": "c::loop", "fields": [ { "name": "me", "type": "loop" } ] }
            ] }"#,
        )
        .unwrap();

        let set = dependents(&catalogue, catalogue.lookup("c::t").unwrap());
        assert_eq!(member_names(&catalogue, &set), vec!["c::a", "c::b", "c::t"]);

        let lonely = dependents(&catalogue, catalogue.lookup("c::loop").unwrap());
        assert_eq!(member_names(&catalogue, &lonely), vec!["c::loop"]);
    }

    #[test]
    fn test_cache_reuses_computed_sets() {
        let catalogue = expr_catalogue();
        let cache = DependencyCache::new(&catalogue);
        let expr = catalogue.lookup("e::Expr").unwrap();

        let first = cache.get(expr);
        let second = cache.get(expr);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        let plus = catalogue.lookup("e::Plus").unwrap();
        assert_eq!(cache.graph().holds(plus), vec![expr]);
        assert_eq!(cache.graph().holds(expr).len(), 2);
    }

    #[test]
    fn test_abstract_base_may_hold_what_its_subtypes_hold() {
        let catalogue = Catalogue::from_json_str(
            r#"{ "classes": [
                { "name": "d::sort" },
                { "name": "d::expr", "modifiers": ["abstract"] },
                { "name": "d::var", "base": "expr", "fields": [ { "name": "sort", "type": "sort" } ] },
                { "name": "d::app", "base": "expr", "fields": [ { "name": "head", "type": "expr" } ] },
                { "name": "d::lit", "base": "expr" }
            ] }"#,
        )
        .unwrap();

        let set = dependents(&catalogue, catalogue.lookup("d::sort").unwrap());
        assert_eq!(
            member_names(&catalogue, &set),
            vec!["d::sort", "d::expr", "d::var", "d::app"]
        );

        let set = dependents(&catalogue, catalogue.lookup("d::lit").unwrap());
        assert_eq!(
            member_names(&catalogue, &set),
            vec!["d::expr", "d::app", "d::lit"]
        );
    }

    #[test]
    fn test_concrete_base_only_holds_its_fields() {
        let catalogue = Catalogue::from_json_str(
            r#"{
              "leaf_types": ["leaf"],
              "classes": [
                { "name": "e::target" },
                { "name": "e::plain", "fields": [ { "name": "v", "type": "leaf" } ] },
                { "name": "e::child", "base": "plain", "fields": [ { "name": "t", "type": "target" } ] }
              ]
            }"#,
        )
        .unwrap();

        let set = dependents(&catalogue, catalogue.lookup("e::target").unwrap());
        assert_eq!(member_names(&catalogue, &set), vec!["e::target", "e::child"]);

        let graph = DependencyGraph::new(&catalogue);
        assert!(graph.holds(catalogue.lookup("e::plain").unwrap()).is_empty());
    }
}
