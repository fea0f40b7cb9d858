//! Processing order of node types in generated output.

use std::cmp::Ordering;

use crate::model::NodeType;

/// Abstract types come first, ordered by declaration index among themselves.
/// Concrete types compare equal to each other, so a stable sort keeps their input order.
pub fn compare_node_types(a: &NodeType, b: &NodeType) -> Ordering {
    match (a.is_abstract(), b.is_abstract()) {
        (true, true) => a.source_index.cmp(&b.source_index),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}

/// Returns `nodes` in generation order. `sort_by` is stable, which the concrete group relies on.
pub fn order<'a, I>(nodes: I) -> Vec<&'a NodeType>
where
    I: IntoIterator<Item = &'a NodeType>,
{
    let mut ordered: Vec<&NodeType> = nodes.into_iter().collect();
    ordered.sort_by(|a, b| compare_node_types(a, b));
    ordered
}
