//! Builder generation: rebuild functions specialised for one target type.
//!
//! Only node types in the target's dependency set get a function. A rebuilt node is a new
//! value assembled from its fields in declaration order, where a field is replaced by its
//! recursive rebuild if it is modifiable and its type can contain the target; every other
//! field is passed through as `x.field()`.

use crate::analysis::{DependencySet, ModifiabilityMap};
use crate::model::{Catalogue, Field, NodeType};

use super::{hook, join_functions, visit, write_dispatch, CodeWriter};

/// Value type a rebuild of `node` yields: its base when it has one.
fn result_type<'a>(catalogue: &'a Catalogue, node: &'a NodeType) -> &'a str {
    match node.base {
        Some(base) => &catalogue.node(base).qualified_name,
        None => &node.qualified_name,
    }
}

fn rebuild_argument(
    node: &NodeType,
    field: &Field,
    dependencies: &DependencySet,
    modifiability: &ModifiabilityMap,
) -> String {
    let accessor = field.accessor();
    let may_hold_target = field
        .type_ref
        .node()
        .is_some_and(|held| dependencies.contains(held));

    if !(may_hold_target && modifiability.is_modifiable(node.id, &field.name)) {
        return accessor;
    }

    if field.optional_time {
        format!("x.has_time() ? {} : {}", visit(&accessor), accessor)
    } else {
        visit(&accessor)
    }
}

/// Rebuild function for a node type in the dependency set.
pub fn builder_function(
    catalogue: &Catalogue,
    node: &NodeType,
    dependencies: &DependencySet,
    modifiability: &ModifiabilityMap,
) -> String {
    let result = result_type(catalogue, node);

    let mut writer = CodeWriter::new();
    writer.line(format!("{} operator()(const {}& x)", result, node.qualified_name));
    writer.open();
    writer.line(hook("enter"));

    // A node without fields is its own rebuild; otherwise it is reassembled from its fields.
    if node.fields.is_empty() {
        writer.line(format!("{} result = x;", result));
    } else {
        let arguments: Vec<String> = node
            .fields
            .iter()
            .map(|field| rebuild_argument(node, field, dependencies, modifiability))
            .collect();
        writer.line(format!(
            "{} result = {}({});",
            result,
            node.qualified_name,
            arguments.join(", ")
        ));
    }

    if node.is_abstract() {
        // Subtypes that cannot contain the target have no rebuild function; they keep the
        // value assembled above.
        let subtypes: Vec<&NodeType> = catalogue
            .subtypes(node.id)
            .iter()
            .filter(|id| dependencies.contains(**id))
            .map(|id| catalogue.node(*id))
            .collect();
        write_dispatch(&mut writer, &subtypes, "result = ");
    }

    writer.line(hook("leave"));
    writer.line("return result;");
    writer.close();
    writer.finish()
}

/// Builder region for `nodes` (already in generation order). Node types outside
/// `dependencies` are omitted entirely.
pub fn emit_build(
    catalogue: &Catalogue,
    nodes: &[&NodeType],
    dependencies: &DependencySet,
    modifiability: &ModifiabilityMap,
) -> String {
    join_functions(
        nodes
            .iter()
            .filter(|node| dependencies.contains(node.id))
            .map(|node| builder_function(catalogue, node, dependencies, modifiability))
            .collect(),
    )
}
