//! Traverser generation: one visit function per node type of a namespace.

use crate::model::{Catalogue, NodeType};

use super::{hook, join_functions, visit, write_dispatch, CodeWriter};

/// Visit function for `node`: `enter`, every field in declaration order, `leave`.
///
/// The optional time field is only visited under `x.has_time()`. Abstract types also
/// dispatch to each of their subtypes.
pub fn traverse_function(catalogue: &Catalogue, node: &NodeType) -> String {
    let mut writer = CodeWriter::new();
    writer.line(format!("void operator()(const {}& x)", node.qualified_name));
    writer.open();
    writer.line(hook("enter"));

    for field in &node.fields {
        let call = format!("{};", visit(&field.accessor()));
        if field.optional_time {
            writer.line("if (x.has_time())");
            writer.open();
            writer.line(call);
            writer.close();
        } else {
            writer.line(call);
        }
    }

    if node.is_abstract() {
        let subtypes: Vec<&NodeType> = catalogue
            .subtypes(node.id)
            .iter()
            .map(|id| catalogue.node(*id))
            .collect();
        write_dispatch(&mut writer, &subtypes, "");
    }

    writer.line(hook("leave"));
    writer.close();
    writer.finish()
}

/// Traverser region for `nodes`, which the caller has already put in generation order.
/// Every node gets a function; traversal is total.
pub fn emit_traverse(catalogue: &Catalogue, nodes: &[&NodeType]) -> String {
    join_functions(
        nodes
            .iter()
            .map(|node| traverse_function(catalogue, node))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::order;
    use indoc::indoc;

    fn lps_catalogue() -> Catalogue {
        Catalogue::from_json_str(
            r#"{
              "leaf_types": ["core::identifier_string"],
              "classes": [
                { "name": "data::data_expression", "modifiers": ["abstract"] },
                { "name": "data::variable", "base": "data_expression",
                  "fields": [ { "name": "name", "type": "core::identifier_string" } ] },
                { "name": "lps::action", "fields": [ { "name": "arguments", "type": "data::data_expression_list" } ] },
                { "name": "lps::multi_action",
                  "fields": [
                    { "name": "actions", "type": "action_list" },
                    { "name": "time", "type": "data::data_expression", "optional_time": true }
                  ] }
              ],
              "namespaces": [ { "name": "lps", "classes": ["action", "multi_action"] } ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_time_field_is_guarded() {
        let catalogue = lps_catalogue();
        let multi_action = catalogue.node(catalogue.lookup("lps::multi_action").unwrap());

        let expected = indoc! {r#"
            void operator()(const lps::multi_action& x)
            {
              static_cast<Derived&>(*this).enter(x);
              static_cast<Derived&>(*this)(x.actions());
              if (x.has_time())
              {
                static_cast<Derived&>(*this)(x.time());
              }
              static_cast<Derived&>(*this).leave(x);
            }
        "#};
        assert_eq!(traverse_function(&catalogue, multi_action), expected);
    }

    #[test]
    fn test_node_without_time_has_no_guard() {
        let catalogue = lps_catalogue();
        let action = catalogue.node(catalogue.lookup("lps::action").unwrap());
        let text = traverse_function(&catalogue, action);
        assert!(!text.contains("has_time"));
        assert!(text.contains("static_cast<Derived&>(*this)(x.arguments());"));
    }

    #[test]
    fn test_abstract_type_dispatches_to_subtypes() {
        let catalogue = lps_catalogue();
        let expression = catalogue.node(catalogue.lookup("data::data_expression").unwrap());

        let expected = indoc! {r#"
            void operator()(const data::data_expression& x)
            {
              static_cast<Derived&>(*this).enter(x);
              if (data::is_variable(x))
              {
                static_cast<Derived&>(*this)(data::variable(atermpp::aterm_appl(x)));
              }
              static_cast<Derived&>(*this).leave(x);
            }
        "#};
        assert_eq!(traverse_function(&catalogue, expression), expected);
    }

    #[test]
    fn test_every_namespace_node_is_emitted_in_order() {
        let catalogue = lps_catalogue();
        let namespace = catalogue.namespace("lps").unwrap();
        let nodes = order(catalogue.namespace_nodes(namespace));
        let text = emit_traverse(&catalogue, &nodes);

        let action = text.find("const lps::action& x").unwrap();
        let multi_action = text.find("const lps::multi_action& x").unwrap();
        assert!(action < multi_action);
        assert_eq!(text.matches("void operator()").count(), 2);
        assert!(text.contains("}\n\nvoid operator()"));
    }
}
