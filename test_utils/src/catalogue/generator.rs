//! Random class catalogues for property-based testing.
//!
//! A `RandomCatalogue` is a small multi-namespace class model in the JSON shape accepted
//! by `Catalogue::from_json_str`. Fields may refer to any class, including the owner
//! itself and classes declared later, so the type graph routinely contains cycles.
//! Base types are always classes declared earlier, abstract or concrete.
//!
//! The structure stays inspectable (`classes`, `holds`) so tests can compute expected
//! results independently of the code under test.

use quickcheck::{Arbitrary, Gen};
use serde_json::{json, Value};

pub const NAMESPACES: &[&str] = &["alpha", "beta", "gamma"];

/// The only leaf type random fields use.
pub const LEAF_TYPE: &str = "core::identifier_string";

const MAX_CLASSES: u32 = 12;
const MAX_FIELDS: u32 = 3;

/// How a field refers to its class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldShape {
    /// `ns::name`
    Direct,
    /// `ns::name_list`
    SuffixList,
    /// `atermpp::term_list<ns::name>`
    TermList,
}

#[derive(Clone, Debug)]
pub struct RandomField {
    pub name: String,
    /// Index of the referenced class; `None` for the leaf type.
    pub target: Option<usize>,
    pub shape: FieldShape,
    pub immutable: bool,
    pub optional_time: bool,
}

#[derive(Clone, Debug)]
pub struct RandomClass {
    pub namespace: &'static str,
    pub name: String,
    pub is_abstract: bool,
    pub base: Option<usize>,
    /// Declaration index, a permutation of `0..classes.len()`.
    pub index: usize,
    pub fields: Vec<RandomField>,
}

#[derive(Clone, Debug)]
pub struct RandomCatalogue {
    pub classes: Vec<RandomClass>,
}

fn gen_range(g: &mut Gen, min: u32, max: u32) -> u32 {
    min + (u32::arbitrary(g) % (max - min + 1))
}

fn gen_field(g: &mut Gen, position: usize, class_count: usize, has_time: &mut bool) -> RandomField {
    // Roughly one in five fields is a leaf.
    let target = if gen_range(g, 0, 4) == 0 {
        None
    } else {
        Some(gen_range(g, 0, class_count as u32 - 1) as usize)
    };
    let shape = *g
        .choose(&[FieldShape::Direct, FieldShape::SuffixList, FieldShape::TermList])
        .unwrap_or(&FieldShape::Direct);
    let optional_time = !*has_time && target.is_some() && gen_range(g, 0, 5) == 0;
    *has_time |= optional_time;

    RandomField {
        name: if optional_time {
            "time".to_string()
        } else {
            format!("f{}", position)
        },
        target,
        shape,
        immutable: gen_range(g, 0, 4) == 0,
        optional_time,
    }
}

impl RandomCatalogue {
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn qualified_name(&self, class: usize) -> String {
        let class = &self.classes[class];
        format!("{}::{}", class.namespace, class.name)
    }

    /// Classes directly referenced by fields of `class`.
    pub fn holds(&self, class: usize) -> Vec<usize> {
        self.classes[class].fields.iter().filter_map(|f| f.target).collect()
    }

    /// Namespaces that have at least one class, in `NAMESPACES` order.
    pub fn namespaces(&self) -> Vec<&'static str> {
        NAMESPACES
            .iter()
            .copied()
            .filter(|ns| self.classes.iter().any(|c| c.namespace == *ns))
            .collect()
    }

    fn field_type(&self, field: &RandomField) -> String {
        match field.target {
            None => LEAF_TYPE.to_string(),
            Some(target) => {
                let name = self.qualified_name(target);
                match field.shape {
                    FieldShape::Direct => name,
                    FieldShape::SuffixList => format!("{}_list", name),
                    FieldShape::TermList => format!("atermpp::term_list<{}>", name),
                }
            }
        }
    }

    pub fn to_value(&self) -> Value {
        let classes: Vec<Value> = self
            .classes
            .iter()
            .map(|class| {
                let fields: Vec<Value> = class
                    .fields
                    .iter()
                    .map(|field| {
                        json!({
                            "name": field.name,
                            "type": self.field_type(field),
                            "immutable": field.immutable,
                            "optional_time": field.optional_time,
                        })
                    })
                    .collect();
                let mut value = json!({
                    "name": format!("{}::{}", class.namespace, class.name),
                    "index": class.index,
                    "fields": fields,
                });
                if class.is_abstract {
                    value["modifiers"] = json!(["abstract"]);
                }
                if let Some(base) = class.base {
                    value["base"] = json!(self.qualified_name(base));
                }
                value
            })
            .collect();

        let namespaces: Vec<Value> = self
            .namespaces()
            .into_iter()
            .map(|ns| {
                let members: Vec<&str> = self
                    .classes
                    .iter()
                    .filter(|c| c.namespace == ns)
                    .map(|c| c.name.as_str())
                    .collect();
                json!({ "name": ns, "classes": members })
            })
            .collect();

        json!({
            "leaf_types": [LEAF_TYPE],
            "classes": classes,
            "namespaces": namespaces,
        })
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Same catalogue with the declaration indices of concrete classes permuted.
    pub fn with_concrete_indices_reversed(&self) -> Self {
        let mut concrete: Vec<usize> = self
            .classes
            .iter()
            .filter(|c| !c.is_abstract)
            .map(|c| c.index)
            .collect();
        concrete.reverse();

        let mut copy = self.clone();
        let mut indices = concrete.into_iter();
        for class in copy.classes.iter_mut().filter(|c| !c.is_abstract) {
            if let Some(index) = indices.next() {
                class.index = index;
            }
        }
        copy
    }
}

impl Arbitrary for RandomCatalogue {
    fn arbitrary(g: &mut Gen) -> Self {
        let count = gen_range(g, 1, MAX_CLASSES) as usize;

        // A random permutation of declaration indices.
        let mut keys: Vec<(u32, usize)> = (0..count).map(|i| (u32::arbitrary(g), i)).collect();
        keys.sort();
        let mut indices = vec![0; count];
        for (index, (_, class)) in keys.into_iter().enumerate() {
            indices[class] = index;
        }

        let mut classes: Vec<RandomClass> = Vec::with_capacity(count);
        for (i, index) in indices.into_iter().enumerate() {
            let is_abstract = gen_range(g, 0, 3) == 0;
            let bases: Vec<usize> = (0..i).collect();
            let base = if !bases.is_empty() && bool::arbitrary(g) {
                g.choose(&bases).copied()
            } else {
                None
            };

            let mut has_time = false;
            let fields = (0..gen_range(g, 0, MAX_FIELDS) as usize)
                .map(|position| gen_field(g, position, count, &mut has_time))
                .collect();

            classes.push(RandomClass {
                namespace: g.choose(NAMESPACES).copied().unwrap_or(NAMESPACES[0]),
                name: format!("t{}", i),
                is_abstract,
                base,
                index,
                fields,
            });
        }

        RandomCatalogue { classes }
    }
}
