//! Emission of traverser and builder member functions.
//!
//! Generated fragments are C++ included inside CRTP class templates, so every hook and
//! recursive call goes through the derived class:
//!
//! - `static_cast<Derived&>(*this).enter(x);` / `.leave(x);`
//! - `static_cast<Derived&>(*this)(x.field())` for the recursive visit or rebuild
//! - `x.has_time()` guards the optional time attribute

pub mod builder;
pub mod traverser;

pub use builder::{builder_function, emit_build};
pub use traverser::{emit_traverse, traverse_function};

use crate::model::NodeType;

const DERIVED: &str = "static_cast<Derived&>(*this)";
const INDENT: &str = "  ";

/// Line-oriented text buffer with brace-driven indentation.
#[derive(Debug, Default)]
pub struct CodeWriter {
    buffer: String,
    depth: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.buffer.push_str(INDENT);
        }
        self.buffer.push_str(text.as_ref());
        self.buffer.push('\n');
    }

    pub fn open(&mut self) {
        self.line("{");
        self.depth += 1;
    }

    pub fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

/// Recursive visit of `expr` through the derived class.
pub(crate) fn visit(expr: &str) -> String {
    format!("{}({})", DERIVED, expr)
}

/// `enter`/`leave` hook call on the current node.
pub(crate) fn hook(name: &str) -> String {
    format!("{}.{}(x);", DERIVED, name)
}

/// Views the abstract value `x` as its concrete subtype.
fn downcast(subtype: &NodeType) -> String {
    format!("{}(atermpp::aterm_appl(x))", subtype.qualified_name)
}

/// Writes an `if / else if` chain visiting `x` as whichever subtype it is.
/// `assign` prefixes each call, e.g. `"result = "` in builders.
pub(crate) fn write_dispatch(writer: &mut CodeWriter, subtypes: &[&NodeType], assign: &str) {
    for (i, subtype) in subtypes.iter().enumerate() {
        let keyword = if i == 0 { "if" } else { "else if" };
        writer.line(format!("{} ({}(x))", keyword, subtype.recognizer()));
        writer.open();
        writer.line(format!("{}{};", assign, visit(&downcast(subtype))));
        writer.close();
    }
}

/// Newline-joined concatenation of emitted functions.
pub(crate) fn join_functions(functions: Vec<String>) -> String {
    functions.join("\n")
}
