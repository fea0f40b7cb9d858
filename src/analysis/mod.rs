pub mod dependencies;
pub mod modifiability;
pub mod ordering;

pub use dependencies::{dependents, DependencyCache, DependencyGraph, DependencySet};
pub use modifiability::ModifiabilityMap;
pub use ordering::{compare_node_types, order};
