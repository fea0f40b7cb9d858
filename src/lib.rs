//! Offline generator for visitor-pattern traverser and builder fragments over a
//! multi-namespace AST class catalogue.
//!
//! Pipeline: [`model::Catalogue`] → [`analysis`] (ordering, dependency sets,
//! modifiability) → [`codegen`] → [`inject`], orchestrated by [`driver::run`] over a
//! [`plan::GenerationPlan`].

pub mod analysis;
pub mod codegen;
pub mod driver;
pub mod error;
pub mod inject;
pub mod logging;
pub mod model;
pub mod plan;

pub use driver::{run, Generator, RunOptions, RunReport};
pub use error::{CatalogueError, GenerateError, InjectError, PlanError};
pub use model::Catalogue;
pub use plan::{ArtifactKind, ArtifactSpec, GenerationPlan};
