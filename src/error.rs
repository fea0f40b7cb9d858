//! Error types for catalogue loading, plan resolution, fragment injection and
//! the generation run as a whole.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading or validating the class catalogue.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// The catalogue file could not be read.
    #[error("Failed to read catalogue {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The catalogue document is not valid JSON for the descriptor schema.
    #[error("Malformed catalogue: {0}")]
    Parse(#[from] serde_json::Error),
    /// Class names must carry their namespace (`ns::name`).
    #[error("Class name `{0}` is not namespace-qualified")]
    UnqualifiedName(String),
    #[error("Class `{0}` is declared more than once")]
    DuplicateClass(String),
    #[error("Class `{class}` names unknown base type `{base}`")]
    UnknownBase { class: String, base: String },
    /// A field type resolves to neither a class, a container of a class, nor a declared leaf type.
    #[error("Field `{class}.{field}` has unresolvable type `{type_name}`")]
    UnresolvedFieldType {
        class: String,
        field: String,
        type_name: String,
    },
    #[error("Namespace `{0}` is declared more than once")]
    DuplicateNamespace(String),
    #[error("Namespace `{namespace}` lists unknown class `{class}`")]
    UnknownClass { namespace: String, class: String },
}

/// Failures while resolving a generation plan against a catalogue.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Failed to read plan {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed plan: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Artifact {artifact} refers to unknown namespace `{namespace}`")]
    UnknownNamespace { artifact: PathBuf, namespace: String },
    #[error("Artifact {artifact} builds against unknown target type `{target}`")]
    UnknownTarget { artifact: PathBuf, target: String },
}

/// Marker problems found while merging a generated region into artifact text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InjectError {
    #[error("Marker `{marker}` not found")]
    MissingMarker { marker: String },
    #[error("Marker `{marker}` occurs {count} times")]
    DuplicateMarker { marker: String, count: usize },
    #[error("End marker for `{label}` precedes its start marker")]
    MisorderedMarkers { label: String },
}

/// Umbrella error for a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("Artifact {path}: {source}")]
    Inject {
        path: PathBuf,
        #[source]
        source: InjectError,
    },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GenerateError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
