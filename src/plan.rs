//! Generation plan: which artifacts to render, from which namespace, against which target.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PlanError;
use crate::inject::DEFAULT_LABEL;
use crate::model::{Catalogue, NodeId};

fn default_label() -> String {
    DEFAULT_LABEL.to_string()
}

/// Ordered list of artifacts to generate in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationPlan {
    /// Marker label used by artifacts that do not name their own.
    #[serde(default = "default_label")]
    pub label: String,
    pub artifacts: Vec<ArtifactSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSpec {
    /// Artifact path, relative to the run root.
    pub path: PathBuf,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub kind: ArtifactKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactKind {
    Traverser,
    Builder { target: String },
}

impl ArtifactSpec {
    pub fn traverser(path: impl Into<PathBuf>, namespace: &str) -> Self {
        Self {
            path: path.into(),
            namespace: namespace.to_string(),
            label: None,
            kind: ArtifactKind::Traverser,
        }
    }

    pub fn builder(path: impl Into<PathBuf>, namespace: &str, target: &str) -> Self {
        Self {
            path: path.into(),
            namespace: namespace.to_string(),
            label: None,
            kind: ArtifactKind::Builder {
                target: target.to_string(),
            },
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

/// What to render for one resolved artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Traverse,
    Build { target: NodeId },
}

/// A plan entry checked against the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub path: PathBuf,
    pub label: String,
    pub namespace: String,
    pub job: Job,
}

impl GenerationPlan {
    pub fn new(artifacts: Vec<ArtifactSpec>) -> Self {
        Self {
            label: default_label(),
            artifacts,
        }
    }

    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let text = fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let plan = Self::from_json_str(&text)?;
        info!("Loaded plan {:?} with {} artifacts", path, plan.artifacts.len());
        Ok(plan)
    }

    pub fn from_json_str(text: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Checks every entry against `catalogue`. Any unknown namespace or target fails the
    /// whole plan, so nothing is rendered for a misconfigured run.
    pub fn resolve(&self, catalogue: &Catalogue) -> Result<Vec<ResolvedArtifact>, PlanError> {
        self.artifacts
            .iter()
            .map(|entry| {
                if catalogue.namespace(&entry.namespace).is_none() {
                    return Err(PlanError::UnknownNamespace {
                        artifact: entry.path.clone(),
                        namespace: entry.namespace.clone(),
                    });
                }
                let job = match &entry.kind {
                    ArtifactKind::Traverser => Job::Traverse,
                    ArtifactKind::Builder { target } => {
                        let id = catalogue.lookup(target).ok_or_else(|| PlanError::UnknownTarget {
                            artifact: entry.path.clone(),
                            target: target.clone(),
                        })?;
                        Job::Build { target: id }
                    }
                };
                Ok(ResolvedArtifact {
                    path: entry.path.clone(),
                    label: entry.label.clone().unwrap_or_else(|| self.label.clone()),
                    namespace: entry.namespace.clone(),
                    job,
                })
            })
            .collect()
    }

    /// The mCRL2 table, with paths relative to the `libraries/` directory.
    pub fn mcrl2() -> Self {
        const MODAL: &str = "lps/include/mcrl2/modal_formula/detail";

        let mut artifacts = vec![
            ArtifactSpec::traverser("bes/include/mcrl2/bes/detail/traverser.inc.h", "bes"),
            ArtifactSpec::traverser("lps/include/mcrl2/lps/detail/traverser.inc.h", "lps"),
            ArtifactSpec::traverser(
                "process/include/mcrl2/process/detail/traverser.inc.h",
                "process",
            ),
            ArtifactSpec::traverser("data/include/mcrl2/data/detail/traverser.inc.h", "data"),
            ArtifactSpec::traverser(
                "pbes/include/mcrl2/pbes/detail/traverser.inc.h",
                "pbes_system",
            ),
            ArtifactSpec::traverser(
                format!("{MODAL}/action_formula_traverser.inc.h"),
                "action_formulas",
            ),
            ArtifactSpec::traverser(
                format!("{MODAL}/regular_formula_traverser.inc.h"),
                "regular_formulas",
            ),
            ArtifactSpec::traverser(
                format!("{MODAL}/state_formula_traverser.inc.h"),
                "state_formulas",
            ),
        ];

        // Sort and data expressions occur in every language; each gets a builder per namespace.
        for (expression, target) in [
            ("sort_expression", "data::sort_expression"),
            ("data_expression", "data::data_expression"),
        ] {
            let builders = [
                ("data/include/mcrl2/data/detail", "", "data"),
                ("lps/include/mcrl2/lps/detail", "", "lps"),
                ("process/include/mcrl2/process/detail", "", "process"),
                ("pbes/include/mcrl2/pbes/detail", "", "pbes_system"),
                (MODAL, "action_formula_", "action_formulas"),
                (MODAL, "regular_formula_", "regular_formulas"),
                (MODAL, "state_formula_", "state_formulas"),
            ];
            artifacts.extend(builders.into_iter().map(|(directory, prefix, namespace)| {
                let path = format!("{directory}/{prefix}{expression}_builder.inc.h");
                ArtifactSpec::builder(path, namespace, target)
            }));
        }

        artifacts.extend([
            ArtifactSpec::builder(
                "pbes/include/mcrl2/pbes/detail/pbes_expression_builder.inc.h",
                "pbes_system",
                "pbes_system::pbes_expression",
            ),
            ArtifactSpec::builder(
                "bes/include/mcrl2/bes/detail/boolean_expression_builder.inc.h",
                "bes",
                "bes::boolean_expression",
            ),
            ArtifactSpec::builder(
                "process/include/mcrl2/process/detail/process_expression_builder.inc.h",
                "process",
                "process::process_expression",
            ),
            ArtifactSpec::builder(
                format!("{MODAL}/state_formula_builder.inc.h"),
                "state_formulas",
                "state_formulas::state_formula",
            ),
            ArtifactSpec::builder(
                format!("{MODAL}/action_formula_builder.inc.h"),
                "action_formulas",
                "action_formulas::action_formula",
            ),
            ArtifactSpec::builder(
                format!("{MODAL}/regular_formula_builder.inc.h"),
                "regular_formulas",
                "regular_formulas::regular_formula",
            ),
        ]);

        Self::new(artifacts)
    }
}
