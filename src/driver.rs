//! Generation run: resolve the plan, render every artifact, merge, then write.
//!
//! Rendering is pure and runs in parallel over the plan. All merging happens in memory
//! before the first write, so a configuration or marker error in any artifact leaves
//! every file on disk untouched.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::analysis::{order, DependencyCache, ModifiabilityMap};
use crate::codegen::{emit_build, emit_traverse};
use crate::error::{GenerateError, PlanError};
use crate::inject::{merge_regions, read_artifact, write_atomic};
use crate::model::Catalogue;
use crate::plan::{GenerationPlan, Job, ResolvedArtifact};

/// Renders artifacts against one catalogue, sharing dependency sets between artifacts that
/// build against the same target.
#[derive(Debug)]
pub struct Generator<'a> {
    catalogue: &'a Catalogue,
    dependencies: DependencyCache,
    modifiability: ModifiabilityMap,
}

impl<'a> Generator<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        Self {
            catalogue,
            dependencies: DependencyCache::new(catalogue),
            modifiability: ModifiabilityMap::from_catalogue(catalogue),
        }
    }

    pub fn dependencies(&self) -> &DependencyCache {
        &self.dependencies
    }

    /// Region text for one artifact.
    pub fn render(&self, artifact: &ResolvedArtifact) -> Result<String, GenerateError> {
        let namespace = self
            .catalogue
            .namespace(&artifact.namespace)
            .ok_or_else(|| PlanError::UnknownNamespace {
                artifact: artifact.path.clone(),
                namespace: artifact.namespace.clone(),
            })?;
        let nodes = order(self.catalogue.namespace_nodes(namespace));

        let text = match artifact.job {
            Job::Traverse => emit_traverse(self.catalogue, &nodes),
            Job::Build { target } => {
                let dependencies = self.dependencies.get(target);
                emit_build(self.catalogue, &nodes, &dependencies, &self.modifiability)
            }
        };

        debug!(
            "Rendered {:?} ({}): {} functions",
            artifact.path,
            artifact.namespace,
            text.matches("operator()(").count()
        );
        Ok(text)
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory the plan's artifact paths are relative to.
    pub root: PathBuf,
    /// Compare only; never write.
    pub check_only: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            check_only: false,
        }
    }
}

/// Per-artifact outcome of a run, as plan-relative paths in plan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Created or rewritten.
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    /// Would change; only filled in check mode.
    pub stale: Vec<PathBuf>,
}

impl RunReport {
    pub fn is_up_to_date(&self) -> bool {
        self.stale.is_empty()
    }
}

/// Pending content for one artifact file.
struct Merged {
    path: PathBuf,
    full_path: PathBuf,
    text: String,
    changed: bool,
    created: bool,
}

/// Rendered regions grouped by artifact path, keeping the first-appearance order.
fn group_by_path(
    rendered: Vec<(ResolvedArtifact, String)>,
) -> Vec<(PathBuf, Vec<(String, String)>)> {
    let mut groups: Vec<(PathBuf, Vec<(String, String)>)> = Vec::new();
    let mut positions: HashMap<PathBuf, usize> = HashMap::new();

    for (artifact, text) in rendered {
        let position = *positions.entry(artifact.path.clone()).or_insert_with(|| {
            groups.push((artifact.path.clone(), Vec::new()));
            groups.len() - 1
        });
        let regions = &mut groups[position].1;
        if regions.iter().any(|(label, _)| *label == artifact.label) {
            warn!(
                "Artifact {:?} lists region `{}` more than once; the last entry wins",
                artifact.path, artifact.label
            );
        }
        regions.push((artifact.label, text));
    }
    groups
}

fn merge(
    root: &Path,
    path: PathBuf,
    regions: &[(String, String)],
) -> Result<Merged, GenerateError> {
    let full_path = root.join(&path);
    let existing = read_artifact(&full_path).map_err(|e| GenerateError::io(&full_path, e))?;

    let regions: Vec<(&str, &str)> = regions
        .iter()
        .map(|(label, text)| (label.as_str(), text.as_str()))
        .collect();
    let text = merge_regions(&path, existing.as_deref(), &regions).map_err(|source| {
        GenerateError::Inject {
            path: full_path.clone(),
            source,
        }
    })?;

    let changed = existing.as_deref() != Some(text.as_str());
    Ok(Merged {
        created: existing.is_none(),
        path,
        full_path,
        text,
        changed,
    })
}

/// Generates every artifact in `plan`.
///
/// Fails before touching the filesystem if any plan entry is invalid or any existing
/// artifact lacks its markers. Unchanged artifacts are not rewritten.
pub fn run(
    catalogue: &Catalogue,
    plan: &GenerationPlan,
    options: &RunOptions,
) -> Result<RunReport, GenerateError> {
    let started = Instant::now();
    let resolved = plan.resolve(catalogue)?;
    let generator = Generator::new(catalogue);

    let rendered: Vec<(ResolvedArtifact, String)> = resolved
        .into_par_iter()
        .map(|artifact| -> Result<_, GenerateError> {
            let text = generator.render(&artifact)?;
            Ok((artifact, text))
        })
        .collect::<Result<_, GenerateError>>()?;
    debug!(
        "Rendered {} regions using {} dependency sets",
        rendered.len(),
        generator.dependencies().len()
    );

    let merged: Vec<Merged> = group_by_path(rendered)
        .into_iter()
        .map(|(path, regions)| merge(&options.root, path, &regions))
        .collect::<Result<_, _>>()?;

    let mut report = RunReport::default();
    for artifact in merged {
        if !artifact.changed {
            debug!("Unchanged: {:?}", artifact.full_path);
            report.unchanged.push(artifact.path);
        } else if options.check_only {
            info!("Stale: {:?}", artifact.full_path);
            report.stale.push(artifact.path);
        } else {
            write_atomic(&artifact.full_path, &artifact.text)
                .map_err(|e| GenerateError::io(&artifact.full_path, e))?;
            info!(
                "{}: {:?}",
                if artifact.created { "Created" } else { "Updated" },
                artifact.full_path
            );
            report.written.push(artifact.path);
        }
    }

    info!(
        "Generation finished in {:?}: {} written, {} unchanged, {} stale",
        started.elapsed(),
        report.written.len(),
        report.unchanged.len(),
        report.stale.len()
    );
    Ok(report)
}
