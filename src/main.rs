//! Regenerates traverser and builder fragments in place.
//!
//! Usage: `traverser-gen --catalogue classes.json [--root DIR] [--plan plan.json] [--check]`

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use traverser_gen::logging::init_logger;
use traverser_gen::{run, Catalogue, GenerationPlan, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "traverser-gen", version)]
#[command(about = "Generate traverser and builder fragments from a class catalogue")]
struct Args {
    /// JSON class catalogue
    #[arg(long)]
    catalogue: PathBuf,

    /// Directory the artifact paths are relative to
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// JSON generation plan (defaults to the built-in mCRL2 table)
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Report stale artifacts without writing; exits with 1 if any are stale
    #[arg(long)]
    check: bool,

    /// Log level filter, overriding RUST_LOG
    #[arg(long = "log-level")]
    log_level: Option<String>,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color")]
    no_color: bool,
}

/// Returns whether every artifact is up to date.
fn generate(args: &Args) -> Result<bool> {
    let catalogue = Catalogue::load(&args.catalogue)
        .with_context(|| format!("loading catalogue {}", args.catalogue.display()))?;
    let plan = match &args.plan {
        Some(path) => GenerationPlan::load(path)
            .with_context(|| format!("loading plan {}", path.display()))?,
        None => GenerationPlan::mcrl2(),
    };

    let options = RunOptions {
        root: args.root.clone(),
        check_only: args.check,
    };
    let report = run(&catalogue, &plan, &options).context("generation failed")?;

    for path in &report.stale {
        println!("stale: {}", path.display());
    }
    Ok(report.is_up_to_date())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logger(args.no_color, args.log_level.as_deref()) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    match generate(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    }
}
