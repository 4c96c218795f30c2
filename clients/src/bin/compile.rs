//! `milestone-compile`: compiles the milestoning of a model document.
//!
//! Reads a JSON model document, runs the milestoning pass and writes the
//! compiled model as Pure-style text or as a JSON model document.
//!
//! **Usage:**
//! ```text
//! milestone-compile <input.json> [--config <options.toml>] [--range-filter <filter>]
//!                   [--strict-shapes] [--format pure|json] [--out <path>]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use milestone_clients::{init_logging, CompileArgs};
use milestone_compiler::{compile, CoreSymbols};
use milestone_model::render::render_model;

/// Output format.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Pure-style text.
    Pure,
    /// JSON model document.
    Json,
}

/// Compile the milestoning of a model document.
#[derive(Parser)]
#[command(
    name = "milestone-compile",
    about = "Synthesize milestoning properties and propagate milestoning dates"
)]
struct Args {
    #[command(flatten)]
    compile: CompileArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Pure)]
    format: Format,

    /// Write the output here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let options = args.compile.options()?;
    let mut model = args.compile.model()?;
    let report = compile(&mut model, &CoreSymbols, &options)
        .with_context(|| format!("Failed to compile {}", args.compile.input.display()))?;
    info!(
        "temporal classes: {}, synthesized: {}, milestoned: {}, bodies resolved: {}",
        report.temporal_classes.len(),
        report.properties_synthesized,
        report.properties_milestoned,
        report.bodies_resolved
    );

    let output = match args.format {
        Format::Pure => render_model(&model),
        Format::Json => serde_json::to_string_pretty(&model.to_document())
            .context("Failed to serialize the compiled model")?,
    };

    match &args.out {
        Some(path) => {
            fs::write(path, &output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("  Written: {}", path.display());
        }
        None => println!("{output}"),
    }
    Ok(())
}
