//! `milestone-conformance`: compiles a model document and validates the
//! result against the milestoning invariants.
//!
//! **Usage:**
//! ```text
//! milestone-conformance <input.json> [--config <options.toml>] [--range-filter <filter>]
//!                       [--strict-shapes]
//! ```
//!
//! Exits non-zero if compilation fails or any check fails.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use milestone_clients::{init_logging, CompileArgs};
use milestone_compiler::{compile, CoreSymbols};
use milestone_conformance::{run_all_with, Severity};

/// Compile a model document and check the milestoning invariants.
#[derive(Parser)]
#[command(
    name = "milestone-conformance",
    about = "Validate a compiled model against the milestoning invariants"
)]
struct Args {
    #[command(flatten)]
    compile: CompileArgs,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let options = args.compile.options()?;
    let mut model = args.compile.model()?;
    compile(&mut model, &CoreSymbols, &options)
        .with_context(|| format!("Failed to compile {}", args.compile.input.display()))?;

    let report = run_all_with(&model, &options);

    println!("Milestoning Conformance Report");
    println!("==============================");
    println!();

    for result in &report.results {
        println!("{result}");
    }

    let count = |severity: Severity| report.results.iter().filter(|r| r.severity == severity).count();
    let failed = count(Severity::Failure);
    println!();
    println!(
        "Summary: {} passed, {} warnings, {} failed",
        count(Severity::Pass),
        count(Severity::Warning),
        failed
    );

    if failed > 0 {
        eprintln!("Conformance FAILED: {failed} check(s) did not pass.");
        process::exit(1);
    }

    println!("Conformance PASSED.");
    Ok(())
}
