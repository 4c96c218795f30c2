//! Shared plumbing for the milestone binaries: model loading, option
//! resolution and logging setup.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use log::debug;
use milestone_compiler::{CompileOptions, RangeFilter};
use milestone_model::{Model, ModelDocument};
use serde::Deserialize;

/// Options file layout. Only the `[compiler]` table is read.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Compile options.
    #[serde(default)]
    pub compiler: CompileOptions,
}

/// Arguments shared by every binary that compiles a model.
#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Model document (JSON) to compile.
    pub input: PathBuf,

    /// TOML options file with a `[compiler]` table.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Range accessor filter: `start-equality` or `half-open`. Overrides the options file.
    #[arg(long, value_parser = parse_range_filter)]
    pub range_filter: Option<RangeFilter>,

    /// Reject classes with several temporal stereotypes. Overrides the options file.
    #[arg(long)]
    pub strict_shapes: bool,
}

impl CompileArgs {
    /// Options from the options file, if any, with flags applied on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the options file cannot be read or parsed.
    pub fn options(&self) -> Result<CompileOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                parse_config(&text)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            None => CompileOptions::default(),
        };
        if let Some(range_filter) = self.range_filter {
            options.range_filter = range_filter;
        }
        if self.strict_shapes {
            options.strict_shapes = true;
        }
        debug!("compile options: {options:?}");
        Ok(options)
    }

    /// Loads the input model.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read or is not a model document.
    pub fn model(&self) -> Result<Model> {
        load_model(&self.input)
    }
}

fn parse_range_filter(name: &str) -> Result<RangeFilter, String> {
    RangeFilter::from_name(name)
        .ok_or_else(|| format!("unknown range filter `{name}` (expected start-equality or half-open)"))
}

/// Parses an options file.
///
/// # Errors
///
/// Returns an error on malformed TOML or unknown compiler options.
pub fn parse_config(text: &str) -> Result<CompileOptions> {
    let file: ConfigFile = toml::from_str(text)?;
    Ok(file.compiler)
}

/// Parses a JSON model document and builds its symbol table.
///
/// # Errors
///
/// Returns an error if `text` is not a model document.
pub fn parse_model(text: &str) -> Result<Model> {
    let document: ModelDocument =
        serde_json::from_str(text).context("Input is not a model document")?;
    Ok(Model::from_document(document))
}

/// Reads and parses a JSON model document.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_model(path: &Path) -> Result<Model> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_model(&text).with_context(|| format!("Failed to load {}", path.display()))
}

/// Initialises `env_logger` from `RUST_LOG`, defaulting to `warn`.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}
