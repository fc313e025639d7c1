//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use keel::prelude::TracingFormat;

/// Builds a Keel site project.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "keel-build")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project directory
    pub project_dir: PathBuf,

    /// Tasks to build (default: the project's default tasks)
    pub tasks: Vec<String>,

    /// Activate an environment
    #[arg(short = 'E', long = "environment", value_name = "ENV")]
    pub environments: Vec<String>,

    /// Override a project property
    #[arg(short = 'P', long = "property", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,

    /// Remove a task from the plan; its dependencies still run
    #[arg(short = 'x', long = "exclude", value_name = "TASK")]
    pub exclude: Vec<String>,

    /// List tasks instead of building
    #[arg(short = 't', long)]
    pub list_tasks: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Log output format: pretty, compact or json
    #[arg(long, value_name = "FORMAT", default_value = "pretty", value_parser = parse_log_format)]
    pub log_format: TracingFormat,
}

/// Splits `key=value` at the first `=`.
fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("invalid property '{raw}', expected KEY=VALUE")),
    }
}

fn parse_log_format(raw: &str) -> Result<TracingFormat, String> {
    TracingFormat::parse(raw).ok_or_else(|| format!("unknown log format '{raw}'"))
}
