//! Example Keel command line.
//!
//! Builds a static site project with the `site` and `core` plugins.
//!
//! # Usage
//!
//! ```bash
//! keel-build <PROJECT_DIR> [TASKS]... [-E ENV] [-P KEY=VALUE] [-x TASK] [-t] [--json]
//! ```
//!
//! # Example
//!
//! ```bash
//! keel-build ./my-site package -E release -P dir_target=dist
//! ```
//!
//! The log filter is read from `KEEL_LOG`, which may also be set in a `.env`
//! file.

#![expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "command-line output"
)]

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use example::cli::Cli;
use example::site_reactor;
use keel::prelude::*;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    TracingSetup::new().with_format(cli.log_format).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "build failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli) -> Result<(), Box<dyn Error>> {
    let mut reactor = site_reactor();
    reactor.prepare_build(args.properties.iter().cloned(), &args.project_dir)?;

    if args.list_tasks {
        let tasks = reactor.tasks();
        if args.json {
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        } else {
            for task in tasks {
                println!("{:<24}{}", task.name, task.description);
            }
        }
        return Ok(());
    }

    let mut options = BuildOptions::new()
        .with_tasks(args.tasks.iter().cloned())
        .with_environments(args.environments.iter().cloned());
    for task in &args.exclude {
        options = options.with_excluded_task(task.clone());
    }

    let summary = reactor.build_with(&options)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for task in &summary.tasks {
            println!(
                "{:<24}{:>8.1?}  {} action(s)",
                task.task, task.elapsed, task.actions_fired
            );
        }
        println!(
            "Built {} {} in {:.1?}",
            summary.project, summary.version, summary.elapsed
        );
    }
    Ok(())
}
