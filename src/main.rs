//! prefix-rename: prefix every file in a tree and keep references intact.
//!
//! Renames each eligible file under the root by prepending a prefix, then
//! rewrites imports, manifest entries and documentation links to match.
//! Exits 0 when at least one file was renamed, 1 otherwise.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Commands, Options};
use colored::Colorize;
use prefix_rename::{Echo, Policy, Transformer};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let policy = args.options.policy()?;

    match args.command.unwrap_or(Commands::Run) {
        Commands::Run => cmd_run(&args.options, policy),
        Commands::Scan => cmd_scan(&args.options, policy),
    }
}

fn cmd_run(options: &Options, policy: Policy) -> Result<ExitCode> {
    let transformer = Transformer::new(options.root(), policy)?;
    if options.verbose {
        print_policy(&transformer);
    }

    let echo = if options.json { Echo::Stderr } else { Echo::Stdout };
    let report = transformer.with_echo(echo).run();

    if options.json {
        println!("{}", report.to_json()?);
    }

    Ok(exit_code(report.succeeded()))
}

fn cmd_scan(options: &Options, policy: Policy) -> Result<ExitCode> {
    let transformer = Transformer::new(options.root(), policy)?;
    if options.verbose {
        print_policy(&transformer);
    }

    let files = transformer.scan();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&files)?);
    } else {
        println!("Would rename {} files:", files.len());
        for file in &files {
            let shown = file.strip_prefix(transformer.root()).unwrap_or(file);
            println!("  {}", shown.display());
        }
    }

    Ok(exit_code(!files.is_empty()))
}

fn print_policy(transformer: &Transformer) {
    let policy = transformer.policy();
    eprintln!(
        "{} Root: {}",
        "info:".blue().bold(),
        transformer.root().display()
    );
    eprintln!(
        "{} Prefix '{}', protected: {}",
        "info:".blue().bold(),
        policy.prefix,
        policy.known_prefixes.join(", ")
    );
    eprintln!(
        "{} Strategy {:?}, ordering {:?}",
        "info:".blue().bold(),
        policy.strategy,
        policy.ordering
    );
    if !policy.denylist.is_empty() {
        eprintln!(
            "{} Skipping directories: {}",
            "info:".blue().bold(),
            policy.denylist.join(", ")
        );
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
