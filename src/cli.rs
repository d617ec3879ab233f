//! Command-line interface definitions.
//!
//! Defines the argument parser using clap's derive API. With no subcommand the
//! tool runs the full transformation on the current directory.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use prefix_rename::{Policy, RenameStrategy};
use std::path::PathBuf;

/// Prefix every file in a tree and rewrite the references that point at them.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub options: Options,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Commands {
    /// Rename files and rewrite references. The default.
    Run,

    /// List the files that would be renamed without touching the tree.
    Scan,
}

#[derive(Debug, clap::Args)]
pub struct Options {
    /// Root directory to transform. Defaults to current directory.
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Preset prefix and exclusion policy.
    #[arg(long, value_enum, default_value_t = Variant::St6, global = true)]
    pub variant: Variant,

    /// Override the preset's prefix. Both preset prefixes stay protected.
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// Override the preset's rename strategy.
    #[arg(long, value_enum, global = true)]
    pub strategy: Option<Strategy>,

    /// Glob patterns for directory/file names to skip (e.g., "vendor", "*.min.js").
    #[arg(short, long, global = true)]
    pub exclude: Vec<String>,

    /// Emit JSON on stdout; progress moves to stderr.
    #[arg(long, global = true)]
    pub json: bool,

    /// Print additional diagnostics to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// `ST6_`: sorted, atomic moves, skips build directories.
    St6,
    /// `SEAL-TEAM-Six-`: walk order, copy then delete.
    Seal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Atomic rename; source and target must share a filesystem.
    Move,
    /// Copy bytes and timestamps, then delete the original.
    Copy,
}

impl From<Strategy> for RenameStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Move => RenameStrategy::Move,
            Strategy::Copy => RenameStrategy::CopyDelete,
        }
    }
}

impl Options {
    /// Builds the run policy from the preset plus any overrides.
    pub fn policy(&self) -> Result<Policy> {
        let mut policy = match self.variant {
            Variant::St6 => Policy::st6(),
            Variant::Seal => Policy::seal(),
        };
        if let Some(prefix) = &self.prefix {
            policy = policy.with_prefix(prefix)?;
        }
        if let Some(strategy) = self.strategy {
            policy = policy.with_strategy(strategy.into());
        }
        policy.with_excludes(&self.exclude)
    }

    pub fn root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
