//! Run bookkeeping and console output.
//!
//! [`Report`] owns the transformation and error records of one run. Every
//! recorded event is echoed as a progress line; the final summary lists the
//! tallies followed by every error in the order it occurred.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where progress lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Echo {
    #[default]
    Stdout,
    /// Keeps stdout free for machine-readable output.
    Stderr,
    Silent,
}

/// A successful rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transformation {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Tallies for a finished run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub candidates: usize,
    pub files_renamed: usize,
    pub files_updated: usize,
    pub errors: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct Report {
    #[serde(skip)]
    root: PathBuf,
    #[serde(skip)]
    echo: Echo,
    pub renamed: Vec<Transformation>,
    pub updated: Vec<PathBuf>,
    pub errors: Vec<String>,
    #[serde(skip)]
    candidates: usize,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a Report,
    summary: Summary,
}

impl Report {
    pub fn new(root: &Path, echo: Echo) -> Self {
        Self {
            root: root.to_path_buf(),
            echo,
            ..Self::default()
        }
    }

    pub fn start(&self, prefix: &str) {
        self.line(format!("{} {}", "Prefix:".bold(), prefix));
        self.line(format!("{} {}", "Base path:".bold(), self.root.display()));
        self.line("-".repeat(60));
    }

    pub fn candidates_found(&mut self, count: usize) {
        self.candidates = count;
        self.line(format!("{} {} files", "Candidates:".bold(), count));
    }

    pub fn phase(&self, title: &str) {
        self.line(format!("\n{}", title.bold()));
    }

    pub fn record_rename(&mut self, from: PathBuf, to: PathBuf) {
        self.line(format!(
            "  {} {} → {}",
            "ok:".green().bold(),
            self.relative(&from).display(),
            self.relative(&to).display()
        ));
        self.renamed.push(Transformation { from, to });
    }

    pub fn record_rename_failure(&mut self, path: &Path, err: &anyhow::Error) {
        self.line(format!(
            "  {} {} - {:#}",
            "failed:".red().bold(),
            self.relative(path).display(),
            err
        ));
        self.errors
            .push(format!("Failed to rename {}: {:#}", path.display(), err));
    }

    pub fn record_update(&mut self, path: PathBuf) {
        self.line(format!(
            "  {} {}",
            "updated:".cyan().bold(),
            self.relative(&path).display()
        ));
        self.updated.push(path);
    }

    pub fn record_update_failure(&mut self, path: &Path, err: &anyhow::Error) {
        self.line(format!(
            "  {} {} - {:#}",
            "failed:".red().bold(),
            self.relative(path).display(),
            err
        ));
        self.errors.push(format!(
            "Failed to update references in {}: {:#}",
            path.display(),
            err
        ));
    }

    pub fn summary(&self) -> Summary {
        Summary {
            candidates: self.candidates,
            files_renamed: self.renamed.len(),
            files_updated: self.updated.len(),
            errors: self.errors.len(),
        }
    }

    /// A run succeeds when at least one file was renamed.
    pub fn succeeded(&self) -> bool {
        !self.renamed.is_empty()
    }

    pub fn print_summary(&self) {
        let s = self.summary();
        self.line(format!("\n{}", "=".repeat(60)));
        self.line(format!("{} {}", "Files renamed:".bold(), s.files_renamed));
        self.line(format!("{} {}", "Files updated:".bold(), s.files_updated));
        self.line(format!("{} {}", "Errors:".bold(), s.errors));

        if !self.errors.is_empty() {
            self.line(format!("\n{}", "Error report:".yellow().bold()));
            for error in &self.errors {
                self.line(format!("  - {}", error));
            }
        }

        let status = if self.succeeded() {
            "SUCCESS".green().bold()
        } else {
            "NOTHING RENAMED".red().bold()
        };
        self.line(format!("\n{} {}", "Status:".bold(), status));
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&JsonReport {
            report: self,
            summary: self.summary(),
        })?)
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    fn line(&self, text: String) {
        match self.echo {
            Echo::Stdout => println!("{}", text),
            Echo::Stderr => eprintln!("{}", text),
            Echo::Silent => {}
        }
    }
}
