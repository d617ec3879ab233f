//! The rename-then-rewrite pipeline.
//!
//! A [`Transformer`] runs the phases strictly in order: scan the tree, rename
//! every candidate, then walk the renamed tree again and rewrite references.
//! Per-file failures are recorded in the [`Report`] and never stop the batch.

use crate::policy::Policy;
use crate::renamer::{self, Candidate};
use crate::report::{Echo, Report};
use crate::{rewriter, scanner};
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Transformer {
    root: PathBuf,
    policy: Policy,
    report: Report,
}

impl Transformer {
    /// Fails only if `root` is not an existing directory.
    pub fn new(root: impl AsRef<Path>, policy: Policy) -> Result<Self> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .with_context(|| format!("Cannot resolve root {}", root.display()))?;
        if !root.is_dir() {
            bail!("{} is not a directory", root.display());
        }
        let report = Report::new(&root, Echo::Stdout);
        Ok(Self {
            root,
            policy,
            report,
        })
    }

    /// Redirects progress output.
    pub fn with_echo(mut self, echo: Echo) -> Self {
        self.report = Report::new(&self.root, echo);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Lists rename candidates without touching the tree.
    pub fn scan(&self) -> Vec<PathBuf> {
        scanner::scan(&self.root, &self.policy)
    }

    /// Runs all phases and returns the finished report.
    pub fn run(mut self) -> Report {
        self.report.start(&self.policy.prefix);

        let candidates = self.scan();
        self.report.candidates_found(candidates.len());

        self.report.phase("Renaming files...");
        self.rename_all(candidates);

        self.report.phase("Updating references...");
        self.rewrite_all();

        self.report.print_summary();
        self.report
    }

    fn rename_all(&mut self, candidates: Vec<PathBuf>) {
        for source in candidates {
            let outcome = Candidate::new(source.clone(), &self.policy).and_then(|candidate| {
                renamer::rename(&candidate, self.policy.strategy)?;
                Ok(candidate)
            });
            match outcome {
                Ok(Candidate { source, target }) => self.report.record_rename(source, target),
                Err(err) => self.report.record_rename_failure(&source, &err),
            }
        }
    }

    // Re-walks the tree instead of reusing the rename list, so files whose
    // rename failed are still visited under their old names.
    fn rewrite_all(&mut self) {
        for path in scanner::collect_rewrite_targets(&self.root, &self.policy) {
            match rewriter::rewrite(&path, &self.policy) {
                Ok(true) => self.report.record_update(path),
                Ok(false) => {}
                Err(err) => self.report.record_update_failure(&path, &err),
            }
        }
    }
}
