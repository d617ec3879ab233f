//! Directory scanner.
//!
//! Recursively walks a root directory, pruning version-control metadata,
//! hidden entries, denylisted build directories and user exclusions as
//! configured by the [`Policy`]. Produces either the rename candidates or the
//! full list of files the reference rewriter should visit.

use crate::policy::{CandidateOrder, Policy};
use colored::Colorize;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Collects every regular file under `root` eligible for prefixing.
///
/// A file is skipped if any segment below `root` is excluded by the policy,
/// or if its own name already carries a known prefix. Unreadable entries are
/// reported on stderr and skipped.
pub fn scan(root: &Path, policy: &Policy) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walk_files(root, policy)
        .filter(|path| {
            path.file_name()
                .is_some_and(|name| !policy.is_prefixed(&name.to_string_lossy()))
        })
        .collect();

    if policy.ordering == CandidateOrder::Sorted {
        files.sort();
    }

    files
}

/// Collects every regular file the reference rewriter should visit.
///
/// Uses the same directory pruning as [`scan`] but keeps already-prefixed
/// files, since they are exactly the ones whose references need updating.
pub fn collect_rewrite_targets(root: &Path, policy: &Policy) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walk_files(root, policy).collect();
    files.sort();
    files
}

fn walk_files<'a>(root: &'a Path, policy: &'a Policy) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(move |e| !is_excluded(e, policy))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                eprintln!("{} Skipping unreadable entry: {}", "warn:".yellow().bold(), err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(DirEntry::into_path)
}

/// The root itself is never judged, so scanning inside a dot-directory works.
fn is_excluded(entry: &DirEntry, policy: &Policy) -> bool {
    entry.depth() > 0 && policy.is_excluded_segment(&entry.file_name().to_string_lossy())
}
