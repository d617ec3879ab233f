//! prefix-rename library for prefixing file names across a tree.
//!
//! Renames every eligible file by prepending a prefix, then rewrites the
//! textual references that pointed at the old names. A run has four phases:
//!
//! 1. **Scanning**: walk the root and collect candidates not yet prefixed
//! 2. **Renaming**: move each candidate to its prefixed name
//! 3. **Rewriting**: walk the renamed tree and update imports, manifest
//!    entries and documentation links
//! 4. **Reporting**: tally renames, updates and per-file errors
//!
//! # Example
//!
//! ```no_run
//! use prefix_rename::{Policy, Transformer};
//!
//! let report = Transformer::new(".", Policy::st6()).unwrap().run();
//! println!("{} files renamed", report.summary().files_renamed);
//! ```

pub mod policy;
pub mod renamer;
pub mod report;
pub mod rewriter;
pub mod scanner;
pub mod transformer;

// Re-export commonly used types at crate root
pub use policy::{CandidateOrder, Policy, RenameStrategy};
pub use report::{Echo, Report, Summary};
pub use transformer::Transformer;
