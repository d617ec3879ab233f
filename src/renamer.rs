//! File renaming.
//!
//! Moves a candidate to its prefixed name in the same directory, using either
//! an atomic `rename` or a copy followed by deleting the source. An existing
//! file at the target name is never overwritten.

use crate::policy::{Policy, RenameStrategy};
use anyhow::{Context, Result, bail};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};

/// A file selected for renaming together with its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub source: PathBuf,
    pub target: PathBuf,
}

impl Candidate {
    /// Derives the target by prepending the policy's prefix to the base name.
    pub fn new(source: PathBuf, policy: &Policy) -> Result<Self> {
        let name = source
            .file_name()
            .with_context(|| format!("{} has no file name", source.display()))?;
        let target = source.with_file_name(policy.prefixed(name));
        Ok(Self { source, target })
    }
}

/// Renames `candidate.source` to `candidate.target` using `strategy`.
///
/// Fails if the source is missing, the target already exists, or the
/// underlying filesystem call fails.
pub fn rename(candidate: &Candidate, strategy: RenameStrategy) -> Result<()> {
    let Candidate { source, target } = candidate;

    fs::symlink_metadata(source).with_context(|| format!("{} does not exist", source.display()))?;
    if fs::symlink_metadata(target).is_ok() {
        bail!("target {} already exists", target.display());
    }

    match strategy {
        RenameStrategy::Move => fs::rename(source, target)
            .with_context(|| format!("rename to {} failed", target.display())),
        RenameStrategy::CopyDelete => copy_then_delete(source, target),
    }
}

fn copy_then_delete(source: &Path, target: &Path) -> Result<()> {
    let metadata = fs::metadata(source)
        .with_context(|| format!("could not read metadata of {}", source.display()))?;

    let moved = (|| {
        fs::copy(source, target)
            .with_context(|| format!("copy to {} failed", target.display()))?;
        filetime::set_file_times(
            target,
            FileTime::from_last_access_time(&metadata),
            FileTime::from_last_modification_time(&metadata),
        )
        .with_context(|| format!("could not restore timestamps on {}", target.display()))?;
        fs::remove_file(source).with_context(|| format!("could not remove {}", source.display()))
    })();

    discard_target_on_error(target, moved)
}

/// Removes a complete or partial copy at `target` when any step failed, so
/// the source remains the only file.
fn discard_target_on_error(target: &Path, result: Result<()>) -> Result<()> {
    if result.is_err() {
        let _ = fs::remove_file(target);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn candidate(dir: &TempDir, name: &str, contents: &str) -> Candidate {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        Candidate::new(path, &Policy::st6()).unwrap()
    }

    #[test]
    fn target_is_prefixed_sibling() {
        let policy = Policy::seal();
        let c = Candidate::new(PathBuf::from("a/b/c.txt"), &policy).unwrap();
        assert_eq!(c.target, PathBuf::from("a/b/SEAL-TEAM-Six-c.txt"));
    }

    #[test]
    fn candidate_without_file_name_is_rejected() {
        assert!(Candidate::new(PathBuf::from("/"), &Policy::st6()).is_err());
    }

    #[test]
    fn move_renames_file() {
        let dir = TempDir::new().unwrap();
        let c = candidate(&dir, "a.txt", "alpha");
        rename(&c, RenameStrategy::Move).unwrap();
        assert!(!c.source.exists());
        assert_eq!(fs::read_to_string(&c.target).unwrap(), "alpha");
    }

    #[test]
    fn copy_delete_preserves_contents_and_mtime() {
        let dir = TempDir::new().unwrap();
        let c = candidate(&dir, "a.txt", "alpha");
        let mtime = FileTime::from_unix_time(1_000_000_000, 0);
        filetime::set_file_mtime(&c.source, mtime).unwrap();

        rename(&c, RenameStrategy::CopyDelete).unwrap();

        assert!(!c.source.exists());
        assert_eq!(fs::read_to_string(&c.target).unwrap(), "alpha");
        let meta = fs::metadata(&c.target).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta), mtime);
    }

    #[test]
    fn collision_is_an_error_and_keeps_both_files() {
        for strategy in [RenameStrategy::Move, RenameStrategy::CopyDelete] {
            let dir = TempDir::new().unwrap();
            let c = candidate(&dir, "a.txt", "new");
            fs::write(&c.target, "existing").unwrap();

            let err = rename(&c, strategy).unwrap_err();

            assert!(format!("{:#}", err).contains("already exists"));
            assert_eq!(fs::read_to_string(&c.source).unwrap(), "new");
            assert_eq!(fs::read_to_string(&c.target).unwrap(), "existing");
        }
    }

    #[test]
    fn failed_copy_step_discards_target() {
        let dir = TempDir::new().unwrap();
        let c = candidate(&dir, "a.txt", "alpha");
        fs::write(&c.target, "half written").unwrap();

        let result = discard_target_on_error(&c.target, Err(anyhow::anyhow!("disk full")));

        assert!(result.is_err());
        assert!(!c.target.exists());
        assert_eq!(fs::read_to_string(&c.source).unwrap(), "alpha");
    }

    #[test]
    fn successful_copy_step_keeps_target() {
        let dir = TempDir::new().unwrap();
        let c = candidate(&dir, "a.txt", "alpha");
        fs::write(&c.target, "alpha").unwrap();

        discard_target_on_error(&c.target, Ok(())).unwrap();

        assert!(c.target.exists());
    }

    #[test]
    fn copy_delete_of_directory_leaves_no_target() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("folder");
        fs::create_dir(&source).unwrap();
        let c = Candidate::new(source, &Policy::st6()).unwrap();

        assert!(rename(&c, RenameStrategy::CopyDelete).is_err());

        assert!(c.source.is_dir());
        assert!(fs::symlink_metadata(&c.target).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_name_keeps_its_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let c = Candidate::new(PathBuf::from(OsStr::from_bytes(b"d/caf\xe9.txt")), &Policy::st6()).unwrap();
        assert_eq!(c.target.file_name().unwrap().as_bytes(), b"ST6_caf\xe9.txt");

        for strategy in [RenameStrategy::Move, RenameStrategy::CopyDelete] {
            let dir = TempDir::new().unwrap();
            let source = dir.path().join(OsStr::from_bytes(b"caf\xe9.txt"));
            fs::write(&source, "latin-1").unwrap();
            let c = Candidate::new(source, &Policy::st6()).unwrap();

            rename(&c, strategy).unwrap();

            assert!(!c.source.exists());
            let expected = dir.path().join(OsStr::from_bytes(b"ST6_caf\xe9.txt"));
            assert_eq!(fs::read_to_string(expected).unwrap(), "latin-1");
        }
    }

    #[test]
    fn missing_source_is_an_error() {
        let dir = TempDir::new().unwrap();
        let c = Candidate::new(dir.path().join("ghost.txt"), &Policy::st6()).unwrap();
        let err = rename(&c, RenameStrategy::Move).unwrap_err();
        assert!(format!("{:#}", err).contains("does not exist"));
    }
}
