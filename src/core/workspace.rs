//! Scratch workspace shared by every typer invocation of a batch
//!
//! There is exactly one directory and it is reused: it must be empty
//! before each invocation and is emptied again once that invocation's
//! result has been read. [`WorkspaceLease`] ties the cleanup to scope
//! so it also happens on early returns.

use crate::bio::fasta::write_fasta;
use crate::bio::sequence::Sequence;
use crate::SeqtyperError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name a staged record is written to
pub const STAGED_FILE: &str = "sequence.fasta";

#[derive(Debug)]
pub struct ScratchWorkspace {
    root: PathBuf,
}

impl ScratchWorkspace {
    /// Create the directory if needed and purge anything a previous run left
    pub fn open<P: Into<PathBuf>>(root: P) -> Result<Self, SeqtyperError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            SeqtyperError::Workspace(format!("cannot create {}: {}", root.display(), e))
        })?;
        let workspace = Self { root };
        workspace.reset()?;
        Ok(workspace)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a file inside the workspace
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Names of everything currently in the workspace, sorted
    pub fn entries(&self) -> Result<Vec<PathBuf>, SeqtyperError> {
        let mut entries = fs::read_dir(&self.root)
            .map_err(|e| {
                SeqtyperError::Workspace(format!("cannot list {}: {}", self.root.display(), e))
            })?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                SeqtyperError::Workspace(format!("cannot list {}: {}", self.root.display(), e))
            })?;
        entries.sort();
        Ok(entries)
    }

    pub fn is_empty(&self) -> Result<bool, SeqtyperError> {
        Ok(self.entries()?.is_empty())
    }

    /// Take the workspace for one invocation. Fails if anything is left
    /// over, since the typer could pick up a stale artifact.
    pub fn acquire(&self) -> Result<WorkspaceLease<'_>, SeqtyperError> {
        let leftovers = self.entries()?;
        if !leftovers.is_empty() {
            return Err(SeqtyperError::Workspace(format!(
                "{} is not empty ({} leftover entries)",
                self.root.display(),
                leftovers.len()
            )));
        }
        Ok(WorkspaceLease {
            workspace: self,
            released: false,
        })
    }

    /// Remove every entry.
    ///
    /// Individual removal failures are logged and skipped. The call only
    /// fails when the directory cannot be listed or entries survive the
    /// purge.
    pub fn reset(&self) -> Result<(), SeqtyperError> {
        for path in self.entries()? {
            match remove_entry(&path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }

        let remaining = self.entries()?;
        if !remaining.is_empty() {
            return Err(SeqtyperError::Workspace(format!(
                "could not clear {}: {} entries remain",
                self.root.display(),
                remaining.len()
            )));
        }
        Ok(())
    }

    /// Move the workspace contents into `dest` (created if missing).
    ///
    /// Entries that cannot be renamed, e.g. because `dest` is on another
    /// filesystem, are copied and then removed. An entry that can be
    /// neither renamed nor copied is an error, since the following reset
    /// would delete it.
    pub fn preserve_into(&self, dest: &Path) -> Result<(), SeqtyperError> {
        fs::create_dir_all(dest).map_err(|e| {
            SeqtyperError::Workspace(format!("cannot create {}: {}", dest.display(), e))
        })?;
        for path in self.entries()? {
            let Some(name) = path.file_name() else {
                continue;
            };
            let target = dest.join(name);
            if let Err(e) = fs::rename(&path, &target) {
                debug!(
                    "Rename of {} failed ({}), copying instead",
                    path.display(),
                    e
                );
                copy_entry(&path, &target).map_err(|e| {
                    SeqtyperError::Workspace(format!(
                        "could not keep {} as {}: {}",
                        path.display(),
                        target.display(),
                        e
                    ))
                })?;
                remove_entry(&path)?;
            }
        }
        Ok(())
    }
}

fn copy_entry(src: &Path, dest: &Path) -> std::io::Result<()> {
    if src.is_dir() {
        fs::create_dir_all(dest)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_entry(&entry.path(), &dest.join(entry.file_name()))?;
        }
    } else {
        fs::copy(src, dest)?;
    }
    Ok(())
}

fn remove_entry(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Exclusive use of the workspace for one record.
///
/// Call [`WorkspaceLease::release`] to reset and see whether cleanup
/// succeeded. A lease dropped without release resets on a best-effort
/// basis.
#[derive(Debug)]
pub struct WorkspaceLease<'a> {
    workspace: &'a ScratchWorkspace,
    released: bool,
}

impl<'a> WorkspaceLease<'a> {
    pub fn workspace(&self) -> &ScratchWorkspace {
        self.workspace
    }

    /// Write a record to the fixed staging file, replacing previous content
    pub fn stage(&self, record: &Sequence) -> Result<PathBuf, SeqtyperError> {
        let staged = self.workspace.path(STAGED_FILE);
        write_fasta(&staged, std::slice::from_ref(record)).map_err(|e| {
            SeqtyperError::Workspace(format!("cannot stage {}: {}", record.id, e))
        })?;
        debug!("Staged {} at {}", record.id, staged.display());
        Ok(staged)
    }

    pub fn release(mut self) -> Result<(), SeqtyperError> {
        self.released = true;
        self.workspace.reset()
    }
}

impl Drop for WorkspaceLease<'_> {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.workspace.reset() {
                warn!("Failed to reset workspace: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_and_purges() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("tmp");
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::write(root.join("data.json"), "{}").unwrap();
        fs::write(root.join("nested").join("hit.tsv"), "x").unwrap();

        let workspace = ScratchWorkspace::open(&root).unwrap();
        assert!(workspace.is_empty().unwrap());

        let fresh = ScratchWorkspace::open(dir.path().join("new")).unwrap();
        assert!(fresh.root().is_dir());
    }

    #[test]
    fn test_stage_overwrites_and_release_empties() {
        let dir = TempDir::new().unwrap();
        let workspace = ScratchWorkspace::open(dir.path()).unwrap();

        let lease = workspace.acquire().unwrap();
        let first = Sequence::new("seqA".to_string(), b"ACGT".to_vec());
        let second = Sequence::new("seqB".to_string(), b"GGGG".to_vec());
        lease.stage(&first).unwrap();
        let staged = lease.stage(&second).unwrap();

        assert_eq!(staged, dir.path().join(STAGED_FILE));
        assert_eq!(fs::read_to_string(&staged).unwrap(), ">seqB\nGGGG\n");
        assert_eq!(workspace.entries().unwrap(), vec![staged]);

        lease.release().unwrap();
        assert!(workspace.is_empty().unwrap());
    }

    #[test]
    fn test_acquire_refuses_dirty_workspace() {
        let dir = TempDir::new().unwrap();
        let workspace = ScratchWorkspace::open(dir.path()).unwrap();
        fs::write(workspace.path("data.json"), "{}").unwrap();

        assert!(matches!(workspace.acquire(), Err(SeqtyperError::Workspace(_))));
        workspace.reset().unwrap();
        assert!(workspace.acquire().is_ok());
    }

    #[test]
    fn test_dropped_lease_resets() {
        let dir = TempDir::new().unwrap();
        let workspace = ScratchWorkspace::open(dir.path()).unwrap();
        {
            let lease = workspace.acquire().unwrap();
            fs::write(lease.workspace().path("data.json"), "{}").unwrap();
            fs::create_dir(lease.workspace().path("tmp")).unwrap();
        }
        assert!(workspace.is_empty().unwrap());
    }

    #[test]
    fn test_copy_entry_keeps_nested_files() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("tmp");
        fs::create_dir_all(src.join("blast")).unwrap();
        fs::write(src.join("blast").join("hits.tsv"), "locus\tallele\n").unwrap();

        let dest = dir.path().join("kept");
        copy_entry(&src, &dest).unwrap();
        remove_entry(&src).unwrap();

        assert_eq!(
            fs::read_to_string(dest.join("blast").join("hits.tsv")).unwrap(),
            "locus\tallele\n"
        );
        assert!(!src.exists());
    }

    #[test]
    fn test_preserve_into_fails_instead_of_losing_files() {
        let dir = TempDir::new().unwrap();
        let workspace = ScratchWorkspace::open(dir.path().join("scratch")).unwrap();
        fs::write(workspace.path("data.json"), "{}").unwrap();

        // A non-empty directory in the way: neither rename nor copy can land
        let kept = dir.path().join("kept");
        fs::create_dir_all(kept.join("data.json").join("occupied")).unwrap();

        assert!(matches!(workspace.preserve_into(&kept), Err(SeqtyperError::Workspace(_))));
        assert!(workspace.path("data.json").is_file());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_preserve_into_across_filesystems() {
        use std::os::unix::fs::MetadataExt;

        let shm = Path::new("/dev/shm");
        if !shm.is_dir() {
            return;
        }
        let Ok(scratch_root) = TempDir::new_in(shm) else {
            return;
        };
        let out_root = TempDir::new().unwrap();
        let same_device = fs::metadata(scratch_root.path()).unwrap().dev()
            == fs::metadata(out_root.path()).unwrap().dev();
        if same_device {
            return;
        }

        let workspace = ScratchWorkspace::open(scratch_root.path().join("tmp")).unwrap();
        fs::write(workspace.path("data.json"), r#"{"mlst": {}}"#).unwrap();
        fs::create_dir(workspace.path("blast")).unwrap();
        fs::write(workspace.path("blast").join("hits.tsv"), "x").unwrap();

        let kept = out_root.path().join("typer_output").join("0_seqA");
        workspace.preserve_into(&kept).unwrap();

        assert_eq!(fs::read_to_string(kept.join("data.json")).unwrap(), r#"{"mlst": {}}"#);
        assert!(kept.join("blast").join("hits.tsv").is_file());
        assert!(workspace.is_empty().unwrap());
    }

    #[test]
    fn test_preserve_into_moves_entries() {
        let dir = TempDir::new().unwrap();
        let workspace = ScratchWorkspace::open(dir.path().join("scratch")).unwrap();
        fs::write(workspace.path("data.json"), "{}").unwrap();

        let kept = dir.path().join("kept");
        workspace.preserve_into(&kept).unwrap();
        assert!(kept.join("data.json").is_file());
        assert!(workspace.is_empty().unwrap());
    }
}
