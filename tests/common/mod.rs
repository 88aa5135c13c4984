#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use seqtyper::core::config::RunConfiguration;
use seqtyper::Catalog;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a test FASTA file with the given content
pub fn create_test_fasta(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content)?;
    Ok(path)
}

/// FASTA text with one record per id
pub fn fasta_with_ids(ids: &[&str]) -> String {
    let mut content = String::new();
    for (i, id) in ids.iter().enumerate() {
        content.push_str(&format!(">{} contig {}\n", id, i + 1));
        content.push_str("ATGATGATGATGATGATGATGATGATGATGATGATGATGATGATG\n");
    }
    content
}

/// Database, scratch and output directories for one batch
pub struct BatchDirs {
    pub root: TempDir,
    pub database: PathBuf,
    pub scratch: PathBuf,
    pub outdir: PathBuf,
}

impl BatchDirs {
    pub fn new() -> Result<Self> {
        let root = TempDir::new()?;
        let database = root.path().join("mlst_db");
        let scratch = root.path().join("tmp");
        let outdir = root.path().join("out");
        fs::create_dir_all(&database)?;
        fs::create_dir_all(&outdir)?;
        Ok(Self {
            root,
            database,
            scratch,
            outdir,
        })
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn config(&self, inputs: &[PathBuf], species: &str) -> Result<RunConfiguration> {
        Ok(RunConfiguration::builder()
            .inputs(inputs.iter().cloned())
            .species(species)
            .database(&self.database)
            .scratch_dir(&self.scratch)
            .outdir(&self.outdir)
            .build(&Catalog::builtin())?)
    }

    pub fn report(&self) -> String {
        fs::read_to_string(self.outdir.join("results.csv")).unwrap_or_default()
    }
}

/// The seqtyper binary with a private SEQTYPER_HOME
pub fn seqtyper_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("seqtyper").expect("seqtyper binary");
    cmd.env("SEQTYPER_HOME", home)
        .env_remove("SEQTYPER_DB_DIR")
        .env_remove("SEQTYPER_TMP_DIR")
        .env_remove("SEQTYPER_LOG");
    cmd
}
