//! Test-only helpers for building entry trees on disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::io::config::{CONFIG_FILE_NAME, ConformConfig, ConformPaths, InterpreterConfig};

/// Config that runs every entry with `sh`, so tests need no JavaScript runtime.
pub fn shell_config(expected_count: usize) -> ConformConfig {
    let sh = vec!["sh".to_string()];
    ConformConfig {
        expected_count,
        timeout_secs: 60,
        interpreters: InterpreterConfig {
            node: sh.clone(),
            typescript: sh.clone(),
            coffee: sh,
        },
        ..ConformConfig::default()
    }
}

/// A temporary project root with an `entries/` directory.
pub struct EntryTree {
    dir: TempDir,
    cfg: ConformConfig,
    paths: ConformPaths,
}

impl EntryTree {
    /// Create a tree whose config expects `expected_count` target lines.
    pub fn new(expected_count: usize) -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp dir")?;
        let cfg = shell_config(expected_count);
        let paths = ConformPaths::new(dir.path());
        fs::create_dir_all(paths.entries_dir(&cfg)).context("create entries dir")?;
        Ok(Self { dir, cfg, paths })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> &ConformConfig {
        &self.cfg
    }

    pub fn paths(&self) -> &ConformPaths {
        &self.paths
    }

    /// Write `<root>/entries/<entry>/<file_name>` with `contents`.
    pub fn add_entry(&self, entry: &str, file_name: &str, contents: &str) -> Result<PathBuf> {
        let dir = self.paths.entry_dir(&self.cfg, entry);
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        let path = dir.join(file_name);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Persist the config as `<root>/conform.toml` for binary tests.
    pub fn write_config(&self) -> Result<PathBuf> {
        let path = self.root().join(CONFIG_FILE_NAME);
        let contents = toml::to_string_pretty(&self.cfg).context("serialize config")?;
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}
