//! Harness configuration stored in `conform.toml` at the project root.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::types::Interpreter;

/// Default config file name, relative to the project root.
pub const CONFIG_FILE_NAME: &str = "conform.toml";

/// Harness configuration (TOML).
///
/// Missing fields default to the reference rules: 1000-byte files that print
/// `Hello World` exactly one million times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConformConfig {
    /// Directory holding one subdirectory per entry, relative to the root.
    pub entries_dir: PathBuf,

    /// Largest allowed entry file, in bytes.
    pub size_limit_bytes: u64,

    /// Literal the entry must print.
    pub target: String,

    /// Exact number of times `target` must appear on stdout.
    pub expected_count: usize,

    /// Wall-clock ceiling for one entry process, in seconds.
    pub timeout_secs: u64,

    pub interpreters: InterpreterConfig,
}

/// Command prefixes per interpreter. The entry file path is appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InterpreterConfig {
    pub node: Vec<String>,
    pub typescript: Vec<String>,
    pub coffee: Vec<String>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            node: vec!["node".to_string()],
            typescript: vec![
                "node".to_string(),
                "--loader".to_string(),
                "ts-node/esm".to_string(),
            ],
            coffee: vec!["coffee".to_string()],
        }
    }
}

impl InterpreterConfig {
    /// Command prefix for `interpreter`.
    pub fn command(&self, interpreter: Interpreter) -> &[String] {
        match interpreter {
            Interpreter::Node => &self.node,
            Interpreter::TypeScript => &self.typescript,
            Interpreter::CoffeeScript => &self.coffee,
        }
    }
}

impl Default for ConformConfig {
    fn default() -> Self {
        Self {
            entries_dir: PathBuf::from("entries"),
            size_limit_bytes: 1000,
            target: "Hello World".to_string(),
            expected_count: 1_000_000,
            timeout_secs: 60 * 60,
            interpreters: InterpreterConfig::default(),
        }
    }
}

impl ConformConfig {
    pub fn validate(&self) -> Result<()> {
        if self.entries_dir.as_os_str().is_empty() {
            return Err(anyhow!("entries_dir must be non-empty"));
        }
        if self.size_limit_bytes == 0 {
            return Err(anyhow!("size_limit_bytes must be > 0"));
        }
        if self.target.is_empty() {
            return Err(anyhow!("target must be non-empty"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be > 0"));
        }
        for (label, command) in [
            ("node", &self.interpreters.node),
            ("typescript", &self.interpreters.typescript),
            ("coffee", &self.interpreters.coffee),
        ] {
            if command.is_empty() || command[0].trim().is_empty() {
                return Err(anyhow!("interpreters.{label} must be a non-empty array"));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Resolved locations for one project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformPaths {
    pub root: PathBuf,
    pub config_path: PathBuf,
}

impl ConformPaths {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            config_path: root.join(CONFIG_FILE_NAME),
        }
    }

    /// Use an explicit config file instead of `<root>/conform.toml`.
    pub fn with_config(mut self, config_path: PathBuf) -> Self {
        self.config_path = config_path;
        self
    }

    pub fn entries_dir(&self, cfg: &ConformConfig) -> PathBuf {
        self.root.join(&cfg.entries_dir)
    }

    pub fn entry_dir(&self, cfg: &ConformConfig, entry: &str) -> PathBuf {
        self.entries_dir(cfg).join(entry)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ConformConfig::default()`.
pub fn load_config(path: &Path) -> Result<ConformConfig> {
    if !path.exists() {
        let cfg = ConformConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ConformConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}
