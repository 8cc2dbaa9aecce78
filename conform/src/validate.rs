//! Per-entry validation pipeline and the aggregated report.
//!
//! Each entry runs strictly in order: structure, static checks, execution,
//! output count. Later stages only run when every earlier one passed. Entries
//! are isolated from each other: a failing or broken entry never stops the
//! rest from being validated.

use std::fs;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::core::output::verify_count;
use crate::core::rules::run_static_checks;
use crate::core::types::{Rule, RuleResult};
use crate::io::config::{ConformConfig, ConformPaths};
use crate::io::entries::{entry_file, list_entries};
use crate::io::process::run_captured;

/// Validation outcome for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReport {
    pub entry: String,
    /// Script file name, when the structure check found one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub checks: Vec<RuleResult>,
    /// Unexpected failure (I/O, spawn) that stopped this entry's pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EntryReport {
    fn new(entry: &str) -> Self {
        Self {
            entry: entry.to_string(),
            file: None,
            checks: Vec::new(),
            error: None,
        }
    }

    pub fn passed(&self) -> bool {
        self.error.is_none() && self.checks.iter().all(|check| check.passed)
    }

    /// Result recorded for `rule`, if that stage ran.
    pub fn check(&self, rule: Rule) -> Option<&RuleResult> {
        self.checks.iter().find(|check| check.rule == rule)
    }

    fn push(&mut self, result: RuleResult) -> bool {
        let passed = result.passed;
        self.checks.push(result);
        passed
    }
}

/// Reports for every validated entry, in entry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub entries: Vec<EntryReport>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.entries.iter().all(EntryReport::passed)
    }

    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.passed()).count()
    }
}

/// Validate one entry through the full pipeline.
///
/// Never fails: unexpected errors are recorded on the report.
#[instrument(skip_all, fields(entry = %entry))]
pub fn validate_entry(cfg: &ConformConfig, paths: &ConformPaths, entry: &str) -> EntryReport {
    let mut report = EntryReport::new(entry);
    if let Err(err) = run_pipeline(cfg, paths, entry, &mut report) {
        let message = format!("{err:#}");
        warn!(err = %message, "entry pipeline error");
        report.error = Some(message);
    }
    info!(passed = report.passed(), "entry validated");
    report
}

fn run_pipeline(
    cfg: &ConformConfig,
    paths: &ConformPaths,
    entry: &str,
    report: &mut EntryReport,
) -> Result<()> {
    let entry_dir = paths.entry_dir(cfg, entry);
    let file = match entry_file(&entry_dir)? {
        Ok(file) => file,
        Err(violation) => {
            report.push(RuleResult::fail(&violation));
            return Ok(());
        }
    };
    report.file = Some(file.name.clone());
    report.push(RuleResult::pass(Rule::Structure));

    let source = fs::read(&file.path).with_context(|| format!("read {}", file.path.display()))?;
    let mut static_passed = true;
    for result in run_static_checks(&source, cfg.size_limit_bytes) {
        static_passed &= report.push(result);
    }
    if !static_passed {
        debug!("static checks failed, skipping execution");
        return Ok(());
    }

    let prefix = cfg.interpreters.command(file.interpreter());
    let execution = run_captured(prefix, &file.path, cfg.timeout())?;
    let stdout = match execution.into_stdout() {
        Ok(stdout) => stdout,
        Err(violation) => {
            report.push(RuleResult::fail(&violation));
            return Ok(());
        }
    };
    report.push(RuleResult::pass(Rule::Execution));

    report.push(RuleResult::from_check(
        Rule::OutputCount,
        verify_count(&stdout, &cfg.target, cfg.expected_count),
    ));
    Ok(())
}

/// Validate every entry, or only `selector` when given.
///
/// Fails only when the entries directory cannot be read or the selector does
/// not name an existing entry.
#[instrument(skip_all, fields(selector = ?selector))]
pub fn validate_all(
    cfg: &ConformConfig,
    paths: &ConformPaths,
    selector: Option<&str>,
) -> Result<ValidationReport> {
    let entries_dir = paths.entries_dir(cfg);
    let mut names = list_entries(&entries_dir)?;
    if let Some(selected) = selector {
        if !names.iter().any(|name| name == selected) {
            bail!(
                "entry {selected} not found in {} (available: {})",
                entries_dir.display(),
                names.join(", ")
            );
        }
        names.retain(|name| name == selected);
    }

    let entries = names
        .iter()
        .map(|name| validate_entry(cfg, paths, name))
        .collect();
    Ok(ValidationReport { entries })
}
