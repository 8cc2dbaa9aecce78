//! Conformance harness CLI.
//!
//! `conform check` validates every entry under `entries/` (or one selected
//! entry) and prints a per-rule report. `conform list` prints entry names.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use conform::exit_codes;
use conform::io::config::{ConformPaths, load_config};
use conform::io::entries::list_entries;
use conform::validate::{ValidationReport, validate_all};

#[derive(Parser)]
#[command(
    name = "conform",
    version,
    about = "Validate script entries against size, style and output rules"
)]
struct Cli {
    /// Project root containing `conform.toml` and the entries directory.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
    /// Config file to use instead of `<root>/conform.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate entries and report every rule outcome.
    Check {
        /// Only validate this entry.
        #[arg(long, env = "CONFORM_ENTRY")]
        entry: Option<String>,
        /// Print the report as JSON instead of text.
        #[arg(long)]
        json: bool,
        /// Also write the JSON report to this file.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print the names of all entries, one per line.
    List,
}

fn main() {
    conform::logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let mut paths = ConformPaths::new(&cli.root);
    if let Some(config) = cli.config {
        paths = paths.with_config(config);
    }
    let cfg = load_config(&paths.config_path).context("load config")?;

    match cli.command {
        Command::Check {
            entry,
            json,
            report,
        } => {
            let outcome = validate_all(&cfg, &paths, entry.as_deref())?;
            if let Some(path) = report {
                write_report(&path, &outcome)?;
            }
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&outcome).context("serialize report")?
                );
            } else {
                print_report(&outcome);
            }
            if outcome.passed() {
                Ok(exit_codes::OK)
            } else {
                Ok(exit_codes::FAILED)
            }
        }
        Command::List => {
            for name in list_entries(&paths.entries_dir(&cfg))? {
                println!("{name}");
            }
            Ok(exit_codes::OK)
        }
    }
}

fn print_report(report: &ValidationReport) {
    for entry in &report.entries {
        let verdict = if entry.passed() { "pass" } else { "FAIL" };
        match &entry.file {
            Some(file) => println!("{verdict} {} ({file})", entry.entry),
            None => println!("{verdict} {}", entry.entry),
        }
        for check in &entry.checks {
            let mark = if check.passed { "ok" } else { "x" };
            match &check.message {
                Some(message) => println!("  {mark:>2} {}: {message}", check.rule.as_str()),
                None => println!("  {mark:>2} {}", check.rule.as_str()),
            }
        }
        if let Some(error) = &entry.error {
            println!("   ! error: {error}");
        }
    }
    println!(
        "summary: entries={} passed={} failed={}",
        report.entries.len(),
        report.entries.len() - report.failed_count(),
        report.failed_count()
    );
}

fn write_report(path: &Path, report: &ValidationReport) -> Result<()> {
    let mut payload = serde_json::to_string_pretty(report).context("serialize report")?;
    payload.push('\n');
    fs::write(path, payload).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_check_with_entry() {
        let cli = Cli::parse_from(["conform", "check", "--entry", "hello", "--json"]);
        assert!(matches!(
            cli.command,
            Command::Check { entry: Some(ref name), json: true, report: None } if name == "hello"
        ));
    }

    #[test]
    fn parse_global_root_after_subcommand() {
        let cli = Cli::parse_from(["conform", "list", "--root", "/tmp/project"]);
        assert_eq!(cli.root, PathBuf::from("/tmp/project"));
        assert!(matches!(cli.command, Command::List));
    }
}
