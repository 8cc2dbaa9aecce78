//! Interactive launcher for conform entries.
//!
//! Runs one entry (by exact or approximate name) or all of them, with output
//! attached to the terminal. Exits with the child's exit code.

mod dispatch;
mod matcher;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use inquire::Text;

use conform::exit_codes;
use conform::io::config::{ConformPaths, load_config};
use conform::io::entries::list_entries;

use crate::dispatch::{Resolution, StreamingRunner, dispatch, resolve};
use crate::matcher::SkimMatcher;

#[derive(Parser)]
#[command(
    name = "launch",
    version,
    about = "Run conform entries with live output"
)]
struct Cli {
    /// Project root containing `conform.toml` and the entries directory.
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Config file to use instead of `<root>/conform.toml`.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run every entry in order without prompting.
    #[arg(long, conflicts_with = "name")]
    all: bool,
    /// Entry to run. Prompts when omitted; an empty answer runs all.
    name: Option<String>,
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
    let entries = list_entries(&paths.entries_dir(&cfg))?;

    let input = match (cli.all, cli.name) {
        (true, _) => String::new(),
        (false, Some(name)) => name,
        (false, None) => prompt(&entries)?,
    };

    let resolution = resolve(&input, &entries, &SkimMatcher::default())?;
    if let Resolution::Approximate { query, entry } = &resolution {
        eprintln!("no entry named '{query}', running closest match '{entry}'");
    }

    let runner = StreamingRunner::new(&cfg, &paths);
    dispatch(&resolution, &entries, &runner)
}

fn prompt(entries: &[String]) -> Result<String> {
    let help = format!("available: {}", entries.join(", "));
    Text::new("Entry to run (empty runs all):")
        .with_help_message(&help)
        .prompt()
        .context("read entry name")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_name_argument() {
        let cli = Cli::parse_from(["launch", "hello"]);
        assert_eq!(cli.name.as_deref(), Some("hello"));
        assert!(!cli.all);
    }

    #[test]
    fn all_conflicts_with_name() {
        assert!(Cli::try_parse_from(["launch", "--all", "hello"]).is_err());
        let cli = Cli::parse_from(["launch", "--all"]);
        assert!(cli.all);
    }
}
