//! Entry-name resolution and run dispatch for the launcher.
//!
//! An empty name runs every entry in order, stopping at the first non-zero
//! exit. An exact name runs that entry. Anything else falls back to the
//! approximate matcher's best candidate.

use anyhow::{Result, bail};
use thiserror::Error;
use tracing::{debug, info, instrument};

use conform::io::config::{ConformConfig, ConformPaths};
use conform::io::entries::entry_file;
use conform::io::process::run_streaming;

use crate::matcher::ApproximateMatcher;

/// Exit code used when a child reports none (killed by a signal).
const SIGNALED: i32 = 1;

/// What the operator's input resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Empty input: run every entry.
    All,
    /// The input named an entry exactly.
    Exact(String),
    /// The input named no entry; `entry` is the matcher's top candidate.
    Approximate { query: String, entry: String },
}

impl Resolution {
    /// Entries to run, in order.
    fn targets<'a>(&'a self, entries: &'a [String]) -> Vec<&'a str> {
        match self {
            Resolution::All => entries.iter().map(String::as_str).collect(),
            Resolution::Exact(entry) | Resolution::Approximate { entry, .. } => {
                vec![entry.as_str()]
            }
        }
    }
}

/// The typed name could not be resolved to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("no entry matches '{query}'; available entries: {}", .available.join(", "))]
    NoMatch {
        query: String,
        available: Vec<String>,
    },
    #[error("could not match '{query}' ({reason}); available entries: {}", .available.join(", "))]
    MatcherFailed {
        query: String,
        reason: String,
        available: Vec<String>,
    },
}

/// Resolve operator input against the known entry names.
pub fn resolve<M: ApproximateMatcher>(
    input: &str,
    entries: &[String],
    matcher: &M,
) -> Result<Resolution, ResolutionError> {
    let query = input.trim();
    if query.is_empty() {
        return Ok(Resolution::All);
    }
    if entries.iter().any(|entry| entry == query) {
        return Ok(Resolution::Exact(query.to_string()));
    }

    let ranked = matcher
        .rank(query, entries)
        .map_err(|err| ResolutionError::MatcherFailed {
            query: query.to_string(),
            reason: format!("{err:#}"),
            available: entries.to_vec(),
        })?;
    debug!(query, candidates = ?ranked, "approximate match");
    match ranked.into_iter().next() {
        Some(entry) => Ok(Resolution::Approximate {
            query: query.to_string(),
            entry,
        }),
        None => Err(ResolutionError::NoMatch {
            query: query.to_string(),
            available: entries.to_vec(),
        }),
    }
}

/// Runs one entry and reports its exit code.
pub trait EntryRunner {
    /// `None` means the process ended without an exit code.
    fn run(&self, entry: &str) -> Result<Option<i32>>;
}

/// Runs entries with their output attached to the current terminal.
pub struct StreamingRunner<'a> {
    cfg: &'a ConformConfig,
    paths: &'a ConformPaths,
}

impl<'a> StreamingRunner<'a> {
    pub fn new(cfg: &'a ConformConfig, paths: &'a ConformPaths) -> Self {
        Self { cfg, paths }
    }
}

impl EntryRunner for StreamingRunner<'_> {
    fn run(&self, entry: &str) -> Result<Option<i32>> {
        let file = match entry_file(&self.paths.entry_dir(self.cfg, entry))? {
            Ok(file) => file,
            Err(violation) => bail!("entry {entry}: {violation}"),
        };
        let prefix = self.cfg.interpreters.command(file.interpreter());
        run_streaming(prefix, &file.path)
    }
}

/// Run the resolved entries and return the exit code for the launcher.
///
/// Entries run one at a time. The first non-zero exit stops the sequence and
/// becomes the result.
#[instrument(skip_all, fields(resolution = ?resolution))]
pub fn dispatch<R: EntryRunner>(
    resolution: &Resolution,
    entries: &[String],
    runner: &R,
) -> Result<i32> {
    let many = matches!(resolution, Resolution::All);
    for entry in resolution.targets(entries) {
        if many {
            eprintln!("==> {entry}");
        }
        let code = runner.run(entry)?.unwrap_or(SIGNALED);
        info!(entry, code, "entry exited");
        if code != 0 {
            return Ok(code);
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use anyhow::anyhow;

    struct FakeMatcher {
        ranked: Result<Vec<String>, String>,
    }

    impl ApproximateMatcher for FakeMatcher {
        fn rank(&self, _query: &str, _candidates: &[String]) -> Result<Vec<String>> {
            self.ranked.clone().map_err(|reason| anyhow!(reason))
        }
    }

    struct FakeRunner {
        codes: BTreeMap<String, Option<i32>>,
        ran: RefCell<Vec<String>>,
    }

    impl FakeRunner {
        fn new(codes: &[(&str, Option<i32>)]) -> Self {
            Self {
                codes: codes
                    .iter()
                    .map(|(name, code)| (name.to_string(), *code))
                    .collect(),
                ran: RefCell::new(Vec::new()),
            }
        }

        fn ran(&self) -> Vec<String> {
            self.ran.borrow().clone()
        }
    }

    impl EntryRunner for FakeRunner {
        fn run(&self, entry: &str) -> Result<Option<i32>> {
            self.ran.borrow_mut().push(entry.to_string());
            self.codes
                .get(entry)
                .copied()
                .ok_or_else(|| anyhow!("unknown entry {entry}"))
        }
    }

    fn entries() -> Vec<String> {
        vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()]
    }

    fn no_match() -> FakeMatcher {
        FakeMatcher { ranked: Ok(Vec::new()) }
    }

    #[test]
    fn empty_input_runs_all() {
        assert_eq!(resolve("  ", &entries(), &no_match()), Ok(Resolution::All));
    }

    #[test]
    fn exact_name_wins_without_matcher() {
        let matcher = FakeMatcher {
            ranked: Err("should not be called".to_string()),
        };
        assert_eq!(
            resolve("beta", &entries(), &matcher),
            Ok(Resolution::Exact("beta".to_string()))
        );
    }

    #[test]
    fn unknown_name_uses_top_candidate() {
        let matcher = FakeMatcher {
            ranked: Ok(vec!["gamma".to_string(), "alpha".to_string()]),
        };
        assert_eq!(
            resolve("gama", &entries(), &matcher),
            Ok(Resolution::Approximate {
                query: "gama".to_string(),
                entry: "gamma".to_string()
            })
        );
    }

    #[test]
    fn no_candidate_lists_available_entries() {
        let err = resolve("zzz", &entries(), &no_match()).expect_err("no match");
        assert_eq!(
            err.to_string(),
            "no entry matches 'zzz'; available entries: alpha, beta, gamma"
        );
    }

    #[test]
    fn matcher_failure_is_resolution_error() {
        let matcher = FakeMatcher {
            ranked: Err("index unavailable".to_string()),
        };
        let err = resolve("zzz", &entries(), &matcher).expect_err("matcher failed");
        assert!(matches!(err, ResolutionError::MatcherFailed { .. }));
        assert!(err.to_string().contains("index unavailable"));
        assert!(err.to_string().contains("alpha, beta, gamma"));
    }

    #[test]
    fn run_all_is_sequential_and_succeeds() {
        let runner = FakeRunner::new(&[("alpha", Some(0)), ("beta", Some(0)), ("gamma", Some(0))]);
        let code = dispatch(&Resolution::All, &entries(), &runner).expect("dispatch");
        assert_eq!(code, 0);
        assert_eq!(runner.ran(), entries());
    }

    #[test]
    fn run_all_stops_at_first_failure() {
        let runner = FakeRunner::new(&[("alpha", Some(0)), ("beta", Some(4)), ("gamma", Some(0))]);
        let code = dispatch(&Resolution::All, &entries(), &runner).expect("dispatch");
        assert_eq!(code, 4);
        assert_eq!(runner.ran(), vec!["alpha", "beta"]);
    }

    #[test]
    fn single_run_propagates_exit_code() {
        let runner = FakeRunner::new(&[("gamma", Some(9))]);
        let resolution = Resolution::Approximate {
            query: "gama".to_string(),
            entry: "gamma".to_string(),
        };
        let code = dispatch(&resolution, &entries(), &runner).expect("dispatch");
        assert_eq!(code, 9);
        assert_eq!(runner.ran(), vec!["gamma"]);
    }

    #[test]
    fn signal_termination_maps_to_failure() {
        let runner = FakeRunner::new(&[("alpha", None)]);
        let resolution = Resolution::Exact("alpha".to_string());
        let code = dispatch(&resolution, &entries(), &runner).expect("dispatch");
        assert_eq!(code, SIGNALED);
    }
}
