//! Shared deterministic types for the conformance checks.
//!
//! These types are the contract between the pure rule checks, the process
//! runner and the report. They never touch the filesystem.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rule violation found while validating one entry.
///
/// Violations are per-entry outcomes, not plumbing failures: an entry that
/// produces one is reported and validation moves on to the next entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// The entry directory does not hold exactly one recognized script.
    #[error("structural error: {reason}")]
    Structural { reason: String },
    /// The script is larger than the configured byte ceiling.
    #[error("file is {size} bytes, limit is {limit}")]
    SizeExceeded { size: u64, limit: u64 },
    /// A loop keyword or iteration method survived comment stripping.
    #[error("banned construct `{construct}`")]
    BannedConstruct { construct: String },
    /// A function calls itself by name inside its own body.
    #[error("function `{function}` calls itself")]
    SelfRecursion { function: String },
    /// The interpreter exited non-zero (or never exited in time).
    #[error("execution failed (exit code {}): {}", display_code(.code), .stderr.trim())]
    ExecutionFailed { code: Option<i32>, stderr: String },
    /// The target literal was printed the wrong number of times.
    #[error("expected {expected} occurrences, found {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

impl Violation {
    pub fn structural(reason: impl Into<String>) -> Self {
        Violation::Structural {
            reason: reason.into(),
        }
    }

    /// The rule this violation belongs to.
    pub fn rule(&self) -> Rule {
        match self {
            Violation::Structural { .. } => Rule::Structure,
            Violation::SizeExceeded { .. } => Rule::Size,
            Violation::BannedConstruct { .. } => Rule::BannedConstructs,
            Violation::SelfRecursion { .. } => Rule::SelfRecursion,
            Violation::ExecutionFailed { .. } => Rule::Execution,
            Violation::CountMismatch { .. } => Rule::OutputCount,
        }
    }
}

/// Checks applied to an entry, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Structure,
    Size,
    BannedConstructs,
    SelfRecursion,
    Execution,
    OutputCount,
}

impl Rule {
    pub fn as_str(self) -> &'static str {
        match self {
            Rule::Structure => "structure",
            Rule::Size => "size",
            Rule::BannedConstructs => "banned_constructs",
            Rule::SelfRecursion => "self_recursion",
            Rule::Execution => "execution",
            Rule::OutputCount => "output_count",
        }
    }
}

/// Pass/fail outcome of one rule for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule: Rule,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RuleResult {
    pub fn pass(rule: Rule) -> Self {
        Self {
            rule,
            passed: true,
            message: None,
        }
    }

    pub fn fail(violation: &Violation) -> Self {
        Self {
            rule: violation.rule(),
            passed: false,
            message: Some(violation.to_string()),
        }
    }

    /// Build a result for `rule` from a check outcome.
    pub fn from_check(rule: Rule, outcome: Result<(), Violation>) -> Self {
        match outcome {
            Ok(()) => Self::pass(rule),
            Err(violation) => Self::fail(&violation),
        }
    }
}

/// Interpreter family used to execute an entry file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpreter {
    /// Plain JavaScript (`.js`, `.cjs`, `.mjs`).
    Node,
    /// TypeScript executed with ES module loader semantics.
    TypeScript,
    CoffeeScript,
}

impl Interpreter {
    /// Select the interpreter from the entry file name.
    pub fn for_file_name(file_name: &str) -> Self {
        if file_name.ends_with(".ts") {
            Interpreter::TypeScript
        } else if file_name.ends_with(".coffee") {
            Interpreter::CoffeeScript
        } else {
            Interpreter::Node
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpreter_follows_extension() {
        assert_eq!(Interpreter::for_file_name("main.ts"), Interpreter::TypeScript);
        assert_eq!(
            Interpreter::for_file_name("main.coffee"),
            Interpreter::CoffeeScript
        );
        for name in ["main.js", "main.cjs", "main.mjs"] {
            assert_eq!(Interpreter::for_file_name(name), Interpreter::Node);
        }
    }

    #[test]
    fn violation_maps_to_rule() {
        let violation = Violation::CountMismatch {
            expected: 3,
            actual: 2,
        };
        let result = RuleResult::fail(&violation);
        assert_eq!(result.rule, Rule::OutputCount);
        assert!(!result.passed);
        assert_eq!(
            result.message.as_deref(),
            Some("expected 3 occurrences, found 2")
        );
    }

    #[test]
    fn execution_failure_message_includes_stderr() {
        let violation = Violation::ExecutionFailed {
            code: Some(1),
            stderr: "ReferenceError: x is not defined\n".to_string(),
        };
        assert_eq!(
            violation.to_string(),
            "execution failed (exit code 1): ReferenceError: x is not defined"
        );
    }

    #[test]
    fn rule_serializes_snake_case() {
        let json = serde_json::to_string(&RuleResult::pass(Rule::BannedConstructs)).expect("json");
        assert_eq!(json, r#"{"rule":"banned_constructs","passed":true}"#);
    }
}
