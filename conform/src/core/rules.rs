//! Static rule checks over entry source text.
//!
//! Each check is independent: one failing never hides another, and all of
//! them work on raw text rather than a syntax tree. False positives inside
//! string literals and missed mutual recursion are accepted limitations.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::source::{
    body_open, brace_depth_at, matching_close, statement_end, strip_comments,
};
use crate::core::types::{Rule, RuleResult, Violation};

/// Banned constructs in reporting order, with the pattern that finds them.
static BANNED_CONSTRUCTS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("for (", r"\bfor\s*\("),
        ("while (", r"\bwhile\s*\("),
        (".forEach(", r"\.\s*forEach\s*\("),
    ]
    .into_iter()
    .map(|(label, pattern)| (label, compile(pattern)))
    .collect()
});

static FUNCTION_DECL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\bfunction\b\s*\*?\s*([A-Za-z_$][\w$]*)\s*(?:<[^<>()]*>\s*)?\("));

static ARROW_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?",
        r"(?:<[^<>()]*>\s*)?",
        r"(?:\([^()]*\)(?:\s*:[^;=]+?)?|[A-Za-z_$][\w$]*)\s*=>",
    ))
});

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static rule pattern compiles")
}

/// A function definition found in the source: its name and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition<'a> {
    /// Byte offset of the definition keyword.
    pub start: usize,
    pub name: &'a str,
    pub body: &'a str,
}

/// Fail when the file is larger than `limit` bytes. Exactly `limit` passes.
pub fn check_size(size: u64, limit: u64) -> Result<(), Violation> {
    if size > limit {
        return Err(Violation::SizeExceeded { size, limit });
    }
    Ok(())
}

/// Fail when a loop keyword or `.forEach(` call remains after stripping comments.
pub fn check_banned_constructs(source: &str) -> Result<(), Violation> {
    let code = strip_comments(source);
    for (label, pattern) in &*BANNED_CONSTRUCTS {
        if pattern.is_match(&code) {
            return Err(Violation::BannedConstruct {
                construct: (*label).to_string(),
            });
        }
    }
    Ok(())
}

/// Fail when a top-level function calls itself by name inside its own body.
pub fn check_self_recursion(source: &str) -> Result<(), Violation> {
    let code = strip_comments(source);
    for definition in top_level_definitions(&code) {
        if calls_itself(&definition) {
            return Err(Violation::SelfRecursion {
                function: definition.name.to_string(),
            });
        }
    }
    Ok(())
}

/// Run every static check and report each outcome, in pipeline order.
///
/// Size is measured on the raw bytes. The text checks see the bytes decoded
/// lossily, so a file that is not valid UTF-8 still gets every check.
pub fn run_static_checks(source: &[u8], size_limit: u64) -> Vec<RuleResult> {
    let text = String::from_utf8_lossy(source);
    vec![
        RuleResult::from_check(Rule::Size, check_size(source.len() as u64, size_limit)),
        RuleResult::from_check(Rule::BannedConstructs, check_banned_constructs(&text)),
        RuleResult::from_check(Rule::SelfRecursion, check_self_recursion(&text)),
    ]
}

/// Function declarations and arrow-function bindings at brace depth zero.
///
/// Declaration bodies are brace-balanced. Arrow bodies are brace-balanced for
/// block bodies and otherwise run to the end of the statement.
pub fn top_level_definitions(code: &str) -> Vec<Definition<'_>> {
    let mut definitions = Vec::new();

    for captures in FUNCTION_DECL.captures_iter(code) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if brace_depth_at(code, whole.start()) != 0 {
            continue;
        }
        let params_open = whole.end() - 1;
        let Some(params_close) = matching_close(code, params_open) else {
            continue;
        };
        let Some(body) = block_after(code, params_close + 1) else {
            continue;
        };
        definitions.push(Definition {
            start: whole.start(),
            name: name.as_str(),
            body,
        });
    }

    for captures in ARROW_BINDING.captures_iter(code) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if brace_depth_at(code, whole.start()) != 0 {
            continue;
        }
        let body = block_after(code, whole.end()).unwrap_or_else(|| {
            let start = whole.end();
            &code[start..statement_end(code, start)]
        });
        definitions.push(Definition {
            start: whole.start(),
            name: name.as_str(),
            body,
        });
    }

    definitions.sort_by_key(|definition| definition.start);
    definitions
}

/// The `{ ... }` body starting after `from`, past any return type annotation.
fn block_after(code: &str, from: usize) -> Option<&str> {
    let open = body_open(code, from)?;
    let close = matching_close(code, open)?;
    Some(&code[open..=close])
}

fn calls_itself(definition: &Definition<'_>) -> bool {
    let pattern = format!(r"(?:^|[^\w$.]){}\s*\(", regex::escape(definition.name));
    match Regex::new(&pattern) {
        Ok(call) => call.is_match(definition.body),
        Err(_) => false,
    }
}
