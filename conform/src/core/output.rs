//! Counting the target literal in captured stdout.

use crate::core::types::Violation;

/// Count non-overlapping occurrences of `needle` in `haystack`.
///
/// This is a plain substring scan, so regex metacharacters in `needle` have
/// no special meaning. An empty needle counts as zero occurrences.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

/// Fail unless `stdout` contains `target` exactly `expected` times.
pub fn verify_count(stdout: &str, target: &str, expected: usize) -> Result<(), Violation> {
    let actual = count_occurrences(stdout, target);
    if actual != expected {
        return Err(Violation::CountMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_non_overlapping() {
        assert_eq!(count_occurrences("aaaa", "aa"), 2);
        assert_eq!(count_occurrences("abab", "aba"), 1);
    }

    #[test]
    fn metacharacters_are_literal() {
        assert_eq!(count_occurrences("a.b axb a.b", "a.b"), 2);
        assert_eq!(count_occurrences("(x)* (x)*", "(x)*"), 2);
    }

    #[test]
    fn empty_needle_counts_zero() {
        assert_eq!(count_occurrences("anything", ""), 0);
    }

    #[test]
    fn exact_count_passes_and_off_by_one_fails() {
        let line = "Hello World\n";
        let expected = 1_000_000;
        assert_eq!(
            verify_count(&line.repeat(expected), "Hello World", expected),
            Ok(())
        );
        assert_eq!(
            verify_count(&line.repeat(expected - 1), "Hello World", expected),
            Err(Violation::CountMismatch {
                expected,
                actual: expected - 1
            })
        );
        assert_eq!(
            verify_count(&line.repeat(expected + 1), "Hello World", expected),
            Err(Violation::CountMismatch {
                expected,
                actual: expected + 1
            })
        );
    }
}
