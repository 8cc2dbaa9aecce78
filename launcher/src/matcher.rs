//! Approximate entry-name matching for mistyped names.

use anyhow::Result;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Ranks known entry names against a typed name.
pub trait ApproximateMatcher {
    /// Candidates matching `query`, best first. Empty when nothing is close.
    fn rank(&self, query: &str, candidates: &[String]) -> Result<Vec<String>>;
}

/// Skim-style subsequence scoring, falling back to edit distance.
///
/// Subsequence hits (a dropped letter, an abbreviation) rank first by skim
/// score. Candidates that are not subsequence hits follow when they are
/// within a small Levenshtein distance of the query, which catches
/// substituted or transposed letters.
#[derive(Default)]
pub struct SkimMatcher {
    inner: SkimMatcherV2,
}

impl SkimMatcher {
    /// Largest edit distance still treated as a typo of `query`.
    fn max_typo_distance(query: &str) -> usize {
        (query.chars().count() / 3).max(1)
    }
}

impl ApproximateMatcher for SkimMatcher {
    fn rank(&self, query: &str, candidates: &[String]) -> Result<Vec<String>> {
        let mut scored: Vec<(i64, &String)> = Vec::new();
        let mut typos: Vec<(usize, &String)> = Vec::new();
        let max_distance = Self::max_typo_distance(query);

        for candidate in candidates {
            if let Some(score) = self.inner.fuzzy_match(candidate, query) {
                scored.push((score, candidate));
                continue;
            }
            let distance = strsim::levenshtein(&query.to_lowercase(), &candidate.to_lowercase());
            if distance <= max_distance {
                typos.push((distance, candidate));
            }
        }

        scored.sort_by(|left, right| right.0.cmp(&left.0).then_with(|| left.1.cmp(right.1)));
        typos.sort();
        Ok(scored
            .into_iter()
            .map(|(_, candidate)| candidate.clone())
            .chain(typos.into_iter().map(|(_, candidate)| candidate.clone()))
            .collect())
    }
}
