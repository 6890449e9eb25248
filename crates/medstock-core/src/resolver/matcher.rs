//! Fuzzy name matching over a catalog snapshot.
//!
//! Scores are dissimilarities in `[0.0, 1.0]` (0.0 = identical, case-insensitive).
//! A name is scored against the whole query, and, for queries of at least
//! [`MatcherConfig::min_window_len`] characters, against every same-length
//! window of the name so that a partial name ("amox") still finds the full one
//! ("Amoxicillin 500mg").

use serde::Deserialize;
use strsim::normalized_levenshtein;

use crate::models::MedicationRecord;

/// Default maximum dissimilarity accepted.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Default number of matches returned.
pub const DEFAULT_LIMIT: usize = 3;

/// Matcher tuning.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatcherConfig {
    /// Maximum dissimilarity for a name to count as a match
    pub threshold: f64,
    /// Maximum number of matches returned
    pub limit: usize,
    /// Shortest query that is also matched against name windows
    pub min_window_len: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            limit: DEFAULT_LIMIT,
            min_window_len: 3,
        }
    }
}

/// A catalog name with its dissimilarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub name: String,
    pub score: f64,
}

/// Approximate name matcher.
#[derive(Debug, Clone, Default)]
pub struct FuzzyMatcher {
    config: MatcherConfig,
}

impl FuzzyMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Rank `catalog` names against `query`.
    ///
    /// Single pass over the catalog; results ordered by ascending score, ties
    /// in catalog order, truncated to the configured limit. Stock levels are
    /// ignored.
    pub fn search(&self, query: &str, catalog: &[MedicationRecord]) -> Vec<FuzzyMatch> {
        let query = query.trim().to_lowercase();
        if query.is_empty() || self.config.limit == 0 {
            return Vec::new();
        }

        let mut matches: Vec<FuzzyMatch> = catalog
            .iter()
            .filter_map(|record| {
                let score = self.score(&query, &record.name.to_lowercase());
                (score <= self.config.threshold).then(|| FuzzyMatch {
                    name: record.name.clone(),
                    score,
                })
            })
            .collect();

        // Stable sort keeps catalog order for equal scores
        matches.sort_by(|a, b| a.score.total_cmp(&b.score));
        matches.truncate(self.config.limit);
        matches
    }

    /// Dissimilarity between a lowercase query and a lowercase name.
    fn score(&self, query: &str, name: &str) -> f64 {
        let full = 1.0 - normalized_levenshtein(query, name);

        let query_len = query.chars().count();
        let chars: Vec<char> = name.chars().collect();
        if query_len < self.config.min_window_len || query_len >= chars.len() {
            return full;
        }

        let window = chars
            .windows(query_len)
            .map(|w| {
                let candidate: String = w.iter().collect();
                1.0 - normalized_levenshtein(query, &candidate)
            })
            .fold(1.0, f64::min);

        full.min(window)
    }
}
