//! Parsing of suggestion replies into candidate names.

use serde::{Deserialize, Serialize};

/// Maximum number of substitute candidates considered per query.
pub const MAX_CANDIDATES: usize = 3;

/// Reply token meaning "no alternative known".
pub const NONE_TOKEN: &str = "none";

/// Where a candidate list came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    /// Parsed from a reply of the suggestion service
    Service,
    /// Taken from the configured fallback list after a transient failure
    Fallback,
}

impl SuggestionSource {
    pub fn is_degraded(&self) -> bool {
        matches!(self, SuggestionSource::Fallback)
    }
}

/// Ordered substitute candidates (at most [`MAX_CANDIDATES`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Suggestions {
    pub candidates: Vec<String>,
    pub source: SuggestionSource,
}

impl Suggestions {
    /// Candidates parsed from a genuine service reply.
    pub fn from_reply(reply: &str) -> Self {
        Self {
            candidates: parse_reply(reply),
            source: SuggestionSource::Service,
        }
    }

    /// Candidates from the fallback list.
    pub fn fallback(names: &[String]) -> Self {
        Self {
            candidates: clean_candidates(names.iter().map(String::as_str)),
            source: SuggestionSource::Fallback,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Parse a free-text reply into at most [`MAX_CANDIDATES`] names.
///
/// Names are separated by commas (newlines are accepted as well), trimmed,
/// and empty tokens dropped. A reply of `none` in any case means no
/// candidates.
pub fn parse_reply(reply: &str) -> Vec<String> {
    let trimmed = reply.trim().trim_end_matches('.').trim();
    if trimmed.eq_ignore_ascii_case(NONE_TOKEN) {
        return Vec::new();
    }

    clean_candidates(trimmed.split([',', '\n']))
}

fn clean_candidates<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<String> {
    tokens
        .map(|t| t.trim().trim_end_matches('.').trim())
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case(NONE_TOKEN))
        .take(MAX_CANDIDATES)
        .map(str::to_string)
        .collect()
}
