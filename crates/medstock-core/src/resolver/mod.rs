//! Availability resolver for medication queries.
//!
//! Pipeline: Exact lookup → Fuzzy match → Substitute suggestion → Exact lookup per substitute
//!
//! Each stage only runs when every earlier stage came back empty, and the
//! first positive stage decides the [`ResolutionOutcome`]. Misses are data,
//! not errors: only bad input, an unavailable suggestion service, or a
//! storage failure produce a [`ResolverError`].

mod matcher;

pub use matcher::*;

use log::{debug, info, warn};
use medstock_llm::{SuggestionError, Suggester, MAX_CANDIDATES};
use thiserror::Error;

use crate::db::{DbError, InventoryStore};
use crate::models::{ResolutionOutcome, ResolutionQuery};

/// Resolver errors.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Suggestion service unavailable: {0}")]
    ServiceUnavailable(SuggestionError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<SuggestionError> for ResolverError {
    fn from(e: SuggestionError) -> Self {
        if e.is_input_error() {
            ResolverError::InvalidInput(e.to_string())
        } else {
            ResolverError::ServiceUnavailable(e)
        }
    }
}

impl ResolverError {
    /// Stable error code for transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            ResolverError::InvalidInput(_) => "INVALID_INPUT",
            ResolverError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ResolverError::Database(_) => "STORAGE_ERROR",
        }
    }
}

pub type ResolverResult<T> = Result<T, ResolverError>;

/// Main resolver that coordinates the full pipeline.
pub struct Resolver<'a> {
    store: &'a dyn InventoryStore,
    suggester: &'a dyn Suggester,
    matcher: FuzzyMatcher,
}

impl<'a> Resolver<'a> {
    /// Create a new resolver with the default matcher.
    pub fn new(store: &'a dyn InventoryStore, suggester: &'a dyn Suggester) -> Self {
        Self {
            store,
            suggester,
            matcher: FuzzyMatcher::default(),
        }
    }

    /// Replace the fuzzy matcher.
    pub fn with_matcher(mut self, matcher: FuzzyMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Build a query from raw input and resolve it.
    pub fn resolve_name(&self, name: &str, model: Option<&str>) -> ResolverResult<ResolutionOutcome> {
        let query = ResolutionQuery::new(name, model).map_err(ResolverError::InvalidInput)?;
        self.resolve(&query)
    }

    /// Resolve a query to exactly one outcome.
    pub fn resolve(&self, query: &ResolutionQuery) -> ResolverResult<ResolutionOutcome> {
        let outcome = match self.exact_stage(query)? {
            Some(outcome) => outcome,
            None => match self.fuzzy_stage(query)? {
                Some(outcome) => outcome,
                None => self.substitute_stage(query)?,
            },
        };

        info!("Resolved {:?} as {}", query.name(), outcome.status());
        Ok(outcome)
    }

    /// Step 1: case-insensitive exact match with stock on hand.
    fn exact_stage(&self, query: &ResolutionQuery) -> ResolverResult<Option<ResolutionOutcome>> {
        let hit = self.store.find_exact_in_stock(query.name())?;
        debug!("Exact stage for {:?}: hit={}", query.name(), hit.is_some());
        Ok(hit.map(|medication| ResolutionOutcome::AvailableLocally { medication }))
    }

    /// Step 2: similar names anywhere in the catalog, regardless of stock.
    fn fuzzy_stage(&self, query: &ResolutionQuery) -> ResolverResult<Option<ResolutionOutcome>> {
        let catalog = self.store.list_all()?;
        let matches = self.matcher.search(query.name(), &catalog);
        debug!(
            "Fuzzy stage for {:?}: {} match(es) in {} record(s)",
            query.name(),
            matches.len(),
            catalog.len()
        );

        if matches.is_empty() {
            return Ok(None);
        }

        let suggestions = matches.into_iter().map(|m| m.name).collect();
        Ok(Some(ResolutionOutcome::SimilarExistInStock { suggestions }))
    }

    /// Step 3: ask for substitutes and take the first one in stock.
    fn substitute_stage(&self, query: &ResolutionQuery) -> ResolverResult<ResolutionOutcome> {
        let mut suggestions = self.suggester.suggest(query.name(), query.model())?;
        suggestions.candidates.truncate(MAX_CANDIDATES);

        if suggestions.source.is_degraded() {
            warn!(
                "Substitute stage for {:?} is using fallback candidates",
                query.name()
            );
        }
        debug!(
            "Substitute stage for {:?}: candidates={:?}",
            query.name(),
            suggestions.candidates
        );

        for candidate in &suggestions.candidates {
            if let Some(medication) = self.store.find_exact_in_stock(candidate)? {
                return Ok(ResolutionOutcome::alternative(medication, suggestions.source));
            }
        }

        Ok(ResolutionOutcome::not_available(
            suggestions.candidates,
            suggestions.source,
        ))
    }
}
