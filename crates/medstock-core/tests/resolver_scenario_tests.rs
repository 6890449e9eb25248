//! End-to-end resolver tests.
//!
//! These run the real pipeline and the real substitute suggester against an
//! in-memory inventory, with an instrumented store and a scripted transport
//! standing in for the suggestion service.

use std::cell::Cell;

use medstock_core::db::{Database, DbError, DbResult, InventoryStore};
use medstock_core::models::{MedicationRecord, NewMedication, ResolutionOutcome};
use medstock_core::resolver::{Resolver, ResolverError};
use medstock_llm::{
    CompletionRequest, CompletionTransport, SubstituteSuggester, SuggesterConfig, SuggestionSource,
    TransportError,
};

/// Store wrapper that counts calls per operation.
struct CountingStore {
    db: Database,
    exact_in_stock_calls: Cell<usize>,
    list_all_calls: Cell<usize>,
}

impl CountingStore {
    fn with(items: &[(&str, u32)]) -> Self {
        let db = Database::open_in_memory().unwrap();
        for (name, stock) in items {
            db.add_medication(NewMedication::new(*name, *stock, 3.0))
                .unwrap();
        }
        Self {
            db,
            exact_in_stock_calls: Cell::new(0),
            list_all_calls: Cell::new(0),
        }
    }
}

impl InventoryStore for CountingStore {
    fn find_exact_in_stock(&self, name: &str) -> DbResult<Option<MedicationRecord>> {
        self.exact_in_stock_calls
            .set(self.exact_in_stock_calls.get() + 1);
        self.db.find_exact_in_stock(name)
    }

    fn find_exact(&self, name: &str) -> DbResult<Option<MedicationRecord>> {
        self.db.find_exact(name)
    }

    fn list_all(&self) -> DbResult<Vec<MedicationRecord>> {
        self.list_all_calls.set(self.list_all_calls.get() + 1);
        self.db.list_all()
    }
}

/// Store whose backend is gone.
struct BrokenStore;

impl InventoryStore for BrokenStore {
    fn find_exact_in_stock(&self, _name: &str) -> DbResult<Option<MedicationRecord>> {
        Err(DbError::Sqlite(rusqlite::Error::InvalidQuery))
    }

    fn find_exact(&self, _name: &str) -> DbResult<Option<MedicationRecord>> {
        Err(DbError::Sqlite(rusqlite::Error::InvalidQuery))
    }

    fn list_all(&self) -> DbResult<Vec<MedicationRecord>> {
        Err(DbError::Sqlite(rusqlite::Error::InvalidQuery))
    }
}

/// Transport with a scripted reply that counts calls.
struct ScriptedTransport {
    reply: fn() -> Result<String, TransportError>,
    calls: Cell<usize>,
}

impl ScriptedTransport {
    fn new(reply: fn() -> Result<String, TransportError>) -> Self {
        Self {
            reply,
            calls: Cell::new(0),
        }
    }
}

impl CompletionTransport for ScriptedTransport {
    fn complete(&self, _request: &CompletionRequest) -> Result<String, TransportError> {
        self.calls.set(self.calls.get() + 1);
        (self.reply)()
    }
}

fn config() -> SuggesterConfig {
    SuggesterConfig {
        api_key: "sk-test".into(),
        default_model: "model-a".into(),
        allowed_models: vec!["model-a".into(), "model-b".into()],
        ..SuggesterConfig::default()
    }
}

fn suggester(
    reply: fn() -> Result<String, TransportError>,
) -> SubstituteSuggester<ScriptedTransport> {
    SubstituteSuggester::new(ScriptedTransport::new(reply), config())
}

fn calls(suggester: &SubstituteSuggester<ScriptedTransport>) -> usize {
    suggester.transport().calls.get()
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn scenario_a_exact_match_case_insensitive() {
    let store = CountingStore::with(&[("Paracetamol", 10)]);
    let suggester = suggester(|| Ok("Ibuprofen".into()));
    let resolver = Resolver::new(&store, &suggester);

    let outcome = resolver.resolve_name("paracetamol", None).unwrap();

    match outcome {
        ResolutionOutcome::AvailableLocally { medication } => {
            assert_eq!(medication.name, "Paracetamol");
            assert_eq!(medication.quantity_in_stock, 10);
        }
        other => panic!("expected AvailableLocally, got {:?}", other),
    }
    assert_eq!(store.list_all_calls.get(), 0);
    assert_eq!(calls(&suggester), 0);
}

#[test]
fn scenario_b_out_of_stock_name_reported_by_fuzzy_stage() {
    let store = CountingStore::with(&[("Paracetamol", 0)]);
    let suggester = suggester(|| Ok("Ibuprofen".into()));
    let resolver = Resolver::new(&store, &suggester);

    let outcome = resolver.resolve_name("Paracetamol", None).unwrap();

    assert_eq!(
        outcome,
        ResolutionOutcome::SimilarExistInStock {
            suggestions: vec!["Paracetamol".into()]
        }
    );
    assert_eq!(store.list_all_calls.get(), 1);
    assert_eq!(calls(&suggester), 0);
}

#[test]
fn scenario_c_substitute_in_stock() {
    let store = CountingStore::with(&[("Ibuprofen", 5)]);
    let suggester = suggester(|| Ok("Paracetamol, Ibuprofen".into()));
    let resolver = Resolver::new(&store, &suggester);

    let outcome = resolver.resolve_name("Tylenol", None).unwrap();

    match &outcome {
        ResolutionOutcome::AlternativeAvailableLocally {
            medication,
            disclaimer,
            source,
        } => {
            assert_eq!(medication.name, "Ibuprofen");
            assert_eq!(medication.quantity_in_stock, 5);
            assert_eq!(disclaimer, medstock_core::SUBSTITUTE_DISCLAIMER);
            assert_eq!(*source, SuggestionSource::Service);
        }
        other => panic!("expected AlternativeAvailableLocally, got {:?}", other),
    }
    // exact query + Paracetamol + Ibuprofen
    assert_eq!(store.exact_in_stock_calls.get(), 3);
    assert_eq!(calls(&suggester), 1);
}

#[test]
fn scenario_d_none_reply_on_empty_inventory() {
    let store = CountingStore::with(&[]);
    let suggester = suggester(|| Ok("none".into()));
    let resolver = Resolver::new(&store, &suggester);

    let outcome = resolver.resolve_name("Aspirin", None).unwrap();

    assert_eq!(
        outcome,
        ResolutionOutcome::not_available(vec![], SuggestionSource::Service)
    );
    assert_eq!(calls(&suggester), 1);
}

#[test]
fn scenario_e_non_transient_failure_is_service_error() {
    let store = CountingStore::with(&[]);
    let suggester = suggester(|| {
        Err(TransportError::Http {
            status: 403,
            message: "forbidden".into(),
        })
    });
    let resolver = Resolver::new(&store, &suggester);

    let err = resolver.resolve_name("Aspirin", None).unwrap_err();

    assert!(matches!(err, ResolverError::ServiceUnavailable(_)));
    assert_eq!(err.code(), "SERVICE_UNAVAILABLE");
}

// =========================================================================
// Properties
// =========================================================================

#[test]
fn exhausted_search_reports_at_most_three_candidates() {
    let store = CountingStore::with(&[("Zinc", 1)]);
    let suggester = suggester(|| Ok("Alpha, Beta, Gamma, Delta, Epsilon".into()));
    let resolver = Resolver::new(&store, &suggester);

    let outcome = resolver.resolve_name("Tylenol", None).unwrap();

    assert_eq!(outcome.status(), "not_available");
    assert_eq!(outcome.suggestions(), ["Alpha", "Beta", "Gamma"]);
}

#[test]
fn substitute_stage_inspects_at_most_three_candidates() {
    // The fourth candidate is in stock but must never be looked at
    let store = CountingStore::with(&[("Delta", 9)]);
    let suggester = suggester(|| Ok("Alpha, Beta, Gamma, Delta".into()));
    let resolver = Resolver::new(&store, &suggester);

    let outcome = resolver.resolve_name("Tylenol", None).unwrap();

    assert_eq!(outcome.status(), "not_available");
    assert_eq!(store.exact_in_stock_calls.get(), 1 + 3);
}

#[test]
fn substitute_stage_returns_first_in_stock_hit() {
    let store = CountingStore::with(&[("Ibuprofen", 5), ("Naproxen", 2)]);
    let suggester = suggester(|| Ok("Naproxen, Ibuprofen".into()));
    let resolver = Resolver::new(&store, &suggester);

    let outcome = resolver.resolve_name("Tylenol", None).unwrap();

    assert_eq!(outcome.medication().unwrap().name, "Naproxen");
    assert_eq!(store.exact_in_stock_calls.get(), 1 + 1);
}

#[test]
fn repeated_resolution_is_idempotent() {
    let store = CountingStore::with(&[("Ibuprofen", 5), ("Paracetamol", 0)]);
    let suggester = suggester(|| Ok("Aspirin, Ibuprofen".into()));
    let resolver = Resolver::new(&store, &suggester);

    for query in ["Ibuprofen", "paracetamol", "Tylenol", "Unobtainium"] {
        let first = resolver.resolve_name(query, None).unwrap();
        let second = resolver.resolve_name(query, None).unwrap();
        assert_eq!(first, second, "query {}", query);
    }
}

#[test]
fn unknown_model_rejected_without_external_call() {
    let store = CountingStore::with(&[]);
    let suggester = suggester(|| Ok("Ibuprofen".into()));
    let resolver = Resolver::new(&store, &suggester);

    let err = resolver
        .resolve_name("Tylenol", Some("not-allowed"))
        .unwrap_err();

    assert!(matches!(err, ResolverError::InvalidInput(_)));
    assert_eq!(calls(&suggester), 0);
}

#[test]
fn unknown_model_not_checked_when_earlier_stage_answers() {
    let store = CountingStore::with(&[("Paracetamol", 10)]);
    let suggester = suggester(|| Ok("Ibuprofen".into()));
    let resolver = Resolver::new(&store, &suggester);

    let outcome = resolver
        .resolve_name("Paracetamol", Some("not-allowed"))
        .unwrap();

    assert_eq!(outcome.status(), "available");
    assert_eq!(calls(&suggester), 0);
}

#[test]
fn allowed_model_is_used() {
    let store = CountingStore::with(&[("Ibuprofen", 5)]);
    let suggester = suggester(|| Ok("Ibuprofen".into()));
    let resolver = Resolver::new(&store, &suggester);

    let outcome = resolver.resolve_name("Tylenol", Some("model-b")).unwrap();

    assert_eq!(outcome.status(), "alternative_available");
    assert_eq!(calls(&suggester), 1);
}

#[test]
fn transient_failure_degrades_to_fallback() {
    let store = CountingStore::with(&[("Ibuprofen", 5)]);
    let mut cfg = config();
    cfg.fallback_candidates = Some(vec!["Paracetamol".into(), "Ibuprofen".into()]);
    let suggester = SubstituteSuggester::new(
        ScriptedTransport::new(|| Err(TransportError::RateLimited)),
        cfg,
    );
    let resolver = Resolver::new(&store, &suggester);

    let outcome = resolver.resolve_name("Tylenol", None).unwrap();

    assert_eq!(outcome.medication().unwrap().name, "Ibuprofen");
    assert!(outcome.is_degraded());
    assert!(outcome.to_response("Tylenol").degraded);
}

#[test]
fn transient_failure_without_fallback_is_service_error() {
    let store = CountingStore::with(&[]);
    let suggester = suggester(|| Err(TransportError::Timeout));
    let resolver = Resolver::new(&store, &suggester);

    let err = resolver.resolve_name("Tylenol", None).unwrap_err();
    assert!(matches!(err, ResolverError::ServiceUnavailable(_)));
}

#[test]
fn storage_failure_propagates() {
    let suggester = suggester(|| Ok("Ibuprofen".into()));
    let resolver = Resolver::new(&BrokenStore, &suggester);

    let err = resolver.resolve_name("Tylenol", None).unwrap_err();

    assert!(matches!(err, ResolverError::Database(DbError::Sqlite(_))));
    assert_eq!(err.code(), "STORAGE_ERROR");
    assert_eq!(calls(&suggester), 0);
}

#[test]
fn empty_inventory_still_consults_suggester() {
    let store = CountingStore::with(&[]);
    let suggester = suggester(|| Ok("Ibuprofen".into()));
    let resolver = Resolver::new(&store, &suggester);

    let outcome = resolver.resolve_name("Tylenol", None).unwrap();

    assert_eq!(
        outcome,
        ResolutionOutcome::not_available(vec!["Ibuprofen".into()], SuggestionSource::Service)
    );
    assert_eq!(store.list_all_calls.get(), 1);
    assert_eq!(calls(&suggester), 1);
}
