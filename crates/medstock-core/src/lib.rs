//! MedStock Core Library
//!
//! Medication availability resolution against a local inventory.
//!
//! # Architecture
//!
//! ```text
//! Query ("tylenol", model?)
//!         │
//!         ▼
//!   Exact lookup ──── in stock ────────────────▶ AvailableLocally
//!         │ miss
//!         ▼
//!   Fuzzy match (whole catalog) ── names ──────▶ SimilarExistInStock
//!         │ none
//!         ▼
//!   Substitute suggester (LLM, ≤ 3 candidates)
//!         │
//!         ▼
//!   Exact lookup per candidate ── first hit ───▶ AlternativeAvailableLocally
//!         │ exhausted
//!         ▼
//!   NotAvailableAnywhere
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite inventory store
//! - [`models`]: Domain types (MedicationRecord, ResolutionQuery, ResolutionOutcome)
//! - [`resolver`]: Resolution pipeline and fuzzy matcher

pub mod db;
pub mod models;
pub mod resolver;

// Re-export commonly used types
pub use db::{Database, InventoryStore};
pub use models::{
    MedicationRecord, NewMedication, ResolutionOutcome, ResolutionQuery, ResolutionResponse,
    SUBSTITUTE_DISCLAIMER,
};
pub use resolver::{FuzzyMatcher, MatcherConfig, Resolver, ResolverError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use medstock_llm::{SubstituteSuggester, Suggester, SuggesterConfig};
use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MedStockError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl MedStockError {
    /// Stable error code for transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            MedStockError::InvalidInput(_) => "INVALID_INPUT",
            MedStockError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            MedStockError::DatabaseError(_) => "STORAGE_ERROR",
            MedStockError::NotFound(_) => "NOT_FOUND",
            MedStockError::Duplicate(_) => "DUPLICATE",
            MedStockError::SerializationError(_) => "SERIALIZATION_ERROR",
        }
    }
}

impl From<db::DbError> for MedStockError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(name) => MedStockError::NotFound(name),
            db::DbError::Duplicate(name) => MedStockError::Duplicate(name),
            db::DbError::Constraint(msg) => MedStockError::InvalidInput(msg),
            db::DbError::Sqlite(_) | db::DbError::LockPoisoned => {
                MedStockError::DatabaseError(e.to_string())
            }
        }
    }
}

impl From<ResolverError> for MedStockError {
    fn from(e: ResolverError) -> Self {
        match e {
            ResolverError::InvalidInput(msg) => MedStockError::InvalidInput(msg),
            ResolverError::ServiceUnavailable(inner) => {
                MedStockError::ServiceUnavailable(inner.to_string())
            }
            ResolverError::Database(inner) => inner.into(),
        }
    }
}

impl From<medstock_llm::ConfigError> for MedStockError {
    fn from(e: medstock_llm::ConfigError) -> Self {
        MedStockError::InvalidInput(e.to_string())
    }
}

impl From<medstock_llm::TransportError> for MedStockError {
    fn from(e: medstock_llm::TransportError) -> Self {
        MedStockError::ServiceUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for MedStockError {
    fn from(e: serde_json::Error) -> Self {
        MedStockError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for MedStockError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        MedStockError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(
    path: String,
    config: FfiSuggesterConfig,
) -> Result<Arc<MedStockCore>, MedStockError> {
    let db = Database::open(&path)?;
    Ok(MedStockCore::new(db, http_suggester(config)?))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory(
    config: FfiSuggesterConfig,
) -> Result<Arc<MedStockCore>, MedStockError> {
    let db = Database::open_in_memory()?;
    Ok(MedStockCore::new(db, http_suggester(config)?))
}

fn http_suggester(
    config: FfiSuggesterConfig,
) -> Result<Arc<dyn Suggester + Send + Sync>, MedStockError> {
    let config: SuggesterConfig = config.into();
    config.validate()?;
    Ok(Arc::new(SubstituteSuggester::http(config)?))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe inventory and resolver handle for FFI.
#[derive(uniffi::Object)]
pub struct MedStockCore {
    db: Arc<Mutex<Database>>,
    suggester: Arc<dyn Suggester + Send + Sync>,
    matcher: FuzzyMatcher,
}

impl std::fmt::Debug for MedStockCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MedStockCore").finish_non_exhaustive()
    }
}

impl MedStockCore {
    /// Wrap an open database and a suggester.
    pub fn new(db: Database, suggester: Arc<dyn Suggester + Send + Sync>) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            suggester,
            matcher: FuzzyMatcher::default(),
        })
    }

    fn resolve_response(
        &self,
        name: &str,
        model: Option<&str>,
    ) -> Result<ResolutionResponse, MedStockError> {
        let query = ResolutionQuery::new(name, model).map_err(MedStockError::InvalidInput)?;
        // Locks per lookup; nothing is held while the suggester runs.
        let resolver =
            Resolver::new(&*self.db, &*self.suggester).with_matcher(self.matcher.clone());
        let outcome = resolver.resolve(&query)?;
        Ok(outcome.to_response(query.name()))
    }
}

#[uniffi::export]
impl MedStockCore {
    // =========================================================================
    // Inventory Operations
    // =========================================================================

    /// Add a medication. Fails with `Duplicate` if the name already exists.
    pub fn add_medication(&self, item: FfiNewMedication) -> Result<FfiMedication, MedStockError> {
        let db = self.db.lock()?;
        let record = db.add_medication(item.into())?;
        Ok(record.into())
    }

    /// Get a medication by name (case-insensitive).
    pub fn get_medication(&self, name: String) -> Result<Option<FfiMedication>, MedStockError> {
        let db = self.db.lock()?;
        let record = db.get_medication(&name)?;
        Ok(record.map(|r| r.into()))
    }

    /// List all medications in insertion order.
    pub fn list_medications(&self) -> Result<Vec<FfiMedication>, MedStockError> {
        let db = self.db.lock()?;
        let records = db.list_medications()?;
        Ok(records.into_iter().map(|r| r.into()).collect())
    }

    /// Set the stock level of a medication.
    pub fn update_stock(
        &self,
        name: String,
        quantity_in_stock: u32,
    ) -> Result<FfiMedication, MedStockError> {
        let db = self.db.lock()?;
        let record = db.update_stock(&name, quantity_in_stock)?;
        Ok(record.into())
    }

    // =========================================================================
    // Resolver Operations
    // =========================================================================

    /// Resolve a medication name to an availability outcome.
    pub fn resolve_medication(
        &self,
        name: String,
        model: Option<String>,
    ) -> Result<FfiResolution, MedStockError> {
        let response = self.resolve_response(&name, model.as_deref())?;
        Ok(response.into())
    }

    /// Resolve a medication name and return the response body as JSON.
    pub fn resolve_medication_json(
        &self,
        name: String,
        model: Option<String>,
    ) -> Result<String, MedStockError> {
        let response = self.resolve_response(&name, model.as_deref())?;
        Ok(serde_json::to_string(&response)?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe medication record.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiMedication {
    pub name: String,
    pub quantity_in_stock: u32,
    pub price: f64,
    pub dosage_frequency: Option<String>,
    pub usage_instructions: Option<String>,
    pub food_warnings: Option<String>,
}

impl From<MedicationRecord> for FfiMedication {
    fn from(record: MedicationRecord) -> Self {
        Self {
            name: record.name,
            quantity_in_stock: record.quantity_in_stock,
            price: record.price,
            dosage_frequency: record.dosage_frequency,
            usage_instructions: record.usage_instructions,
            food_warnings: record.food_warnings,
        }
    }
}

/// FFI-safe input for adding a medication.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewMedication {
    pub name: String,
    pub quantity_in_stock: u32,
    pub price: f64,
    pub dosage_frequency: Option<String>,
    pub usage_instructions: Option<String>,
    pub food_warnings: Option<String>,
}

impl From<FfiNewMedication> for NewMedication {
    fn from(item: FfiNewMedication) -> Self {
        NewMedication {
            name: item.name,
            quantity_in_stock: item.quantity_in_stock,
            price: item.price,
            dosage_frequency: item.dosage_frequency,
            usage_instructions: item.usage_instructions,
            food_warnings: item.food_warnings,
        }
    }
}

/// FFI-safe resolution result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiResolution {
    /// One of: available, similar_found, alternative_available, not_available
    pub status: String,
    pub message: String,
    pub medication: Option<FfiMedication>,
    pub suggestions: Vec<String>,
    pub disclaimer: Option<String>,
    /// True when substitutes came from the fallback list
    pub degraded: bool,
}

impl From<ResolutionResponse> for FfiResolution {
    fn from(response: ResolutionResponse) -> Self {
        Self {
            status: response.status,
            message: response.message,
            medication: response.medication.map(|m| m.into()),
            suggestions: response.suggestions,
            disclaimer: response.disclaimer,
            degraded: response.degraded,
        }
    }
}

/// FFI-safe suggester configuration.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSuggesterConfig {
    pub api_key: String,
    pub base_url: String,
    pub default_model: String,
    pub allowed_models: Vec<String>,
    pub fallback_candidates: Option<Vec<String>>,
    pub timeout_secs: u64,
}

impl From<FfiSuggesterConfig> for SuggesterConfig {
    fn from(config: FfiSuggesterConfig) -> Self {
        SuggesterConfig {
            api_key: config.api_key,
            base_url: config.base_url,
            default_model: config.default_model,
            allowed_models: config.allowed_models,
            fallback_candidates: config.fallback_candidates,
            timeout_secs: config.timeout_secs,
        }
    }
}
