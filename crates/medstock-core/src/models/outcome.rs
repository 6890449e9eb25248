//! Resolution query and outcome models.

use medstock_llm::SuggestionSource;
use serde::Serialize;

use super::MedicationRecord;

/// Advisory attached to every result that involved suggested substitutes.
pub const SUBSTITUTE_DISCLAIMER: &str = "Alternatives are suggested automatically and are not medical advice. \
Consult a pharmacist or physician before substituting any medication.";

/// Input to the resolution pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionQuery {
    name: String,
    model: Option<String>,
}

impl ResolutionQuery {
    /// Build a query. The name is trimmed and must not be empty; a blank
    /// model means "use the default".
    pub fn new(name: &str, model: Option<&str>) -> Result<Self, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("medication name cannot be empty".into());
        }
        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        Ok(Self {
            name: name.to_string(),
            model,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

/// Result of resolving a query. Exactly one variant per query, in stage order.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    /// Exact name match with stock on hand
    AvailableLocally { medication: MedicationRecord },
    /// Similar names exist in the catalog (stock not considered)
    SimilarExistInStock { suggestions: Vec<String> },
    /// A suggested substitute is in stock
    AlternativeAvailableLocally {
        medication: MedicationRecord,
        disclaimer: String,
        source: SuggestionSource,
    },
    /// Nothing in stock, including every suggested substitute
    NotAvailableAnywhere {
        suggestions: Vec<String>,
        disclaimer: String,
        source: SuggestionSource,
    },
}

impl ResolutionOutcome {
    pub fn alternative(medication: MedicationRecord, source: SuggestionSource) -> Self {
        ResolutionOutcome::AlternativeAvailableLocally {
            medication,
            disclaimer: SUBSTITUTE_DISCLAIMER.to_string(),
            source,
        }
    }

    pub fn not_available(suggestions: Vec<String>, source: SuggestionSource) -> Self {
        ResolutionOutcome::NotAvailableAnywhere {
            suggestions,
            disclaimer: SUBSTITUTE_DISCLAIMER.to_string(),
            source,
        }
    }

    /// Stable status label for transport layers.
    pub fn status(&self) -> &'static str {
        match self {
            ResolutionOutcome::AvailableLocally { .. } => "available",
            ResolutionOutcome::SimilarExistInStock { .. } => "similar_found",
            ResolutionOutcome::AlternativeAvailableLocally { .. } => "alternative_available",
            ResolutionOutcome::NotAvailableAnywhere { .. } => "not_available",
        }
    }

    /// Human-readable message for `query_name`.
    pub fn message(&self, query_name: &str) -> String {
        match self {
            ResolutionOutcome::AvailableLocally { medication } => {
                format!("{} is available in stock", medication.name)
            }
            ResolutionOutcome::SimilarExistInStock { suggestions } => format!(
                "{} was not found. Similar medications: {}",
                query_name,
                suggestions.join(", ")
            ),
            ResolutionOutcome::AlternativeAvailableLocally { medication, .. } => format!(
                "{} is not available, but the alternative {} is in stock",
                query_name, medication.name
            ),
            ResolutionOutcome::NotAvailableAnywhere { suggestions, .. } if suggestions.is_empty() => {
                format!("{} is not available and no alternatives were found", query_name)
            }
            ResolutionOutcome::NotAvailableAnywhere { suggestions, .. } => format!(
                "{} is not available. Suggested alternatives not in stock: {}",
                query_name,
                suggestions.join(", ")
            ),
        }
    }

    pub fn medication(&self) -> Option<&MedicationRecord> {
        match self {
            ResolutionOutcome::AvailableLocally { medication }
            | ResolutionOutcome::AlternativeAvailableLocally { medication, .. } => Some(medication),
            _ => None,
        }
    }

    pub fn suggestions(&self) -> &[String] {
        match self {
            ResolutionOutcome::SimilarExistInStock { suggestions }
            | ResolutionOutcome::NotAvailableAnywhere { suggestions, .. } => suggestions.as_slice(),
            _ => &[],
        }
    }

    pub fn disclaimer(&self) -> Option<&str> {
        match self {
            ResolutionOutcome::AlternativeAvailableLocally { disclaimer, .. }
            | ResolutionOutcome::NotAvailableAnywhere { disclaimer, .. } => Some(disclaimer.as_str()),
            _ => None,
        }
    }

    /// Whether substitute candidates came from the fallback list.
    pub fn is_degraded(&self) -> bool {
        match self {
            ResolutionOutcome::AlternativeAvailableLocally { source, .. }
            | ResolutionOutcome::NotAvailableAnywhere { source, .. } => source.is_degraded(),
            _ => false,
        }
    }

    /// Flatten into a response body for `query_name`.
    pub fn to_response(&self, query_name: &str) -> ResolutionResponse {
        ResolutionResponse {
            status: self.status().to_string(),
            message: self.message(query_name),
            medication: self.medication().cloned(),
            suggestions: self.suggestions().to_vec(),
            disclaimer: self.disclaimer().map(str::to_string),
            degraded: self.is_degraded(),
        }
    }
}

/// JSON-ready response body for a resolution.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolutionResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication: Option<MedicationRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
    pub degraded: bool,
}
