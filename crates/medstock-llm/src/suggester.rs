//! Substitute suggester: allow-list, one service call, fallback policy.

use log::{debug, warn};
use thiserror::Error;

use crate::config::SuggesterConfig;
use crate::prompts::{make_substitute_prompt, SYSTEM_PROMPT};
use crate::suggestion::Suggestions;
use crate::transport::{CompletionRequest, CompletionTransport, HttpTransport, TransportError};

/// Suggestion errors.
#[derive(Error, Debug)]
pub enum SuggestionError {
    /// The requested model is not allow-listed. No request was made.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// The suggestion service failed and the failure was not absorbed.
    #[error("Suggestion service error: {0}")]
    Service(#[from] TransportError),
}

impl SuggestionError {
    /// Whether the error was caused by the caller's input.
    pub fn is_input_error(&self) -> bool {
        matches!(self, SuggestionError::UnknownModel(_))
    }
}

pub type SuggestionResult<T> = Result<T, SuggestionError>;

/// Source of substitute candidates for a medication name.
pub trait Suggester {
    /// Suggest up to three alternatives for `medication`.
    ///
    /// `model` selects the service model; `None` or an empty string means the
    /// configured default.
    fn suggest(&self, medication: &str, model: Option<&str>) -> SuggestionResult<Suggestions>;
}

/// Suggester backed by a completion transport.
pub struct SubstituteSuggester<T: CompletionTransport> {
    transport: T,
    config: SuggesterConfig,
}

impl SubstituteSuggester<HttpTransport> {
    /// Create a suggester that calls the configured HTTP endpoint.
    pub fn http(config: SuggesterConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config.base_url, &config.api_key, config.timeout())?;
        Ok(Self::new(transport, config))
    }
}

impl<T: CompletionTransport> SubstituteSuggester<T> {
    pub fn new(transport: T, config: SuggesterConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &SuggesterConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Pick the model to use, rejecting anything outside the allow-list.
    fn select_model<'a>(&'a self, requested: Option<&'a str>) -> SuggestionResult<&'a str> {
        match requested.map(str::trim).filter(|m| !m.is_empty()) {
            None => Ok(&self.config.default_model),
            Some(model) if self.config.is_model_allowed(model) => Ok(model),
            Some(model) => Err(SuggestionError::UnknownModel(model.to_string())),
        }
    }
}

impl<T: CompletionTransport> Suggester for SubstituteSuggester<T> {
    fn suggest(&self, medication: &str, model: Option<&str>) -> SuggestionResult<Suggestions> {
        let model = self.select_model(model)?;

        let request = CompletionRequest {
            model: model.to_string(),
            system: SYSTEM_PROMPT.to_string(),
            prompt: make_substitute_prompt(medication),
        };

        match self.transport.complete(&request) {
            Ok(reply) => {
                let suggestions = Suggestions::from_reply(&reply);
                debug!(
                    "Suggestion service returned {} candidate(s) for {:?} using {}",
                    suggestions.candidates.len(),
                    medication,
                    model
                );
                Ok(suggestions)
            }
            Err(e) if e.is_transient() => match &self.config.fallback_candidates {
                Some(fallback) => {
                    warn!(
                        "Suggestion service unavailable for {:?} ({}); using {} fallback candidate(s)",
                        medication,
                        e,
                        fallback.len()
                    );
                    Ok(Suggestions::fallback(fallback))
                }
                None => Err(e.into()),
            },
            Err(e) => Err(e.into()),
        }
    }
}
