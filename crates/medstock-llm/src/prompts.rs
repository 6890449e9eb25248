//! Prompts for substitute suggestion.

use crate::suggestion::MAX_CANDIDATES;

/// System prompt for substitute suggestion.
pub const SYSTEM_PROMPT: &str = r#"You are a pharmacy assistant that names alternative medications.

Rules:
- Answer with medication names only, separated by commas.
- Prefer generic names that a pharmacy is likely to stock.
- Do not add dosages, explanations, numbering or punctuation other than commas.
- If you do not know any alternative, answer with the single word: none"#;

/// User prompt asking for alternatives to `medication`.
pub fn make_substitute_prompt(medication: &str) -> String {
    format!(
        r#"List up to {} alternative medications that could be used instead of "{}".
Reply with a comma-separated list of names, or "none" if there is no suitable alternative."#,
        MAX_CANDIDATES, medication
    )
}
