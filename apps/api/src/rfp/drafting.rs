//! Draft Synthesizer: renders a templated first-draft answer for one requirement,
//! citing up to two matching snippets from the user's answer library.
//!
//! No LLM and no scoring: a snippet is relevant when any significant requirement
//! word occurs in its title or tags, and the first relevant snippets in library
//! order win. Output is a pure function of (requirement, library).

use serde::{Deserialize, Serialize};

/// Requirement words of this length or shorter are ignored as noise.
const MIN_TOKEN_CHARS: usize = 4;
/// Snippets quoted in one draft.
pub const MAX_SUPPORTING_SNIPPETS: usize = 2;

pub const FALLBACK_CAPABILITY: &str =
    "- Existing standard capability statement available on request.";

/// A reusable answer fragment from the user's library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSnippet {
    pub title: String,
    pub body: String,
    /// Free-form, usually comma separated.
    pub tags: String,
}

fn significant_tokens(requirement: &str) -> Vec<String> {
    requirement
        .to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

fn is_relevant(snippet: &AnswerSnippet, tokens: &[String]) -> bool {
    let haystack = format!("{} {}", snippet.title, snippet.tags).to_lowercase();
    tokens.iter().any(|token| haystack.contains(token.as_str()))
}

/// The first `MAX_SUPPORTING_SNIPPETS` snippets relevant to `requirement`, in library order.
pub fn select_supporting_snippets<'a>(
    requirement: &str,
    library: &'a [AnswerSnippet],
) -> Vec<&'a AnswerSnippet> {
    let tokens = significant_tokens(requirement);
    library
        .iter()
        .filter(|snippet| is_relevant(snippet, &tokens))
        .take(MAX_SUPPORTING_SNIPPETS)
        .collect()
}

/// Renders the draft answer for `requirement`.
pub fn synthesize_draft(requirement: &str, library: &[AnswerSnippet]) -> String {
    let supporting = select_supporting_snippets(requirement, library);

    let capabilities = if supporting.is_empty() {
        FALLBACK_CAPABILITY.to_string()
    } else {
        supporting
            .iter()
            .map(|s| format!("- {}: {}", s.title, s.body))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "We acknowledge the requirement: \"{requirement}\".\n\n\
         Proposed response:\n\
         Our team will satisfy this requirement through a structured delivery plan, clear ownership, and measurable outcomes.\n\n\
         Supporting capabilities:\n\
         {capabilities}\n\n\
         Assumptions:\n\
         - Final scope confirmation during kickoff\n\
         - Access to stakeholder SMEs within 5 business days\n\n\
         This draft should be tailored with project-specific metrics before submission."
    )
}
