//! Decoding model replies into domain types.

use serde::Deserialize;

use vlogbook_core::model::{
    GeneratedContent, GrammarItem, SelectionAnalysis, SelectionKind, VocabularyItem,
};

use crate::error::ProviderError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptPayload {
    spanish_text: String,
    #[serde(default)]
    vocabulary: Vec<VocabularyItem>,
    #[serde(default)]
    grammar: Vec<GrammarItem>,
}

/// Strip a surrounding markdown code fence, if the model added one despite
/// being asked for raw JSON.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parse a full script reply.
pub fn parse_script(text: &str) -> Result<GeneratedContent, ProviderError> {
    let json = strip_code_fence(text);
    if json.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    let payload: ScriptPayload = serde_json::from_str(json)
        .map_err(|e| ProviderError::MalformedResponse(format!("script: {e}")))?;
    if payload.spanish_text.trim().is_empty() {
        return Err(ProviderError::MalformedResponse(
            "script: spanishText is empty".into(),
        ));
    }

    Ok(GeneratedContent {
        target_text: payload.spanish_text,
        vocabulary: payload.vocabulary,
        grammar: payload.grammar,
    })
}

/// Parse a selection-analysis reply of the requested kind.
pub fn parse_selection(text: &str, kind: SelectionKind) -> Result<SelectionAnalysis, ProviderError> {
    let json = strip_code_fence(text);
    if json.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    let malformed = |e: serde_json::Error| ProviderError::MalformedResponse(format!("{kind}: {e}"));
    match kind {
        SelectionKind::Vocab => serde_json::from_str::<VocabularyItem>(json)
            .map(SelectionAnalysis::Vocabulary)
            .map_err(malformed),
        SelectionKind::Grammar => serde_json::from_str::<GrammarItem>(json)
            .map(SelectionAnalysis::Grammar)
            .map_err(malformed),
    }
}
