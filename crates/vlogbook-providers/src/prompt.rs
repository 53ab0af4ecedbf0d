//! Prompt and response-schema construction for the content generator.
//!
//! Every request asks for JSON matching a schema so the reply can be
//! deserialized directly. Meanings and explanations are requested in
//! Chinese, the learner's language.

use serde_json::{json, Value};

use vlogbook_core::model::SelectionKind;

/// System instruction shared by all content requests.
pub const SYSTEM_INSTRUCTION: &str = "\
You are a Spanish tutor for native Chinese speakers.
Write natural, spoken-style Spanish suitable for a short personal vlog.
Explain vocabulary and grammar in simplified Chinese.
Reply with JSON only.";

/// Prompt for translating a Chinese note into a Spanish vlog script.
pub fn script_prompt(source_text: &str) -> String {
    format!(
        "Turn the following Chinese note into a short Spanish vlog script, as if the \
         learner were telling it to a camera.\n\
         Then pick the most useful vocabulary words and grammar points from your script.\n\n\
         Chinese note:\n{source_text}"
    )
}

/// Prompt for rewriting an existing script.
pub fn rewrite_prompt(target_text: &str, instruction: &str) -> String {
    format!(
        "Here is a Spanish vlog script:\n{target_text}\n\n\
         Rewrite it following this instruction: {instruction}\n\
         Keep the original story unless the instruction asks otherwise. \
         Extract vocabulary and grammar points again from the rewritten script."
    )
}

/// Prompt for explaining a selection within a script.
pub fn selection_prompt(selection: &str, context: &str, kind: SelectionKind) -> String {
    let task = match kind {
        SelectionKind::Vocab => "Explain the selected word or phrase as a vocabulary item.",
        SelectionKind::Grammar => "Explain the grammar point shown by the selected text.",
    };
    format!("Script:\n{context}\n\nSelection: {selection}\n\n{task}")
}

fn vocabulary_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "word": { "type": "STRING", "description": "The Spanish word or phrase" },
            "meaning": { "type": "STRING", "description": "Meaning in Chinese" },
            "context": { "type": "STRING", "description": "Sentence from the script containing the word" }
        },
        "required": ["word", "meaning", "context"]
    })
}

fn grammar_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "point": { "type": "STRING", "description": "Name of the grammar point" },
            "explanation": { "type": "STRING", "description": "Explanation in Chinese" },
            "example": { "type": "STRING", "description": "Usage taken from the script" }
        },
        "required": ["point", "explanation", "example"]
    })
}

/// Response schema for a full script with extracted items.
pub fn script_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "spanishText": { "type": "STRING", "description": "The Spanish vlog script" },
            "vocabulary": { "type": "ARRAY", "items": vocabulary_schema() },
            "grammar": { "type": "ARRAY", "items": grammar_schema() }
        },
        "required": ["spanishText", "vocabulary", "grammar"]
    })
}

/// Response schema for a single selection analysis.
pub fn selection_schema(kind: SelectionKind) -> Value {
    match kind {
        SelectionKind::Vocab => vocabulary_schema(),
        SelectionKind::Grammar => grammar_schema(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_embed_inputs() {
        assert!(script_prompt("今天我去公园散步").contains("今天我去公园散步"));

        let p = rewrite_prompt("Hoy fui al parque.", "make it more formal");
        assert!(p.contains("Hoy fui al parque."));
        assert!(p.contains("make it more formal"));

        let p = selection_prompt("fui", "Hoy fui al parque.", SelectionKind::Grammar);
        assert!(p.contains("Selection: fui"));
        assert!(p.contains("grammar point"));
    }

    #[test]
    fn schemas_match_item_fields() {
        let schema = script_schema();
        assert_eq!(schema["properties"]["vocabulary"]["type"], "ARRAY");
        assert!(schema["properties"]["vocabulary"]["items"]["properties"]["word"].is_object());

        let vocab = selection_schema(SelectionKind::Vocab);
        assert!(vocab["properties"]["meaning"].is_object());
        let grammar = selection_schema(SelectionKind::Grammar);
        assert!(grammar["properties"]["explanation"].is_object());
    }
}
