//! Built-in system prompts instructing the model to answer with the
//! structured code reply schema.

use crate::config::PromptLanguage;

fn schema_json(language: PromptLanguage) -> serde_json::Value {
    let (code_desc, lang_desc) = match language {
        PromptLanguage::En => (
            "Executable code",
            "Language of the code (python or sh)",
        ),
        PromptLanguage::Ja => (
            "そのまま実行可能なコード",
            "コードの言語 (python or sh)",
        ),
    };

    serde_json::json!({
        "type": "object",
        "properties": {
            "code": {"type": "string", "description": code_desc},
            "language": {"type": "string", "description": lang_desc},
        },
        "required": ["code", "language"],
    })
}

/// The default coding system prompt, embedding the reply schema.
pub fn builtin_system_prompt(language: PromptLanguage) -> String {
    let schema = serde_json::to_string_pretty(&schema_json(language))
        .expect("schema literal serializes");

    match language {
        PromptLanguage::En => format!(
            "You are an AI assistant specialized in coding. Please write the code in JSON \
             format according to the following schema.\n\n```json\n{schema}\n```"
        ),
        PromptLanguage::Ja => format!(
            "あなたはコーディングに特化したAIアシスタントです。\
             以下のスキーマに従ったJSON形式でコードを記述してください。\n\n```json\n{schema}\n```"
        ),
    }
}
