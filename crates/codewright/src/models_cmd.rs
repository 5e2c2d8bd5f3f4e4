use anyhow::Result;

use cwr_core::{OutputFormat, Provider};

const PROVIDERS: [Provider; 4] = [
    Provider::OpenAi,
    Provider::Google,
    Provider::Groq,
    Provider::Anthropic,
];

/// Print the fixed model catalog grouped by provider.
pub(crate) fn handle_models(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let catalog: Vec<_> = PROVIDERS
                .iter()
                .map(|provider| {
                    serde_json::json!({
                        "provider": provider.as_str(),
                        "api_key_var": provider.api_key_var(),
                        "models": provider.models(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
        OutputFormat::Text => {
            for provider in PROVIDERS {
                println!("{} (key: {})", provider, provider.api_key_var());
                for model in provider.models() {
                    println!("  {model}");
                }
                println!();
            }
        }
    }
    Ok(())
}
