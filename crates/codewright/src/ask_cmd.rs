use anyhow::{Context, Result, bail};
use std::io::Read;
use std::path::PathBuf;
use tracing::warn;

use cwr_config::Config;
use cwr_core::{Message, OutputFormat};
use cwr_llm::{ChatOptions, client_for_model};

use crate::pipeline::{self, AttemptReport, ExecSettings, InteractionOutcome};

enum AskResult {
    Chat(String),
    Repair(InteractionOutcome),
}

/// Handle `cwr ask`: load the session, append the user request, run the
/// model (with or without the repair loop), persist the transcript.
///
/// Returns the process exit code: 0 on success, 2 when the repair loop
/// exhausted its attempts without a passing execution.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn handle_ask(
    prompt: Option<String>,
    session_name: String,
    model_override: Option<String>,
    temperature_override: Option<f32>,
    attach: Vec<PathBuf>,
    no_exec: bool,
    sessions_dir: Option<PathBuf>,
    format: OutputFormat,
) -> Result<i32> {
    let config = Config::load()?;
    let root = sessions_dir.unwrap_or_else(|| config.session.sessions_root());

    let model = model_override.unwrap_or_else(|| config.chat.model.clone());
    let options = ChatOptions {
        temperature: temperature_override.unwrap_or(config.chat.temperature),
        max_tokens: config.chat.max_tokens,
        json_mode: config.chat.json_mode,
    };

    // Fail on an unknown model or missing key before touching the session.
    let client = client_for_model(&model, options)?;

    let prompt_text = match prompt {
        Some(p) => p,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read prompt from stdin")?;
            buffer
        }
    };
    if prompt_text.trim().is_empty() {
        bail!("Empty prompt: pass one as an argument or on stdin");
    }

    let system_prompt = config.chat.effective_system_prompt();
    let mut transcript = cwr_session::load_or_init(&root, &session_name, &system_prompt)?;

    // Store uploads first, then attach any images to this request.
    let mut image_urls = Vec::new();
    for file in &attach {
        let stored = cwr_session::store_upload(&root, &session_name, file)?;
        if cwr_session::is_image_file(&stored) {
            image_urls.push(cwr_session::file_to_data_url(&stored)?);
        }
    }

    let message = if !image_urls.is_empty() && !transcript.has_image_turn() {
        Message::user_with_images(prompt_text, image_urls)
    } else {
        if !image_urls.is_empty() {
            warn!("history already carries an image turn; sending text only");
        }
        Message::user(prompt_text)
    };
    transcript.push(message);

    // Snippets run inside the session directory, like everything else the
    // session owns.
    let workdir = cwr_session::session_dir(&root, &session_name)?;
    std::fs::create_dir_all(&workdir)
        .with_context(|| format!("Failed to create session directory: {}", workdir.display()))?;

    let echo_attempts = matches!(format, OutputFormat::Text);
    let result = if no_exec || !config.exec.enabled {
        pipeline::run_chat_turn(client.as_ref(), &mut transcript)
            .await
            .map(AskResult::Chat)
    } else {
        let exec = ExecSettings {
            workdir,
            timeout: config.exec.timeout(),
        };
        pipeline::run_interaction(
            client.as_ref(),
            &mut transcript,
            &exec,
            config.repair.max_attempts,
            |report| {
                if echo_attempts {
                    render_attempt(report);
                }
            },
        )
        .await
        .map(AskResult::Repair)
    };

    // Persist wholesale no matter how the interaction ended, so the session
    // file records what actually happened.
    cwr_session::save_transcript(&root, &session_name, &transcript)?;

    match result? {
        AskResult::Chat(reply) => {
            match format {
                OutputFormat::Text => println!("{reply}"),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "session": session_name,
                        "model": model,
                        "reply": reply,
                    }))?
                ),
            }
            Ok(0)
        }
        AskResult::Repair(outcome) => {
            if let OutputFormat::Json = format {
                let last = outcome.last_execution.as_ref();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "session": session_name,
                        "model": model,
                        "success": outcome.success,
                        "attempts": outcome.attempts,
                        "exit_code": last.map(|e| e.exit_code),
                        "output": last.map(|e| e.output.as_str()),
                    }))?
                );
            }
            if outcome.success {
                Ok(0)
            } else {
                eprintln!(
                    "Giving up after {} attempt(s); last execution failed.",
                    outcome.attempts
                );
                Ok(2)
            }
        }
    }
}

fn render_attempt(report: &AttemptReport<'_>) {
    if let Some(response) = &report.reply.response {
        println!("{response}\n");
    }
    println!("```{}", report.reply.language);
    println!("{}", report.reply.code.trim_end());
    println!("```");

    println!(
        "--- output (attempt {}, exit {}) ---",
        report.attempt, report.execution.exit_code
    );
    let output = report.execution.output.trim_end();
    if output.is_empty() {
        println!("[no output]");
    } else {
        println!("{output}");
    }
    println!("---");
}
