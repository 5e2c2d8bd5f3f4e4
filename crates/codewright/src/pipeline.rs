//! The execution-and-repair loop: ask the model, run what it returns, feed
//! failures back as the next prompt, bounded by a fixed attempt count.

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use cwr_core::{CodeReply, Message, Transcript};
use cwr_exec::{ExecutionOutcome, run_snippet};
use cwr_llm::ChatClient;

/// Where and how snippets run.
pub struct ExecSettings {
    pub workdir: PathBuf,
    pub timeout: Option<Duration>,
}

/// Final state of one `ask` interaction.
#[derive(Debug)]
pub struct InteractionOutcome {
    /// Whether the last executed snippet succeeded. False means the retry
    /// bound was exhausted; there is no other give-up signal.
    pub success: bool,
    /// Model calls performed (1..=max_attempts).
    pub attempts: u32,
    pub last_reply: Option<CodeReply>,
    pub last_execution: Option<ExecutionOutcome>,
}

/// Per-attempt view handed to the progress callback.
pub struct AttemptReport<'a> {
    pub attempt: u32,
    pub reply: &'a CodeReply,
    pub execution: &'a ExecutionOutcome,
}

/// One plain chat turn: send the transcript, append the reply, no parsing or
/// execution.
pub async fn run_chat_turn(
    client: &dyn ChatClient,
    transcript: &mut Transcript,
) -> Result<String> {
    let reply = client.complete(transcript).await?;
    transcript.push(Message::assistant(reply.clone()));
    Ok(reply)
}

/// Run the repair loop over a transcript ending in a user request.
///
/// Each attempt appends the raw model reply as an assistant message and the
/// captured execution output as an environment message. A failed attempt
/// additionally appends the output as a user message (the repair prompt) —
/// including the final failed attempt, whose repair prompt goes unanswered.
///
/// A reply that does not validate as a code reply aborts the interaction;
/// the assistant message stays in the transcript so the session file records
/// what the model actually said.
pub async fn run_interaction(
    client: &dyn ChatClient,
    transcript: &mut Transcript,
    exec: &ExecSettings,
    max_attempts: u32,
    mut report: impl FnMut(&AttemptReport<'_>),
) -> Result<InteractionOutcome> {
    let mut attempts = 0;
    let mut last_reply = None;
    let mut last_execution = None;

    while attempts < max_attempts {
        let reply_text = client.complete(transcript).await?;
        transcript.push(Message::assistant(reply_text.clone()));

        let reply = CodeReply::parse(&reply_text)?;
        debug!(language = %reply.language, attempt = attempts + 1, "model returned code");

        let execution =
            run_snippet(&reply.code, reply.language, &exec.workdir, exec.timeout).await?;
        transcript.push(Message::environment(execution.output.clone()));

        attempts += 1;
        report(&AttemptReport {
            attempt: attempts,
            reply: &reply,
            execution: &execution,
        });

        let succeeded = execution.success;
        if !succeeded {
            // Feed the error back as the next prompt.
            transcript.push(Message::user(execution.output.clone()));
            warn!(
                attempt = attempts,
                exit_code = execution.exit_code,
                "snippet failed"
            );
        }

        last_reply = Some(reply);
        last_execution = Some(execution);

        if succeeded {
            return Ok(InteractionOutcome {
                success: true,
                attempts,
                last_reply,
                last_execution,
            });
        }
    }

    Ok(InteractionOutcome {
        success: false,
        attempts,
        last_reply,
        last_execution,
    })
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
