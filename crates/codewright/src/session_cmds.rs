use anyhow::Result;
use std::path::PathBuf;

use cwr_config::Config;
use cwr_core::{Content, OutputFormat};
use cwr_session::{clear_history, delete_session, list_sessions, load_transcript};

pub(crate) fn handle_session_list(
    sessions_dir: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let root = crate::resolve_sessions_root(sessions_dir)?;
    let sessions = list_sessions(&root)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
        OutputFormat::Text => {
            if sessions.is_empty() {
                eprintln!("No sessions found.");
                return Ok(());
            }
            println!("{:<30}  {:>8}  LAST MODIFIED", "SESSION", "MESSAGES");
            println!("{}", "-".repeat(60));
            for session in sessions {
                let modified = session
                    .last_modified
                    .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<30}  {:>8}  {}",
                    session.name, session.message_count, modified
                );
            }
        }
    }

    Ok(())
}

pub(crate) fn handle_session_show(
    session: String,
    tail: Option<usize>,
    sessions_dir: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let root = crate::resolve_sessions_root(sessions_dir)?;
    let transcript = load_transcript(&root, &session)?;

    let skip = tail
        .map(|n| transcript.len().saturating_sub(n))
        .unwrap_or(0);

    match format {
        OutputFormat::Json => {
            let messages: Vec<_> = transcript.iter().skip(skip).collect();
            println!("{}", serde_json::to_string_pretty(&messages)?);
        }
        OutputFormat::Text => {
            for message in transcript.iter().skip(skip) {
                let body = match &message.content {
                    Content::Text(text) => text.clone(),
                    Content::Parts(_) => {
                        let mut body = message.content.as_text();
                        if message.content.has_images() {
                            body.push_str("\n[image attached]");
                        }
                        body
                    }
                };
                println!("[{}]", message.role);
                println!("{}", body.trim_end());
                println!();
            }
        }
    }

    Ok(())
}

pub(crate) fn handle_session_clear(session: String, sessions_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::load()?;
    let root = sessions_dir.unwrap_or_else(|| config.session.sessions_root());
    let system_prompt = config.chat.effective_system_prompt();
    clear_history(&root, &session, &system_prompt)?;
    println!("Cleared session '{session}'.");
    Ok(())
}

pub(crate) fn handle_session_delete(session: String, sessions_dir: Option<PathBuf>) -> Result<()> {
    let root = crate::resolve_sessions_root(sessions_dir)?;
    delete_session(&root, &session)?;
    println!("Deleted session '{session}'.");
    Ok(())
}

pub(crate) fn handle_upload(
    file: PathBuf,
    session: String,
    sessions_dir: Option<PathBuf>,
) -> Result<()> {
    let root = crate::resolve_sessions_root(sessions_dir)?;
    let dest = cwr_session::store_upload(&root, &session, &file)?;
    println!("Stored {}", dest.display());
    Ok(())
}
