//! Session CRUD: wholesale load/save of the message log, listing, deletion.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use cwr_core::{CwrError, Transcript};

pub const HISTORY_FILE_NAME: &str = "history.json";

const SESSION_NAME_MAX_LEN: usize = 64;

/// Listing entry for one stored session.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionSummary {
    pub name: String,
    pub message_count: usize,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Session names become directory names; keep them boring.
///
/// Non-empty, at most 64 chars, no path separators, no leading dot.
pub fn validate_session_name(name: &str) -> Result<(), CwrError> {
    let valid = !name.is_empty()
        && name.len() <= SESSION_NAME_MAX_LEN
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(CwrError::InvalidSessionName(name.to_string()))
    }
}

/// Directory of a named session under `root`.
pub fn session_dir(root: &Path, name: &str) -> Result<PathBuf, CwrError> {
    validate_session_name(name)?;
    Ok(root.join(name))
}

fn history_path(root: &Path, name: &str) -> Result<PathBuf, CwrError> {
    Ok(session_dir(root, name)?.join(HISTORY_FILE_NAME))
}

/// Load a session's transcript, seeding a fresh one when the session (or its
/// history file) does not exist yet.
///
/// A file that exists but does not parse is an error, never silently
/// reinitialized.
pub fn load_or_init(root: &Path, name: &str, system_prompt: &str) -> Result<Transcript> {
    let path = history_path(root, name)?;

    if !path.exists() {
        debug!(session = name, "no history file, seeding fresh transcript");
        return Ok(Transcript::new(system_prompt));
    }

    load_transcript(root, name)
}

/// Load an existing session's transcript; a missing session is an error.
pub fn load_transcript(root: &Path, name: &str) -> Result<Transcript> {
    let path = history_path(root, name)?;
    if !path.exists() {
        return Err(CwrError::SessionNotFound(name.to_string()).into());
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read history file: {}", path.display()))?;

    let transcript: Transcript =
        serde_json::from_str(&contents).map_err(|source| CwrError::CorruptHistory {
            path: path.display().to_string(),
            source,
        })?;

    Ok(transcript)
}

/// Write the whole transcript, creating the session directory on first save.
pub fn save_transcript(root: &Path, name: &str, transcript: &Transcript) -> Result<()> {
    let dir = session_dir(root, name)?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create session directory: {}", dir.display()))?;

    let path = dir.join(HISTORY_FILE_NAME);
    let contents =
        serde_json::to_string_pretty(transcript).context("Failed to serialize transcript")?;
    fs::write(&path, contents)
        .with_context(|| format!("Failed to write history file: {}", path.display()))?;

    debug!(session = name, messages = transcript.len(), "saved history");
    Ok(())
}

/// Reseed a session's history with just the system prompt.
pub fn clear_history(root: &Path, name: &str, system_prompt: &str) -> Result<Transcript> {
    let transcript = Transcript::new(system_prompt);
    save_transcript(root, name, &transcript)?;
    Ok(transcript)
}

/// List stored sessions, most recently modified first.
pub fn list_sessions(root: &Path) -> Result<Vec<SessionSummary>> {
    let mut summaries = Vec::new();

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(summaries),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to read sessions root: {}", root.display()));
        }
    };

    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let history = entry.path().join(HISTORY_FILE_NAME);
        if !history.exists() {
            continue;
        }

        let message_count = fs::read_to_string(&history)
            .ok()
            .and_then(|contents| serde_json::from_str::<Transcript>(&contents).ok())
            .map(|transcript| transcript.len())
            .unwrap_or(0);

        let last_modified = fs::metadata(&history)
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        summaries.push(SessionSummary {
            name,
            message_count,
            last_modified,
        });
    }

    summaries.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    Ok(summaries)
}

/// Delete a session directory and everything in it.
pub fn delete_session(root: &Path, name: &str) -> Result<()> {
    let dir = session_dir(root, name)?;
    if !dir.exists() {
        return Err(CwrError::SessionNotFound(name.to_string()).into());
    }
    fs::remove_dir_all(&dir)
        .with_context(|| format!("Failed to delete session directory: {}", dir.display()))?;
    Ok(())
}
