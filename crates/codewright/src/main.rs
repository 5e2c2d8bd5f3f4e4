use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod ask_cmd;
mod cli;
mod config_cmds;
mod models_cmd;
mod pipeline;
mod session_cmds;

use cli::{Cli, Commands, ConfigCommands, SessionCommands};
use cwr_config::Config;

/// Sessions root: the `--sessions-dir` override when given, the configured
/// (or XDG-default) root otherwise.
pub(crate) fn resolve_sessions_root(overridden: Option<PathBuf>) -> Result<PathBuf> {
    match overridden {
        Some(path) => Ok(path),
        None => Ok(Config::load()?.session.sessions_root()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (output to stderr, initialize only once)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    let output_format = cli.format.clone();
    let sessions_dir = cli.sessions_dir.clone();

    match cli.command {
        Commands::Ask {
            prompt,
            session,
            model,
            temperature,
            attach,
            no_exec,
        } => {
            let exit_code = ask_cmd::handle_ask(
                prompt,
                session,
                model,
                temperature,
                attach,
                no_exec,
                sessions_dir,
                output_format,
            )
            .await?;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Commands::Session { cmd } => match cmd {
            SessionCommands::List => {
                session_cmds::handle_session_list(sessions_dir, output_format)?;
            }
            SessionCommands::Show { session, tail } => {
                session_cmds::handle_session_show(session, tail, sessions_dir, output_format)?;
            }
            SessionCommands::Clear { session } => {
                session_cmds::handle_session_clear(session, sessions_dir)?;
            }
            SessionCommands::Delete { session } => {
                session_cmds::handle_session_delete(session, sessions_dir)?;
            }
        },
        Commands::Upload { file, session } => {
            session_cmds::handle_upload(file, session, sessions_dir)?;
        }
        Commands::Models => {
            models_cmd::handle_models(output_format)?;
        }
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show => {
                config_cmds::handle_config_show(output_format)?;
            }
            ConfigCommands::Path => {
                config_cmds::handle_config_path()?;
            }
        },
    }

    Ok(())
}
