use clap::{Parser, Subcommand};
use cwr_core::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cwr")]
#[command(about = "codewright: session-based LLM code writing with local execution and repair")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json)
    #[arg(long, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Override the sessions root directory
    #[arg(long, global = true)]
    pub sessions_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a request to the model and execute the returned code
    Ask {
        /// Request prompt; reads from stdin if omitted
        prompt: Option<String>,

        /// Session name (one directory per session)
        #[arg(short, long, default_value = "default")]
        session: String,

        /// Model identifier (see `cwr models`); defaults from config
        #[arg(short, long)]
        model: Option<String>,

        /// Sampling temperature override
        #[arg(long)]
        temperature: Option<f32>,

        /// Image files to upload and attach to this request
        #[arg(long)]
        attach: Vec<PathBuf>,

        /// Plain chat: stop after the first model reply, execute nothing
        #[arg(long)]
        no_exec: bool,
    },

    /// Manage sessions
    Session {
        #[command(subcommand)]
        cmd: SessionCommands,
    },

    /// Copy a file into a session directory
    Upload {
        /// File to upload
        file: PathBuf,

        /// Session name
        #[arg(short, long, default_value = "default")]
        session: String,
    },

    /// List the supported model catalog
    Models,

    /// Show/manage configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// List stored sessions
    List,

    /// Print a session's transcript
    Show {
        #[arg(short, long)]
        session: String,

        /// Only the last N messages
        #[arg(long)]
        tail: Option<usize>,
    },

    /// Reset a session's history to just the system prompt
    Clear {
        #[arg(short, long)]
        session: String,
    },

    /// Delete a session directory
    Delete {
        #[arg(short, long)]
        session: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
}
