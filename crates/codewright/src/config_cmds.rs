use anyhow::{Result, bail};

use cwr_config::Config;
use cwr_core::OutputFormat;

/// Print the effective configuration (file values merged over defaults).
pub(crate) fn handle_config_show(format: OutputFormat) -> Result<()> {
    let config = Config::load()?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        OutputFormat::Text => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

/// Print the config file path, whether or not the file exists yet.
pub(crate) fn handle_config_path() -> Result<()> {
    match cwr_config::paths::config_file() {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => bail!("Could not determine a config directory on this platform"),
    }
}
