use std::path::PathBuf;

/// XDG app name used for config and state paths.
pub const APP_NAME: &str = "codewright";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Config directory (`~/.config/codewright` on Linux).
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path of the config file, whether or not it exists.
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// State directory (`~/.local/state/codewright` on Linux).
///
/// `state_dir()` is Linux-only; fall back to `data_local_dir()` on
/// macOS/Windows.
pub fn state_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| {
        dirs.state_dir()
            .unwrap_or_else(|| dirs.data_local_dir())
            .to_path_buf()
    })
}

/// Default root directory holding all session directories.
pub fn default_sessions_root() -> PathBuf {
    state_dir()
        .map(|dir| dir.join("sessions"))
        .unwrap_or_else(|| std::env::temp_dir().join(format!("{APP_NAME}-sessions")))
}
