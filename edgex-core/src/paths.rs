//! Default path resolution for the CLI configuration
//!
//! The configuration lives in `~/.edgex-cli/config.yaml`.

use std::path::PathBuf;

const CONFIG_DIR_NAME: &str = ".edgex-cli";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Returns the configuration directory.
///
/// Prefers `$HOME`, then the platform home directory, then the current
/// directory.
pub fn default_config_dir() -> PathBuf {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Returns the default path of the configuration file.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join(CONFIG_FILE_NAME)
}
