//! Configuration loading and management.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the alias mapping file.
    pub aliases_path: PathBuf,

    /// Path to the stored OAuth token.
    pub token_path: PathBuf,

    /// Socket address for `qcal serve`.
    pub address: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs_config_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            aliases_path: config_dir.join("aliases.json"),
            token_path: config_dir.join("token.json"),
            address: SocketAddr::from(([127, 0, 0, 1], 5485)),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Layering: defaults, then `config.toml` in the platform config dir,
    /// then the given file, then `QCAL_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("QCAL_"));

        figment.extract()
    }
}

/// Platform-specific config directory for qcal.
///
/// On Linux: `~/.config/qcal`
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("qcal"))
}
