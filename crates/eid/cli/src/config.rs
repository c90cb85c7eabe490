//! Settings file `~/.eid/eid.toml`

use std::path::{Path, PathBuf};

use eid_apdu_transport_pcsc::PcscConfig;
use eid_card::SessionConfig;
use eyre::OptionExt;
use figment::{
    Figment,
    providers::{Format, Toml},
};
use serde::Deserialize;

/// Settings read from the configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Reader to use when `--reader` is not given
    pub reader: Option<String>,
    /// Refuse to sign without a pinpad reader
    pub secure: bool,
    /// Card session timings and pinpad language
    pub session: SessionConfig,
    /// Reader connection
    pub pcsc: PcscConfig,
}

/// Directory holding the configuration file
pub fn config_dir() -> eyre::Result<PathBuf> {
    Ok(std::env::home_dir()
        .ok_or_eyre("home directory not found")?
        .join(".eid"))
}

/// Load `path`, or `~/.eid/eid.toml` when no path is given
///
/// A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config_dir()?.join("eid.toml"),
    };
    Ok(Figment::new().merge(Toml::file(path)).extract()?)
}
