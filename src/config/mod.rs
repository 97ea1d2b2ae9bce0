use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_RPC: &str = "http://localhost:8545";
pub const DEFAULT_CHAIN_ID: u64 = 97;
pub const DEFAULT_NETWORK_NAME: &str = "BNB Smart Chain Testnet";
pub const DEFAULT_EXPLORER_BASE_URL: &str = "https://testnet.bscscan.com/address";
pub const DEFAULT_NFT_VIEW_BASE_URL: &str = "https://testnet.bscscan.com/nft/";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub rpc: Option<String>,
    pub contract: Option<String>,
    pub chain_id: Option<u64>,
    pub network_name: Option<String>,
    pub explorer_base_url: Option<String>,
    pub nft_view_base_url: Option<String>,
    /// Address treated as the connected wallet
    pub viewer: Option<String>,

    #[serde(default)]
    pub grade_colors: BTreeMap<String, String>,
}

impl Config {
    pub fn rpc(&self) -> &str {
        non_blank(self.rpc.as_deref()).unwrap_or(DEFAULT_RPC)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id.unwrap_or(DEFAULT_CHAIN_ID)
    }

    pub fn network_name(&self) -> &str {
        non_blank(self.network_name.as_deref()).unwrap_or(DEFAULT_NETWORK_NAME)
    }

    pub fn explorer_base_url(&self) -> &str {
        non_blank(self.explorer_base_url.as_deref()).unwrap_or(DEFAULT_EXPLORER_BASE_URL)
    }

    pub fn nft_view_base_url(&self) -> &str {
        non_blank(self.nft_view_base_url.as_deref()).unwrap_or(DEFAULT_NFT_VIEW_BASE_URL)
    }

    pub fn contract(&self) -> Option<&str> {
        non_blank(self.contract.as_deref())
    }

    pub fn viewer(&self) -> Option<String> {
        non_blank(self.viewer.as_deref()).map(normalize_address)
    }

    /// Configured color name for a grade, falling back to the built-in palette
    pub fn grade_color(&self, grade: &str) -> Option<&str> {
        self.grade_colors
            .get(grade)
            .map(String::as_str)
            .or_else(|| default_grade_color(grade))
    }
}

fn default_grade_color(grade: &str) -> Option<&'static str> {
    match grade {
        "A+" | "A" => Some("green"),
        "B+" | "B" => Some("blue"),
        "C+" | "C" => Some("yellow"),
        "D" => Some("magenta"),
        "F" => Some("red"),
        _ => None,
    }
}

/// Load the config file, falling back to defaults when missing or invalid
pub fn load() -> Config {
    match config_path() {
        Some(path) => load_from(&path).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "using default config");
            Config::default()
        }),
        None => Config::default(),
    }
}

/// Like [`load`] but a missing file is the only tolerated failure
pub fn load_strict() -> Result<Config, ConfigError> {
    match config_path() {
        Some(path) if path.exists() => load_from(&path),
        _ => Ok(Config::default()),
    }
}

pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    toml::from_str::<Config>(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("CERTDECK_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("certdeck").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("certdeck").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "certdeck", "certdeck")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("certdeck"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("certdeck"));
    }
    directories::ProjectDirs::from("io", "certdeck", "certdeck")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn log_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("certdeck.log"))
}

pub fn exports_dir() -> PathBuf {
    data_dir()
        .map(|dir| dir.join("exports"))
        .unwrap_or_else(|| PathBuf::from(".certdeck").join("exports"))
}

pub fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    let payload = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    format!("0x{}", payload.to_lowercase())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
