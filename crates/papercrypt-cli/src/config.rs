use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use papercrypt_core::serial::DEFAULT_SERIAL_LENGTH;

/// Optional user configuration. Command-line flags take precedence.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaperCryptConfig {
    #[serde(default)]
    pub generate: GenerateSection,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateSection {
    /// Length of generated serial numbers.
    pub serial_length: usize,
    /// Lower-case hex digits.
    pub lowercase: bool,
    /// Armor body instead of hex.
    pub armor: bool,
    /// Embed a QR code of the payload.
    pub qr: bool,
}

impl Default for GenerateSection {
    fn default() -> Self {
        Self {
            serial_length: DEFAULT_SERIAL_LENGTH,
            lowercase: false,
            armor: false,
            qr: true,
        }
    }
}

/// Load the config from `explicit`, or from the default location if it exists.
///
/// A missing file at the default location yields the defaults; a missing file
/// at an explicitly given path is an error.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<PaperCryptConfig> {
    let path = match explicit {
        Some(path) => PathBuf::from(path),
        None => match default_config_path() {
            Ok(path) if path.exists() => path,
            _ => return Ok(PaperCryptConfig::default()),
        },
    };
    let config = read_config(&path)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn read_config(path: &Path) -> anyhow::Result<PaperCryptConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("papercrypt"));
        }
    }
    Ok(home_dir()?.join(".config").join("papercrypt"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
