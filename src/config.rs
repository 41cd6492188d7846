use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    pub server: ServerConfig,
    pub geocoder: GeocoderConfig,
    pub solar: SolarConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// Source rate table (TSV) read by `generate`.
    pub source_table: PathBuf,
    /// Dataset artifact written by `generate` and loaded by `serve`.
    pub dataset_json: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SolarConfig {
    pub mwh_per_hectare_year: f64,
    pub tco2e_per_mwh: f64,
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}
