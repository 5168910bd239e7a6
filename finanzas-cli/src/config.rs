use anyhow::{Context, Result};
use finanzas_ai::batch::DEFAULT_BATCH_SIZE;
use finanzas_ai::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_finanzas_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ai: AiSection,
    pub projection: ProjectionSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSection {
    /// "openai" or "rules"
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub batch_size: usize,
    pub restrict_to_vocabulary: bool,
    pub apply_to_similar: bool,
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            batch_size: DEFAULT_BATCH_SIZE,
            restrict_to_vocabulary: true,
            apply_to_similar: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionSection {
    /// IANA zone used to decide what "today" is
    pub timezone: String,
}

impl Default for ProjectionSection {
    fn default() -> Self {
        Self {
            timezone: "Europe/Madrid".to_string(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_finanzas_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: Config = toml::from_str("[ai]\nmodel = \"gpt-4o\"\nbatch_size = 5\n").unwrap();
        assert_eq!(cfg.ai.model, "gpt-4o");
        assert_eq!(cfg.ai.batch_size, 5);
        assert_eq!(cfg.ai.provider, "openai");
        assert!(cfg.ai.apply_to_similar);
        assert_eq!(cfg.projection.timezone, "Europe/Madrid");
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(s.contains("[projection]"));
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.ai.batch_size, DEFAULT_BATCH_SIZE);
    }
}
