use anyhow::{Context, Result};
use kickoff_core::{
    AffinityWeights, ClusterOrder, CompatibilityWeights, RecommendationEngine, DEFAULT_GROUPING_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{ensure_kickoff_home, kickoff_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineSection,
    pub display: DisplaySection,
    pub weights: WeightsSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Minimum score for interactive grouping suggestions.
    pub grouping_threshold: u32,
    /// Minimum score for batch auto-grouping (overridable per run).
    pub auto_group_threshold: u32,
    pub cluster_order: ClusterOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// IANA zone departure times are shown in.
    pub timezone: String,
    pub limit: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightsSection {
    pub compatibility: CompatibilityWeights,
    pub affinity: AffinityWeights,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            grouping_threshold: DEFAULT_GROUPING_THRESHOLD,
            auto_group_threshold: DEFAULT_GROUPING_THRESHOLD,
            cluster_order: ClusterOrder::CreatedAt,
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            timezone: "Europe/London".to_string(),
            limit: 10,
        }
    }
}

impl Config {
    pub fn engine(&self) -> RecommendationEngine {
        RecommendationEngine::new(self.weights.compatibility, self.weights.affinity)
            .with_threshold(self.engine.grouping_threshold)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(kickoff_home()?.join("config.toml"))
}

/// Load `explicit` if given, else `~/.kickoff/config.toml`, else defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = match explicit {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !p.exists() {
        if explicit.is_some() {
            anyhow::bail!("config not found: {}", p.display());
        }
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    ensure_kickoff_home()?;
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let written = save_config(&Config::default())?;
    println!("Wrote {}", written.display());
    Ok(())
}
