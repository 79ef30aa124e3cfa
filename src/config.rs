//! Runtime configuration loaded from YAML

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration for an engine run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub stress: StressConfig,
    #[serde(default)]
    pub frames: FrameConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_smoothing")]
    pub smoothing: bool,
}

/// Random entity workload used to exercise the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressConfig {
    #[serde(default = "default_stress_entities")]
    pub entities: usize,
    /// Share of entities drawn as text rather than rects.
    #[serde(default = "default_text_ratio")]
    pub text_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Directory for JSON frame dumps; none disables them.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default = "default_frame_interval")]
    pub every_ticks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_seed() -> u64 {
    7
}

fn default_ticks() -> u64 {
    60
}

fn default_smoothing() -> bool {
    true
}

fn default_stress_entities() -> usize {
    1000
}

fn default_text_ratio() -> f64 {
    0.05
}

fn default_frame_interval() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DisplayConfig {
    /// A 16x16 grid of 50px cells.
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            smoothing: default_smoothing(),
        }
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            entities: default_stress_entities(),
            text_ratio: default_text_ratio(),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            every_ticks: default_frame_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            ticks: default_ticks(),
            display: DisplayConfig::default(),
            stress: StressConfig::default(),
            frames: FrameConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.display.width == 0 || self.display.height == 0 {
            bail!(
                "display size must be non-zero, got {}x{}",
                self.display.width,
                self.display.height
            );
        }
        if !(0.0..=1.0).contains(&self.stress.text_ratio) {
            bail!(
                "stress.text_ratio must be between 0.0 and 1.0, got {}",
                self.stress.text_ratio
            );
        }
        Ok(())
    }
}
