use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::dataset::SplitRatios;
use crate::error::DatasetError;
use crate::models::Roi;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the `cls_*` and `rg_*` data folders
    pub data_root: PathBuf,
    /// Extension of the image files, including the dot
    pub img_format: String,
    pub preprocess: PreprocessConfig,
    pub split: SplitRatios,
}

/// Parameters of the fixed crop → gray → binarize → resize chain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub roi: Roi,
    pub binarize_threshold: f32,
    pub resize_factor: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("../data"),
            img_format: ".png".to_string(),
            preprocess: PreprocessConfig::default(),
            split: SplitRatios::default(),
        }
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            roi: Roi::default(),
            binarize_threshold: 20.0,
            resize_factor: 0.5,
        }
    }
}

impl PreprocessConfig {
    /// Threshold as applied to 8-bit pixels: anything strictly above it turns white
    pub fn threshold_u8(&self) -> u8 {
        self.binarize_threshold.floor().clamp(0.0, 255.0) as u8
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.roi.width() == 0 || self.roi.height() == 0 {
            return Err(DatasetError::InvalidConfig(format!("empty ROI {}", self.roi)));
        }
        if !(0.0..=255.0).contains(&self.binarize_threshold) {
            return Err(DatasetError::InvalidConfig(format!(
                "binarize threshold {} outside 0..=255",
                self.binarize_threshold
            )));
        }
        if !(self.resize_factor > 0.0 && self.resize_factor.is_finite()) {
            return Err(DatasetError::InvalidConfig(format!(
                "resize factor must be positive, got {}",
                self.resize_factor
            )));
        }
        Ok(())
    }
}

impl PipelineConfig {
    /// Load from a JSON file, or fall back to defaults when no path is given.
    /// Missing fields take their default values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                let config: PipelineConfig = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?;
                info!("Loaded configuration from {}", path.display());
                config
            }
            None => PipelineConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        if !self.img_format.starts_with('.') {
            return Err(DatasetError::InvalidConfig(format!(
                "image format '{}' must start with a dot",
                self.img_format
            )));
        }
        self.preprocess.validate()?;
        self.split.validate()
    }

    pub fn with_data_root(mut self, data_root: impl Into<PathBuf>) -> Self {
        self.data_root = data_root.into();
        self
    }
}
