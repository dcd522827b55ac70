pub mod metrics;
pub mod xlsx;

use anyhow::{Context, Result};
use ndarray::Array2;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::dataset::labels::read_attribute_table;
use crate::dataset::{RgDataset, SplitDataset};
use crate::models::{Stage, NUM_ATTRIBUTES};

pub use metrics::{ErrorStats, ForceCorrection};

/// Predictions and ground truth for the test slice of a regression dataset, row-aligned
#[derive(Debug, Clone)]
pub struct Report {
    names: Vec<String>,
    preds: Array2<f32>,
    gts: Array2<f32>,
}

/// Where a report was written and what it contained
#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub path: PathBuf,
    pub stats: ErrorStats,
}

impl Report {
    pub fn new(names: Vec<String>, preds: Array2<f32>, gts: Array2<f32>) -> Result<Self> {
        if preds.dim() != gts.dim() || preds.nrows() != names.len() {
            anyhow::bail!(
                "Mismatched report inputs: {} names, preds {:?}, gts {:?}",
                names.len(),
                preds.dim(),
                gts.dim()
            );
        }
        Ok(Self { names, preds, gts })
    }

    /// Match a prediction CSV against the test slice by left image file name
    pub fn from_predictions(dataset: &RgDataset, predictions: &Path) -> Result<Self> {
        let table = read_attribute_table(predictions)?;
        let samples = dataset.split().stage(Stage::Test);

        let mut names = Vec::with_capacity(samples.len());
        let mut preds = Array2::<f32>::zeros((samples.len(), NUM_ATTRIBUTES));
        let mut gts = Array2::<f32>::zeros((samples.len(), NUM_ATTRIBUTES));

        for (i, sample) in samples.iter().enumerate() {
            let key = sample.pair.name();
            let pred = table.get(&key).with_context(|| {
                format!("No prediction for '{}' in {}", key, predictions.display())
            })?;
            for j in 0..NUM_ATTRIBUTES {
                preds[[i, j]] = pred[j];
                gts[[i, j]] = sample.label[j];
            }
            names.push(sample.pair.left.display().to_string());
        }

        if table.len() > samples.len() {
            warn!(
                "{} predictions do not belong to the test slice",
                table.len() - samples.len()
            );
        }

        Self::new(names, preds, gts)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn preds(&self) -> &Array2<f32> {
        &self.preds
    }

    pub fn gts(&self) -> &Array2<f32> {
        &self.gts
    }

    /// Apply the force correction heuristic to the predictions
    pub fn apply_correction<R: Rng>(&mut self, correction: &ForceCorrection, rng: &mut R) -> usize {
        let corrected = correction.apply(&mut self.preds, &self.gts, rng);
        info!("Force correction adjusted {} of {} rows", corrected, self.names.len());
        corrected
    }

    pub fn stats(&self) -> Result<ErrorStats> {
        ErrorStats::compute(&self.preds, &self.gts)
    }

    /// Write `<save_folder>/<data_folder>.xlsx`, creating the folder if needed
    pub fn write(&self, save_folder: &Path, data_folder: &str) -> Result<ReportSummary> {
        fs::create_dir_all(save_folder)
            .with_context(|| format!("Failed to create {}", save_folder.display()))?;

        let stats = self.stats()?;
        info!("Max Error: {:.3}", stats.max_error);
        info!("Max Force: {:.3}", stats.max_force);
        match stats.fso {
            Some(fso) => info!("FSO Value: {:.3}%", fso * 100.0),
            None => warn!("FSO undefined: no positive ground-truth force"),
        }

        let path = save_folder.join(format!("{}.xlsx", data_folder));
        xlsx::write_workbook(&path, &self.names, &self.preds, &self.gts, &stats)?;
        info!("Wrote {}", path.display());

        Ok(ReportSummary { path, stats })
    }
}
