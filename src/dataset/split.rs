use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::DatasetError;
use crate::models::{ImagePair, Stage};

/// Fractions of each class assigned to train, val and test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.6,
            val: 0.2,
            test: 0.2,
        }
    }
}

/// Index ranges of the three slices of one list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitBounds {
    pub train: Range<usize>,
    pub val: Range<usize>,
    pub test: Range<usize>,
}

impl SplitRatios {
    pub fn validate(&self) -> Result<(), DatasetError> {
        let all = [self.train, self.val, self.test];
        if all.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(DatasetError::InvalidConfig(format!(
                "split ratios must be non-negative, got {:?}",
                all
            )));
        }
        if self.train + self.val + self.test > 1.0 + 1e-9 {
            return Err(DatasetError::InvalidConfig(format!(
                "split ratios sum to more than 1: {:?}",
                all
            )));
        }
        Ok(())
    }

    /// Slice boundaries for a list of `n` items.
    ///
    /// Train and val are taken from the front, test from the back; all three
    /// lengths truncate toward zero. A zero-length test slice stays empty.
    pub fn bounds(&self, n: usize) -> SplitBounds {
        let train_end = truncate(self.train, n);
        let val_end = truncate(self.train + self.val, n).max(train_end);
        let test_start = (n - truncate(self.test, n)).max(val_end);

        SplitBounds {
            train: 0..train_end,
            val: train_end..val_end,
            test: test_start..n,
        }
    }
}

fn truncate(ratio: f64, n: usize) -> usize {
    ((ratio * n as f64) as usize).min(n)
}

/// One image pair with its target
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<L> {
    pub pair: ImagePair,
    pub label: L,
}

/// Train/val/test slices, each the concatenation of per-class slices in class order
#[derive(Debug, Clone)]
pub struct Split<L> {
    train: Vec<Sample<L>>,
    val: Vec<Sample<L>>,
    test: Vec<Sample<L>>,
}

impl<L: Clone> Split<L> {
    pub fn new() -> Self {
        Self {
            train: Vec::new(),
            val: Vec::new(),
            test: Vec::new(),
        }
    }

    /// Partition one class's samples and append each slice
    pub fn extend_class(&mut self, samples: &[Sample<L>], ratios: &SplitRatios) {
        let bounds = ratios.bounds(samples.len());
        self.train.extend_from_slice(&samples[bounds.train]);
        self.val.extend_from_slice(&samples[bounds.val]);
        self.test.extend_from_slice(&samples[bounds.test]);
    }

    /// Put every sample into a single slice
    pub fn extend_stage(&mut self, stage: Stage, samples: impl IntoIterator<Item = Sample<L>>) {
        self.stage_mut(stage).extend(samples);
    }

    pub fn stage(&self, stage: Stage) -> &[Sample<L>] {
        match stage {
            Stage::Train => &self.train,
            Stage::Val => &self.val,
            Stage::Test => &self.test,
        }
    }

    fn stage_mut(&mut self, stage: Stage) -> &mut Vec<Sample<L>> {
        match stage {
            Stage::Train => &mut self.train,
            Stage::Val => &mut self.val,
            Stage::Test => &mut self.test,
        }
    }

    pub fn len(&self, stage: Stage) -> usize {
        self.stage(stage).len()
    }

    pub fn is_empty(&self) -> bool {
        Stage::ALL.iter().all(|s| self.len(*s) == 0)
    }
}

impl<L: Clone> Default for Split<L> {
    fn default() -> Self {
        Self::new()
    }
}
