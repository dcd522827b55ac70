use anyhow::Result;
use ndarray::{s, Array2, Array4};
use rand::Rng;
use tracing::debug;

use crate::dataset::{Label, Sample, Split};
use crate::error::DatasetError;
use crate::models::Stage;
use crate::preprocessing::Preprocessor;

/// Preprocessed images (N x H x W x 2) and their targets (N x k)
#[derive(Debug, Clone)]
pub struct Batch {
    pub images: Array4<f32>,
    pub labels: Array2<f32>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.images.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Turns index lists over a [`Split`] into tensor batches
pub struct BatchReader<'a, L> {
    split: &'a Split<L>,
    preprocessor: &'a Preprocessor,
}

impl<'a, L: Label> BatchReader<'a, L> {
    pub fn new(split: &'a Split<L>, preprocessor: &'a Preprocessor) -> Self {
        Self {
            split,
            preprocessor,
        }
    }

    /// `batch_size` train samples drawn uniformly with replacement
    pub fn random_batch<R: Rng>(&self, rng: &mut R, batch_size: usize) -> Result<Batch> {
        let train = self.split.stage(Stage::Train);
        if train.is_empty() {
            return Err(DatasetError::EmptySplit(Stage::Train).into());
        }

        let samples: Vec<&Sample<L>> = (0..batch_size)
            .map(|_| &train[rng.gen_range(0..train.len())])
            .collect();
        self.read(&samples)
    }

    /// Contiguous val/test samples `[start_index, start_index + batch_size)`,
    /// truncated at the end of the slice
    pub fn direct_batch(
        &self,
        batch_size: usize,
        start_index: usize,
        stage: Stage,
    ) -> Result<Batch> {
        if stage == Stage::Train {
            return Err(DatasetError::UnsupportedStage(stage).into());
        }

        let samples = self.split.stage(stage);
        if start_index >= samples.len() {
            return Err(DatasetError::BatchOutOfRange {
                stage,
                start: start_index,
                len: samples.len(),
            }
            .into());
        }

        let end_index = start_index.saturating_add(batch_size).min(samples.len());
        let selected: Vec<&Sample<L>> = samples[start_index..end_index].iter().collect();
        self.read(&selected)
    }

    /// Preprocess the given samples into one batch
    pub fn read(&self, samples: &[&Sample<L>]) -> Result<Batch> {
        let (height, width, channels) = self.preprocessor.input_shape();
        let mut images = Array4::<f32>::zeros((samples.len(), height, width, channels));
        let mut labels = Array2::<f32>::zeros((samples.len(), L::COLUMNS.len()));

        for (i, sample) in samples.iter().enumerate() {
            let stacked = self.preprocessor.process_pair(&sample.pair)?;
            images.slice_mut(s![i, .., .., ..]).assign(&stacked);
            sample.label.fill(labels.row_mut(i));
        }

        debug!("Read batch of {} samples", samples.len());
        Ok(Batch { images, labels })
    }
}
