pub mod batch;
pub mod cls;
pub mod files;
pub mod labels;
pub mod rg;
pub mod split;

use ndarray::{Array1, ArrayViewMut1};

use crate::models::{Attribute, Attributes, Stage};
use crate::preprocessing::Preprocessor;

pub use batch::{Batch, BatchReader};
pub use cls::{ClassLabel, ClsDataset, NUM_CLASSES};
pub use rg::{Domain, RgDataset};
pub use split::{Sample, Split, SplitBounds, SplitRatios};

/// Target attached to every sample, written as one row of the label tensor
pub trait Label: Clone {
    /// Column names, one per value written by [`Label::fill`]
    const COLUMNS: &'static [&'static str];

    fn fill(&self, row: ArrayViewMut1<'_, f32>);

    fn values(&self) -> Vec<f32> {
        let mut row = Array1::<f32>::zeros(Self::COLUMNS.len());
        self.fill(row.view_mut());
        row.to_vec()
    }
}

impl Label for Attributes {
    const COLUMNS: &'static [&'static str] = &["x", "y", "ra", "rb", "f", "d"];

    fn fill(&self, mut row: ArrayViewMut1<'_, f32>) {
        for attr in Attribute::ALL {
            row[attr.index()] = self[attr.index()];
        }
    }
}

/// A dataset whose samples have been partitioned into train/val/test
pub trait SplitDataset {
    type Label: Label;

    fn split(&self) -> &Split<Self::Label>;

    fn preprocessor(&self) -> &Preprocessor;

    /// Log the dataset parameters and slice sizes
    fn log_summary(&self);

    fn num(&self, stage: Stage) -> usize {
        self.split().len(stage)
    }

    fn batches(&self) -> BatchReader<'_, Self::Label> {
        BatchReader::new(self.split(), self.preprocessor())
    }
}
