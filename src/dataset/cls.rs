use anyhow::Result;
use ndarray::ArrayViewMut1;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::PipelineConfig;
use crate::dataset::files::pair_files;
use crate::dataset::{Label, Sample, Split, SplitDataset};
use crate::models::{ImagePair, Stage};
use crate::preprocessing::Preprocessor;

/// Number of contact-shape classes per shape family
pub const NUM_CLASSES: usize = 5;

/// Index of a contact-shape class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassLabel(pub u8);

impl Label for ClassLabel {
    const COLUMNS: &'static [&'static str] = &["label"];

    fn fill(&self, mut row: ArrayViewMut1<'_, f32>) {
        row[0] = self.0 as f32;
    }
}

/// Shape classification data: `<root>/cls_<shape>/<shape>_<i>/` for each class `i`
pub struct ClsDataset {
    shape: String,
    config: PipelineConfig,
    classes: Vec<Vec<ImagePair>>,
    split: Split<ClassLabel>,
    preprocessor: Preprocessor,
}

impl ClsDataset {
    pub fn open(config: &PipelineConfig, shape: &str) -> Result<Self> {
        config.validate()?;

        let mut classes = Vec::with_capacity(NUM_CLASSES);
        let mut split = Split::new();

        for class in 0..NUM_CLASSES {
            let folder = class_folder(&config.data_root, shape, class);
            let pairs = pair_files(&folder, &config.img_format)?;

            let samples: Vec<Sample<ClassLabel>> = pairs
                .iter()
                .cloned()
                .map(|pair| Sample {
                    pair,
                    label: ClassLabel(class as u8),
                })
                .collect();
            split.extend_class(&samples, &config.split);
            classes.push(pairs);
        }

        Ok(Self {
            shape: shape.to_string(),
            config: config.clone(),
            classes,
            split,
            preprocessor: Preprocessor::new(&config.preprocess),
        })
    }

    pub fn shape(&self) -> &str {
        &self.shape
    }

    /// All pairs of one class, before splitting
    pub fn class_pairs(&self, class: usize) -> &[ImagePair] {
        &self.classes[class]
    }
}

/// Folder holding the images of one class
pub fn class_folder(data_root: &Path, shape: &str, class: usize) -> PathBuf {
    data_root
        .join(format!("cls_{}", shape))
        .join(format!("{}_{}", shape, class))
}

impl SplitDataset for ClsDataset {
    type Label = ClassLabel;

    fn split(&self) -> &Split<ClassLabel> {
        &self.split
    }

    fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    fn log_summary(&self) {
        let pre = &self.config.preprocess;
        info!("Dataset parameters:");
        info!("  shape:              {}", self.shape);
        info!("  img_format:         {}", self.config.img_format);
        info!("  resize_factor:      {}", pre.resize_factor);
        info!("  roi:                {}", pre.roi);
        info!("  binarize_threshold: {}", pre.binarize_threshold);
        for (class, pairs) in self.classes.iter().enumerate() {
            info!("  class {} pairs:      {}", class, pairs.len());
        }
        for stage in Stage::ALL {
            info!("  {:<19} {}", format!("{} pairs:", stage), self.num(stage));
        }
        info!("  input_shape:        {:?}", self.preprocessor.input_shape());
    }
}
