use anyhow::Result;
use std::fmt;
use std::path::Path;
use tracing::info;

use crate::config::PipelineConfig;
use crate::dataset::files::pair_files;
use crate::dataset::labels::read_attribute_table;
use crate::dataset::{Sample, Split, SplitDataset};
use crate::error::DatasetError;
use crate::models::{Attribute, Attributes, Stage, NUM_ATTRIBUTES};
use crate::preprocessing::Preprocessor;

/// Name of the label table inside every regression folder
pub const LABELS_FILE: &str = "labels.csv";

/// Which positional attributes a regression run was recorded for
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Domain {
    Xy,
    Rarb,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Xy => "xy",
            Domain::Rarb => "rarb",
        }
    }

    /// Folder of the training recordings for this domain
    pub fn train_folder(&self) -> String {
        format!("rg_{}_train", self.as_str())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Force/position regression data from a single folder of pairs plus `labels.csv`
pub struct RgDataset {
    domain: Domain,
    data_folder: String,
    config: PipelineConfig,
    num_pairs: usize,
    split: Split<Attributes>,
    min_values: Attributes,
    max_values: Attributes,
    preprocessor: Preprocessor,
}

impl RgDataset {
    /// Training recordings, partitioned into train/val/test
    pub fn open_train(config: &PipelineConfig, domain: Domain) -> Result<Self> {
        Self::open(config, domain, &domain.train_folder(), false)
    }

    /// A held-out recording; every pair goes into the test slice in file order
    pub fn open_test(config: &PipelineConfig, domain: Domain, data_folder: &str) -> Result<Self> {
        Self::open(config, domain, data_folder, true)
    }

    fn open(
        config: &PipelineConfig,
        domain: Domain,
        data_folder: &str,
        test_only: bool,
    ) -> Result<Self> {
        config.validate()?;

        let folder = config.data_root.join(data_folder);
        let samples = load_samples(&folder, &config.img_format)?;
        let (min_values, max_values) = attribute_range(&samples);

        let mut split = Split::new();
        if test_only {
            split.extend_stage(Stage::Test, samples.iter().cloned());
        } else {
            split.extend_class(&samples, &config.split);
        }

        Ok(Self {
            domain,
            data_folder: data_folder.to_string(),
            config: config.clone(),
            num_pairs: samples.len(),
            split,
            min_values,
            max_values,
            preprocessor: Preprocessor::new(&config.preprocess),
        })
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn data_folder(&self) -> &str {
        &self.data_folder
    }

    pub fn min_values(&self) -> &Attributes {
        &self.min_values
    }

    pub fn max_values(&self) -> &Attributes {
        &self.max_values
    }

    /// Scale each attribute into [0, 1] using the label range.
    /// Attributes with an empty range map to 0.
    pub fn normalize(&self, values: &Attributes) -> Attributes {
        let mut out = [0.0; NUM_ATTRIBUTES];
        for i in 0..NUM_ATTRIBUTES {
            let span = self.max_values[i] - self.min_values[i];
            if span > 0.0 {
                out[i] = (values[i] - self.min_values[i]) / span;
            }
        }
        out
    }

    pub fn denormalize(&self, values: &Attributes) -> Attributes {
        let mut out = [0.0; NUM_ATTRIBUTES];
        for i in 0..NUM_ATTRIBUTES {
            out[i] = values[i] * (self.max_values[i] - self.min_values[i]) + self.min_values[i];
        }
        out
    }
}

/// Pair the images of a folder and attach their rows from the label table
pub fn load_samples(folder: &Path, img_format: &str) -> Result<Vec<Sample<Attributes>>> {
    let pairs = pair_files(folder, img_format)?;
    let table_path = folder.join(LABELS_FILE);
    let table = read_attribute_table(&table_path)?;

    pairs
        .into_iter()
        .map(|pair| -> Result<Sample<Attributes>> {
            let name = pair.name();
            match table.get(&name) {
                Some(label) => Ok(Sample { pair, label: *label }),
                None => Err(DatasetError::MissingLabel {
                    name,
                    table: table_path.clone(),
                }
                .into()),
            }
        })
        .collect()
}

/// Per-attribute minimum and maximum; zeros when there are no samples
fn attribute_range(samples: &[Sample<Attributes>]) -> (Attributes, Attributes) {
    let Some(first) = samples.first() else {
        return ([0.0; NUM_ATTRIBUTES], [0.0; NUM_ATTRIBUTES]);
    };

    let mut min_values = first.label;
    let mut max_values = first.label;
    for sample in &samples[1..] {
        for i in 0..NUM_ATTRIBUTES {
            min_values[i] = min_values[i].min(sample.label[i]);
            max_values[i] = max_values[i].max(sample.label[i]);
        }
    }
    (min_values, max_values)
}

impl SplitDataset for RgDataset {
    type Label = Attributes;

    fn split(&self) -> &Split<Attributes> {
        &self.split
    }

    fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    fn log_summary(&self) {
        let pre = &self.config.preprocess;
        info!("Dataset parameters:");
        info!("  domain:             {}", self.domain);
        info!("  data_folder:        {}", self.data_folder);
        info!("  img_format:         {}", self.config.img_format);
        info!("  resize_factor:      {}", pre.resize_factor);
        info!("  roi:                {}", pre.roi);
        info!("  binarize_threshold: {}", pre.binarize_threshold);
        info!("  labelled pairs:     {}", self.num_pairs);
        for stage in Stage::ALL {
            info!("  {:<19} {}", format!("{} pairs:", stage), self.num(stage));
        }
        for attr in Attribute::ALL {
            info!(
                "  {:<2} range:          [{:.3}, {:.3}]",
                attr.header(),
                self.min_values[attr.index()],
                self.max_values[attr.index()]
            );
        }
        info!("  input_shape:        {:?}", self.preprocessor.input_shape());
    }
}
