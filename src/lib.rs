pub mod config;
pub mod dataset;
pub mod debug;
pub mod error;
pub mod manifest;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod report;

pub use config::{PipelineConfig, PreprocessConfig};
pub use dataset::{
    BatchReader, Batch, ClassLabel, ClsDataset, Domain, Label, RgDataset, Sample, Split,
    SplitDataset, SplitRatios,
};
pub use error::DatasetError;
pub use models::{Attribute, Attributes, ImagePair, Roi, Side, Stage, NUM_ATTRIBUTES};
pub use pipeline::{Pipeline, PipelineContext, PipelineData, PipelineStep};
pub use preprocessing::Preprocessor;
pub use report::{ErrorStats, ForceCorrection, Report, ReportSummary};
