#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from tactile_pipeline for tests
pub use tactile_pipeline::dataset::{ClsDataset, Domain, RgDataset, SplitDataset};
pub use tactile_pipeline::{DatasetError, PipelineConfig, Stage};
