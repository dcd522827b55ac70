use std::path::PathBuf;
use thiserror::Error;

use crate::models::{Roi, Stage};

/// Failures of the dataset layer that callers may want to match on
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The expected directory does not exist
    #[error("Data folder not found: {}", .0.display())]
    MissingFolder(PathBuf),

    /// A folder has a different number of left and right images
    #[error("Unpaired images in {}: {left} left vs {right} right", .folder.display())]
    SideMismatch {
        folder: PathBuf,
        left: usize,
        right: usize,
    },

    /// An image pair has no row in the label table
    #[error("No label for '{name}' in {}", .table.display())]
    MissingLabel { name: String, table: PathBuf },

    /// An image is smaller than the crop region
    #[error("Image {width}x{height} does not contain ROI {roi}")]
    ImageTooSmall { width: u32, height: u32, roi: Roi },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A direct batch starts past the end of its slice
    #[error("Batch start {start} out of range for {stage} slice of {len}")]
    BatchOutOfRange { stage: Stage, start: usize, len: usize },

    #[error("Direct batches are only available for val and test, not {0}")]
    UnsupportedStage(Stage),

    #[error("The {0} slice is empty")]
    EmptySplit(Stage),
}
