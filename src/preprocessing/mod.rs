pub mod ops;
pub mod steps;

use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage, ImageReader};
use ndarray::Array3;
use std::path::Path;
use std::sync::Arc;

use crate::config::PreprocessConfig;
use crate::models::ImagePair;
use crate::pipeline::{Pipeline, PipelineContext, PipelineData};
use steps::{BinarizeStep, CropStep, GrayscaleStep, ResizeStep};

/// Applies the fixed preprocessing chain to image pairs.
///
/// The same instance is used for training batches, evaluation batches and the
/// debug dump, so every consumer sees identical tensors for a given file.
#[derive(Clone)]
pub struct Preprocessor {
    config: PreprocessConfig,
    pipeline: Pipeline,
}

impl Preprocessor {
    pub fn new(config: &PreprocessConfig) -> Self {
        Self {
            config: config.clone(),
            pipeline: build_standard_pipeline(config),
        }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Shape (height, width, channels) of one preprocessed pair
    pub fn input_shape(&self) -> (usize, usize, usize) {
        let roi = &self.config.roi;
        (
            ops::scaled_dim(roi.height(), self.config.resize_factor) as usize,
            ops::scaled_dim(roi.width(), self.config.resize_factor) as usize,
            2,
        )
    }

    /// Run the chain on one decoded image
    pub fn process_image(
        &self,
        image: DynamicImage,
        context: &PipelineContext,
    ) -> Result<GrayImage> {
        let out = self.pipeline.run(image, context)?;
        Ok(out.image.to_luma8())
    }

    /// Load both images of a pair and stack their preprocessed masks
    pub fn process_pair(&self, pair: &ImagePair) -> Result<Array3<f32>> {
        let left =
            self.process_image(load_image(&pair.left)?, &PipelineContext::for_file(&pair.left))?;
        let right =
            self.process_image(load_image(&pair.right)?, &PipelineContext::for_file(&pair.right))?;
        ops::stack_channels(&left, &right)
            .with_context(|| format!("Stacking pair {}", pair.name()))
    }

    /// Every intermediate image of the chain for one file, input first
    pub fn trace(&self, path: &Path) -> Result<Vec<(String, PipelineData)>> {
        let image = load_image(path)?;
        let input = PipelineData::from_image(image.clone());
        let mut trace = vec![("input".to_string(), input)];
        trace.extend(self.pipeline.run_traced(image, &PipelineContext::for_file(path))?);
        Ok(trace)
    }
}

/// Decode an image file
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    ImageReader::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image {}: {}", path.display(), e))
}

/// Build the crop → gray → binarize → resize pipeline
pub fn build_standard_pipeline(config: &PreprocessConfig) -> Pipeline {
    Pipeline::new()
        .add_step(Arc::new(CropStep { roi: config.roi }))
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(BinarizeStep {
            threshold: config.threshold_u8(),
        }))
        .add_step(Arc::new(ResizeStep {
            factor: config.resize_factor,
        }))
}
