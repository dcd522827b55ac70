use crate::models::Roi;
use crate::pipeline::{PipelineContext, PipelineData, PipelineStep};
use crate::preprocessing::ops;
use anyhow::{Context, Result};
use image::DynamicImage;

/// Crop to the sensor membrane region
pub struct CropStep {
    pub roi: Roi,
}

impl PipelineStep for CropStep {
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData> {
        let cropped = ops::crop_roi(&data.image, &self.roi)
            .with_context(|| format!("Cropping {}", context.source_display()))?;

        Ok(PipelineData::from_image(cropped))
    }

    fn name(&self) -> &str {
        "crop"
    }
}

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = ops::to_grayscale(&data.image);
        Ok(PipelineData::from_image(DynamicImage::ImageLuma8(gray)))
    }

    fn name(&self) -> &str {
        "gray"
    }
}

/// Fixed-level binary threshold
pub struct BinarizeStep {
    pub threshold: u8,
}

impl PipelineStep for BinarizeStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = data.image.to_luma8();
        let binary = ops::binarize(&gray, self.threshold);
        Ok(PipelineData::from_image(DynamicImage::ImageLuma8(binary)))
    }

    fn name(&self) -> &str {
        "binary"
    }
}

/// Nearest-neighbour downscale so the binary mask stays binary
pub struct ResizeStep {
    pub factor: f32,
}

impl PipelineStep for ResizeStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = data.image.to_luma8();
        let resized = ops::resize_nearest(&gray, self.factor);
        Ok(PipelineData::from_image(DynamicImage::ImageLuma8(resized)))
    }

    fn name(&self) -> &str {
        "resize"
    }
}
