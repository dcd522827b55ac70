use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Result;
use tracing::debug;

/// Data that flows through the pipeline
#[derive(Clone)]
pub struct PipelineData {
    /// The image data (can be grayscale or color)
    pub image: DynamicImage,
}

impl PipelineData {
    /// Create PipelineData for a full image
    pub fn from_image(image: DynamicImage) -> Self {
        Self { image }
    }
}

/// Context available to all pipeline steps
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    /// File the input image was read from, for error messages
    pub source: Option<PathBuf>,
}

impl PipelineContext {
    pub fn for_file(path: &Path) -> Self {
        Self {
            source: Some(path.to_path_buf()),
        }
    }

    pub fn source_display(&self) -> String {
        self.source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string())
    }
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Transform one image
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData>;

    /// Short name for this step (used in logs and debug file names)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
#[derive(Clone)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order and return the final image
    pub fn run(&self, input: DynamicImage, context: &PipelineContext) -> Result<PipelineData> {
        self.run_partial(input, self.steps.len(), context)
    }

    /// Run every step and keep the output of each one, in step order
    pub fn run_traced(
        &self,
        input: DynamicImage,
        context: &PipelineContext,
    ) -> Result<Vec<(String, PipelineData)>> {
        let mut data = PipelineData::from_image(input);
        let mut trace = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            data = step.process(data, context)?;
            debug!(
                "{}: {} -> {}x{}",
                context.source_display(),
                step.name(),
                data.image.width(),
                data.image.height()
            );
            trace.push((step.name().to_string(), data.clone()));
        }

        Ok(trace)
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(
        &self,
        input: DynamicImage,
        num_steps: usize,
        context: &PipelineContext,
    ) -> Result<PipelineData> {
        let mut data = PipelineData::from_image(input);

        for step in self.steps.iter().take(num_steps) {
            data = step.process(data, context)?;
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
