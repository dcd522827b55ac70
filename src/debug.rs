//! Dump every preprocessing stage of a few random pairs for visual inspection.

use anyhow::{Context, Result};
use image::{imageops, DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::dataset::{Label, Sample};
use crate::error::DatasetError;
use crate::models::{Roi, Stage};
use crate::preprocessing::Preprocessor;

const ROI_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const ROI_THICKNESS: u32 = 2;

/// Write `s1_roi_*` .. `s5_resize_*` side-by-side images for `count` random samples.
/// Returns the written paths.
pub fn dump_stages<L: Label, R: Rng>(
    samples: &[Sample<L>],
    preprocessor: &Preprocessor,
    count: usize,
    folder: &Path,
    rng: &mut R,
) -> Result<Vec<PathBuf>> {
    if samples.is_empty() {
        return Err(DatasetError::EmptySplit(Stage::Train).into());
    }
    fs::create_dir_all(folder).with_context(|| format!("Failed to create {}", folder.display()))?;

    let roi = preprocessor.config().roi;
    let mut written = Vec::new();

    for _ in 0..count {
        let sample = &samples[rng.gen_range(0..samples.len())];
        let left = preprocessor.trace(&sample.pair.left)?;
        let right = preprocessor.trace(&sample.pair.right)?;
        let base = sample.pair.name();

        for (idx, ((name, l), (_, r))) in left.iter().zip(right.iter()).enumerate() {
            // the input stage is shown with the crop region drawn on it
            let (tag, canvas) = if idx == 0 {
                ("roi", side_by_side(&draw_roi(&l.image, &roi), &draw_roi(&r.image, &roi)))
            } else {
                (name.as_str(), side_by_side(&l.image, &r.image))
            };

            let path = folder.join(format!("s{}_{}_{}", idx + 1, tag, base));
            canvas.save(&path).map_err(|e| {
                anyhow::anyhow!("Failed to save debug image {}: {}", path.display(), e)
            })?;
            written.push(path);
        }
    }

    info!("Saved {} debug images to {}", written.len(), folder.display());
    Ok(written)
}

/// Outline the ROI with its corners `(left, top)` and `(right, bottom)` both
/// inclusive. The border is centred on those edges, so with a thickness of 2 it
/// covers `left - 1 ..= left` and `right ..= right + 1`. Parts outside the frame
/// are clipped.
fn draw_roi(img: &DynamicImage, roi: &Roi) -> DynamicImage {
    let mut canvas = img.to_rgb8();
    let half = (ROI_THICKNESS / 2) as i32;
    for k in 0..ROI_THICKNESS as i32 {
        let offset = k - half;
        let width = roi.width() as i32 + 1 - 2 * offset;
        let height = roi.height() as i32 + 1 - 2 * offset;
        if width <= 0 || height <= 0 {
            break;
        }
        let rect = Rect::at(roi.left as i32 + offset, roi.top as i32 + offset)
            .of_size(width as u32, height as u32);
        draw_hollow_rect_mut(&mut canvas, rect, ROI_COLOR);
    }
    DynamicImage::ImageRgb8(canvas)
}

/// Place two images next to each other, left first
fn side_by_side(left: &DynamicImage, right: &DynamicImage) -> DynamicImage {
    let width = left.width() + right.width();
    let height = left.height().max(right.height());

    match (left, right) {
        (DynamicImage::ImageLuma8(l), DynamicImage::ImageLuma8(r)) => {
            let mut canvas = GrayImage::new(width, height);
            imageops::replace(&mut canvas, l, 0, 0);
            imageops::replace(&mut canvas, r, l.width() as i64, 0);
            DynamicImage::ImageLuma8(canvas)
        }
        _ => {
            let mut canvas = RgbImage::new(width, height);
            imageops::replace(&mut canvas, &left.to_rgb8(), 0, 0);
            imageops::replace(&mut canvas, &right.to_rgb8(), left.width() as i64, 0);
            DynamicImage::ImageRgb8(canvas)
        }
    }
}
