use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use imageproc::contrast::{threshold, ThresholdType};
use ndarray::Array3;

use crate::error::DatasetError;
use crate::models::Roi;

// BGR to gray weights (0.299, 0.587, 0.114) in 14-bit fixed point
const GRAY_SHIFT: u32 = 14;
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;

/// Crop the region of interest out of an image
pub fn crop_roi(img: &DynamicImage, roi: &Roi) -> Result<DynamicImage, DatasetError> {
    let (width, height) = img.dimensions();
    if !roi.fits(width, height) {
        return Err(DatasetError::ImageTooSmall {
            width,
            height,
            roi: *roi,
        });
    }
    Ok(img.crop_imm(roi.left, roi.top, roi.width(), roi.height()))
}

/// Convert image to grayscale with the luma weights the sensor models were trained with
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let sum = r as u32 * R_WEIGHT + g as u32 * G_WEIGHT + b as u32 * B_WEIGHT;
        Luma([((sum + (1 << (GRAY_SHIFT - 1))) >> GRAY_SHIFT) as u8])
    })
}

/// Pixels strictly above `level` become 255, the rest 0
pub fn binarize(img: &GrayImage, level: u8) -> GrayImage {
    threshold(img, level, ThresholdType::Binary)
}

/// Output length of a dimension scaled by `factor`
pub fn scaled_dim(dim: u32, factor: f32) -> u32 {
    (dim as f64 * factor as f64).floor() as u32
}

/// Nearest-neighbour resize by a uniform factor.
/// Output pixel (x, y) samples source (floor(x / factor), floor(y / factor)).
pub fn resize_nearest(img: &GrayImage, factor: f32) -> GrayImage {
    let (width, height) = img.dimensions();
    let new_w = scaled_dim(width, factor);
    let new_h = scaled_dim(height, factor);
    let inv = 1.0 / factor as f64;

    GrayImage::from_fn(new_w, new_h, |x, y| {
        let sx = ((x as f64 * inv).floor() as u32).min(width - 1);
        let sy = ((y as f64 * inv).floor() as u32).min(height - 1);
        *img.get_pixel(sx, sy)
    })
}

/// Stack the left and right images into an H x W x 2 tensor (channel 0 = left)
pub fn stack_channels(left: &GrayImage, right: &GrayImage) -> anyhow::Result<Array3<f32>> {
    if left.dimensions() != right.dimensions() {
        anyhow::bail!(
            "Left and right images differ in size: {:?} vs {:?}",
            left.dimensions(),
            right.dimensions()
        );
    }
    let (width, height) = left.dimensions();
    Ok(Array3::from_shape_fn(
        (height as usize, width as usize, 2),
        |(y, x, c)| {
            let img = if c == 0 { left } else { right };
            img.get_pixel(x as u32, y as u32)[0] as f32
        },
    ))
}
