use image::{ImageBuffer, Rgb, RgbImage};
use std::fs;
use std::path::Path;
use tactile_pipeline::PipelineConfig;
use tempfile::TempDir;

/// Size of the synthetic camera frames; large enough to contain the default ROI
pub const FRAME_WIDTH: u32 = 600;
pub const FRAME_HEIGHT: u32 = 400;

/// Dark frame with a bright block at rows/cols given in full-frame coordinates
pub fn membrane_frame(rows: std::ops::Range<u32>, cols: std::ops::Range<u32>) -> RgbImage {
    ImageBuffer::from_fn(FRAME_WIDTH, FRAME_HEIGHT, |x, y| {
        if rows.contains(&y) && cols.contains(&x) {
            Rgb([200u8, 200u8, 200u8])
        } else {
            Rgb([5u8, 5u8, 5u8])
        }
    })
}

/// Writes `<index>_L_.png` and `<index>_R_.png` into `folder`
pub fn write_pair(folder: &Path, index: usize) {
    fs::create_dir_all(folder).expect("Failed to create fixture folder");
    let left = membrane_frame(20..40, 90..110);
    let right = membrane_frame(100..120, 200..220);
    left.save(folder.join(format!("{:04}_L_.png", index)))
        .expect("Failed to save left image");
    right
        .save(folder.join(format!("{:04}_R_.png", index)))
        .expect("Failed to save right image");
}

/// Creates `cls_<shape>/<shape>_<i>/` with `counts[i]` pairs each.
pub fn create_cls_tree(root: &Path, shape: &str, counts: [usize; 5]) {
    for (class, count) in counts.iter().enumerate() {
        let folder = root.join(format!("cls_{}", shape)).join(format!("{}_{}", shape, class));
        fs::create_dir_all(&folder).expect("Failed to create class folder");
        for i in 0..*count {
            write_pair(&folder, i);
        }
    }
}

/// Label row for pair `i` of a regression fixture: x = i, f = 0.1 * (i + 1)
pub fn rg_label(i: usize) -> [f32; 6] {
    let i = i as f32;
    [i, 2.0 * i, 0.5, -0.5, 0.1 * (i + 1.0), 1.0]
}

/// Creates a regression folder with `n` pairs and a labels.csv
pub fn create_rg_folder(root: &Path, folder: &str, n: usize) {
    let dir = root.join(folder);
    let mut csv = String::from("name,x,y,ra,rb,f,d\n");
    for i in 0..n {
        write_pair(&dir, i);
        let [x, y, ra, rb, f, d] = rg_label(i);
        csv.push_str(&format!("{:04}_L_.png,{},{},{},{},{},{}\n", i, x, y, ra, rb, f, d));
    }
    fs::write(dir.join("labels.csv"), csv).expect("Failed to write labels");
}

/// Temp data root and a config pointing at it.
/// The temp directory must be kept alive for the duration of the test.
pub fn temp_config() -> (PipelineConfig, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let config = PipelineConfig::default().with_data_root(dir.path());
    (config, dir)
}
