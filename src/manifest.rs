use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::dataset::{Label, Split};
use crate::models::Stage;

/// Write `<stage>.csv` (`left,right,<label columns>`) for every stage
pub fn write_manifests<L: Label>(split: &Split<L>, folder: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(folder).with_context(|| format!("Failed to create {}", folder.display()))?;

    let mut written = Vec::with_capacity(Stage::ALL.len());
    for stage in Stage::ALL {
        let path = folder.join(format!("{}.csv", stage));
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        let mut header = vec!["left", "right"];
        header.extend_from_slice(L::COLUMNS);
        writer.write_record(&header)?;

        for sample in split.stage(stage) {
            let mut record = vec![
                sample.pair.left.display().to_string(),
                sample.pair.right.display().to_string(),
            ];
            record.extend(sample.label.values().iter().map(|v| v.to_string()));
            writer.write_record(&record)?;
        }
        writer.flush()?;

        info!("Wrote {} {} rows to {}", split.len(stage), stage, path.display());
        written.push(path);
    }
    Ok(written)
}
