use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::models::Attributes;

/// One row of a `name,x,y,ra,rb,f,d` table
#[derive(Debug, Deserialize)]
struct AttributeRecord {
    name: String,
    x: f32,
    y: f32,
    ra: f32,
    rb: f32,
    f: f32,
    d: f32,
}

impl AttributeRecord {
    fn values(&self) -> Attributes {
        [self.x, self.y, self.ra, self.rb, self.f, self.d]
    }
}

/// Read a table of per-image attributes keyed by left image file name.
/// Used for both ground-truth labels and model predictions.
pub fn read_attribute_table(path: &Path) -> Result<HashMap<String, Attributes>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut table = HashMap::new();
    for (line, record) in reader.deserialize::<AttributeRecord>().enumerate() {
        // +2: header row and 1-based lines
        let record =
            record.with_context(|| format!("{}: bad row at line {}", path.display(), line + 2))?;
        let values = record.values();
        if table.insert(record.name.clone(), values).is_some() {
            anyhow::bail!("{}: duplicate entry for '{}'", path.display(), record.name);
        }
    }
    Ok(table)
}
