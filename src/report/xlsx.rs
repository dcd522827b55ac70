use anyhow::{Context, Result};
use ndarray::Array2;
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};
use std::path::Path;

use crate::models::Attribute;
use crate::report::metrics::ErrorStats;

const INDEX_HEADERS: [&str; 2] = ["No", "Name"];

/// Write the `preds`, `gts` and `l2_error` sheets to `path`
pub fn write_workbook(
    path: &Path,
    names: &[String],
    preds: &Array2<f32>,
    gts: &Array2<f32>,
    stats: &ErrorStats,
) -> Result<()> {
    let mut workbook = build_workbook(names, preds, gts, stats)?;
    workbook
        .save(path)
        .with_context(|| format!("Failed to save workbook {}", path.display()))?;
    Ok(())
}

/// Assemble the workbook in memory
pub fn build_workbook(
    names: &[String],
    preds: &Array2<f32>,
    gts: &Array2<f32>,
    stats: &ErrorStats,
) -> Result<Workbook> {
    let format = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    let mut workbook = Workbook::new();
    for (sheet_name, data) in [("preds", preds), ("gts", gts), ("l2_error", &stats.l2)] {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;
        write_table(worksheet, names, data, &format)?;

        if sheet_name == "l2_error" {
            write_summary(worksheet, names.len(), stats, &format)?;
        }
    }
    Ok(workbook)
}

fn write_table(
    worksheet: &mut Worksheet,
    names: &[String],
    data: &Array2<f32>,
    format: &Format,
) -> Result<()> {
    let headers = INDEX_HEADERS
        .iter()
        .copied()
        .chain(Attribute::ALL.iter().map(|a| a.header()));
    for (col, header) in headers.enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, format)?;
    }

    for (idx, name) in names.iter().enumerate() {
        let row = idx as u32 + 1;
        worksheet.write_string_with_format(row, 0, format!("{:03}", idx), format)?;
        worksheet.write_string_with_format(row, 1, name, format)?;
        for attr in Attribute::ALL {
            let col = attr.index() as u16 + 2;
            let value = data[[idx, attr.index()]] as f64;
            worksheet.write_number_with_format(row, col, value, format)?;
        }
    }
    Ok(())
}

/// Average error row and FSO row below the table
fn write_summary(
    worksheet: &mut Worksheet,
    num_rows: usize,
    stats: &ErrorStats,
    format: &Format,
) -> Result<()> {
    let avg_row = num_rows as u32 + 1;
    worksheet.write_string_with_format(avg_row, 1, "average error", format)?;
    for attr in Attribute::ALL {
        let col = attr.index() as u16 + 2;
        let value = stats.average[attr.index()] as f64;
        worksheet.write_number_with_format(avg_row, col, value, format)?;
    }

    let fso_row = avg_row + 1;
    worksheet.write_string_with_format(fso_row, 1, "FSO", format)?;
    match stats.fso {
        Some(fso) => worksheet.write_number_with_format(fso_row, 2, fso as f64, format)?,
        None => worksheet.write_string_with_format(fso_row, 2, "n/a", format)?,
    };
    Ok(())
}
