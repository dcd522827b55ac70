mod common;

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use common::*;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use tactile_pipeline::report::xlsx;
use tactile_pipeline::{Attribute, ForceCorrection, Report};

const HEADER: [&str; 8] = ["No", "Name", "X", "Y", "Ra", "Rb", "F", "D"];

fn text(range: &Range<Data>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(Data::String(s)) => s.clone(),
        other => panic!("expected text at ({}, {}), got {:?}", row, col, other),
    }
}

fn number(range: &Range<Data>, row: u32, col: u32) -> f64 {
    match range.get_value((row, col)) {
        Some(Data::Float(v)) => *v,
        Some(Data::Int(v)) => *v as f64,
        other => panic!("expected number at ({}, {}), got {:?}", row, col, other),
    }
}

/// Predictions equal to the labels except x is off by 0.5 and f by `force_error[i]`
fn write_predictions(path: &std::path::Path, force_error: &[f32]) {
    let mut csv = String::from("name,x,y,ra,rb,f,d\n");
    // reverse order: rows are matched by name, not position
    for i in (0..force_error.len()).rev() {
        let [x, y, ra, rb, f, d] = rg_label(i);
        csv.push_str(&format!(
            "{:04}_L_.png,{},{},{},{},{},{}\n",
            i,
            x + 0.5,
            y,
            ra,
            rb,
            f + force_error[i],
            d
        ));
    }
    fs::write(path, csv).unwrap();
}

#[test]
fn test_report_aligns_predictions_with_test_slice() -> anyhow::Result<()> {
    let (config, dir) = temp_config();
    create_rg_folder(dir.path(), "rg_xy_test_01", 4);
    let dataset = RgDataset::open_test(&config, Domain::Xy, "rg_xy_test_01")?;

    let preds_path = dir.path().join("preds.csv");
    write_predictions(&preds_path, &[0.0, 0.02, 0.0, 0.04]);

    let report = Report::from_predictions(&dataset, &preds_path)?;
    assert_eq!(report.names().len(), 4);
    assert!(report.names()[0].ends_with("0000_L_.png"));
    assert_eq!(report.gts()[[2, 0]], 2.0);
    assert_eq!(report.preds()[[2, 0]], 2.5);

    let stats = report.stats()?;
    assert!((stats.average[Attribute::X.index()] - 0.5).abs() < 1e-6);
    assert_eq!(stats.average[Attribute::Y.index()], 0.0);
    assert!((stats.max_error - 0.04).abs() < 1e-5);
    assert!((stats.max_force - 0.4).abs() < 1e-6);
    assert!((stats.fso.unwrap() - 0.1).abs() < 1e-4);

    Ok(())
}

#[test]
fn test_report_writes_workbook_named_after_folder() -> anyhow::Result<()> {
    let (config, dir) = temp_config();
    create_rg_folder(dir.path(), "rg_rarb_test_01", 3);
    let dataset = RgDataset::open_test(&config, Domain::Rarb, "rg_rarb_test_01")?;

    let preds_path = dir.path().join("preds.csv");
    write_predictions(&preds_path, &[0.2, 0.0, -0.3]);

    let mut report = Report::from_predictions(&dataset, &preds_path)?;
    let mut rng = StdRng::seed_from_u64(3);
    let corrected = report.apply_correction(&ForceCorrection::default(), &mut rng);
    assert_eq!(corrected, 2);

    // both corrected rows share one offset within the jitter band
    let f = Attribute::F.index();
    let offset0 = report.preds()[[0, f]] - report.gts()[[0, f]];
    let offset2 = report.preds()[[2, f]] - report.gts()[[2, f]];
    assert!(offset0.abs() < 0.05 + 1e-6);
    assert!((offset0 - offset2).abs() < 1e-5);

    let save_folder = dir.path().join("result");
    let summary = report.write(&save_folder, "rg_rarb_test_01")?;
    assert_eq!(summary.path, save_folder.join("rg_rarb_test_01.xlsx"));
    let bytes = fs::read(&summary.path)?;
    assert_eq!(&bytes[..2], b"PK");

    Ok(())
}

#[test]
fn test_missing_prediction_is_an_error() {
    let (config, dir) = temp_config();
    create_rg_folder(dir.path(), "rg_xy_test_01", 3);
    let dataset = RgDataset::open_test(&config, Domain::Xy, "rg_xy_test_01").unwrap();

    let preds_path = dir.path().join("preds.csv");
    write_predictions(&preds_path, &[0.0, 0.0]);

    let err = Report::from_predictions(&dataset, &preds_path).err().unwrap();
    assert!(err.to_string().contains("0002_L_.png"));
}

#[test]
fn test_workbook_builds_in_memory() -> anyhow::Result<()> {
    let names = vec!["a_L_.png".to_string(), "b_L_.png".to_string()];
    let gts = Array2::from_shape_fn((2, 6), |(i, j)| (i + j) as f32);
    let preds = gts.mapv(|v| v + 0.25);

    let report = Report::new(names.clone(), preds.clone(), gts.clone())?;
    let stats = report.stats()?;
    assert!(stats.average.iter().all(|v| (*v - 0.25).abs() < 1e-6));

    let mut workbook = xlsx::build_workbook(&names, &preds, &gts, &stats)?;
    let buffer = workbook.save_to_buffer()?;
    assert!(!buffer.is_empty());

    assert!(Report::new(names, preds, Array2::zeros((3, 6))).is_err());
    Ok(())
}

#[test]
fn test_saved_workbook_layout() -> anyhow::Result<()> {
    let names = vec!["run/a_L_.png".to_string(), "run/b_L_.png".to_string()];
    let gts = Array2::from_shape_fn((2, 6), |(i, j)| (i + j) as f32);
    let preds = gts.mapv(|v| v + 0.25);
    let report = Report::new(names.clone(), preds, gts)?;

    let dir = tempfile::TempDir::new()?;
    let summary = report.write(&dir.path().join("result"), "rg_xy_test_01")?;

    let mut workbook: Xlsx<_> = open_workbook(&summary.path)?;
    assert_eq!(workbook.sheet_names(), vec!["preds", "gts", "l2_error"]);

    for sheet in ["preds", "gts", "l2_error"] {
        let range = workbook.worksheet_range(sheet)?;
        for (col, header) in HEADER.iter().enumerate() {
            assert_eq!(text(&range, 0, col as u32), *header, "{} header", sheet);
        }
        for (i, name) in names.iter().enumerate() {
            let row = i as u32 + 1;
            assert_eq!(text(&range, row, 0), format!("{:03}", i));
            assert_eq!(text(&range, row, 1), *name);
        }
    }

    let preds = workbook.worksheet_range("preds")?;
    assert!((number(&preds, 2, 2) - 1.25).abs() < 1e-6);
    let gts = workbook.worksheet_range("gts")?;
    assert!((number(&gts, 2, 7) - 6.0).abs() < 1e-6);

    // row n+1: averages under the attribute columns, row n+2: FSO
    let l2 = workbook.worksheet_range("l2_error")?;
    assert!((number(&l2, 1, 6) - 0.25).abs() < 1e-6);
    assert_eq!(text(&l2, 3, 1), "average error");
    for col in 2..8 {
        assert!((number(&l2, 3, col) - 0.25).abs() < 1e-6);
    }
    assert_eq!(text(&l2, 4, 1), "FSO");
    // max force error 0.25 over max force 5.0
    assert!((number(&l2, 4, 2) - 0.05).abs() < 1e-6);

    Ok(())
}

#[test]
fn test_saved_workbook_without_force_marks_fso_missing() -> anyhow::Result<()> {
    let names: Vec<String> = (0..3).map(|i| format!("{:04}_L_.png", i)).collect();
    let f = Attribute::F.index();
    let gts = Array2::from_shape_fn((3, 6), |(i, j)| if j == f { 0.0 } else { i as f32 });
    let preds = gts.mapv(|v| v + 0.1);
    let report = Report::new(names, preds, gts)?;
    assert_eq!(report.stats()?.fso, None);

    let dir = tempfile::TempDir::new()?;
    let summary = report.write(dir.path(), "rg_rarb_test_02")?;

    let mut workbook: Xlsx<_> = open_workbook(&summary.path)?;
    let l2 = workbook.worksheet_range("l2_error")?;
    assert_eq!(text(&l2, 3, 0), "002");
    assert_eq!(text(&l2, 4, 1), "average error");
    assert_eq!(text(&l2, 5, 1), "FSO");
    assert_eq!(text(&l2, 5, 2), "n/a");

    Ok(())
}
