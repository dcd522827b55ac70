mod common;

use common::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_random_batch_shape_and_labels() -> anyhow::Result<()> {
    let (config, dir) = temp_config();
    create_cls_tree(dir.path(), "circle", [5; 5]);
    let dataset = ClsDataset::open(&config, "circle")?;

    let mut rng = StdRng::seed_from_u64(42);
    let batch = dataset.batches().random_batch(&mut rng, 4)?;

    assert_eq!(batch.len(), 4);
    assert_eq!(batch.images.shape(), &[4, 185, 242, 2]);
    assert_eq!(batch.labels.shape(), &[4, 1]);
    assert!(batch.labels.iter().all(|l| (0.0..=4.0).contains(l)));
    // every fixture pair has the same left block at the ROI origin
    assert_eq!(batch.images[[0, 5, 5, 0]], 255.0);

    // same seed, same draw
    let mut again = StdRng::seed_from_u64(42);
    let repeat = dataset.batches().random_batch(&mut again, 4)?;
    assert_eq!(repeat.labels, batch.labels);

    Ok(())
}

#[test]
fn test_direct_batch_truncates_at_end() -> anyhow::Result<()> {
    let (config, dir) = temp_config();
    create_cls_tree(dir.path(), "circle", [5; 5]);
    let dataset = ClsDataset::open(&config, "circle")?;
    let reader = dataset.batches();

    let batch = reader.direct_batch(3, 3, Stage::Val)?;
    assert_eq!(batch.len(), 2);
    let labels: Vec<f32> = batch.labels.iter().copied().collect();
    assert_eq!(labels, vec![3.0, 4.0]);

    let batch = reader.direct_batch(2, 0, Stage::Test)?;
    let labels: Vec<f32> = batch.labels.iter().copied().collect();
    assert_eq!(labels, vec![0.0, 1.0]);

    Ok(())
}

#[test]
fn test_direct_batch_with_unbounded_size_stops_at_end() -> anyhow::Result<()> {
    let (config, dir) = temp_config();
    create_cls_tree(dir.path(), "circle", [5; 5]);
    let dataset = ClsDataset::open(&config, "circle")?;

    // "everything from here on" must not overflow the end index
    let batch = dataset.batches().direct_batch(usize::MAX, 1, Stage::Val)?;
    assert_eq!(batch.len(), 4);
    let labels: Vec<f32> = batch.labels.iter().copied().collect();
    assert_eq!(labels, vec![1.0, 2.0, 3.0, 4.0]);

    Ok(())
}

#[test]
fn test_direct_batch_rejects_bad_requests() {
    let (config, dir) = temp_config();
    create_cls_tree(dir.path(), "circle", [5; 5]);
    let dataset = ClsDataset::open(&config, "circle").unwrap();
    let reader = dataset.batches();

    let err = reader.direct_batch(2, 0, Stage::Train).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<DatasetError>(),
        Some(DatasetError::UnsupportedStage(Stage::Train))
    ));

    let err = reader.direct_batch(2, 5, Stage::Val).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<DatasetError>(),
        Some(DatasetError::BatchOutOfRange { start: 5, len: 5, .. })
    ));
}

#[test]
fn test_regression_batch_carries_all_attributes() -> anyhow::Result<()> {
    let (config, dir) = temp_config();
    create_rg_folder(dir.path(), "rg_rarb_test_01", 3);
    let dataset = RgDataset::open_test(&config, Domain::Rarb, "rg_rarb_test_01")?;

    let batch = dataset.batches().direct_batch(8, 1, Stage::Test)?;
    assert_eq!(batch.images.shape(), &[2, 185, 242, 2]);
    assert_eq!(batch.labels.shape(), &[2, 6]);
    let row: Vec<f32> = batch.labels.row(0).to_vec();
    assert_eq!(row, rg_label(1).to_vec());

    // no train slice in a held-out folder
    let mut rng = StdRng::seed_from_u64(1);
    let err = dataset.batches().random_batch(&mut rng, 1).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<DatasetError>(),
        Some(DatasetError::EmptySplit(Stage::Train))
    ));

    Ok(())
}
