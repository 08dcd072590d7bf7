//! End-to-end checks of the train/test feature pipeline

use pretty_assertions::assert_eq;
use sdf_flux::{
    sdf_features, ColumnStatus, FeatureMode, MorphLayout, PartitionGenerator, SampleMatrix,
    SdfConfig, SdfError, SdfProcessor, SymbolEncoder,
};

fn reference_data() -> Vec<f64> {
    vec![
        0.82487374, 0.21834812, 0.60166418, 0.76465689, 0.44819955, 0.72335342, 0.8710113,
        0.73258881, 0.97047932, 0.5975058, 0.02474567, 0.38093561,
    ]
}

fn round(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| (v * 1e8).round() / 1e8).collect()
}

#[test]
fn reference_example_end_to_end() {
    let data = reference_data();
    let partition = PartitionGenerator::max_entropy(&data, 4).unwrap();
    assert_eq!(
        partition.cut_points(),
        &[0.38093561, 0.60166418, 0.76465689]
    );

    let symbols = SymbolEncoder::encode(&data, &partition);
    assert_eq!(symbols, vec![4, 1, 3, 4, 2, 3, 4, 3, 4, 2, 1, 2]);

    let feature = sdf_features(&data, 4, FeatureMode::Stationary).unwrap();
    assert_eq!(
        round(&feature),
        vec![0.18181818, 0.18181818, 0.27272727, 0.36363636]
    );
}

#[test]
fn reference_morph_transposed_layout() {
    let data = reference_data();
    let matrix = SampleMatrix::from_series(data).unwrap();
    let config = SdfConfig::new(4, FeatureMode::Morph).with_morph_layout(MorphLayout::Transposed);
    let processor = {
        let mut p = SdfProcessor::new(config).unwrap();
        p.fit(&matrix).unwrap();
        p
    };
    let features = processor.extract(&matrix).unwrap();

    // Column after column of the destination-by-source matrix
    assert_eq!(
        round(&features.columns[0].values),
        vec![
            0.0, 0.33333333, 0.33333333, 0.0, //
            0.5, 0.0, 0.33333333, 0.0, //
            0.0, 0.0, 0.0, 1.0, //
            0.5, 0.66666667, 0.33333333, 0.0,
        ]
    );
}

#[test]
fn train_partition_is_reused_for_test_matrix() {
    let train = SampleMatrix::from_rows(&[
        vec![1.0, 6.0],
        vec![2.0, 7.0],
        vec![3.0, 8.0],
        vec![4.0, 9.0],
        vec![5.0, 10.0],
    ])
    .unwrap();

    let mut processor = SdfProcessor::new(SdfConfig::new(2, FeatureMode::Stationary)).unwrap();
    processor.fit(&train).unwrap();
    assert_eq!(processor.partition().unwrap().cut_points(), &[5.0]);

    let test = SampleMatrix::from_columns(vec![
        vec![0.0, 100.0, 0.0, 100.0, 0.0],
        vec![5.0, 5.0, 5.0, 5.0, 5.0],
        vec![4.9],
    ]);
    assert!(matches!(test, Err(SdfError::RaggedMatrix { index: 2, .. })));

    let test = SampleMatrix::from_columns(vec![
        vec![0.0, 100.0, 0.0, 100.0, 0.0],
        vec![5.0, 5.0, 5.0, 5.0, 5.0],
    ])
    .unwrap();
    let features = processor.extract(&test).unwrap();

    assert_eq!(features.columns[0].values, vec![0.5, 0.5]);
    // Value equal to the cut point belongs to the upper symbol
    assert_eq!(features.columns[1].values, vec![0.0, 1.0]);
    assert_eq!(
        features.to_dense(f64::NAN),
        vec![vec![0.5, 0.0], vec![0.5, 1.0]]
    );
}

#[test]
fn degenerate_columns_do_not_abort_batch() {
    let matrix = SampleMatrix::from_columns(vec![vec![3.0]]).unwrap();
    let mut processor = SdfProcessor::new(SdfConfig::new(3, FeatureMode::Morph)).unwrap();
    processor.fit(&matrix).unwrap();

    let report = processor.extract_report(&matrix).unwrap();
    assert_eq!(report.columns[0].status, ColumnStatus::Degenerate);
    assert_eq!(report.quality.degenerate_columns, 1);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["quality"]["flags"][0], "degenerate_column");
    // Both cut points fitted on a single sample coincide
    assert_eq!(json["quality"]["flags"][1], "duplicate_cut_points");
}

#[test]
fn configuration_errors_are_immediate() {
    assert!(matches!(
        SdfProcessor::new(SdfConfig::new(1, FeatureMode::Stationary)),
        Err(SdfError::InvalidSymbolCount(1))
    ));

    let empty = SampleMatrix::from_columns(vec![]).unwrap();
    let mut processor = SdfProcessor::new(SdfConfig::default()).unwrap();
    assert!(matches!(
        processor.fit(&empty),
        Err(SdfError::EmptyTrainingPool)
    ));
}
