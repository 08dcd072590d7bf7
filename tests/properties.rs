//! Property tests for partitioning, encoding and Markov estimation

use proptest::prelude::*;
use sdf_flux::{
    FeatureExtractor, FeatureMode, MarkovEstimator, Partition, PartitionGenerator, SampleMatrix,
    SdfConfig, SymbolEncoder,
};

const TOLERANCE: f64 = 1e-9;

fn samples(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1e6f64..1e6, 1..max_len)
}

proptest! {
    #[test]
    fn partition_is_sorted_and_sized(pool in samples(200), num_symbols in 2usize..12) {
        let partition = PartitionGenerator::max_entropy(&pool, num_symbols).unwrap();
        prop_assert_eq!(partition.cut_points().len(), num_symbols - 1);
        prop_assert!(partition.cut_points().windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(Partition::from_cut_points(partition.cut_points().to_vec()).is_ok());
    }

    #[test]
    fn refitting_is_idempotent(pool in samples(100), num_symbols in 2usize..8) {
        let first = PartitionGenerator::max_entropy(&pool, num_symbols).unwrap();
        let second = PartitionGenerator::max_entropy(&pool, num_symbols).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn symbols_stay_in_range(
        pool in samples(100),
        series in prop::collection::vec(-1e7f64..1e7, 0..100),
        num_symbols in 2usize..10,
    ) {
        let partition = PartitionGenerator::max_entropy(&pool, num_symbols).unwrap();
        for symbol in SymbolEncoder::encode(&series, &partition) {
            prop_assert!((1..=num_symbols).contains(&symbol));
        }
    }

    #[test]
    fn encoding_is_monotonic(
        pool in samples(100),
        a in -1e7f64..1e7,
        b in -1e7f64..1e7,
        num_symbols in 2usize..10,
    ) {
        let partition = PartitionGenerator::max_entropy(&pool, num_symbols).unwrap();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            SymbolEncoder::encode_value(lo, &partition) <= SymbolEncoder::encode_value(hi, &partition)
        );
    }

    #[test]
    fn equal_frequency_cut_points(m in 1usize..20, num_symbols in 2usize..8) {
        // k * m distinct samples: cut point i is the (i * m)-th smallest
        let pool: Vec<f64> = (0..num_symbols * m).rev().map(|v| v as f64).collect();
        let partition = PartitionGenerator::max_entropy(&pool, num_symbols).unwrap();
        for (i, &cut) in partition.cut_points().iter().enumerate() {
            prop_assert_eq!(pool.iter().filter(|&&v| v <= cut).count(), (i + 1) * m);
        }
    }

    #[test]
    fn stationary_vector_is_a_distribution(
        symbols in prop::collection::vec(1usize..=5, 2..200),
    ) {
        let model = MarkovEstimator::estimate(&symbols, 5, false).unwrap();
        prop_assert!(model.stationary.iter().all(|&p| p >= 0.0));
        prop_assert!((model.stationary.iter().sum::<f64>() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn morph_rows_are_stochastic(symbols in prop::collection::vec(1usize..=4, 2..200)) {
        let model = MarkovEstimator::estimate(&symbols, 4, true).unwrap();
        let morph = model.morph.unwrap();
        for (i, row) in morph.rows().enumerate() {
            prop_assert!((row.iter().sum::<f64>() - 1.0).abs() < TOLERANCE);
            if model.fallback_rows.contains(&i) {
                prop_assert_eq!(row, model.stationary.as_slice());
            }
        }
    }

    #[test]
    fn parallel_and_sequential_agree(
        columns in prop::collection::vec(prop::collection::vec(-10f64..10.0, 8), 1..16),
        num_symbols in 2usize..6,
    ) {
        let matrix = SampleMatrix::from_columns(columns).unwrap();
        let partition = PartitionGenerator::fit_matrix(&matrix, num_symbols).unwrap();
        let config = SdfConfig::new(num_symbols, FeatureMode::Morph);

        let parallel = FeatureExtractor::extract(&matrix, &partition, &config).unwrap();
        let sequential =
            FeatureExtractor::extract(&matrix, &partition, &config.with_parallel(false)).unwrap();
        prop_assert_eq!(parallel, sequential);
    }
}
