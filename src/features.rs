//! Feature extraction
//!
//! This module runs symbol encoding and Markov estimation over every column of
//! a sample matrix and assembles the per-column feature vectors:
//! - Stationary vector (one entry per symbol)
//! - Flattened morph matrix (one entry per symbol pair)

use crate::config::SdfConfig;
use crate::error::SdfError;
use crate::markov::MarkovEstimator;
use crate::partition::Partition;
use crate::symbols::SymbolEncoder;
use crate::types::{ColumnFeatures, ColumnStatus, FeatureMatrix, FeatureMode, SampleMatrix};
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Feature extractor for computing SDF features per series
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Extract one feature vector per column using a fitted partition.
    ///
    /// Configuration mismatches fail the whole call; a column with fewer than
    /// 2 samples is reported as degenerate and the rest are still processed.
    pub fn extract(
        matrix: &SampleMatrix,
        partition: &Partition,
        config: &SdfConfig,
    ) -> Result<FeatureMatrix, SdfError> {
        config.validate()?;
        if partition.num_symbols() != config.num_symbols {
            return Err(SdfError::SymbolCountMismatch {
                partition: partition.num_symbols(),
                requested: config.num_symbols,
            });
        }

        let columns = Self::extract_columns(matrix, partition, config)?;

        let degenerate = columns.iter().filter(|c| c.is_degenerate()).count();
        if degenerate > 0 {
            warn!(
                degenerate,
                total = columns.len(),
                "series too short for transition counting"
            );
        }
        debug!(
            columns = columns.len(),
            mode = config.mode.as_str(),
            num_symbols = config.num_symbols,
            "extracted sdf features"
        );

        Ok(FeatureMatrix {
            num_symbols: config.num_symbols,
            mode: config.mode,
            columns,
        })
    }

    #[cfg(feature = "parallel")]
    fn extract_columns(
        matrix: &SampleMatrix,
        partition: &Partition,
        config: &SdfConfig,
    ) -> Result<Vec<ColumnFeatures>, SdfError> {
        if !config.parallel {
            return Self::extract_sequential(matrix, partition, config);
        }

        let columns: Vec<&[f64]> = matrix.columns().collect();
        columns
            .par_iter()
            .enumerate()
            .map(|(index, series)| Self::extract_series(index, series, partition, config))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn extract_columns(
        matrix: &SampleMatrix,
        partition: &Partition,
        config: &SdfConfig,
    ) -> Result<Vec<ColumnFeatures>, SdfError> {
        Self::extract_sequential(matrix, partition, config)
    }

    fn extract_sequential(
        matrix: &SampleMatrix,
        partition: &Partition,
        config: &SdfConfig,
    ) -> Result<Vec<ColumnFeatures>, SdfError> {
        matrix
            .columns()
            .enumerate()
            .map(|(index, series)| Self::extract_series(index, series, partition, config))
            .collect()
    }

    /// Features of a single series
    pub fn extract_series(
        index: usize,
        series: &[f64],
        partition: &Partition,
        config: &SdfConfig,
    ) -> Result<ColumnFeatures, SdfError> {
        let symbols = SymbolEncoder::encode(series, partition);
        let with_morph = config.mode == FeatureMode::Morph;

        let model = match MarkovEstimator::estimate(&symbols, config.num_symbols, with_morph) {
            Ok(model) => model,
            Err(e) if e.is_degenerate() => return Ok(ColumnFeatures::degenerate(index)),
            Err(e) => return Err(e),
        };

        if !model.fallback_rows.is_empty() {
            debug!(
                column = index,
                rows = ?model.fallback_rows,
                "morph rows without transitions replaced by stationary vector"
            );
        }

        let values = match (config.mode, &model.morph) {
            (FeatureMode::Morph, Some(morph)) => morph.flatten(config.morph_layout),
            _ => model.stationary,
        };

        Ok(ColumnFeatures {
            index,
            status: ColumnStatus::Ok,
            values,
            fallback_rows: model.fallback_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::PartitionGenerator;
    use crate::types::MorphLayout;

    fn make_test_matrix() -> SampleMatrix {
        SampleMatrix::from_columns(vec![
            vec![0.1, 0.9, 0.2, 0.8, 0.3, 0.7],
            vec![0.5, 0.5, 0.6, 0.6, 0.4, 0.4],
            vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_stationary_features_per_column() {
        let matrix = make_test_matrix();
        let config = SdfConfig::new(3, FeatureMode::Stationary);
        let partition = PartitionGenerator::fit_matrix(&matrix, 3).unwrap();
        let features = FeatureExtractor::extract(&matrix, &partition, &config).unwrap();

        assert_eq!(features.n_cols(), 3);
        assert_eq!(features.feature_len(), 3);
        for column in &features.columns {
            assert_eq!(column.status, ColumnStatus::Ok);
            assert_eq!(column.values.len(), 3);
            assert!((column.values.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_morph_features_length() {
        let matrix = make_test_matrix();
        let config = SdfConfig::new(3, FeatureMode::Morph);
        let partition = PartitionGenerator::fit_matrix(&matrix, 3).unwrap();
        let features = FeatureExtractor::extract(&matrix, &partition, &config).unwrap();

        for column in &features.columns {
            assert_eq!(column.values.len(), 9);
            for row in column.values.chunks(3) {
                assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let matrix = make_test_matrix();
        let partition = PartitionGenerator::fit_matrix(&matrix, 4).unwrap();
        let config = SdfConfig::new(4, FeatureMode::Morph).with_morph_layout(MorphLayout::Transposed);

        let parallel = FeatureExtractor::extract(&matrix, &partition, &config).unwrap();
        let sequential =
            FeatureExtractor::extract(&matrix, &partition, &config.with_parallel(false)).unwrap();

        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_single_row_columns_are_degenerate() {
        let matrix = SampleMatrix::from_columns(vec![vec![1.0], vec![2.0]]).unwrap();
        let partition = Partition::from_cut_points(vec![1.5]).unwrap();
        let config = SdfConfig::new(2, FeatureMode::Stationary);
        let features = FeatureExtractor::extract(&matrix, &partition, &config).unwrap();

        assert_eq!(features.degenerate_columns(), vec![0, 1]);
        assert!(features.columns.iter().all(|c| c.values.is_empty()));
    }

    #[test]
    fn test_symbol_count_mismatch() {
        let matrix = make_test_matrix();
        let partition = PartitionGenerator::fit_matrix(&matrix, 3).unwrap();
        let config = SdfConfig::new(4, FeatureMode::Stationary);

        let result = FeatureExtractor::extract(&matrix, &partition, &config);
        assert!(matches!(
            result,
            Err(SdfError::SymbolCountMismatch {
                partition: 3,
                requested: 4
            })
        ));
    }

    #[test]
    fn test_fallback_rows_reported() {
        // Monotone ramp never returns to the lowest symbol
        let matrix = SampleMatrix::from_series(vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let partition = Partition::from_cut_points(vec![0.5, 1.5, 2.5]).unwrap();
        let config = SdfConfig::new(4, FeatureMode::Morph);
        let features = FeatureExtractor::extract(&matrix, &partition, &config).unwrap();

        assert_eq!(features.columns[0].fallback_rows, vec![0]);
    }
}
