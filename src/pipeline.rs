//! Pipeline orchestration
//!
//! This module provides the public API for SDF feature extraction.
//! It orchestrates the full pipeline from raw samples to feature vectors:
//! partition fit → symbol encoding → Markov estimation → feature assembly.

use crate::config::SdfConfig;
use crate::error::SdfError;
use crate::features::FeatureExtractor;
use crate::partition::{Partition, PartitionGenerator};
use crate::report::ReportEncoder;
use crate::types::{FeatureMatrix, FeatureMode, FeatureReport, SampleMatrix};
use tracing::debug;

/// Extract SDF features from a single series, fitting the partition on the
/// series itself.
///
/// # Arguments
/// * `series` - Raw samples of one time series
/// * `num_symbols` - Alphabet size (at least 2)
/// * `mode` - Stationary vector or flattened morph matrix
///
/// # Returns
/// The feature vector; a series shorter than 2 samples is a
/// `SdfError::DegenerateSequence`.
///
/// # Example
/// ```
/// use sdf_flux::{sdf_features, FeatureMode};
///
/// let series = [0.1, 0.7, 0.3, 0.9, 0.2, 0.8];
/// let feature = sdf_features(&series, 2, FeatureMode::Stationary).unwrap();
/// assert_eq!(feature.len(), 2);
/// ```
pub fn sdf_features(
    series: &[f64],
    num_symbols: usize,
    mode: FeatureMode,
) -> Result<Vec<f64>, SdfError> {
    let config = SdfConfig::new(num_symbols, mode).with_parallel(false);
    config.validate()?;

    let matrix = SampleMatrix::from_series(series.to_vec())?;
    let partition = PartitionGenerator::fit_matrix(&matrix, num_symbols)?;
    let features = FeatureExtractor::extract(&matrix, &partition, &config)?;

    match features.columns.into_iter().next() {
        Some(column) if !column.is_degenerate() => Ok(column.values),
        _ => Err(SdfError::DegenerateSequence(series.len())),
    }
}

/// Stateful processor: fit the partition once on training data, then extract
/// features from any number of matrices with that same partition.
pub struct SdfProcessor {
    config: SdfConfig,
    partition: Option<Partition>,
    encoder: ReportEncoder,
}

impl Default for SdfProcessor {
    fn default() -> Self {
        Self {
            config: SdfConfig::default(),
            partition: None,
            encoder: ReportEncoder::new(),
        }
    }
}

impl SdfProcessor {
    /// Create a processor with validated settings
    pub fn new(config: SdfConfig) -> Result<Self, SdfError> {
        config.validate()?;
        Ok(Self {
            config,
            partition: None,
            encoder: ReportEncoder::new(),
        })
    }

    /// Create a processor around an already fitted partition
    pub fn with_partition(config: SdfConfig, partition: Partition) -> Result<Self, SdfError> {
        let mut processor = Self::new(config)?;
        processor.set_partition(partition)?;
        Ok(processor)
    }

    pub fn config(&self) -> &SdfConfig {
        &self.config
    }

    pub fn partition(&self) -> Option<&Partition> {
        self.partition.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.partition.is_some()
    }

    /// Fit the partition on all samples of the training matrix
    pub fn fit(&mut self, training: &SampleMatrix) -> Result<&Partition, SdfError> {
        let partition = PartitionGenerator::fit_matrix(training, self.config.num_symbols)?;
        debug!(
            columns = training.n_cols(),
            rows = training.n_rows(),
            "partition fitted on training matrix"
        );
        Ok(&*self.partition.insert(partition))
    }

    fn set_partition(&mut self, partition: Partition) -> Result<(), SdfError> {
        if partition.num_symbols() != self.config.num_symbols {
            return Err(SdfError::SymbolCountMismatch {
                partition: partition.num_symbols(),
                requested: self.config.num_symbols,
            });
        }
        self.partition = Some(partition);
        Ok(())
    }

    /// Extract features with the fitted partition
    pub fn extract(&self, matrix: &SampleMatrix) -> Result<FeatureMatrix, SdfError> {
        let partition = self.partition.as_ref().ok_or(SdfError::PartitionNotFitted)?;
        FeatureExtractor::extract(matrix, partition, &self.config)
    }

    /// Extract features and wrap them in a report
    pub fn extract_report(&self, matrix: &SampleMatrix) -> Result<FeatureReport, SdfError> {
        let partition = self.partition.as_ref().ok_or(SdfError::PartitionNotFitted)?;
        let features = FeatureExtractor::extract(matrix, partition, &self.config)?;
        Ok(self.encoder.encode(&features, partition, &self.config))
    }

    /// Load partition state from JSON
    pub fn load_partition(&mut self, json: &str) -> Result<(), SdfError> {
        let partition = Partition::from_json(json)?;
        self.set_partition(partition)
    }

    /// Save partition state to JSON
    pub fn save_partition(&self) -> Result<String, SdfError> {
        self.partition
            .as_ref()
            .ok_or(SdfError::PartitionNotFitted)?
            .to_json()
    }
}
