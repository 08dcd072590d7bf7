//! Report encoding
//!
//! This module encodes a feature matrix into a self-describing JSON report.
//! Every report carries producer metadata, the partition it was computed
//! with, feature labels, and per-column quality information.

use crate::config::SdfConfig;
use crate::error::SdfError;
use crate::partition::Partition;
use crate::types::{
    FeatureMatrix, FeatureMode, FeatureReport, MorphLayout, QualityFlag, ReportProducer,
    ReportQuality,
};
use crate::{PRODUCER_NAME, SDF_VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Labels for each entry of a feature vector, in emission order.
///
/// Stationary entries are `sdf_stationary_{s}`; morph entries are
/// `sdf_morph_{row}_{col}` with 1-based destination row and source column.
pub fn feature_names(num_symbols: usize, mode: FeatureMode, layout: MorphLayout) -> Vec<String> {
    match mode {
        FeatureMode::Stationary => (1..=num_symbols)
            .map(|s| format!("sdf_stationary_{s}"))
            .collect(),
        FeatureMode::Morph => {
            let cells = (1..=num_symbols).flat_map(|a| (1..=num_symbols).map(move |b| (a, b)));
            match layout {
                MorphLayout::RowMajor => cells.map(|(r, c)| format!("sdf_morph_{r}_{c}")).collect(),
                MorphLayout::Transposed => {
                    cells.map(|(c, r)| format!("sdf_morph_{r}_{c}")).collect()
                }
            }
        }
    }
}

/// Report encoder for producing JSON feature reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode a feature matrix into a report
    pub fn encode(
        &self,
        features: &FeatureMatrix,
        partition: &Partition,
        config: &SdfConfig,
    ) -> FeatureReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: SDF_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        FeatureReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            computed_at_utc: Utc::now().to_rfc3339(),
            config: *config,
            partition: partition.cut_points().to_vec(),
            feature_names: feature_names(features.num_symbols, features.mode, config.morph_layout),
            quality: self.build_quality(features, partition),
            columns: features.columns.clone(),
        }
    }

    /// Encode to pretty-printed JSON
    pub fn encode_to_json(
        &self,
        features: &FeatureMatrix,
        partition: &Partition,
        config: &SdfConfig,
    ) -> Result<String, SdfError> {
        let report = self.encode(features, partition, config);
        serde_json::to_string_pretty(&report).map_err(SdfError::JsonError)
    }

    fn build_quality(&self, features: &FeatureMatrix, partition: &Partition) -> ReportQuality {
        let degenerate_columns = features.degenerate_columns().len();
        let fallback_rows: usize = features.columns.iter().map(|c| c.fallback_rows.len()).sum();

        let mut flags = Vec::new();
        if degenerate_columns > 0 {
            flags.push(QualityFlag::DegenerateColumn);
        }
        if fallback_rows > 0 {
            flags.push(QualityFlag::MorphRowFallback);
        }
        if partition.has_duplicates() {
            flags.push(QualityFlag::DuplicateCutPoints);
        }

        ReportQuality {
            total_columns: features.n_cols(),
            degenerate_columns,
            fallback_rows,
            flags,
        }
    }
}
