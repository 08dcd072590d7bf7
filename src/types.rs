//! Core types for the SDF pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: the sample matrix going in, per-column features, the feature
//! matrix, and the JSON report coming out.

use crate::config::SdfConfig;
use crate::error::SdfError;
use serde::{Deserialize, Serialize};

/// Which feature vector is extracted per series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureMode {
    /// Empirical symbol distribution (length `num_symbols`)
    #[default]
    Stationary,
    /// Flattened morph matrix (length `num_symbols²`)
    Morph,
}

impl FeatureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureMode::Stationary => "stationary",
            FeatureMode::Morph => "morph",
        }
    }

    /// Length of one feature vector for the given alphabet size
    pub fn feature_len(&self, num_symbols: usize) -> usize {
        match self {
            FeatureMode::Stationary => num_symbols,
            FeatureMode::Morph => num_symbols * num_symbols,
        }
    }
}

/// Order in which the morph matrix is flattened into a feature vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphLayout {
    /// Row after row of the destination-indexed matrix
    #[default]
    RowMajor,
    /// Transpose first, then row-major (column after column)
    Transposed,
}

/// Quality flags raised while extracting features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    /// At least one column had fewer than 2 samples
    DegenerateColumn,
    /// At least one morph row had no transition mass
    MorphRowFallback,
    /// The partition contains repeated cut points
    DuplicateCutPoints,
}

/// Immutable sample matrix: rows are time steps, columns are series.
///
/// Stored column-major since every stage consumes one series at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix {
    columns: Vec<Vec<f64>>,
    n_rows: usize,
}

impl SampleMatrix {
    /// Build from a list of series
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self, SdfError> {
        let n_rows = columns.first().map(Vec::len).unwrap_or(0);

        for (c, column) in columns.iter().enumerate() {
            if column.len() != n_rows {
                return Err(SdfError::RaggedMatrix {
                    index: c,
                    expected: n_rows,
                    found: column.len(),
                });
            }
            if let Some(r) = column.iter().position(|v| !v.is_finite()) {
                return Err(SdfError::NonFiniteSample { column: c, row: r });
            }
        }

        Ok(Self { columns, n_rows })
    }

    /// Build from a list of time steps, each holding one value per series
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, SdfError> {
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut columns = vec![Vec::with_capacity(rows.len()); n_cols];

        for (r, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(SdfError::RaggedMatrix {
                    index: r,
                    expected: n_cols,
                    found: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                columns[c].push(value);
            }
        }

        Self::from_columns(columns)
    }

    /// Single-series matrix
    pub fn from_series(series: Vec<f64>) -> Result<Self, SdfError> {
        Self::from_columns(vec![series])
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0 || self.columns.is_empty()
    }

    pub fn column(&self, index: usize) -> Option<&[f64]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    pub fn columns(&self) -> impl Iterator<Item = &[f64]> {
        self.columns.iter().map(Vec::as_slice)
    }

    /// All samples concatenated column after column
    pub fn pooled(&self) -> Vec<f64> {
        self.columns.iter().flatten().copied().collect()
    }
}

/// Per-column extraction outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnStatus {
    Ok,
    /// Fewer than 2 samples; the feature vector is empty
    Degenerate,
}

/// Features extracted from one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFeatures {
    pub index: usize,
    pub status: ColumnStatus,
    pub values: Vec<f64>,
    /// Morph rows (0-based) replaced by the stationary vector
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_rows: Vec<usize>,
}

impl ColumnFeatures {
    pub fn degenerate(index: usize) -> Self {
        Self {
            index,
            status: ColumnStatus::Degenerate,
            values: Vec::new(),
            fallback_rows: Vec::new(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.status == ColumnStatus::Degenerate
    }
}

/// Feature matrix: one feature vector per input series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    pub num_symbols: usize,
    pub mode: FeatureMode,
    pub columns: Vec<ColumnFeatures>,
}

impl FeatureMatrix {
    /// Feature dimension (rows of the dense matrix)
    pub fn feature_len(&self) -> usize {
        self.mode.feature_len(self.num_symbols)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> Option<&ColumnFeatures> {
        self.columns.get(index)
    }

    /// Value at feature `row` of series `col`; `None` for degenerate columns
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.columns.get(col)?.values.get(row).copied()
    }

    pub fn degenerate_columns(&self) -> Vec<usize> {
        self.columns
            .iter()
            .filter(|c| c.is_degenerate())
            .map(|c| c.index)
            .collect()
    }

    /// Dense `feature_len × n_cols` matrix, degenerate columns filled with `fill`
    pub fn to_dense(&self, fill: f64) -> Vec<Vec<f64>> {
        let mut dense = vec![vec![fill; self.n_cols()]; self.feature_len()];
        for (c, column) in self.columns.iter().enumerate() {
            for (r, &value) in column.values.iter().enumerate() {
                dense[r][c] = value;
            }
        }
        dense
    }
}

// ============================================================================
// Report types
// ============================================================================

/// Producer metadata embedded in every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Quality summary over all columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportQuality {
    pub total_columns: usize,
    pub degenerate_columns: usize,
    /// Total number of morph rows that fell back to the stationary vector
    pub fallback_rows: usize,
    pub flags: Vec<QualityFlag>,
}

/// JSON report of one extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub config: SdfConfig,
    pub partition: Vec<f64>,
    pub feature_names: Vec<String>,
    pub quality: ReportQuality,
    pub columns: Vec<ColumnFeatures>,
}
