//! Maximum entropy partitioning
//!
//! Cut points are taken at equal-frequency positions of the sorted training
//! pool, so each of the `num_symbols` cells receives roughly the same number of
//! training samples. The partition is fitted once and then only consulted.

use crate::error::SdfError;
use crate::types::SampleMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ordered cut points with an implicit trailing +infinity bound.
///
/// Holds `num_symbols - 1` non-decreasing finite values. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PartitionRepr", into = "PartitionRepr")]
pub struct Partition {
    cut_points: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct PartitionRepr {
    num_symbols: usize,
    cut_points: Vec<f64>,
}

impl TryFrom<PartitionRepr> for Partition {
    type Error = SdfError;

    fn try_from(repr: PartitionRepr) -> Result<Self, Self::Error> {
        let partition = Partition::from_cut_points(repr.cut_points)?;
        if partition.num_symbols() != repr.num_symbols {
            return Err(SdfError::SymbolCountMismatch {
                partition: partition.num_symbols(),
                requested: repr.num_symbols,
            });
        }
        Ok(partition)
    }
}

impl From<Partition> for PartitionRepr {
    fn from(partition: Partition) -> Self {
        Self {
            num_symbols: partition.num_symbols(),
            cut_points: partition.cut_points,
        }
    }
}

impl Partition {
    /// Build from explicit cut points, checking order and finiteness
    pub fn from_cut_points(cut_points: Vec<f64>) -> Result<Self, SdfError> {
        if cut_points.is_empty() {
            return Err(SdfError::InvalidPartition(
                "at least one cut point is required".to_string(),
            ));
        }
        if let Some(i) = cut_points.iter().position(|c| !c.is_finite()) {
            return Err(SdfError::InvalidPartition(format!(
                "cut point {i} is not finite"
            )));
        }
        if let Some(i) = cut_points.windows(2).position(|w| w[0] > w[1]) {
            return Err(SdfError::InvalidPartition(format!(
                "cut points decrease at index {}",
                i + 1
            )));
        }
        Ok(Self { cut_points })
    }

    /// Alphabet size encoded by this partition
    pub fn num_symbols(&self) -> usize {
        self.cut_points.len() + 1
    }

    pub fn cut_points(&self) -> &[f64] {
        &self.cut_points
    }

    /// True when two cut points coincide, so some symbol can never be emitted
    pub fn has_duplicates(&self) -> bool {
        self.cut_points.windows(2).any(|w| w[0] == w[1])
    }

    pub fn from_json(json: &str) -> Result<Self, SdfError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SdfError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Fits partitions from pooled training data
pub struct PartitionGenerator;

impl PartitionGenerator {
    /// Maximum entropy partition of a pooled sample.
    ///
    /// Cut point `i` (1-based) is the sorted sample at 1-based position
    /// `floor(i * k / num_symbols)`. When the pool is smaller than the alphabet
    /// that position can be 0 and is clamped to the smallest sample.
    pub fn max_entropy(pool: &[f64], num_symbols: usize) -> Result<Partition, SdfError> {
        if num_symbols < 2 {
            return Err(SdfError::InvalidSymbolCount(num_symbols));
        }
        if pool.is_empty() {
            return Err(SdfError::EmptyTrainingPool);
        }
        if let Some(row) = pool.iter().position(|v| !v.is_finite()) {
            return Err(SdfError::NonFiniteSample { column: 0, row });
        }

        let mut sorted = pool.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let k = sorted.len();
        let cut_points: Vec<f64> = (1..num_symbols)
            .map(|i| sorted[(i * k / num_symbols).saturating_sub(1)])
            .collect();

        debug!(
            pool_size = k,
            num_symbols,
            ?cut_points,
            "fitted maximum entropy partition"
        );

        Ok(Partition { cut_points })
    }

    /// Fit on every sample of a matrix, columns concatenated
    pub fn fit_matrix(matrix: &SampleMatrix, num_symbols: usize) -> Result<Partition, SdfError> {
        Self::max_entropy(&matrix.pooled(), num_symbols)
    }
}
