//! Markov estimation over symbol sequences
//!
//! Counts symbol-to-symbol transitions to estimate the morph matrix of the
//! probabilistic finite state automaton, and approximates its eigenvector for
//! eigenvalue 1 by the empirical frequency of transition origins.

use crate::error::SdfError;
use crate::types::MorphLayout;

/// Square transition matrix, row-major.
///
/// Entry `(i, j)` holds the transitions from symbol `j + 1` into symbol `i + 1`:
/// rows are indexed by destination, columns by source.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphMatrix {
    size: usize,
    data: Vec<f64>,
}

impl MorphMatrix {
    fn zeros(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.size + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.size..(row + 1) * self.size]
    }

    fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.data[row * self.size..(row + 1) * self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.size)
    }

    /// Flatten into a feature vector
    pub fn flatten(&self, layout: MorphLayout) -> Vec<f64> {
        match layout {
            MorphLayout::RowMajor => self.data.clone(),
            MorphLayout::Transposed => (0..self.size)
                .flat_map(|col| (0..self.size).map(move |row| (row, col)))
                .map(|(row, col)| self.get(row, col))
                .collect(),
        }
    }
}

/// Result of analyzing one symbol sequence
#[derive(Debug, Clone, PartialEq)]
pub struct MarkovModel {
    /// Empirical distribution of transition origins, sums to 1
    pub stationary: Vec<f64>,
    /// Row-normalized morph matrix, when requested
    pub morph: Option<MorphMatrix>,
    /// Morph rows with no accumulated mass, replaced by `stationary`
    pub fallback_rows: Vec<usize>,
}

/// Estimator for stationary vectors and morph matrices
pub struct MarkovEstimator;

impl MarkovEstimator {
    /// Analyze a sequence of 1-based symbols.
    ///
    /// Every adjacent pair `(current, next)` counts once toward
    /// `stationary[current]` and, with `with_morph`, toward `morph[next][current]`.
    /// The final symbol only ever appears as a destination.
    pub fn estimate(
        symbols: &[usize],
        num_symbols: usize,
        with_morph: bool,
    ) -> Result<MarkovModel, SdfError> {
        if num_symbols < 2 {
            return Err(SdfError::InvalidSymbolCount(num_symbols));
        }
        if symbols.len() < 2 {
            return Err(SdfError::DegenerateSequence(symbols.len()));
        }
        if let Some(position) = symbols.iter().position(|&s| s == 0 || s > num_symbols) {
            return Err(SdfError::SymbolOutOfRange {
                symbol: symbols[position],
                position,
                num_symbols,
            });
        }

        let mut counts = vec![0.0; num_symbols];
        let mut morph = with_morph.then(|| MorphMatrix::zeros(num_symbols));

        for pair in symbols.windows(2) {
            let current = pair[0] - 1;
            let next = pair[1] - 1;
            counts[current] += 1.0;
            if let Some(morph) = morph.as_mut() {
                morph.data[next * num_symbols + current] += 1.0;
            }
        }

        let total: f64 = counts.iter().sum();
        let stationary: Vec<f64> = counts.iter().map(|c| c / total).collect();

        let mut fallback_rows = Vec::new();
        if let Some(morph) = morph.as_mut() {
            for row in 0..num_symbols {
                let values = morph.row_mut(row);
                let row_sum: f64 = values.iter().sum();
                if row_sum == 0.0 {
                    values.copy_from_slice(&stationary);
                    fallback_rows.push(row);
                } else {
                    values.iter_mut().for_each(|v| *v /= row_sum);
                }
            }
        }

        Ok(MarkovModel {
            stationary,
            morph,
            fallback_rows,
        })
    }
}
