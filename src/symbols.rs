//! Symbol encoding
//!
//! Quantizes a real-valued series into 1-based symbols using a fitted
//! partition. A value maps to the rank of the first boundary strictly greater
//! than it, with +infinity as the final boundary.

use crate::partition::Partition;

/// Encoder for turning series into symbol sequences
pub struct SymbolEncoder;

impl SymbolEncoder {
    /// Symbol for a single value, in `[1, partition.num_symbols()]`.
    ///
    /// A value equal to a cut point is not below it, so it lands in the cell
    /// above that cut point.
    pub fn encode_value(value: f64, partition: &Partition) -> usize {
        partition.cut_points().partition_point(|&cut| cut <= value) + 1
    }

    /// Symbol sequence for a series, same length as the input
    pub fn encode(series: &[f64], partition: &Partition) -> Vec<usize> {
        series
            .iter()
            .map(|&value| Self::encode_value(value, partition))
            .collect()
    }

    /// Occurrences of each symbol, index 0 holding symbol 1
    pub fn histogram(symbols: &[usize], num_symbols: usize) -> Vec<usize> {
        let mut counts = vec![0; num_symbols];
        for &symbol in symbols {
            if let Some(count) = symbol.checked_sub(1).and_then(|i| counts.get_mut(i)) {
                *count += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::PartitionGenerator;

    /// Literal scan over the cut points plus the +infinity sentinel
    fn linear_scan(value: f64, partition: &Partition) -> usize {
        partition
            .cut_points()
            .iter()
            .chain(std::iter::once(&f64::INFINITY))
            .position(|&cut| cut > value)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    #[test]
    fn test_boundary_goes_to_upper_symbol() {
        let partition = Partition::from_cut_points(vec![5.0]).unwrap();
        assert_eq!(
            SymbolEncoder::encode(&[1.0, 5.0, 6.0, 10.0], &partition),
            vec![1, 2, 2, 2]
        );
    }

    #[test]
    fn test_reference_sequence() {
        let data = [
            0.82487374, 0.21834812, 0.60166418, 0.76465689, 0.44819955, 0.72335342, 0.8710113,
            0.73258881, 0.97047932, 0.5975058, 0.02474567, 0.38093561,
        ];
        let partition = PartitionGenerator::max_entropy(&data, 4).unwrap();
        assert_eq!(
            SymbolEncoder::encode(&data, &partition),
            vec![4, 1, 3, 4, 2, 3, 4, 3, 4, 2, 1, 2]
        );
    }

    #[test]
    fn test_matches_linear_scan_with_duplicates() {
        let partition = Partition::from_cut_points(vec![-1.0, 0.0, 0.0, 0.0, 2.5]).unwrap();
        for value in [-3.0, -1.0, -0.5, 0.0, 1e-12, 1.0, 2.5, 2.6, 1e9] {
            assert_eq!(
                SymbolEncoder::encode_value(value, &partition),
                linear_scan(value, &partition),
                "value {value}"
            );
        }
    }

    #[test]
    fn test_duplicate_cut_points_skip_symbols() {
        let partition = Partition::from_cut_points(vec![1.0, 1.0, 1.0]).unwrap();
        let symbols = SymbolEncoder::encode(&[0.0, 1.0, 2.0], &partition);
        assert_eq!(symbols, vec![1, 4, 4]);
        assert_eq!(SymbolEncoder::histogram(&symbols, 4), vec![1, 0, 0, 2]);
    }

    #[test]
    fn test_empty_series() {
        let partition = Partition::from_cut_points(vec![0.0]).unwrap();
        assert!(SymbolEncoder::encode(&[], &partition).is_empty());
    }

    #[test]
    fn test_equal_frequency_binning() {
        // 3 symbols, m = 4 distinct samples per cell
        let pool: Vec<f64> = (0..12).map(|i| i as f64 * 0.5).collect();
        let partition = PartitionGenerator::max_entropy(&pool, 3).unwrap();

        // Cut point i is the (i * m)-th smallest sample
        for (i, &cut) in partition.cut_points().iter().enumerate() {
            let at_or_below = pool.iter().filter(|&&v| v <= cut).count();
            assert_eq!(at_or_below, (i + 1) * 4);
        }

        // Each cut point itself is encoded upward, shifting one sample per boundary
        let symbols = SymbolEncoder::encode(&pool, &partition);
        assert_eq!(SymbolEncoder::histogram(&symbols, 3), vec![3, 4, 5]);
    }
}
