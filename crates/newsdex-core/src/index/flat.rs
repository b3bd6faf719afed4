//! Exact nearest-neighbor index by squared Euclidean distance.
//!
//! Vectors live in one contiguous row-major `Vec<f32>`. A query scans every
//! row, which is O(N·D) and fine for corpora of a few thousand articles.

use std::cmp::Ordering;

use newsdex_types::error::IndexError;
use newsdex_types::index::{Neighbor, FLAT_L2_INDEX_TYPE};

use super::VectorIndex;

/// Brute-force L2 index. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    rows: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// An index with no rows.
    pub fn empty(dimension: usize) -> Self {
        Self {
            dimension,
            rows: 0,
            data: Vec::new(),
        }
    }

    /// Bulk-load vectors, keeping input order as row order.
    ///
    /// The first vector fixes the dimension; any other length is a
    /// `DimensionMismatch`. No vectors gives an empty index of dimension 0.
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        let Some(first) = vectors.first() else {
            return Ok(Self::empty(0));
        };
        let dimension = first.len();

        let mut data = Vec::with_capacity(dimension * vectors.len());
        for vector in &vectors {
            if vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }

        Ok(Self {
            dimension,
            rows: vectors.len(),
            data,
        })
    }

    /// Reassemble an index from its serialized parts.
    pub fn from_raw_parts(dimension: usize, rows: usize, data: Vec<f32>) -> Result<Self, IndexError> {
        let expected = dimension.checked_mul(rows).ok_or_else(|| {
            IndexError::CorruptState(format!("{rows} rows of dimension {dimension} overflow"))
        })?;
        if data.len() != expected {
            return Err(IndexError::CorruptState(format!(
                "expected {expected} floats for {rows}x{dimension}, found {}",
                data.len()
            )));
        }
        Ok(Self {
            dimension,
            rows,
            data,
        })
    }

    /// The vector stored at `row`.
    pub fn row(&self, row: usize) -> Option<&[f32]> {
        (row < self.rows).then(|| self.row_slice(row))
    }

    /// All rows, flattened row-major.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    fn row_slice(&self, row: usize) -> &[f32] {
        let start = row * self.dimension;
        &self.data[start..start + self.dimension]
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Nearest first; equal distances fall back to the lower row.
fn by_distance_then_row(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.row.cmp(&b.row))
}

impl VectorIndex for FlatIndex {
    fn index_type(&self) -> &'static str {
        FLAT_L2_INDEX_TYPE
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.rows
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        if self.rows == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let k = k.min(self.rows);
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<Neighbor> = (0..self.rows)
            .map(|row| Neighbor {
                row,
                distance: squared_l2(query, self.row_slice(row)),
            })
            .collect();

        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, by_distance_then_row);
            hits.truncate(k);
        }
        hits.sort_by(by_distance_then_row);

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(hits: &[Neighbor]) -> Vec<usize> {
        hits.iter().map(|h| h.row).collect()
    }

    fn three_point_index() -> FlatIndex {
        FlatIndex::build(vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![10.0, 10.0]]).unwrap()
    }

    #[test]
    fn test_build_keeps_input_order() {
        let index = three_point_index();
        assert_eq!(index.len(), 3);
        assert_eq!(index.dimension(), 2);
        assert_eq!(index.row(1), Some(&[1.0, 0.0][..]));
        assert_eq!(index.row(3), None);
    }

    #[test]
    fn test_build_rejects_mixed_dimensions() {
        let err = FlatIndex::build(vec![vec![0.0, 0.0], vec![1.0, 0.0, 2.0]]).unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_build_from_nothing_is_empty() {
        let index = FlatIndex::build(Vec::new()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.search(&[1.0, 2.0], 3).unwrap(), Vec::new());
    }

    #[test]
    fn test_search_returns_nearest_ascending() {
        let hits = three_point_index().search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(rows(&hits), vec![0, 1]);
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(hits[1].distance, 1.0);
    }

    #[test]
    fn test_search_uses_squared_distance() {
        let hits = three_point_index().search(&[0.0, 0.0], 3).unwrap();
        assert_eq!(hits[2].row, 2);
        assert_eq!(hits[2].distance, 200.0);
    }

    #[test]
    fn test_search_ties_break_by_lower_row() {
        let index = FlatIndex::build(vec![
            vec![5.0, 5.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.0, -1.0],
        ])
        .unwrap();

        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        assert_eq!(rows(&hits), vec![1, 2, 3]);

        let hits = index.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(rows(&hits), vec![1, 2]);
    }

    #[test]
    fn test_search_clamps_k_to_row_count() {
        let index = FlatIndex::build(vec![vec![0.0], vec![3.0]]).unwrap();
        let hits = index.search(&[1.0], 5).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(rows(&hits), vec![0, 1]);
    }

    #[test]
    fn test_search_k_zero_is_empty() {
        assert!(three_point_index().search(&[0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_search_rejects_wrong_query_dimension() {
        let index = FlatIndex::build(vec![vec![0.0; 384], vec![1.0; 384]]).unwrap();
        let err = index.search(&vec![0.0; 768], 1).unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 384,
                actual: 768
            }
        ));
    }

    #[test]
    fn test_search_on_empty_index_is_not_an_error() {
        let index = FlatIndex::empty(384);
        assert!(index.search(&[0.0; 3], 5).unwrap().is_empty());
    }

    #[test]
    fn test_search_matches_full_sort() {
        let vectors: Vec<Vec<f32>> = (0..50)
            .map(|i| vec![(i * 7 % 13) as f32, (i * 3 % 5) as f32])
            .collect();
        let index = FlatIndex::build(vectors.clone()).unwrap();
        let query = [4.0, 2.0];

        let mut expected: Vec<Neighbor> = vectors
            .iter()
            .enumerate()
            .map(|(row, v)| Neighbor {
                row,
                distance: squared_l2(&query, v),
            })
            .collect();
        expected.sort_by(by_distance_then_row);
        expected.truncate(7);

        assert_eq!(index.search(&query, 7).unwrap(), expected);
    }

    #[test]
    fn test_from_raw_parts_validates_length() {
        assert!(FlatIndex::from_raw_parts(2, 2, vec![0.0; 4]).is_ok());
        let err = FlatIndex::from_raw_parts(2, 2, vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, IndexError::CorruptState(_)));
    }
}
