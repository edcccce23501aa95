use std::cmp::Ordering;

use crate::error::{AppError, AppResult};

/// Precomputed square matrix of pairwise similarity scores, row-major
///
/// Higher means more similar. Symmetry is conventional and not checked.
#[derive(Debug, Clone)]
pub struct SimilarityTable {
    dimension: usize,
    scores: Vec<f32>,
}

impl SimilarityTable {
    /// Builds the table from rows, rejecting anything that is not square
    pub fn from_rows(rows: Vec<Vec<f32>>) -> AppResult<Self> {
        let dimension = rows.len();
        let mut scores = Vec::with_capacity(dimension * dimension);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dimension {
                return Err(AppError::DataIntegrity(format!(
                    "similarity row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    dimension
                )));
            }
            scores.extend(row);
        }

        Ok(Self { dimension, scores })
    }

    /// Number of rows (and columns)
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn row(&self, index: usize) -> AppResult<&[f32]> {
        if index >= self.dimension {
            return Err(AppError::IndexOutOfRange {
                index,
                len: self.dimension,
            });
        }
        let start = index * self.dimension;
        Ok(&self.scores[start..start + self.dimension])
    }

    /// Every candidate other than `query`, most similar first
    ///
    /// Equal scores are ordered by ascending index. NaN scores rank below
    /// every real score so a corrupt cell can never float to the top.
    pub fn ranked_candidates(&self, query: usize) -> AppResult<Vec<(usize, f32)>> {
        let mut candidates: Vec<(usize, f32)> = self
            .row(query)?
            .iter()
            .copied()
            .enumerate()
            .filter(|(index, _)| *index != query)
            .collect();

        candidates.sort_by(|a, b| compare_desc(a.1, b.1).then(a.0.cmp(&b.0)));
        Ok(candidates)
    }
}

fn compare_desc(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_rejects_ragged_matrix() {
        let result = SimilarityTable::from_rows(vec![vec![1.0, 0.2], vec![0.2]]);
        assert!(matches!(result, Err(AppError::DataIntegrity(_))));
    }

    #[test]
    fn test_from_rows_rejects_non_square_matrix() {
        let result = SimilarityTable::from_rows(vec![vec![1.0, 0.2, 0.3], vec![0.2, 1.0, 0.4]]);
        assert!(matches!(result, Err(AppError::DataIntegrity(_))));
    }

    #[test]
    fn test_row_access() {
        let table =
            SimilarityTable::from_rows(vec![vec![1.0, 0.2], vec![0.3, 1.0]]).unwrap();
        assert_eq!(table.dimension(), 2);
        assert_eq!(table.row(1).unwrap(), &[0.3, 1.0]);
        assert!(matches!(
            table.row(2),
            Err(AppError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_ranked_candidates_breaks_ties_by_index() {
        // A, B, C, D with B and D tied for A
        let table = SimilarityTable::from_rows(vec![
            vec![1.0, 0.9, 0.5, 0.9],
            vec![0.9, 1.0, 0.1, 0.2],
            vec![0.5, 0.1, 1.0, 0.3],
            vec![0.9, 0.2, 0.3, 1.0],
        ])
        .unwrap();

        let ranked = table.ranked_candidates(0).unwrap();
        let order: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![1, 3, 2]);
    }

    #[test]
    fn test_ranked_candidates_excludes_self_even_when_not_highest() {
        let table = SimilarityTable::from_rows(vec![
            vec![0.1, 0.9, 0.5],
            vec![0.9, 1.0, 0.1],
            vec![0.5, 0.1, 1.0],
        ])
        .unwrap();

        let ranked = table.ranked_candidates(0).unwrap();
        assert_eq!(ranked, vec![(1, 0.9), (2, 0.5)]);
    }

    #[test]
    fn test_ranked_candidates_handles_negative_scores_and_nan() {
        let table = SimilarityTable::from_rows(vec![
            vec![1.0, f32::NAN, -2.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0],
        ])
        .unwrap();

        let order: Vec<usize> = table
            .ranked_candidates(0)
            .unwrap()
            .iter()
            .map(|(i, _)| *i)
            .collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn test_empty_table() {
        let table = SimilarityTable::from_rows(vec![]).unwrap();
        assert_eq!(table.dimension(), 0);
        assert!(table.ranked_candidates(0).is_err());
    }
}
