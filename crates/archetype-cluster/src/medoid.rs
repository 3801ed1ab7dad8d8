// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::matrix::{FeatureMatrix, euclidean};

/// Member of `members` (row indices into `points`) with the smallest summed
/// Euclidean distance to the others. Ties go to the earlier member; a single
/// member is its own medoid.
pub fn medoid_index(points: &FeatureMatrix, members: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for &candidate in members {
        let total: f64 = members
            .iter()
            .map(|&other| euclidean(points.row(candidate), points.row(other)))
            .sum();
        if best.is_none_or(|(_, incumbent)| total < incumbent) {
            best = Some((candidate, total));
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::medoid_index;
    use crate::matrix::FeatureMatrix;

    #[test]
    fn picks_the_central_member() {
        let points =
            FeatureMatrix::from_rows(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [10.0, 0.0]], 2)
                .unwrap();
        assert_eq!(medoid_index(&points, &[0, 1, 2, 3]), Some(1));
        assert_eq!(medoid_index(&points, &[3, 0]), Some(3));
    }

    #[test]
    fn singleton_and_empty() {
        let points = FeatureMatrix::from_rows(&[[4.0]], 1).unwrap();
        assert_eq!(medoid_index(&points, &[0]), Some(0));
        assert_eq!(medoid_index(&points, &[]), None);
    }
}
