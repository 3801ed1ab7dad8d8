// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use archetype_core::ArchetypeError;

/// Dense row-major `n x d` matrix.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    n: usize,
    d: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    pub fn new(n: usize, d: usize, data: Vec<f64>) -> Result<Self, ArchetypeError> {
        if d == 0 {
            return Err(ArchetypeError::invalid_input("matrix needs d >= 1"));
        }
        let expected = n.checked_mul(d).ok_or_else(|| {
            ArchetypeError::invalid_input(format!("matrix size overflow: n={n}, d={d}"))
        })?;
        if data.len() != expected {
            return Err(ArchetypeError::invalid_input(format!(
                "matrix data length mismatch: expected {expected} (n={n}, d={d}), got {}",
                data.len()
            )));
        }
        Ok(Self { n, d, data })
    }

    pub fn zeros(n: usize, d: usize) -> Self {
        Self {
            n,
            d,
            data: vec![0.0; n * d],
        }
    }

    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R], d: usize) -> Result<Self, ArchetypeError> {
        let mut data = Vec::with_capacity(rows.len() * d);
        for (idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != d {
                return Err(ArchetypeError::invalid_input(format!(
                    "row {idx} has {} columns; expected {d}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Self::new(rows.len(), d, data)
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn d(&self) -> usize {
        self.d
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.d..(i + 1) * self.d]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.d..(i + 1) * self.d]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.d)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Copies the listed rows, in order, into a new matrix.
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.d);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Self {
            n: indices.len(),
            d: self.d,
            data,
        }
    }

    pub fn column_means(&self) -> Vec<f64> {
        let mut means = vec![0.0; self.d];
        if self.n == 0 {
            return means;
        }
        for row in self.rows() {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= self.n as f64;
        }
        means
    }
}

pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    squared_euclidean(a, b).sqrt()
}

#[cfg(test)]
mod tests {
    use super::{FeatureMatrix, euclidean};

    #[test]
    fn from_rows_checks_width() {
        let ok = FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]], 2).unwrap();
        assert_eq!(ok.n(), 2);
        assert_eq!(ok.row(1), &[3.0, 4.0]);
        let err = FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]], 2).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn new_rejects_length_mismatch() {
        assert!(FeatureMatrix::new(2, 2, vec![0.0; 3]).is_err());
        assert!(FeatureMatrix::new(1, 0, vec![]).is_err());
    }

    #[test]
    fn select_and_means() {
        let m = FeatureMatrix::from_rows(&[[0.0, 0.0], [2.0, 4.0], [4.0, 8.0]], 2).unwrap();
        assert_eq!(m.column_means(), vec![2.0, 4.0]);
        let picked = m.select(&[2, 0]);
        assert_eq!(picked.as_slice(), &[4.0, 8.0, 0.0, 0.0]);
        assert_eq!(euclidean(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
    }
}
