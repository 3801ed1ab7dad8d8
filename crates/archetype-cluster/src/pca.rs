// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Three-component PCA via a Jacobi eigendecomposition of the covariance.

use crate::matrix::FeatureMatrix;
use archetype_core::ArchetypeError;

pub const COMPONENTS: usize = 3;
const MAX_SWEEPS: usize = 100;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PcaProjection {
    pub mean: Vec<f64>,
    /// `COMPONENTS x d`; rows past the feature count are zero.
    pub components: FeatureMatrix,
    pub explained_variance: [f64; COMPONENTS],
    pub explained_variance_ratio: [f64; COMPONENTS],
}

impl PcaProjection {
    /// Fits on an already standardized matrix. Each component's largest
    /// absolute loading is made positive so the basis is deterministic.
    pub fn fit(data: &FeatureMatrix) -> Result<Self, ArchetypeError> {
        if data.is_empty() {
            return Err(ArchetypeError::invalid_input("cannot fit PCA on zero rows"));
        }
        let d = data.d();
        let mean = data.column_means();
        let denom = (data.n().saturating_sub(1)).max(1) as f64;

        let mut cov = vec![0.0; d * d];
        for row in data.rows() {
            for i in 0..d {
                let di = row[i] - mean[i];
                for j in i..d {
                    cov[i * d + j] += di * (row[j] - mean[j]);
                }
            }
        }
        for i in 0..d {
            for j in i..d {
                cov[i * d + j] /= denom;
                cov[j * d + i] = cov[i * d + j];
            }
        }
        if cov.iter().any(|v| !v.is_finite()) {
            return Err(ArchetypeError::numerical_issue(
                "covariance contains non-finite values",
            ));
        }

        let (eigenvalues, eigenvectors) = jacobi_eigen(cov, d);
        let mut order: Vec<usize> = (0..d).collect();
        order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]));

        let total: f64 = eigenvalues.iter().map(|v| v.max(0.0)).sum();
        let mut components = FeatureMatrix::zeros(COMPONENTS, d);
        let mut explained_variance = [0.0; COMPONENTS];
        let mut explained_variance_ratio = [0.0; COMPONENTS];
        for (slot, &idx) in order.iter().take(COMPONENTS).enumerate() {
            let row = components.row_mut(slot);
            for (i, value) in row.iter_mut().enumerate() {
                *value = eigenvectors[i * d + idx];
            }
            let mut pivot = 0;
            for i in 1..d {
                if row[i].abs() > row[pivot].abs() {
                    pivot = i;
                }
            }
            if row[pivot] < 0.0 {
                row.iter_mut().for_each(|v| *v = -*v);
            }
            let variance = eigenvalues[idx].max(0.0);
            explained_variance[slot] = variance;
            explained_variance_ratio[slot] = if total > 0.0 { variance / total } else { 0.0 };
        }

        Ok(Self {
            mean,
            components,
            explained_variance,
            explained_variance_ratio,
        })
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<[f64; COMPONENTS], ArchetypeError> {
        if row.len() != self.mean.len() {
            return Err(ArchetypeError::invalid_input(format!(
                "row has {} columns; PCA was fit on {}",
                row.len(),
                self.mean.len()
            )));
        }
        let mut out = [0.0; COMPONENTS];
        for (slot, component) in out.iter_mut().zip(self.components.rows()) {
            let value: f64 = row
                .iter()
                .zip(&self.mean)
                .zip(component)
                .map(|((x, m), w)| (x - m) * w)
                .sum();
            *slot = if value.is_finite() { value } else { 0.0 };
        }
        Ok(out)
    }
}

/// Cyclic Jacobi for a symmetric `d x d` matrix; returns eigenvalues and
/// column eigenvectors (`v[i * d + j]` is entry `i` of vector `j`).
fn jacobi_eigen(mut a: Vec<f64>, d: usize) -> (Vec<f64>, Vec<f64>) {
    let mut v = vec![0.0; d * d];
    for i in 0..d {
        v[i * d + i] = 1.0;
    }
    let scale: f64 = a.iter().map(|x| x * x).sum::<f64>().max(f64::MIN_POSITIVE);

    for _ in 0..MAX_SWEEPS {
        let mut off = 0.0;
        for p in 0..d {
            for q in (p + 1)..d {
                off += a[p * d + q] * a[p * d + q];
            }
        }
        if off <= 1e-24 * scale {
            break;
        }
        for p in 0..d {
            for q in (p + 1)..d {
                let apq = a[p * d + q];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[q * d + q] - a[p * d + p]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;
                for k in 0..d {
                    let akp = a[k * d + p];
                    let akq = a[k * d + q];
                    a[k * d + p] = c * akp - s * akq;
                    a[k * d + q] = s * akp + c * akq;
                }
                for k in 0..d {
                    let apk = a[p * d + k];
                    let aqk = a[q * d + k];
                    a[p * d + k] = c * apk - s * aqk;
                    a[q * d + k] = s * apk + c * aqk;
                }
                for k in 0..d {
                    let vkp = v[k * d + p];
                    let vkq = v[k * d + q];
                    v[k * d + p] = c * vkp - s * vkq;
                    v[k * d + q] = s * vkp + c * vkq;
                }
            }
        }
    }
    let eigenvalues = (0..d).map(|i| a[i * d + i]).collect();
    (eigenvalues, v)
}
