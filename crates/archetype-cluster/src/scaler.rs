// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::matrix::FeatureMatrix;
use archetype_core::ArchetypeError;

/// Per-column z-scoring fixed at fit time, followed by clipping.
///
/// Columns with zero spread keep a unit scale so they standardize to zero.
/// Non-finite inputs and outputs are replaced with `0.0`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
    pub clip: f64,
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

impl StandardScaler {
    pub fn fit(raw: &FeatureMatrix, clip: f64) -> Result<Self, ArchetypeError> {
        if raw.is_empty() {
            return Err(ArchetypeError::invalid_input("cannot fit scaler on zero rows"));
        }
        if !clip.is_finite() || clip <= 0.0 {
            return Err(ArchetypeError::config(format!(
                "clip must be finite and > 0; got {clip}"
            )));
        }
        let d = raw.d();
        let n = raw.n() as f64;
        let mut means = vec![0.0; d];
        for row in raw.rows() {
            for (mean, &value) in means.iter_mut().zip(row) {
                *mean += finite_or_zero(value);
            }
        }
        for mean in &mut means {
            *mean /= n;
        }
        let mut variances = vec![0.0; d];
        for row in raw.rows() {
            for ((var, &value), mean) in variances.iter_mut().zip(row).zip(&means) {
                let delta = finite_or_zero(value) - mean;
                *var += delta * delta;
            }
        }
        let scales = variances
            .into_iter()
            .map(|var| {
                let std = (var / n).sqrt();
                if std > 0.0 && std.is_finite() { std } else { 1.0 }
            })
            .collect();
        Ok(Self { means, scales, clip })
    }

    pub fn d(&self) -> usize {
        self.means.len()
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, ArchetypeError> {
        if row.len() != self.d() {
            return Err(ArchetypeError::invalid_input(format!(
                "row has {} columns; scaler was fit on {}",
                row.len(),
                self.d()
            )));
        }
        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(&value, (mean, scale))| {
                let z = (finite_or_zero(value) - mean) / scale;
                finite_or_zero(z.clamp(-self.clip, self.clip))
            })
            .collect())
    }

    pub fn transform(&self, raw: &FeatureMatrix) -> Result<FeatureMatrix, ArchetypeError> {
        let mut data = Vec::with_capacity(raw.n() * raw.d());
        for row in raw.rows() {
            data.extend(self.transform_row(row)?);
        }
        FeatureMatrix::new(raw.n(), self.d(), data)
    }
}

#[cfg(test)]
mod tests {
    use super::StandardScaler;
    use crate::matrix::FeatureMatrix;

    #[test]
    fn standardizes_with_population_std() {
        let raw = FeatureMatrix::from_rows(&[[1.0, 5.0], [3.0, 5.0]], 2).unwrap();
        let scaler = StandardScaler::fit(&raw, 10.0).unwrap();
        assert_eq!(scaler.means, vec![2.0, 5.0]);
        assert_eq!(scaler.scales, vec![1.0, 1.0]);
        let z = scaler.transform(&raw).unwrap();
        assert_eq!(z.as_slice(), &[-1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn clips_outliers_and_zeroes_non_finite() {
        let mut rows = vec![[0.0]; 200];
        rows.push([1000.0]);
        let raw = FeatureMatrix::from_rows(&rows, 1).unwrap();
        let scaler = StandardScaler::fit(&raw, 10.0).unwrap();
        let z = scaler.transform(&raw).unwrap();
        assert_eq!(z.row(200)[0], 10.0);

        let out = scaler.transform_row(&[f64::NAN]).unwrap();
        assert!(out[0].is_finite());
    }

    #[test]
    fn rejects_wrong_width_and_empty_input() {
        let raw = FeatureMatrix::from_rows(&[[1.0, 2.0]], 2).unwrap();
        let scaler = StandardScaler::fit(&raw, 10.0).unwrap();
        assert!(scaler.transform_row(&[1.0]).is_err());
        assert!(StandardScaler::fit(&FeatureMatrix::zeros(0, 2), 10.0).is_err());
    }
}
