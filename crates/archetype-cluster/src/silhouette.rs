// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::matrix::{FeatureMatrix, euclidean};
use archetype_core::ArchetypeError;

#[derive(Clone, Debug, PartialEq)]
pub struct SilhouetteReport {
    pub mean: f64,
    /// Mean sample score per label; `0.0` for labels with no members.
    pub per_cluster: Vec<f64>,
    pub samples: Vec<f64>,
}

/// Euclidean silhouette over `k` labels.
///
/// Defined only when the number of non-empty clusters lies in `[2, n - 1]`.
/// Members of singleton clusters score `0.0`.
pub fn silhouette(
    data: &FeatureMatrix,
    labels: &[usize],
    k: usize,
) -> Result<SilhouetteReport, ArchetypeError> {
    let n = data.n();
    if labels.len() != n {
        return Err(ArchetypeError::invalid_input(format!(
            "silhouette labels length {} does not match n={n}",
            labels.len()
        )));
    }
    let mut sizes = vec![0usize; k];
    for &label in labels {
        if label >= k {
            return Err(ArchetypeError::invalid_input(format!(
                "label {label} out of range for k={k}"
            )));
        }
        sizes[label] += 1;
    }
    let occupied = sizes.iter().filter(|&&size| size > 0).count();
    if occupied < 2 || occupied >= n {
        return Err(ArchetypeError::numerical_issue(format!(
            "silhouette undefined for {occupied} occupied clusters over n={n}"
        )));
    }

    let mut samples = Vec::with_capacity(n);
    let mut sums = vec![0.0; k];
    for i in 0..n {
        sums.iter_mut().for_each(|sum| *sum = 0.0);
        let point = data.row(i);
        for (j, other) in data.rows().enumerate() {
            if i != j {
                sums[labels[j]] += euclidean(point, other);
            }
        }
        let own = labels[i];
        if sizes[own] == 1 {
            samples.push(0.0);
            continue;
        }
        let a = sums[own] / (sizes[own] - 1) as f64;
        let b = (0..k)
            .filter(|&c| c != own && sizes[c] > 0)
            .map(|c| sums[c] / sizes[c] as f64)
            .fold(f64::INFINITY, f64::min);
        let denom = a.max(b);
        samples.push(if denom > 0.0 { (b - a) / denom } else { 0.0 });
    }

    let mut per_cluster = vec![0.0; k];
    for (score, &label) in samples.iter().zip(labels) {
        per_cluster[label] += score;
    }
    for (mean, &size) in per_cluster.iter_mut().zip(&sizes) {
        if size > 0 {
            *mean /= size as f64;
        }
    }
    let mean = samples.iter().sum::<f64>() / n as f64;
    Ok(SilhouetteReport {
        mean,
        per_cluster,
        samples,
    })
}
