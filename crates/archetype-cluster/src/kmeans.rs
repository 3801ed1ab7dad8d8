// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Lloyd's k-means with k-means++ seeding and seeded restarts.

use crate::matrix::{FeatureMatrix, squared_euclidean};
use archetype_core::ArchetypeError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Clone, Debug, PartialEq)]
pub struct KMeansConfig {
    pub k: usize,
    pub restarts: usize,
    pub max_iter: usize,
    /// Convergence threshold, scaled by the mean column variance.
    pub tolerance: f64,
    pub seed: u64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansFit {
    pub centroids: FeatureMatrix,
    pub labels: Vec<usize>,
    pub inertia: f64,
    pub iterations: usize,
    /// Index of the restart that produced this fit.
    pub restart: usize,
}

impl KMeansFit {
    pub fn k(&self) -> usize {
        self.centroids.n()
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.k()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

/// Seed for restart `restart` at cluster count `k`.
pub fn restart_seed(seed: u64, k: usize, restart: usize) -> u64 {
    let mut z = seed
        ^ (k as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (restart as u64).wrapping_mul(0xD1B5_4A32_D192_ED03);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Index and squared distance of the closest centroid; ties go to the lower index.
pub fn nearest_centroid(centroids: &FeatureMatrix, point: &[f64]) -> (usize, f64) {
    let mut best = (0usize, f64::INFINITY);
    for (idx, centroid) in centroids.rows().enumerate() {
        let dist = squared_euclidean(centroid, point);
        if dist < best.1 {
            best = (idx, dist);
        }
    }
    best
}

pub fn fit_kmeans(data: &FeatureMatrix, config: &KMeansConfig) -> Result<KMeansFit, ArchetypeError> {
    let n = data.n();
    if config.k == 0 || config.k > n {
        return Err(ArchetypeError::invalid_input(format!(
            "k-means needs 1 <= k <= n; got k={}, n={n}",
            config.k
        )));
    }
    if config.restarts == 0 || config.max_iter == 0 {
        return Err(ArchetypeError::config(
            "k-means restarts and max_iter must be >= 1",
        ));
    }
    if data.as_slice().iter().any(|v| !v.is_finite()) {
        return Err(ArchetypeError::numerical_issue(
            "k-means input contains non-finite values",
        ));
    }

    let threshold = config.tolerance * mean_column_variance(data);
    let mut best: Option<KMeansFit> = None;
    for restart in 0..config.restarts {
        let mut rng = ChaCha8Rng::seed_from_u64(restart_seed(config.seed, config.k, restart));
        let init = kmeans_plus_plus(data, config.k, &mut rng);
        let fit = lloyd(data, init, config.max_iter, threshold, restart);
        if best.as_ref().is_none_or(|incumbent| fit.inertia < incumbent.inertia) {
            best = Some(fit);
        }
    }
    best.ok_or_else(|| ArchetypeError::numerical_issue("k-means produced no fit"))
}

fn mean_column_variance(data: &FeatureMatrix) -> f64 {
    let means = data.column_means();
    let n = data.n() as f64;
    let total: f64 = data
        .rows()
        .map(|row| squared_euclidean(row, &means))
        .sum();
    total / (n * data.d() as f64)
}

fn kmeans_plus_plus(data: &FeatureMatrix, k: usize, rng: &mut ChaCha8Rng) -> FeatureMatrix {
    let n = data.n();
    let mut centroids = FeatureMatrix::zeros(k, data.d());
    let first = rng.random_range(0..n);
    centroids.row_mut(0).copy_from_slice(data.row(first));

    let mut closest: Vec<f64> = data
        .rows()
        .map(|row| squared_euclidean(row, data.row(first)))
        .collect();

    for c in 1..k {
        let total: f64 = closest.iter().sum();
        let pick = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut acc = 0.0;
            let mut chosen = None;
            for (idx, &weight) in closest.iter().enumerate() {
                acc += weight;
                if acc > target && weight > 0.0 {
                    chosen = Some(idx);
                    break;
                }
            }
            chosen.unwrap_or_else(|| closest.iter().rposition(|&w| w > 0.0).unwrap_or(0))
        } else {
            rng.random_range(0..n)
        };
        centroids.row_mut(c).copy_from_slice(data.row(pick));
        for (slot, row) in closest.iter_mut().zip(data.rows()) {
            let dist = squared_euclidean(row, data.row(pick));
            if dist < *slot {
                *slot = dist;
            }
        }
    }
    centroids
}

fn assign(data: &FeatureMatrix, centroids: &FeatureMatrix, labels: &mut [usize]) -> f64 {
    let mut inertia = 0.0;
    for (label, row) in labels.iter_mut().zip(data.rows()) {
        let (idx, dist) = nearest_centroid(centroids, row);
        *label = idx;
        inertia += dist;
    }
    inertia
}

/// Moves the point farthest from its centroid into each empty cluster.
fn fill_empty_clusters(data: &FeatureMatrix, centroids: &FeatureMatrix, labels: &mut [usize]) {
    let k = centroids.n();
    let mut sizes = vec![0usize; k];
    for &label in labels.iter() {
        sizes[label] += 1;
    }
    for empty in 0..k {
        if sizes[empty] > 0 {
            continue;
        }
        let mut donor: Option<(usize, f64)> = None;
        for (idx, row) in data.rows().enumerate() {
            let label = labels[idx];
            if sizes[label] < 2 {
                continue;
            }
            let dist = squared_euclidean(row, centroids.row(label));
            if donor.is_none_or(|(_, best)| dist > best) {
                donor = Some((idx, dist));
            }
        }
        if let Some((idx, _)) = donor {
            sizes[labels[idx]] -= 1;
            labels[idx] = empty;
            sizes[empty] = 1;
        }
    }
}

fn update_centroids(
    data: &FeatureMatrix,
    labels: &[usize],
    previous: &FeatureMatrix,
) -> FeatureMatrix {
    let k = previous.n();
    let mut sums = FeatureMatrix::zeros(k, data.d());
    let mut counts = vec![0usize; k];
    for (row, &label) in data.rows().zip(labels) {
        counts[label] += 1;
        for (acc, value) in sums.row_mut(label).iter_mut().zip(row) {
            *acc += value;
        }
    }
    for (c, &count) in counts.iter().enumerate() {
        if count == 0 {
            sums.row_mut(c).copy_from_slice(previous.row(c));
        } else {
            for value in sums.row_mut(c) {
                *value /= count as f64;
            }
        }
    }
    sums
}

fn lloyd(
    data: &FeatureMatrix,
    init: FeatureMatrix,
    max_iter: usize,
    threshold: f64,
    restart: usize,
) -> KMeansFit {
    let mut centroids = init;
    let mut labels = vec![0usize; data.n()];
    let mut iterations = 0;
    for _ in 0..max_iter {
        iterations += 1;
        assign(data, &centroids, &mut labels);
        fill_empty_clusters(data, &centroids, &mut labels);
        let updated = update_centroids(data, &labels, &centroids);
        let shift: f64 = centroids
            .rows()
            .zip(updated.rows())
            .map(|(old, new)| squared_euclidean(old, new))
            .sum();
        centroids = updated;
        if shift <= threshold {
            break;
        }
    }

    let mut inertia = assign(data, &centroids, &mut labels);
    let before = labels.clone();
    fill_empty_clusters(data, &centroids, &mut labels);
    if labels != before {
        centroids = update_centroids(data, &labels, &centroids);
        inertia = data
            .rows()
            .zip(&labels)
            .map(|(row, &label)| squared_euclidean(row, centroids.row(label)))
            .sum();
    }

    KMeansFit {
        centroids,
        labels,
        inertia,
        iterations,
        restart,
    }
}
