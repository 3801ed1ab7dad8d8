// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Deterministic synthetic inputs shared by the benches.

use archetype_cluster::FeatureMatrix;
use archetype_core::ArchetypeError;

fn lcg_next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state
}

fn unit(state: &mut u64) -> f64 {
    (lcg_next(state) >> 11) as f64 / (1u64 << 53) as f64
}

/// `n` rows of `d` columns drawn around `blobs` well-separated centers.
pub fn blobs(n: usize, d: usize, blobs: usize, seed: u64) -> Result<FeatureMatrix, ArchetypeError> {
    let mut state = seed ^ 0x9e37_79b9_7f4a_7c15;
    let blobs = blobs.max(1);
    let mut data = Vec::with_capacity(n * d);
    for row in 0..n {
        let center = (row % blobs) as f64 * 4.0;
        for col in 0..d {
            let jitter = unit(&mut state) - 0.5;
            let shift = if col % 2 == 0 { center } else { -center };
            data.push(shift + jitter);
        }
    }
    FeatureMatrix::new(n, d, data)
}

/// Round-robin labels matching [`blobs`].
pub fn blob_labels(n: usize, blobs: usize) -> Vec<usize> {
    let blobs = blobs.max(1);
    (0..n).map(|row| row % blobs).collect()
}
