// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::pitch::Handedness;

/// Diagnostics schema version for per-partition clustering metadata.
pub const DIAGNOSTICS_SCHEMA_VERSION: u32 = 1;

/// Score of one candidate cluster count.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateScore {
    pub k: usize,
    pub silhouette: f64,
    pub inertia: f64,
}

/// Structured diagnostics captured while fitting one partition.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionDiagnostics {
    pub side: Handedness,
    pub n: usize,
    pub d: usize,
    pub schema_version: u32,
    pub engine_version: Option<String>,
    pub runtime_ms: Option<u64>,
    pub seed: u64,
    pub candidates: Vec<CandidateScore>,
    /// Best-scoring count before the floor was applied.
    pub best_k: Option<usize>,
    pub chosen_k: usize,
    pub silhouette: f64,
    pub inertia: f64,
    pub per_cluster_silhouette: Vec<f64>,
    pub cluster_sizes: Vec<usize>,
    pub explained_variance_ratio: [f64; 3],
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
}

impl PartitionDiagnostics {
    pub fn new(side: Handedness, n: usize, d: usize, seed: u64) -> Self {
        Self {
            side,
            n,
            d,
            schema_version: DIAGNOSTICS_SCHEMA_VERSION,
            engine_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            runtime_ms: None,
            seed,
            candidates: vec![],
            best_k: None,
            chosen_k: 0,
            silhouette: 0.0,
            inertia: 0.0,
            per_cluster_silhouette: vec![],
            cluster_sizes: vec![],
            explained_variance_ratio: [0.0; 3],
            notes: vec![],
            warnings: vec![],
        }
    }
}
