// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Cluster-count selection as a type-state machine: `Unfit -> Searching -> Fit`.
//!
//! Standardization parameters are fixed on entering `Searching`; the final
//! k-means refit happens on entering `Fit`.

use crate::kmeans::{KMeansConfig, KMeansFit, fit_kmeans};
use crate::matrix::FeatureMatrix;
use crate::scaler::StandardScaler;
use crate::silhouette::{SilhouetteReport, silhouette};
use archetype_core::{ArchetypeError, CandidateScore, ClusterConfig};
use tracing::{debug, warn};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Silhouette recorded for a candidate whose score is undefined.
const UNSCORED: f64 = -1.0;

#[derive(Debug)]
pub struct Unfit;

#[derive(Debug)]
pub struct Searching {
    scaler: StandardScaler,
    standardized: FeatureMatrix,
}

#[derive(Debug)]
pub struct Fit {
    pub scaler: StandardScaler,
    pub standardized: FeatureMatrix,
    pub kmeans: KMeansFit,
    pub candidates: Vec<CandidateScore>,
    pub best_k: Option<usize>,
    pub chosen_k: usize,
    pub silhouette: SilhouetteReport,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct ClusterSelector<S> {
    config: ClusterConfig,
    state: S,
}

/// Best candidate at or above `min_k`, else the global best raised to the
/// floor. Strictly greater scores win, so ties keep the smaller k.
pub fn choose_k(candidates: &[CandidateScore], min_k: usize) -> (Option<usize>, usize) {
    let first_max = |accept: &dyn Fn(&CandidateScore) -> bool| {
        let mut best: Option<&CandidateScore> = None;
        for candidate in candidates.iter().filter(|c| accept(*c)) {
            if best.is_none_or(|b| candidate.silhouette > b.silhouette) {
                best = Some(candidate);
            }
        }
        best.map(|c| c.k)
    };
    let global = first_max(&|_| true);
    match first_max(&|c| c.k >= min_k) {
        Some(k) => (global, k),
        None => (global, global.unwrap_or(min_k).max(min_k)),
    }
}

impl ClusterSelector<Unfit> {
    pub fn new(config: ClusterConfig) -> Result<Self, ArchetypeError> {
        config.validate()?;
        Ok(Self { config, state: Unfit })
    }

    /// Fits the scaler and standardizes. A partition too small for the
    /// floor is a configuration error.
    pub fn standardize(
        self,
        raw: &FeatureMatrix,
    ) -> Result<ClusterSelector<Searching>, ArchetypeError> {
        let needed = self.config.min_k + 1;
        if raw.n() < needed {
            return Err(ArchetypeError::config(format!(
                "partition has {} qualified rows; min_k={} needs at least {needed}",
                raw.n(),
                self.config.min_k
            )));
        }
        if raw.d() != self.config.features.len() {
            return Err(ArchetypeError::invalid_input(format!(
                "feature matrix has {} columns; config lists {} features",
                raw.d(),
                self.config.features.len()
            )));
        }
        let scaler = StandardScaler::fit(raw, self.config.clip)?;
        let standardized = scaler.transform(raw)?;
        Ok(ClusterSelector {
            config: self.config,
            state: Searching {
                scaler,
                standardized,
            },
        })
    }
}

impl ClusterSelector<Searching> {
    pub fn standardized(&self) -> &FeatureMatrix {
        &self.state.standardized
    }

    fn kmeans_config(&self, k: usize, restarts: usize, max_iter: usize) -> KMeansConfig {
        KMeansConfig {
            k,
            restarts,
            max_iter,
            tolerance: self.config.tolerance,
            seed: self.config.seed,
        }
    }

    fn score(&self, k: usize) -> Result<CandidateScore, ArchetypeError> {
        let cfg = self.kmeans_config(k, self.config.search_restarts, self.config.search_max_iter);
        let fit = fit_kmeans(&self.state.standardized, &cfg)?;
        let score = match silhouette(&self.state.standardized, &fit.labels, k) {
            Ok(report) => report.mean,
            Err(err) => {
                warn!(k, error = %err, "candidate silhouette undefined");
                UNSCORED
            }
        };
        debug!(k, silhouette = score, inertia = fit.inertia, "scored candidate");
        Ok(CandidateScore {
            k,
            silhouette: score,
            inertia: fit.inertia,
        })
    }

    /// Scores every candidate with `k <= n - 1`, in ascending k.
    pub fn score_candidates(&self) -> Result<Vec<CandidateScore>, ArchetypeError> {
        let n = self.state.standardized.n();
        let ks: Vec<usize> = self.config.candidates().filter(|&k| k < n).collect();

        #[cfg(feature = "rayon")]
        let scored: Vec<Result<CandidateScore, ArchetypeError>> =
            ks.par_iter().map(|&k| self.score(k)).collect();
        #[cfg(not(feature = "rayon"))]
        let scored: Vec<Result<CandidateScore, ArchetypeError>> =
            ks.iter().map(|&k| self.score(k)).collect();

        scored.into_iter().collect()
    }

    pub fn select(self) -> Result<ClusterSelector<Fit>, ArchetypeError> {
        let candidates = self.score_candidates()?;
        let (best_k, chosen_k) = choose_k(&candidates, self.config.min_k);
        let mut warnings = Vec::new();
        if best_k.is_some_and(|k| k < chosen_k) {
            warnings.push(format!(
                "best silhouette at k={} below floor; using k={chosen_k}",
                best_k.unwrap_or_default()
            ));
        }
        if candidates.is_empty() {
            warnings.push(format!("no scoreable candidates; using floor k={chosen_k}"));
        }

        let cfg = self.kmeans_config(
            chosen_k,
            self.config.final_restarts,
            self.config.final_max_iter,
        );
        let kmeans = fit_kmeans(&self.state.standardized, &cfg)?;
        let report = match silhouette(&self.state.standardized, &kmeans.labels, chosen_k) {
            Ok(report) => report,
            Err(err) => {
                warnings.push(format!("final silhouette undefined: {err}"));
                SilhouetteReport {
                    mean: UNSCORED,
                    per_cluster: vec![0.0; chosen_k],
                    samples: vec![0.0; self.state.standardized.n()],
                }
            }
        };

        Ok(ClusterSelector {
            config: self.config,
            state: Fit {
                scaler: self.state.scaler,
                standardized: self.state.standardized,
                kmeans,
                candidates,
                best_k,
                chosen_k,
                silhouette: report,
                warnings,
            },
        })
    }
}

impl ClusterSelector<Fit> {
    pub fn chosen_k(&self) -> usize {
        self.state.chosen_k
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn into_fit(self) -> Fit {
        self.state
    }
}
