// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! One parameterized pipeline run per handedness partition.

use crate::matrix::FeatureMatrix;
use crate::medoid::medoid_index;
use crate::model::{ClusterModel, ClusterSummary};
use crate::pca::PcaProjection;
use crate::selection::ClusterSelector;
use archetype_core::{
    ArchetypeError, AssignmentSource, ClusterAssignment, ClusterConfig, Handedness,
    PartitionDiagnostics, PitcherSeasonFeatures,
};
use std::time::Instant;
use tracing::info;

#[derive(Clone, Debug)]
pub struct PartitionFit {
    pub model: ClusterModel,
    pub assignments: Vec<ClusterAssignment>,
    pub summaries: Vec<ClusterSummary>,
    pub diagnostics: PartitionDiagnostics,
}

#[derive(Clone, Debug)]
pub struct ClusteringOutcome {
    pub right: PartitionFit,
    pub left: PartitionFit,
}

impl ClusteringOutcome {
    pub fn partitions(&self) -> [&PartitionFit; 2] {
        [&self.right, &self.left]
    }

    pub fn partition(&self, side: Handedness) -> &PartitionFit {
        match side {
            Handedness::Right => &self.right,
            Handedness::Left => &self.left,
        }
    }

    pub fn into_models(self) -> Vec<ClusterModel> {
        vec![self.right.model, self.left.model]
    }
}

/// Standardizes, selects k, refits, projects, and locates medoids for the
/// rows of one partition.
pub fn fit_partition(
    rows: &[&PitcherSeasonFeatures],
    side: Handedness,
    config: &ClusterConfig,
) -> Result<PartitionFit, ArchetypeError> {
    let started = Instant::now();
    if let Some(stray) = rows.iter().find(|row| row.throws != side) {
        return Err(ArchetypeError::invalid_input(format!(
            "row {} throws {} in the {side} partition",
            stray.key(),
            stray.throws
        )));
    }
    let d = config.features.len();
    let projected: Vec<Vec<f64>> = rows.iter().map(|row| row.project(&config.features)).collect();
    let raw = FeatureMatrix::from_rows(&projected, d)?;

    let fit = ClusterSelector::new(config.clone())?
        .standardize(&raw)
        .map_err(|err| match err {
            ArchetypeError::Config(msg) => ArchetypeError::config(format!("{side} partition: {msg}")),
            other => other,
        })?
        .select()?
        .into_fit();

    let pca = PcaProjection::fit(&fit.standardized)?;
    let model = ClusterModel {
        side,
        k: fit.chosen_k,
        features: config.features.clone(),
        scaler: fit.scaler,
        centroids: fit.kmeans.centroids.clone(),
        pca,
        x_offset: config.x_offset,
    };

    let mut assignments = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        assignments.push(ClusterAssignment {
            key: row.key(),
            cluster: model.cluster_id(fit.kmeans.labels[idx]),
            coords: model.project(fit.standardized.row(idx))?,
            source: AssignmentSource::Fitted,
        });
    }

    let centroid_coords = model.centroid_coords()?;
    let mut summaries = Vec::with_capacity(model.k);
    for ordinal in 0..model.k {
        let members: Vec<usize> = fit
            .kmeans
            .labels
            .iter()
            .enumerate()
            .filter(|(_, label)| **label == ordinal)
            .map(|(idx, _)| idx)
            .collect();
        let Some(medoid) = medoid_index(&fit.standardized, &members) else {
            continue;
        };
        summaries.push(ClusterSummary {
            id: model.cluster_id(ordinal),
            size: members.len(),
            medoid: rows[medoid].key(),
            medoid_coords: assignments[medoid].coords,
            centroid_coords: centroid_coords[ordinal],
            silhouette: fit.silhouette.per_cluster.get(ordinal).copied().unwrap_or(0.0),
        });
    }

    let mut diagnostics = PartitionDiagnostics::new(side, raw.n(), d, config.seed);
    diagnostics.candidates = fit.candidates;
    diagnostics.best_k = fit.best_k;
    diagnostics.chosen_k = fit.chosen_k;
    diagnostics.silhouette = fit.silhouette.mean;
    diagnostics.inertia = fit.kmeans.inertia;
    diagnostics.per_cluster_silhouette = fit.silhouette.per_cluster;
    diagnostics.cluster_sizes = fit.kmeans.cluster_sizes();
    diagnostics.explained_variance_ratio = model.pca.explained_variance_ratio;
    diagnostics.warnings = fit.warnings;
    diagnostics.notes.push(format!(
        "final fit used restart {} after {} iterations",
        fit.kmeans.restart, fit.kmeans.iterations
    ));
    diagnostics.runtime_ms = u64::try_from(started.elapsed().as_millis()).ok();

    info!(
        side = %side,
        rows = raw.n(),
        k = model.k,
        silhouette = diagnostics.silhouette,
        "fitted partition"
    );
    Ok(PartitionFit {
        model,
        assignments,
        summaries,
        diagnostics,
    })
}

/// Splits qualified rows by throwing hand and fits both partitions
/// independently.
pub fn fit_all(
    qualified: &[PitcherSeasonFeatures],
    config: &ClusterConfig,
) -> Result<ClusteringOutcome, ArchetypeError> {
    config.validate()?;
    let (right, left): (Vec<&PitcherSeasonFeatures>, Vec<&PitcherSeasonFeatures>) = qualified
        .iter()
        .partition(|row| row.throws == Handedness::Right);

    #[cfg(feature = "rayon")]
    let (right, left) = rayon::join(
        || fit_partition(&right, Handedness::Right, config),
        || fit_partition(&left, Handedness::Left, config),
    );
    #[cfg(not(feature = "rayon"))]
    let (right, left) = (
        fit_partition(&right, Handedness::Right, config),
        fit_partition(&left, Handedness::Left, config),
    );

    Ok(ClusteringOutcome {
        right: right?,
        left: left?,
    })
}
