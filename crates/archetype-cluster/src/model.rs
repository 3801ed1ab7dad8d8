// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::kmeans::nearest_centroid;
use crate::matrix::FeatureMatrix;
use crate::pca::{COMPONENTS, PcaProjection};
use crate::scaler::StandardScaler;
use archetype_core::{
    ArchetypeError, ClusterId, FeatureKey, Handedness, PitcherSeasonFeatures, SeasonKey,
};

/// Fitted state for one handedness partition. Never mutated after fitting.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterModel {
    pub side: Handedness,
    pub k: usize,
    pub features: Vec<FeatureKey>,
    pub scaler: StandardScaler,
    pub centroids: FeatureMatrix,
    pub pca: PcaProjection,
    pub x_offset: f64,
}

impl ClusterModel {
    pub fn cluster_id(&self, ordinal: usize) -> ClusterId {
        ClusterId::new(self.side, ordinal)
    }

    pub fn standardize(&self, row: &PitcherSeasonFeatures) -> Result<Vec<f64>, ArchetypeError> {
        if row.throws != self.side {
            return Err(ArchetypeError::invalid_input(format!(
                "row {} throws {} but model partition is {}",
                row.key(),
                row.throws,
                self.side
            )));
        }
        self.scaler.transform_row(&row.project(&self.features))
    }

    pub fn predict(&self, standardized: &[f64]) -> ClusterId {
        self.cluster_id(nearest_centroid(&self.centroids, standardized).0)
    }

    /// Right-handers shift to `+x`; left-handers mirror and shift to `-x`.
    pub fn apply_offset(&self, raw: [f64; COMPONENTS]) -> [f64; COMPONENTS] {
        let [x, y, z] = raw;
        let x = match self.side {
            Handedness::Right => x + self.x_offset,
            Handedness::Left => -x - self.x_offset,
        };
        [x, y, z]
    }

    pub fn project(&self, standardized: &[f64]) -> Result<[f64; COMPONENTS], ArchetypeError> {
        Ok(self.apply_offset(self.pca.transform_row(standardized)?))
    }

    pub fn centroid_coords(&self) -> Result<Vec<[f64; COMPONENTS]>, ArchetypeError> {
        self.centroids.rows().map(|row| self.project(row)).collect()
    }
}

/// Per-cluster geometry and its real representative member.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterSummary {
    pub id: ClusterId,
    pub size: usize,
    pub medoid: SeasonKey,
    pub medoid_coords: [f64; COMPONENTS],
    pub centroid_coords: [f64; COMPONENTS],
    pub silhouette: f64,
}
