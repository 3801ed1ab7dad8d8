// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Clustering stage: standardize each handedness partition, search cluster
//! counts by silhouette, refit, project to 3-D, and locate medoids.
//!
//! Fitted [`ClusterModel`]s are immutable; [`assign_nearest`] places
//! sub-threshold rows without touching them.

pub mod fallback;
pub mod kmeans;
pub mod matrix;
pub mod medoid;
pub mod model;
pub mod partition;
pub mod pca;
pub mod scaler;
pub mod selection;
pub mod silhouette;

pub use fallback::{assign_fallback, assign_nearest};
pub use kmeans::{KMeansConfig, KMeansFit, fit_kmeans, nearest_centroid};
pub use matrix::{FeatureMatrix, euclidean, squared_euclidean};
pub use medoid::medoid_index;
pub use model::{ClusterModel, ClusterSummary};
pub use partition::{ClusteringOutcome, PartitionFit, fit_all, fit_partition};
pub use pca::PcaProjection;
pub use scaler::StandardScaler;
pub use selection::{ClusterSelector, Fit, Searching, Unfit};
pub use silhouette::{SilhouetteReport, silhouette};
