// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Shared types for the pitcher archetype pipeline.
//!
//! Every stage (reclassification, aggregation, clustering, naming, export)
//! exchanges the records defined here. Configuration defaults live in
//! [`config`] and are validated before any stage runs.

pub mod assignment;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod features;
pub mod pitch;

pub use assignment::{AssignmentSource, ClusterAssignment, ClusterId};
pub use config::{
    ClusterConfig, FeatureConfig, NamingConfig, PipelineConfig, ReclassifyConfig,
    default_cluster_features,
};
pub use diagnostics::{CandidateScore, DIAGNOSTICS_SCHEMA_VERSION, PartitionDiagnostics};
pub use error::ArchetypeError;
pub use event::RawEvent;
pub use features::{
    FeatureKey, PitchMix, PitcherSeasonFeatures, SeasonKey, ZoneMetric, ZoneProfile,
};
pub use pitch::{Handedness, PitchType, TRACKED_PITCH_TYPES};
