// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Event-level preprocessing: resolving the ambiguous breaking-ball code and
//! rolling tracked pitches up into one feature row per pitcher-season.

pub mod aggregate;
pub mod reclassify;
pub mod roles;
pub mod zone;

pub use aggregate::{FeatureAggregator, FeatureTables};
pub use reclassify::{CategoryMap, CategoryReclassifier, MapProvenance, Resolution};
pub use roles::{RoleEntry, RoleTable};
pub use zone::{LocationSummary, summarize_locations};
