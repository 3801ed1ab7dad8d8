// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::error::ArchetypeError;
use crate::features::SeasonKey;
use crate::pitch::Handedness;
use std::fmt;
use std::str::FromStr;

/// Cluster label unique across partitions, rendered as `R_3` / `L_0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "String", try_from = "String")
)]
pub struct ClusterId {
    pub side: Handedness,
    pub ordinal: usize,
}

impl ClusterId {
    pub fn new(side: Handedness, ordinal: usize) -> Self {
        Self { side, ordinal }
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.side.code(), self.ordinal)
    }
}

impl FromStr for ClusterId {
    type Err = ArchetypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (side, ordinal) = s.split_once('_').ok_or_else(|| {
            ArchetypeError::invalid_input(format!("cluster id must look like R_0; got '{s}'"))
        })?;
        let ordinal = ordinal.parse::<usize>().map_err(|err| {
            ArchetypeError::invalid_input(format!("cluster id '{s}' has bad ordinal: {err}"))
        })?;
        Ok(Self::new(side.parse()?, ordinal))
    }
}

impl From<ClusterId> for String {
    fn from(id: ClusterId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for ClusterId {
    type Error = ArchetypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How a row received its cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum AssignmentSource {
    /// Member of the partition the model was fit on.
    Fitted,
    /// Sub-threshold row placed by nearest centroid.
    Fallback,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterAssignment {
    pub key: SeasonKey,
    pub cluster: ClusterId,
    /// Offset 3-D projection; x carries the partition offset.
    pub coords: [f64; 3],
    pub source: AssignmentSource,
}
