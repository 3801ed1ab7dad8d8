// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::error::ArchetypeError;
use std::fmt;
use std::str::FromStr;

/// Throwing (or batting) hand.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Handedness {
    #[cfg_attr(feature = "serde", serde(rename = "R"))]
    Right,
    #[cfg_attr(feature = "serde", serde(rename = "L"))]
    Left,
}

impl Handedness {
    pub const BOTH: [Handedness; 2] = [Handedness::Right, Handedness::Left];

    pub fn code(self) -> &'static str {
        match self {
            Self::Right => "R",
            Self::Left => "L",
        }
    }

    /// Label used for role/hand-keyed profiles (`RHP`, `LHP`).
    pub fn pitcher_label(self) -> &'static str {
        match self {
            Self::Right => "RHP",
            Self::Left => "LHP",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Handedness {
    type Err = ArchetypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "R" | "r" => Ok(Self::Right),
            "L" | "l" => Ok(Self::Left),
            other => Err(ArchetypeError::invalid_input(format!(
                "handedness must be R or L; got '{other}'"
            ))),
        }
    }
}

/// Pitch categories tracked by the usage vector.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PitchType {
    #[cfg_attr(feature = "serde", serde(rename = "FF"))]
    FourSeam,
    #[cfg_attr(feature = "serde", serde(rename = "SI"))]
    Sinker,
    #[cfg_attr(feature = "serde", serde(rename = "FC"))]
    Cutter,
    #[cfg_attr(feature = "serde", serde(rename = "SL"))]
    Slider,
    #[cfg_attr(feature = "serde", serde(rename = "CH"))]
    Changeup,
    #[cfg_attr(feature = "serde", serde(rename = "CU"))]
    Curveball,
    #[cfg_attr(feature = "serde", serde(rename = "FS"))]
    Splitter,
    #[cfg_attr(feature = "serde", serde(rename = "KC"))]
    KnuckleCurve,
    #[cfg_attr(feature = "serde", serde(rename = "ST"))]
    Sweeper,
    #[cfg_attr(feature = "serde", serde(rename = "KN"))]
    Knuckleball,
}

/// Tracked vocabulary in canonical column order.
pub const TRACKED_PITCH_TYPES: [PitchType; 10] = [
    PitchType::FourSeam,
    PitchType::Sinker,
    PitchType::Cutter,
    PitchType::Slider,
    PitchType::Changeup,
    PitchType::Curveball,
    PitchType::Splitter,
    PitchType::KnuckleCurve,
    PitchType::Sweeper,
    PitchType::Knuckleball,
];

impl PitchType {
    pub fn code(self) -> &'static str {
        match self {
            Self::FourSeam => "FF",
            Self::Sinker => "SI",
            Self::Cutter => "FC",
            Self::Slider => "SL",
            Self::Changeup => "CH",
            Self::Curveball => "CU",
            Self::Splitter => "FS",
            Self::KnuckleCurve => "KC",
            Self::Sweeper => "ST",
            Self::Knuckleball => "KN",
        }
    }

    /// Parses a tracked code. Untracked and ambiguous codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        TRACKED_PITCH_TYPES
            .iter()
            .copied()
            .find(|pitch| pitch.code() == code.trim())
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_fastball(self) -> bool {
        matches!(self, Self::FourSeam | Self::Sinker | Self::Cutter)
    }
}

impl fmt::Display for PitchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
