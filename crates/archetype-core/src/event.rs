// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::pitch::{Handedness, PitchType};

/// Pitch outcome descriptions that count as a swing.
pub const SWING_DESCRIPTIONS: [&str; 9] = [
    "swinging_strike",
    "swinging_strike_blocked",
    "foul",
    "foul_tip",
    "foul_bunt",
    "missed_bunt",
    "hit_into_play",
    "hit_into_play_no_out",
    "hit_into_play_score",
];

/// Swing descriptions that count as a miss.
pub const WHIFF_DESCRIPTIONS: [&str; 2] = ["swinging_strike", "swinging_strike_blocked"];

/// One tracked pitch. Field names follow the public pitch-tracking columns.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RawEvent {
    pub pitcher: u64,
    pub game_year: u16,
    pub player_name: Option<String>,
    pub pitch_type: Option<String>,
    pub p_throws: Handedness,
    pub stand: Option<Handedness>,
    pub release_speed: Option<f64>,
    pub release_spin_rate: Option<f64>,
    pub release_pos_x: Option<f64>,
    pub release_pos_z: Option<f64>,
    pub release_extension: Option<f64>,
    pub pfx_x: Option<f64>,
    pub pfx_z: Option<f64>,
    pub plate_x: Option<f64>,
    pub plate_z: Option<f64>,
    pub sz_top: Option<f64>,
    pub sz_bot: Option<f64>,
    pub zone: Option<u8>,
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub result_type: Option<String>,
    pub bb_type: Option<String>,
}

impl RawEvent {
    /// Minimal event with every optional column empty.
    pub fn new(pitcher: u64, game_year: u16, p_throws: Handedness) -> Self {
        Self {
            pitcher,
            game_year,
            player_name: None,
            pitch_type: None,
            p_throws,
            stand: None,
            release_speed: None,
            release_spin_rate: None,
            release_pos_x: None,
            release_pos_z: None,
            release_extension: None,
            pfx_x: None,
            pfx_z: None,
            plate_x: None,
            plate_z: None,
            sz_top: None,
            sz_bot: None,
            zone: None,
            description: None,
            result_type: None,
            bb_type: None,
        }
    }

    /// Category code, or `None` when the column is missing or blank.
    pub fn category(&self) -> Option<&str> {
        self.pitch_type
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    pub fn tracked_category(&self) -> Option<PitchType> {
        self.category().and_then(PitchType::from_code)
    }

    pub fn is_swing(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| SWING_DESCRIPTIONS.contains(&d))
    }

    pub fn is_whiff(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| WHIFF_DESCRIPTIONS.contains(&d))
    }

    /// Inside the nine-cell strike zone grid.
    pub fn in_zone(&self) -> bool {
        self.zone.is_some_and(|z| (1..=9).contains(&z))
    }

    pub fn is_batted_ball(&self) -> bool {
        self.result_type.as_deref() == Some("X")
    }

    pub fn is_ground_ball(&self) -> bool {
        self.is_batted_ball() && self.bb_type.as_deref() == Some("ground_ball")
    }

    /// Whether the batter hits from the same side the pitcher throws.
    pub fn same_side(&self) -> Option<bool> {
        self.stand.map(|stand| stand == self.p_throws)
    }
}
