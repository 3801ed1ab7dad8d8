// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Flat, rounded rows for downstream consumers.

use crate::error::CliError;
use crate::store::MemberLabels;
use archetype_core::{
    AssignmentSource, ClusterAssignment, ClusterId, NamingConfig, PitchMix, PitcherSeasonFeatures,
    SeasonKey,
};
use archetype_naming::{ArchetypeProfile, MemberLabel, RoleClass, profile_key};
use serde::Serialize;
use std::collections::BTreeMap;

const RATIO_PLACES: i32 = 3;
const RATE_PLACES: i32 = 4;
const COORD_PLACES: i32 = 4;
const MEASURE_PLACES: i32 = 1;

pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExportRow {
    pub pitcher: u64,
    pub season: u16,
    pub name: String,
    pub hand: String,
    pub total_pitches: usize,
    pub cluster: ClusterId,
    pub source: AssignmentSource,
    pub archetype: String,
    pub sub_archetype: String,
    pub hybrid: bool,
    pub display: String,
    pub emoji: String,
    pub color: String,
    pub role: RoleClass,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub usage: PitchMix,
    pub avg_velo_ff: f64,
    pub spin_overall: f64,
    pub arm_angle: f64,
    pub avg_extension: f64,
    pub swing_rate: f64,
    pub whiff_rate: f64,
    pub zone_rate: f64,
    pub groundball_rate: f64,
    pub platoon_lateral_shift: f64,
    pub platoon_height_shift: f64,
    pub entropy_shift: f64,
    pub starter_ratio: f64,
}

/// Joins every assignment with its feature row, member label, and profile.
pub fn export_rows(
    rows: &[PitcherSeasonFeatures],
    assignments: &[ClusterAssignment],
    labels: &MemberLabels,
    profiles: &BTreeMap<String, ArchetypeProfile>,
    naming: &NamingConfig,
) -> Result<Vec<ExportRow>, CliError> {
    let by_key: BTreeMap<SeasonKey, &PitcherSeasonFeatures> =
        rows.iter().map(|row| (row.key(), row)).collect();
    let label_by_key: BTreeMap<SeasonKey, &MemberLabel> =
        labels.labels.iter().map(|label| (label.key, label)).collect();

    assignments
        .iter()
        .map(|assignment| {
            let key = assignment.key;
            let row = by_key
                .get(&key)
                .ok_or_else(|| CliError::invalid_input(format!("no feature row for {key}")))?;
            let label = label_by_key
                .get(&key)
                .ok_or_else(|| CliError::invalid_input(format!("no archetype label for {key}; rerun `archetype name`")))?;
            let profile_name = profile_key(assignment.cluster.side, &label.archetype);
            let profile = profiles.get(&profile_name).ok_or_else(|| {
                CliError::invalid_input(format!("no profile {profile_name} for {key}; rerun `archetype name`"))
            })?;
            Ok(flatten(row, assignment, label, profile, naming))
        })
        .collect()
}

fn flatten(
    row: &PitcherSeasonFeatures,
    assignment: &ClusterAssignment,
    label: &MemberLabel,
    profile: &ArchetypeProfile,
    naming: &NamingConfig,
) -> ExportRow {
    let mut usage = PitchMix::default();
    for (pitch, share) in row.usage.iter() {
        usage.set(pitch, round_to(share, RATIO_PLACES));
    }
    let [x, y, z] = assignment.coords.map(|c| round_to(c, COORD_PLACES));
    ExportRow {
        pitcher: row.pitcher,
        season: row.season,
        name: row.player_name.clone(),
        hand: row.throws.pitcher_label().to_string(),
        total_pitches: row.total_pitches,
        cluster: assignment.cluster,
        source: assignment.source,
        archetype: label.archetype.clone(),
        sub_archetype: label.sub_archetype.clone(),
        hybrid: label.hybrid,
        display: label.display.clone(),
        emoji: profile.emoji.clone(),
        color: profile.color.clone(),
        role: RoleClass::from_ratio(row.starter_ratio, naming),
        x,
        y,
        z,
        usage,
        avg_velo_ff: round_to(row.avg_velo_ff, MEASURE_PLACES),
        spin_overall: round_to(row.spin_overall, 0),
        arm_angle: round_to(row.arm_angle, MEASURE_PLACES),
        avg_extension: round_to(row.avg_extension, MEASURE_PLACES),
        swing_rate: round_to(row.swing_rate, RATE_PLACES),
        whiff_rate: round_to(row.whiff_rate, RATE_PLACES),
        zone_rate: round_to(row.zone_rate, RATE_PLACES),
        groundball_rate: round_to(row.groundball_rate, RATE_PLACES),
        platoon_lateral_shift: round_to(row.platoon_lateral_shift, RATE_PLACES),
        platoon_height_shift: round_to(row.platoon_height_shift, RATE_PLACES),
        entropy_shift: round_to(row.entropy_shift, RATE_PLACES),
        starter_ratio: round_to(row.starter_ratio, RATIO_PLACES),
    }
}

/// Profiles with display coordinates rounded like the flat rows.
pub fn export_profiles(
    profiles: &BTreeMap<String, ArchetypeProfile>,
) -> BTreeMap<String, ArchetypeProfile> {
    profiles
        .iter()
        .map(|(key, profile)| {
            let mut profile = profile.clone();
            profile.medoid_coords = profile.medoid_coords.map(|c| round_to(c, COORD_PLACES));
            (key.clone(), profile)
        })
        .collect()
}
