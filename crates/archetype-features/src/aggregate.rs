// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Pitcher-season aggregation over a reclassified corpus.

use crate::roles::RoleTable;
use crate::zone::summarize_locations;
use archetype_core::{
    ArchetypeError, FeatureConfig, Handedness, PitchMix, PitchType, PitcherSeasonFeatures,
    RawEvent, SeasonKey, TRACKED_PITCH_TYPES,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Qualified and sub-threshold rows, both ordered by (season, pitcher).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureTables {
    pub qualified: Vec<PitcherSeasonFeatures>,
    pub sub_threshold: Vec<PitcherSeasonFeatures>,
    /// Rows removed by the implausible-velocity guard.
    pub dropped_low_velocity: Vec<SeasonKey>,
    /// Fingerprint of the category map applied before aggregation.
    pub category_map_fingerprint: Option<String>,
}

#[derive(Clone, Debug)]
pub struct FeatureAggregator {
    config: FeatureConfig,
}

impl FeatureAggregator {
    pub fn new(config: FeatureConfig) -> Result<Self, ArchetypeError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Groups events by (pitcher, season) and splits rows by pitch count.
    ///
    /// Events with a missing or blank category are ignored entirely.
    pub fn aggregate(
        &self,
        events: &[RawEvent],
        roles: &RoleTable,
    ) -> Result<FeatureTables, ArchetypeError> {
        let usable: Vec<&RawEvent> = events.iter().filter(|e| e.category().is_some()).collect();
        if usable.is_empty() {
            return Err(ArchetypeError::invalid_input(
                "no events with a pitch category to aggregate",
            ));
        }
        let names = most_frequent_names(&usable);

        let mut by_season: BTreeMap<u16, BTreeMap<u64, Vec<&RawEvent>>> = BTreeMap::new();
        for event in &usable {
            by_season
                .entry(event.game_year)
                .or_default()
                .entry(event.pitcher)
                .or_default()
                .push(event);
        }
        let seasons: Vec<(u16, BTreeMap<u64, Vec<&RawEvent>>)> = by_season.into_iter().collect();

        let build_season = |(season, pitchers): &(u16, BTreeMap<u64, Vec<&RawEvent>>)| {
            let rows: Vec<PitcherSeasonFeatures> = pitchers
                .iter()
                .map(|(&pitcher, group)| {
                    let key = SeasonKey::new(pitcher, *season);
                    let name = names.get(&pitcher).cloned().unwrap_or_default();
                    self.season_row(key, name, group, roles)
                })
                .collect();
            debug!(season, rows = rows.len(), "aggregated season");
            rows
        };

        #[cfg(feature = "rayon")]
        let per_season: Vec<Vec<PitcherSeasonFeatures>> =
            seasons.par_iter().map(build_season).collect();
        #[cfg(not(feature = "rayon"))]
        let per_season: Vec<Vec<PitcherSeasonFeatures>> =
            seasons.iter().map(build_season).collect();

        let mut tables = FeatureTables::default();
        for row in per_season.into_iter().flatten() {
            if self.config.is_implausible_velocity(row.avg_velo_ff) {
                tables.dropped_low_velocity.push(row.key());
            } else if row.total_pitches >= self.config.min_pitches {
                tables.qualified.push(row);
            } else {
                tables.sub_threshold.push(row);
            }
        }

        if !tables.dropped_low_velocity.is_empty() {
            warn!(
                dropped = tables.dropped_low_velocity.len(),
                band = ?self.config.implausible_velocity,
                "dropped rows with implausible fastball velocity"
            );
        }
        let missing_roles = tables
            .qualified
            .iter()
            .chain(&tables.sub_threshold)
            .filter(|row| !roles.contains(row.key()))
            .count();
        if missing_roles > 0 {
            debug!(
                missing_roles,
                default = RoleTable::DEFAULT_RATIO,
                "rows without a role entry"
            );
        }
        info!(
            events = usable.len(),
            seasons = seasons.len(),
            qualified = tables.qualified.len(),
            sub_threshold = tables.sub_threshold.len(),
            min_pitches = self.config.min_pitches,
            "aggregated pitcher-season features"
        );
        Ok(tables)
    }

    fn season_row(
        &self,
        key: SeasonKey,
        player_name: String,
        group: &[&RawEvent],
        roles: &RoleTable,
    ) -> PitcherSeasonFeatures {
        let throws = group
            .first()
            .map(|event| event.p_throws)
            .unwrap_or(Handedness::Right);
        let mut row = PitcherSeasonFeatures::empty(key, throws);
        row.player_name = player_name;
        row.total_pitches = group.len();

        let mut counts = [0usize; TRACKED_PITCH_TYPES.len()];
        for pitch in group.iter().filter_map(|e| e.tracked_category()) {
            counts[pitch.index()] += 1;
        }
        row.usage = PitchMix::from_counts(&counts);

        row.avg_velo_ff = fastball_velocity(group).unwrap_or(0.0);
        row.spin_overall = mean(group.iter().map(|e| e.release_spin_rate)).unwrap_or(0.0);
        row.spin_ff = spin_for(group, PitchType::FourSeam);
        row.spin_sl = spin_for(group, PitchType::Slider);
        row.spin_cu = spin_for(group, PitchType::Curveball);
        row.avg_extension = mean(group.iter().map(|e| e.release_extension)).unwrap_or(0.0);

        let shoulder = self.config.shoulder_height_ft;
        row.arm_angle = mean(group.iter().map(|e| match (e.release_pos_x, e.release_pos_z) {
            (Some(x), Some(z)) => {
                let adj_x = match e.p_throws {
                    Handedness::Right => x,
                    Handedness::Left => -x,
                };
                Some(adj_x.atan2(z - shoulder).to_degrees())
            }
            _ => None,
        }))
        .unwrap_or(0.0);

        let swings = group.iter().filter(|e| e.is_swing()).count();
        let whiffs = group.iter().filter(|e| e.is_whiff()).count();
        row.swing_rate = ratio(swings, group.len());
        row.whiff_rate = ratio(whiffs, swings);

        let zoned = group.iter().filter(|e| e.zone.is_some()).count();
        let in_zone = group.iter().filter(|e| e.in_zone()).count();
        row.zone_rate = ratio(in_zone, zoned);

        let batted = group
            .iter()
            .filter(|e| e.is_batted_ball() && e.bb_type.is_some())
            .count();
        let grounders = group.iter().filter(|e| e.is_ground_ball()).count();
        row.groundball_rate = ratio(grounders, batted);

        let moved: Vec<(f64, f64)> = group
            .iter()
            .filter_map(|e| match (e.pfx_x, e.pfx_z) {
                (Some(x), Some(z)) if x.is_finite() && z.is_finite() => Some((x, z)),
                _ => None,
            })
            .collect();
        row.pfx_x_avg = mean(moved.iter().map(|(x, _)| Some(*x))).unwrap_or(0.0);
        row.pfx_z_avg = mean(moved.iter().map(|(_, z)| Some(*z))).unwrap_or(0.0);

        let locations = summarize_locations(group.iter().copied(), self.config.min_pitches_per_side);
        row.same_side = locations.same_side;
        row.opposite_side = locations.opposite_side;
        row.platoon_lateral_shift = locations.platoon_lateral_shift;
        row.platoon_height_shift = locations.platoon_height_shift;
        row.entropy_shift = locations.entropy_shift;

        row.starter_ratio = roles.starter_ratio(key);
        row
    }
}

/// Count ratio with the denominator clamped to 1.
fn ratio(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator.max(1) as f64
}

fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn spin_for(group: &[&RawEvent], pitch: PitchType) -> f64 {
    mean(
        group
            .iter()
            .filter(|e| e.tracked_category() == Some(pitch))
            .map(|e| e.release_spin_rate),
    )
    .unwrap_or(0.0)
}

/// Four-seam mean velocity, else the fastest category's mean.
fn fastball_velocity(group: &[&RawEvent]) -> Option<f64> {
    let mut by_code: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for event in group {
        let (Some(code), Some(speed)) = (event.category(), event.release_speed) else {
            continue;
        };
        if !speed.is_finite() {
            continue;
        }
        let slot = by_code.entry(code).or_insert((0.0, 0));
        slot.0 += speed;
        slot.1 += 1;
    }
    if let Some((sum, count)) = by_code.get(PitchType::FourSeam.code()) {
        return Some(sum / *count as f64);
    }
    by_code
        .values()
        .map(|(sum, count)| sum / *count as f64)
        .fold(None, |best: Option<f64>, velo| match best {
            Some(b) if b >= velo => Some(b),
            _ => Some(velo),
        })
}

/// Most frequent display name per pitcher; ties go to the name seen first.
fn most_frequent_names(events: &[&RawEvent]) -> HashMap<u64, String> {
    let mut seen: HashMap<u64, Vec<(&str, usize)>> = HashMap::new();
    for event in events {
        let Some(name) = event.player_name.as_deref().map(str::trim) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let tallies = seen.entry(event.pitcher).or_default();
        match tallies.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, count)) => *count += 1,
            None => tallies.push((name, 1)),
        }
    }
    seen.into_iter()
        .filter_map(|(pitcher, tallies)| {
            let mut best: Option<(&str, usize)> = None;
            for (name, count) in tallies {
                if best.is_none_or(|(_, top)| count > top) {
                    best = Some((name, count));
                }
            }
            best.map(|(name, _)| (pitcher, name.to_string()))
        })
        .collect()
}
