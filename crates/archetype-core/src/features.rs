// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::error::ArchetypeError;
use crate::pitch::{Handedness, PitchType, TRACKED_PITCH_TYPES};
use std::fmt;
use std::str::FromStr;

/// Identity of one pitcher-season row.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeasonKey {
    pub pitcher: u64,
    pub season: u16,
}

impl SeasonKey {
    pub fn new(pitcher: u64, season: u16) -> Self {
        Self { pitcher, season }
    }
}

impl fmt::Display for SeasonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.pitcher, self.season)
    }
}

/// Fraction of tracked pitches thrown in each category.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PitchMix {
    #[cfg_attr(feature = "serde", serde(rename = "FF"))]
    pub ff: f64,
    #[cfg_attr(feature = "serde", serde(rename = "SI"))]
    pub si: f64,
    #[cfg_attr(feature = "serde", serde(rename = "FC"))]
    pub fc: f64,
    #[cfg_attr(feature = "serde", serde(rename = "SL"))]
    pub sl: f64,
    #[cfg_attr(feature = "serde", serde(rename = "CH"))]
    pub ch: f64,
    #[cfg_attr(feature = "serde", serde(rename = "CU"))]
    pub cu: f64,
    #[cfg_attr(feature = "serde", serde(rename = "FS"))]
    pub fs: f64,
    #[cfg_attr(feature = "serde", serde(rename = "KC"))]
    pub kc: f64,
    #[cfg_attr(feature = "serde", serde(rename = "ST"))]
    pub st: f64,
    #[cfg_attr(feature = "serde", serde(rename = "KN"))]
    pub kn: f64,
}

impl PitchMix {
    pub fn get(&self, pitch: PitchType) -> f64 {
        match pitch {
            PitchType::FourSeam => self.ff,
            PitchType::Sinker => self.si,
            PitchType::Cutter => self.fc,
            PitchType::Slider => self.sl,
            PitchType::Changeup => self.ch,
            PitchType::Curveball => self.cu,
            PitchType::Splitter => self.fs,
            PitchType::KnuckleCurve => self.kc,
            PitchType::Sweeper => self.st,
            PitchType::Knuckleball => self.kn,
        }
    }

    pub fn set(&mut self, pitch: PitchType, share: f64) {
        let slot = match pitch {
            PitchType::FourSeam => &mut self.ff,
            PitchType::Sinker => &mut self.si,
            PitchType::Cutter => &mut self.fc,
            PitchType::Slider => &mut self.sl,
            PitchType::Changeup => &mut self.ch,
            PitchType::Curveball => &mut self.cu,
            PitchType::Splitter => &mut self.fs,
            PitchType::KnuckleCurve => &mut self.kc,
            PitchType::Sweeper => &mut self.st,
            PitchType::Knuckleball => &mut self.kn,
        };
        *slot = share;
    }

    /// Builds shares from per-category counts; all zeros when `counts` is empty.
    pub fn from_counts(counts: &[usize; TRACKED_PITCH_TYPES.len()]) -> Self {
        let total: usize = counts.iter().sum();
        let mut mix = Self::default();
        if total == 0 {
            return mix;
        }
        for pitch in TRACKED_PITCH_TYPES {
            mix.set(pitch, counts[pitch.index()] as f64 / total as f64);
        }
        mix
    }

    pub fn iter(&self) -> impl Iterator<Item = (PitchType, f64)> + '_ {
        TRACKED_PITCH_TYPES.iter().map(|&pitch| (pitch, self.get(pitch)))
    }

    pub fn total(&self) -> f64 {
        self.iter().map(|(_, share)| share).sum()
    }
}

/// Location tendencies against one batter side.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneProfile {
    pub up_rate: f64,
    pub arm_side_rate: f64,
    pub heart_rate: f64,
    pub edge_rate: f64,
    pub location_entropy: f64,
}

impl ZoneProfile {
    /// Neutral profile used when a side has no located pitches.
    pub const NEUTRAL: ZoneProfile = ZoneProfile {
        up_rate: 0.5,
        arm_side_rate: 0.5,
        heart_rate: 0.08,
        edge_rate: 0.5,
        location_entropy: 3.0,
    };

    pub fn metric(&self, metric: ZoneMetric) -> f64 {
        match metric {
            ZoneMetric::UpRate => self.up_rate,
            ZoneMetric::ArmSideRate => self.arm_side_rate,
            ZoneMetric::HeartRate => self.heart_rate,
            ZoneMetric::EdgeRate => self.edge_rate,
            ZoneMetric::LocationEntropy => self.location_entropy,
        }
    }
}

impl Default for ZoneProfile {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoneMetric {
    UpRate,
    ArmSideRate,
    HeartRate,
    EdgeRate,
    LocationEntropy,
}

impl ZoneMetric {
    pub const ALL: [ZoneMetric; 5] = [
        ZoneMetric::UpRate,
        ZoneMetric::ArmSideRate,
        ZoneMetric::HeartRate,
        ZoneMetric::EdgeRate,
        ZoneMetric::LocationEntropy,
    ];

    fn suffix(self) -> &'static str {
        match self {
            Self::UpRate => "up_rate",
            Self::ArmSideRate => "arm_side_rate",
            Self::HeartRate => "heart_rate",
            Self::EdgeRate => "edge_rate",
            Self::LocationEntropy => "location_entropy",
        }
    }

    fn from_suffix(suffix: &str, full: &str) -> Result<Self, ArchetypeError> {
        Self::ALL
            .iter()
            .copied()
            .find(|metric| metric.suffix() == suffix)
            .ok_or_else(|| ArchetypeError::invalid_input(format!("unknown feature '{full}'")))
    }
}

/// Aggregate feature vector for one pitcher-season.
///
/// Rates are bounded to `[0, 1]`; a missing aggregate is stored as `0.0`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PitcherSeasonFeatures {
    pub pitcher: u64,
    pub season: u16,
    pub player_name: String,
    pub throws: Handedness,
    pub total_pitches: usize,
    pub usage: PitchMix,
    pub avg_velo_ff: f64,
    pub spin_overall: f64,
    pub spin_ff: f64,
    pub spin_sl: f64,
    pub spin_cu: f64,
    pub arm_angle: f64,
    pub avg_extension: f64,
    pub swing_rate: f64,
    pub whiff_rate: f64,
    pub zone_rate: f64,
    pub groundball_rate: f64,
    pub pfx_x_avg: f64,
    pub pfx_z_avg: f64,
    pub same_side: ZoneProfile,
    pub opposite_side: ZoneProfile,
    pub platoon_lateral_shift: f64,
    pub platoon_height_shift: f64,
    pub entropy_shift: f64,
    pub starter_ratio: f64,
}

impl PitcherSeasonFeatures {
    /// Empty row; every aggregate zero and both zone profiles neutral.
    pub fn empty(key: SeasonKey, throws: Handedness) -> Self {
        Self {
            pitcher: key.pitcher,
            season: key.season,
            player_name: String::new(),
            throws,
            total_pitches: 0,
            usage: PitchMix::default(),
            avg_velo_ff: 0.0,
            spin_overall: 0.0,
            spin_ff: 0.0,
            spin_sl: 0.0,
            spin_cu: 0.0,
            arm_angle: 0.0,
            avg_extension: 0.0,
            swing_rate: 0.0,
            whiff_rate: 0.0,
            zone_rate: 0.0,
            groundball_rate: 0.0,
            pfx_x_avg: 0.0,
            pfx_z_avg: 0.0,
            same_side: ZoneProfile::NEUTRAL,
            opposite_side: ZoneProfile::NEUTRAL,
            platoon_lateral_shift: 0.0,
            platoon_height_shift: 0.0,
            entropy_shift: 0.0,
            starter_ratio: 0.0,
        }
    }

    pub fn key(&self) -> SeasonKey {
        SeasonKey::new(self.pitcher, self.season)
    }

    pub fn value(&self, key: FeatureKey) -> f64 {
        match key {
            FeatureKey::Usage(pitch) => self.usage.get(pitch),
            FeatureKey::AvgVeloFourSeam => self.avg_velo_ff,
            FeatureKey::SpinOverall => self.spin_overall,
            FeatureKey::SpinFourSeam => self.spin_ff,
            FeatureKey::SpinSlider => self.spin_sl,
            FeatureKey::SpinCurveball => self.spin_cu,
            FeatureKey::ArmAngle => self.arm_angle,
            FeatureKey::AvgExtension => self.avg_extension,
            FeatureKey::SwingRate => self.swing_rate,
            FeatureKey::WhiffRate => self.whiff_rate,
            FeatureKey::ZoneRate => self.zone_rate,
            FeatureKey::GroundballRate => self.groundball_rate,
            FeatureKey::PfxXAvg => self.pfx_x_avg,
            FeatureKey::PfxZAvg => self.pfx_z_avg,
            FeatureKey::SameSide(metric) => self.same_side.metric(metric),
            FeatureKey::OppositeSide(metric) => self.opposite_side.metric(metric),
            FeatureKey::PlatoonLateralShift => self.platoon_lateral_shift,
            FeatureKey::PlatoonHeightShift => self.platoon_height_shift,
            FeatureKey::EntropyShift => self.entropy_shift,
            FeatureKey::StarterRatio => self.starter_ratio,
        }
    }

    /// Projects the row onto `keys`, in order.
    pub fn project(&self, keys: &[FeatureKey]) -> Vec<f64> {
        keys.iter().map(|&key| self.value(key)).collect()
    }
}

/// Named numeric column of [`PitcherSeasonFeatures`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "String", try_from = "String")
)]
pub enum FeatureKey {
    Usage(PitchType),
    AvgVeloFourSeam,
    SpinOverall,
    SpinFourSeam,
    SpinSlider,
    SpinCurveball,
    ArmAngle,
    AvgExtension,
    SwingRate,
    WhiffRate,
    ZoneRate,
    GroundballRate,
    PfxXAvg,
    PfxZAvg,
    SameSide(ZoneMetric),
    OppositeSide(ZoneMetric),
    PlatoonLateralShift,
    PlatoonHeightShift,
    EntropyShift,
    StarterRatio,
}

const SCALAR_KEYS: [(FeatureKey, &str); 17] = [
    (FeatureKey::AvgVeloFourSeam, "avg_velo_FF"),
    (FeatureKey::SpinOverall, "spin_overall"),
    (FeatureKey::SpinFourSeam, "spin_FF"),
    (FeatureKey::SpinSlider, "spin_SL"),
    (FeatureKey::SpinCurveball, "spin_CU"),
    (FeatureKey::ArmAngle, "arm_angle"),
    (FeatureKey::AvgExtension, "avg_extension"),
    (FeatureKey::SwingRate, "swing_rate"),
    (FeatureKey::WhiffRate, "whiff_rate"),
    (FeatureKey::ZoneRate, "zone_rate"),
    (FeatureKey::GroundballRate, "groundball_rate"),
    (FeatureKey::PfxXAvg, "pfx_x_avg"),
    (FeatureKey::PfxZAvg, "pfx_z_avg"),
    (FeatureKey::PlatoonLateralShift, "platoon_lateral_shift"),
    (FeatureKey::PlatoonHeightShift, "platoon_height_shift"),
    (FeatureKey::EntropyShift, "entropy_shift"),
    (FeatureKey::StarterRatio, "starter_ratio"),
];

impl FeatureKey {
    pub fn name(self) -> String {
        match self {
            Self::Usage(pitch) => format!("pct_{}", pitch.code()),
            Self::SameSide(metric) => format!("same_side_{}", metric.suffix()),
            Self::OppositeSide(metric) => format!("opposite_side_{}", metric.suffix()),
            scalar => SCALAR_KEYS
                .iter()
                .find(|(key, _)| *key == scalar)
                .map(|(_, name)| (*name).to_string())
                .unwrap_or_default(),
        }
    }

    /// Every column, in a stable order.
    pub fn all() -> Vec<FeatureKey> {
        let mut keys: Vec<FeatureKey> =
            TRACKED_PITCH_TYPES.iter().map(|&p| Self::Usage(p)).collect();
        keys.extend(SCALAR_KEYS.iter().map(|(key, _)| *key));
        keys.extend(ZoneMetric::ALL.iter().map(|&m| Self::SameSide(m)));
        keys.extend(ZoneMetric::ALL.iter().map(|&m| Self::OppositeSide(m)));
        keys
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for FeatureKey {
    type Err = ArchetypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(code) = s.strip_prefix("pct_") {
            return PitchType::from_code(code).map(Self::Usage).ok_or_else(|| {
                ArchetypeError::invalid_input(format!("unknown pitch category in feature '{s}'"))
            });
        }
        if let Some(suffix) = s.strip_prefix("same_side_") {
            return ZoneMetric::from_suffix(suffix, s).map(FeatureKey::SameSide);
        }
        if let Some(suffix) = s.strip_prefix("opposite_side_") {
            return ZoneMetric::from_suffix(suffix, s).map(FeatureKey::OppositeSide);
        }
        SCALAR_KEYS
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(key, _)| *key)
            .ok_or_else(|| ArchetypeError::invalid_input(format!("unknown feature '{s}'")))
    }
}

impl From<FeatureKey> for String {
    fn from(key: FeatureKey) -> Self {
        key.name()
    }
}

impl TryFrom<String> for FeatureKey {
    type Error = ArchetypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureKey, PitchMix, PitcherSeasonFeatures, SeasonKey, ZoneMetric};
    use crate::pitch::{Handedness, PitchType, TRACKED_PITCH_TYPES};

    #[test]
    fn every_key_name_round_trips() {
        let keys = FeatureKey::all();
        assert_eq!(keys.len(), 37);
        for key in keys {
            let parsed: FeatureKey = key.name().parse().unwrap();
            assert_eq!(parsed, key);
        }
    }

    #[test]
    fn unknown_feature_names_are_rejected() {
        assert!("pct_SV".parse::<FeatureKey>().is_err());
        assert!("is_rhp".parse::<FeatureKey>().is_err());
        assert!("same_side_nothing".parse::<FeatureKey>().is_err());
    }

    #[test]
    fn mix_from_counts_sums_to_one() {
        let mut counts = [0usize; TRACKED_PITCH_TYPES.len()];
        counts[PitchType::FourSeam.index()] = 60;
        counts[PitchType::Slider.index()] = 30;
        counts[PitchType::Changeup.index()] = 10;
        let mix = PitchMix::from_counts(&counts);
        assert!((mix.total() - 1.0).abs() < 1e-12);
        assert!((mix.get(PitchType::Slider) - 0.30).abs() < 1e-12);
        assert_eq!(PitchMix::from_counts(&[0; 10]).total(), 0.0);
    }

    #[test]
    fn project_follows_key_order() {
        let mut row = PitcherSeasonFeatures::empty(SeasonKey::new(5, 2024), Handedness::Right);
        row.usage.ff = 0.5;
        row.whiff_rate = 0.3;
        row.opposite_side.up_rate = 0.7;
        let values = row.project(&[
            FeatureKey::WhiffRate,
            FeatureKey::Usage(PitchType::FourSeam),
            FeatureKey::OppositeSide(ZoneMetric::UpRate),
            FeatureKey::SameSide(ZoneMetric::LocationEntropy),
        ]);
        assert_eq!(values, vec![0.3, 0.5, 0.7, 3.0]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn feature_keys_serialize_as_column_names() {
        let encoded =
            serde_json::to_string(&[FeatureKey::Usage(PitchType::Sweeper), FeatureKey::WhiffRate])
                .unwrap();
        assert_eq!(encoded, r#"["pct_ST","whiff_rate"]"#);
        let decoded: Vec<FeatureKey> = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded[0], FeatureKey::Usage(PitchType::Sweeper));
    }
}
