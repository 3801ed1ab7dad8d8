// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Pipeline configuration with validated defaults.

use crate::error::ArchetypeError;
use crate::features::FeatureKey;
use crate::pitch::{PitchType, TRACKED_PITCH_TYPES};

/// Default clustering columns: the usage vector plus four performance traits.
pub fn default_cluster_features() -> Vec<FeatureKey> {
    let mut features: Vec<FeatureKey> = TRACKED_PITCH_TYPES
        .iter()
        .map(|&pitch| FeatureKey::Usage(pitch))
        .collect();
    features.extend([
        FeatureKey::AvgVeloFourSeam,
        FeatureKey::SpinOverall,
        FeatureKey::GroundballRate,
        FeatureKey::WhiffRate,
    ]);
    features
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FeatureConfig {
    /// Rows with at least this many pitches are clustered.
    pub min_pitches: usize,
    /// Batter-side splits below this count reuse the overall location summary.
    pub min_pitches_per_side: usize,
    /// Shoulder height in feet used as the arm-angle pivot.
    pub shoulder_height_ft: f64,
    /// Rows whose fastball velocity lies strictly inside this band are dropped.
    pub implausible_velocity: (f64, f64),
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            min_pitches: 300,
            min_pitches_per_side: 50,
            shoulder_height_ft: 5.0,
            implausible_velocity: (0.0, 75.0),
        }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<(), ArchetypeError> {
        if self.min_pitches == 0 {
            return Err(ArchetypeError::config("features.min_pitches must be >= 1"));
        }
        if !self.shoulder_height_ft.is_finite() {
            return Err(ArchetypeError::config(format!(
                "features.shoulder_height_ft must be finite; got {}",
                self.shoulder_height_ft
            )));
        }
        let (low, high) = self.implausible_velocity;
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(ArchetypeError::config(format!(
                "features.implausible_velocity must be a finite (low, high) band; got ({low}, {high})"
            )));
        }
        Ok(())
    }

    pub fn is_implausible_velocity(&self, velo: f64) -> bool {
        let (low, high) = self.implausible_velocity;
        velo > low && velo < high
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ReclassifyConfig {
    pub ambiguous_code: String,
    /// Mean |horizontal movement| (ft) at or above which the pitch is a sweeper.
    pub sweeper_break_ft: f64,
    /// Mean velocity (mph) at or above which a non-sweeper is a slider.
    pub firm_velocity_mph: f64,
    pub sweeper: PitchType,
    pub firm: PitchType,
    pub fallback: PitchType,
}

impl Default for ReclassifyConfig {
    fn default() -> Self {
        Self {
            ambiguous_code: "SV".to_string(),
            sweeper_break_ft: 1.0,
            firm_velocity_mph: 82.0,
            sweeper: PitchType::Sweeper,
            firm: PitchType::Slider,
            fallback: PitchType::Curveball,
        }
    }
}

impl ReclassifyConfig {
    pub fn validate(&self) -> Result<(), ArchetypeError> {
        if self.ambiguous_code.trim().is_empty() {
            return Err(ArchetypeError::config(
                "reclassify.ambiguous_code must be non-empty",
            ));
        }
        if PitchType::from_code(&self.ambiguous_code).is_some() {
            return Err(ArchetypeError::config(format!(
                "reclassify.ambiguous_code '{}' collides with a tracked category",
                self.ambiguous_code
            )));
        }
        if !self.sweeper_break_ft.is_finite() || !self.firm_velocity_mph.is_finite() {
            return Err(ArchetypeError::config(
                "reclassify thresholds must be finite",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ClusterConfig {
    pub k_min: usize,
    pub k_max: usize,
    /// Smallest cluster count the selector may return.
    pub min_k: usize,
    pub search_restarts: usize,
    pub search_max_iter: usize,
    pub final_restarts: usize,
    pub final_max_iter: usize,
    pub tolerance: f64,
    pub seed: u64,
    pub clip: f64,
    pub x_offset: f64,
    pub features: Vec<FeatureKey>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            k_min: 2,
            k_max: 15,
            min_k: 8,
            search_restarts: 10,
            search_max_iter: 300,
            final_restarts: 20,
            final_max_iter: 500,
            tolerance: 1e-4,
            seed: 42,
            clip: 10.0,
            x_offset: 5.0,
            features: default_cluster_features(),
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<(), ArchetypeError> {
        if self.k_min < 2 {
            return Err(ArchetypeError::config(format!(
                "cluster.k_min must be >= 2; got {}",
                self.k_min
            )));
        }
        if self.k_max < self.k_min {
            return Err(ArchetypeError::config(format!(
                "cluster.k_max must be >= k_min; got k_min={}, k_max={}",
                self.k_min, self.k_max
            )));
        }
        if self.min_k < 2 || self.min_k > self.k_max {
            return Err(ArchetypeError::config(format!(
                "cluster.min_k must lie in [2, k_max={}]; got {}",
                self.k_max, self.min_k
            )));
        }
        if self.search_restarts == 0 || self.final_restarts == 0 {
            return Err(ArchetypeError::config("cluster restarts must be >= 1"));
        }
        if self.search_max_iter == 0 || self.final_max_iter == 0 {
            return Err(ArchetypeError::config("cluster iteration caps must be >= 1"));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ArchetypeError::config(format!(
                "cluster.tolerance must be finite and >= 0; got {}",
                self.tolerance
            )));
        }
        if !self.clip.is_finite() || self.clip <= 0.0 {
            return Err(ArchetypeError::config(format!(
                "cluster.clip must be finite and > 0; got {}",
                self.clip
            )));
        }
        if !self.x_offset.is_finite() || self.x_offset < 0.0 {
            return Err(ArchetypeError::config(format!(
                "cluster.x_offset must be finite and >= 0; got {}",
                self.x_offset
            )));
        }
        if self.features.is_empty() {
            return Err(ArchetypeError::config("cluster.features must be non-empty"));
        }
        for (idx, feature) in self.features.iter().enumerate() {
            if self.features[..idx].contains(feature) {
                return Err(ArchetypeError::config(format!(
                    "cluster.features lists '{feature}' more than once"
                )));
            }
        }
        Ok(())
    }

    /// Candidate counts searched by the selector.
    pub fn candidates(&self) -> std::ops::RangeInclusive<usize> {
        self.k_min..=self.k_max
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct NamingConfig {
    /// Clusters (and members) averaging fewer pitches are labelled `junk_name`.
    pub junk_floor: f64,
    pub junk_name: String,
    pub starter_above: f64,
    pub reliever_below: f64,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            junk_floor: 100.0,
            junk_name: "Eephus Lobber".to_string(),
            starter_above: 0.55,
            reliever_below: 0.35,
        }
    }
}

impl NamingConfig {
    pub fn validate(&self) -> Result<(), ArchetypeError> {
        if !self.junk_floor.is_finite() || self.junk_floor < 0.0 {
            return Err(ArchetypeError::config(format!(
                "naming.junk_floor must be finite and >= 0; got {}",
                self.junk_floor
            )));
        }
        if self.junk_name.trim().is_empty() {
            return Err(ArchetypeError::config("naming.junk_name must be non-empty"));
        }
        if !(0.0..=1.0).contains(&self.reliever_below)
            || !(0.0..=1.0).contains(&self.starter_above)
            || self.reliever_below > self.starter_above
        {
            return Err(ArchetypeError::config(format!(
                "naming role cutoffs need 0 <= reliever_below <= starter_above <= 1; got {} and {}",
                self.reliever_below, self.starter_above
            )));
        }
        Ok(())
    }
}

/// Every tunable of a pipeline run.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PipelineConfig {
    pub features: FeatureConfig,
    pub reclassify: ReclassifyConfig,
    pub cluster: ClusterConfig,
    pub naming: NamingConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ArchetypeError> {
        self.features.validate()?;
        self.reclassify.validate()?;
        self.cluster.validate()?;
        self.naming.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::{ClusterConfig, FeatureConfig, PipelineConfig, ReclassifyConfig};
    use crate::features::FeatureKey;
    use crate::pitch::PitchType;

    #[test]
    fn defaults_validate() {
        PipelineConfig::default().validate().unwrap();
        let cluster = ClusterConfig::default();
        assert_eq!(cluster.features.len(), 14);
        assert_eq!(cluster.candidates().count(), 14);
    }

    #[test]
    fn floor_above_range_is_rejected() {
        let cfg = ClusterConfig {
            min_k: 16,
            ..ClusterConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.code(), "config_error");
        assert!(err.to_string().contains("min_k"));
    }

    #[test]
    fn k_min_of_one_is_rejected() {
        let cfg = ClusterConfig {
            k_min: 1,
            ..ClusterConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn duplicate_features_are_rejected() {
        let cfg = ClusterConfig {
            features: vec![FeatureKey::WhiffRate, FeatureKey::WhiffRate],
            ..ClusterConfig::default()
        };
        assert!(cfg.validate().unwrap_err().to_string().contains("whiff_rate"));
    }

    #[test]
    fn ambiguous_code_cannot_be_tracked() {
        let cfg = ReclassifyConfig {
            ambiguous_code: PitchType::Slider.code().to_string(),
            ..ReclassifyConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn velocity_band_is_exclusive() {
        let cfg = FeatureConfig::default();
        assert!(cfg.is_implausible_velocity(60.0));
        assert!(!cfg.is_implausible_velocity(0.0));
        assert!(!cfg.is_implausible_velocity(75.0));
        assert!(!cfg.is_implausible_velocity(94.0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_overrides_defaults() {
        let cfg: PipelineConfig =
            serde_json::from_str(r#"{"cluster": {"min_k": 4, "seed": 7}}"#).unwrap();
        assert_eq!(cfg.cluster.min_k, 4);
        assert_eq!(cfg.cluster.seed, 7);
        assert_eq!(cfg.cluster.k_max, 15);
        assert_eq!(cfg.features.min_pitches, 300);
        cfg.validate().unwrap();
    }
}
