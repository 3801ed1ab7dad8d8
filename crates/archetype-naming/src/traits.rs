// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use archetype_core::{PitchMix, PitchType, PitcherSeasonFeatures};

/// Raw (unstandardized) values the rule book reads.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TraitRecord {
    pub usage: PitchMix,
    pub whiff: f64,
    pub groundball: f64,
    pub velo: f64,
    pub spin: f64,
    pub starter_ratio: f64,
}

impl TraitRecord {
    pub fn share(&self, pitch: PitchType) -> f64 {
        self.usage.get(pitch)
    }

    pub fn ff(&self) -> f64 {
        self.usage.ff
    }

    pub fn si(&self) -> f64 {
        self.usage.si
    }

    pub fn fc(&self) -> f64 {
        self.usage.fc
    }

    pub fn sl(&self) -> f64 {
        self.usage.sl
    }

    pub fn ch(&self) -> f64 {
        self.usage.ch
    }

    pub fn cu(&self) -> f64 {
        self.usage.cu
    }

    pub fn fs(&self) -> f64 {
        self.usage.fs
    }

    pub fn kc(&self) -> f64 {
        self.usage.kc
    }

    pub fn st(&self) -> f64 {
        self.usage.st
    }

    pub fn kn(&self) -> f64 {
        self.usage.kn
    }

    /// Copy with every value rounded to `places` decimals, for display.
    pub fn rounded(&self, places: i32) -> Self {
        let factor = 10f64.powi(places);
        let round = |v: f64| (v * factor).round() / factor;
        let mut usage = PitchMix::default();
        for (pitch, share) in self.usage.iter() {
            usage.set(pitch, round(share));
        }
        Self {
            usage,
            whiff: round(self.whiff),
            groundball: round(self.groundball),
            velo: round(self.velo),
            spin: round(self.spin),
            starter_ratio: round(self.starter_ratio),
        }
    }
}

impl From<&PitcherSeasonFeatures> for TraitRecord {
    fn from(row: &PitcherSeasonFeatures) -> Self {
        Self {
            usage: row.usage,
            whiff: row.whiff_rate,
            groundball: row.groundball_rate,
            velo: row.avg_velo_ff,
            spin: row.spin_overall,
            starter_ratio: row.starter_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TraitRecord;
    use archetype_core::{Handedness, PitchType, PitcherSeasonFeatures, SeasonKey};

    #[test]
    fn reads_raw_row_values() {
        let mut row = PitcherSeasonFeatures::empty(SeasonKey::new(1, 2024), Handedness::Left);
        row.usage.st = 0.31;
        row.whiff_rate = 0.27;
        row.avg_velo_ff = 93.4;
        let traits = TraitRecord::from(&row);
        assert_eq!(traits.st(), 0.31);
        assert_eq!(traits.share(PitchType::Sweeper), 0.31);
        assert_eq!(traits.whiff, 0.27);
        assert_eq!(traits.velo, 93.4);
    }

    #[test]
    fn rounding_is_per_field() {
        let traits = TraitRecord {
            whiff: 0.123_456,
            velo: 95.049_9,
            ..TraitRecord::default()
        };
        let rounded = traits.rounded(3);
        assert_eq!(rounded.whiff, 0.123);
        assert_eq!(rounded.velo, 95.05);
    }
}
