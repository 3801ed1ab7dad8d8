// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use archetype_core::SeasonKey;
use std::collections::BTreeMap;

/// One externally supplied role row.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RoleEntry {
    pub pitcher: u64,
    pub game_year: u16,
    pub games: Option<u32>,
    pub starts: Option<u32>,
    /// `SP` or `RP`; consulted only when appearance counts are missing.
    pub role: Option<String>,
}

impl RoleEntry {
    /// Share of appearances that were starts, in `[0, 1]`.
    pub fn starter_ratio(&self) -> Option<f64> {
        if let (Some(games), Some(starts)) = (self.games, self.starts) {
            if games > 0 {
                return Some((f64::from(starts) / f64::from(games)).min(1.0));
            }
        }
        match self.role.as_deref().map(str::trim) {
            Some("SP") => Some(1.0),
            Some("RP") => Some(0.0),
            _ => None,
        }
    }
}

/// Starter ratios keyed by pitcher-season; unknown keys read as `default`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoleTable {
    ratios: BTreeMap<SeasonKey, f64>,
    default: f64,
}

impl RoleTable {
    pub const DEFAULT_RATIO: f64 = 0.0;

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = RoleEntry>,
    {
        let ratios = entries
            .into_iter()
            .filter_map(|entry| {
                let ratio = entry.starter_ratio()?;
                Some((SeasonKey::new(entry.pitcher, entry.game_year), ratio))
            })
            .collect();
        Self {
            ratios,
            default: Self::DEFAULT_RATIO,
        }
    }

    pub fn starter_ratio(&self, key: SeasonKey) -> f64 {
        self.ratios.get(&key).copied().unwrap_or(self.default)
    }

    pub fn contains(&self, key: SeasonKey) -> bool {
        self.ratios.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{RoleEntry, RoleTable};
    use archetype_core::SeasonKey;

    fn entry(games: Option<u32>, starts: Option<u32>, role: Option<&str>) -> RoleEntry {
        RoleEntry {
            pitcher: 10,
            game_year: 2024,
            games,
            starts,
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn ratio_prefers_counts_then_label() {
        assert_eq!(entry(Some(32), Some(16), None).starter_ratio(), Some(0.5));
        assert_eq!(entry(Some(3), Some(5), None).starter_ratio(), Some(1.0));
        assert_eq!(entry(Some(0), Some(0), Some("SP")).starter_ratio(), Some(1.0));
        assert_eq!(entry(None, None, Some("RP")).starter_ratio(), Some(0.0));
        assert_eq!(entry(None, None, Some("OP")).starter_ratio(), None);
    }

    #[test]
    fn missing_rows_read_as_default() {
        let table = RoleTable::from_entries([entry(Some(30), Some(30), None)]);
        assert_eq!(table.starter_ratio(SeasonKey::new(10, 2024)), 1.0);
        assert_eq!(
            table.starter_ratio(SeasonKey::new(10, 2023)),
            RoleTable::DEFAULT_RATIO
        );
        assert!(RoleTable::default().is_empty());
    }
}
