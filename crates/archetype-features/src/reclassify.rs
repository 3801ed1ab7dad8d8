// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Per-pitcher resolution of the ambiguous breaking-ball code.
//!
//! The map is built once over the whole corpus and then applied to every
//! event. A pitcher with no ambiguous events never appears in the map; any
//! ambiguous event whose pitcher is absent resolves to the fallback category.

use archetype_core::{ArchetypeError, PitchType, RawEvent, ReclassifyConfig};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Resolved category for one pitcher and the statistics that decided it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub pitch: PitchType,
    pub events: usize,
    pub mean_abs_pfx_x: Option<f64>,
    pub mean_velocity: Option<f64>,
}

/// Where a map came from; persisted next to it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct MapProvenance {
    pub ambiguous_code: String,
    pub sweeper_break_ft: f64,
    pub firm_velocity_mph: f64,
    pub fallback: PitchType,
    pub events_scanned: usize,
    pub ambiguous_events: usize,
    pub seasons: Vec<u16>,
    /// Hex SHA-256 over the ambiguous code and every `pitcher=code` entry.
    pub fingerprint: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryMap {
    pub entries: BTreeMap<u64, Resolution>,
    pub provenance: MapProvenance,
}

impl CategoryMap {
    pub fn resolve(&self, pitcher: u64) -> PitchType {
        self.entries
            .get(&pitcher)
            .map(|resolution| resolution.pitch)
            .unwrap_or(self.provenance.fallback)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fingerprint(&self) -> &str {
        &self.provenance.fingerprint
    }

    /// Rewrites ambiguous codes in place; returns how many events changed.
    pub fn apply(&self, events: &mut [RawEvent]) -> usize {
        let ambiguous = self.provenance.ambiguous_code.as_str();
        let mut rewritten = 0usize;
        for event in events.iter_mut() {
            if event.category() == Some(ambiguous) {
                event.pitch_type = Some(self.resolve(event.pitcher).code().to_string());
                rewritten += 1;
            }
        }
        debug!(rewritten, "applied category map");
        rewritten
    }

    /// Recomputes the fingerprint and compares it with the stored one.
    pub fn verify(&self) -> Result<(), ArchetypeError> {
        let expected = fingerprint(&self.provenance.ambiguous_code, &self.entries);
        if expected != self.provenance.fingerprint {
            return Err(ArchetypeError::invalid_input(format!(
                "category map fingerprint mismatch: stored {}, computed {expected}",
                self.provenance.fingerprint
            )));
        }
        Ok(())
    }
}

fn fingerprint(ambiguous_code: &str, entries: &BTreeMap<u64, Resolution>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ambiguous_code.as_bytes());
    for (pitcher, resolution) in entries {
        hasher.update(format!("\n{pitcher}={}", resolution.pitch.code()).as_bytes());
    }
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[derive(Default)]
struct Accumulator {
    events: usize,
    pfx_sum: f64,
    pfx_count: usize,
    velo_sum: f64,
    velo_count: usize,
}

impl Accumulator {
    fn push(&mut self, event: &RawEvent) {
        self.events += 1;
        if let Some(pfx_x) = event.pfx_x.filter(|v| v.is_finite()) {
            self.pfx_sum += pfx_x.abs();
            self.pfx_count += 1;
        }
        if let Some(speed) = event.release_speed.filter(|v| v.is_finite()) {
            self.velo_sum += speed;
            self.velo_count += 1;
        }
    }

    fn mean_abs_pfx_x(&self) -> Option<f64> {
        (self.pfx_count > 0).then(|| self.pfx_sum / self.pfx_count as f64)
    }

    fn mean_velocity(&self) -> Option<f64> {
        (self.velo_count > 0).then(|| self.velo_sum / self.velo_count as f64)
    }
}

/// Builds [`CategoryMap`]s from a corpus.
#[derive(Clone, Debug)]
pub struct CategoryReclassifier {
    config: ReclassifyConfig,
}

impl CategoryReclassifier {
    pub fn new(config: ReclassifyConfig) -> Result<Self, ArchetypeError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Movement cutoff first, then velocity, then the catch-all.
    pub fn classify(&self, mean_abs_pfx_x: Option<f64>, mean_velocity: Option<f64>) -> PitchType {
        if mean_abs_pfx_x.is_some_and(|pfx| pfx >= self.config.sweeper_break_ft) {
            return self.config.sweeper;
        }
        if mean_velocity.is_some_and(|velo| velo >= self.config.firm_velocity_mph) {
            return self.config.firm;
        }
        self.config.fallback
    }

    /// Scans the full corpus. Zero ambiguous events yields an empty map.
    pub fn build(&self, events: &[RawEvent]) -> CategoryMap {
        let ambiguous = self.config.ambiguous_code.as_str();
        let mut per_pitcher: BTreeMap<u64, Accumulator> = BTreeMap::new();
        let mut seasons = BTreeSet::new();
        let mut ambiguous_events = 0usize;

        for event in events {
            seasons.insert(event.game_year);
            if event.category() == Some(ambiguous) {
                ambiguous_events += 1;
                per_pitcher.entry(event.pitcher).or_default().push(event);
            }
        }

        let entries: BTreeMap<u64, Resolution> = per_pitcher
            .into_iter()
            .map(|(pitcher, acc)| {
                let mean_abs_pfx_x = acc.mean_abs_pfx_x();
                let mean_velocity = acc.mean_velocity();
                let resolution = Resolution {
                    pitch: self.classify(mean_abs_pfx_x, mean_velocity),
                    events: acc.events,
                    mean_abs_pfx_x,
                    mean_velocity,
                };
                (pitcher, resolution)
            })
            .collect();

        info!(
            events = events.len(),
            ambiguous_events,
            pitchers = entries.len(),
            code = ambiguous,
            "built category map"
        );

        CategoryMap {
            provenance: MapProvenance {
                ambiguous_code: self.config.ambiguous_code.clone(),
                sweeper_break_ft: self.config.sweeper_break_ft,
                firm_velocity_mph: self.config.firm_velocity_mph,
                fallback: self.config.fallback,
                events_scanned: events.len(),
                ambiguous_events,
                seasons: seasons.into_iter().collect(),
                fingerprint: fingerprint(ambiguous, &entries),
            },
            entries,
        }
    }
}
