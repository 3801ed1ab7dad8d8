// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Cluster naming, per-member labels, and archetype profiles.

use crate::palette::Palette;
use crate::role::RoleClass;
use crate::rules::{PURE, RuleBook, display_label};
use crate::traits::TraitRecord;
use archetype_cluster::{ClusterModel, ClusterSummary, FeatureMatrix, medoid_index};
use archetype_core::{
    ArchetypeError, ClusterAssignment, ClusterId, Handedness, NamingConfig, PitcherSeasonFeatures,
    SeasonKey,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

const TOP_PITCH_MIN_SHARE: f64 = 0.03;
const TOP_PITCH_COUNT: usize = 4;
const EXAMPLE_COUNT: usize = 5;
const TRAIT_PLACES: i32 = 3;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterName {
    pub cluster: ClusterId,
    pub archetype: String,
    pub medoid: SeasonKey,
    pub members: usize,
    pub avg_pitches: f64,
    /// Named by the small-sample guard rather than the rule book.
    pub low_signal: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct MemberLabel {
    pub key: SeasonKey,
    pub cluster: ClusterId,
    pub archetype: String,
    pub sub_archetype: String,
    pub hybrid: bool,
    pub display: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ArchetypeProfile {
    pub name: String,
    pub emoji: String,
    pub color: String,
    pub role: RoleClass,
    pub side: Handedness,
    pub hand: String,
    pub count: usize,
    pub avg_pitches: f64,
    pub top_pitches: String,
    pub examples: Vec<String>,
    /// Medoid traits, rounded for display.
    pub traits: TraitRecord,
    pub sub_archetypes: BTreeMap<String, usize>,
    pub hybrid_count: usize,
    pub medoid: SeasonKey,
    pub medoid_name: String,
    pub medoid_coords: [f64; 3],
    pub clusters: Vec<ClusterId>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NamingOutcome {
    pub clusters: Vec<ClusterName>,
    /// One per assignment, in assignment order.
    pub labels: Vec<MemberLabel>,
    pub profiles: BTreeMap<String, ArchetypeProfile>,
}

impl NamingOutcome {
    pub fn cluster_name(&self, id: ClusterId) -> Option<&str> {
        self.clusters
            .iter()
            .find(|c| c.cluster == id)
            .map(|c| c.archetype.as_str())
    }
}

/// `RHP_Ghost`, `LHP_Snake`, ...
pub fn profile_key(side: Handedness, archetype: &str) -> String {
    format!("{}_{archetype}", side.pitcher_label())
}

#[derive(Clone, Debug)]
pub struct ArchetypeNamer {
    rules: RuleBook,
    palette: Palette,
    config: NamingConfig,
}

impl ArchetypeNamer {
    pub fn new(rules: RuleBook, palette: Palette, config: NamingConfig) -> Result<Self, ArchetypeError> {
        config.validate()?;
        Ok(Self {
            rules,
            palette,
            config,
        })
    }

    pub fn standard(config: NamingConfig) -> Result<Self, ArchetypeError> {
        Self::new(RuleBook::standard(), Palette::standard(), config)
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn config(&self) -> &NamingConfig {
        &self.config
    }

    /// Names every occupied cluster, labels every member, and rebuilds the
    /// profile set. `rows` must cover every assigned key; `summaries`
    /// supply fitted medoids, and clusters without one get a medoid
    /// computed here.
    pub fn name(
        &self,
        rows: &[PitcherSeasonFeatures],
        assignments: &[ClusterAssignment],
        summaries: &[ClusterSummary],
        models: &[ClusterModel],
    ) -> Result<NamingOutcome, ArchetypeError> {
        let index = RowIndex::new(rows);
        let mut members: BTreeMap<ClusterId, Vec<&ClusterAssignment>> = BTreeMap::new();
        for assignment in assignments {
            index.get(assignment.key)?;
            members.entry(assignment.cluster).or_default().push(assignment);
        }
        let fitted_medoids: BTreeMap<ClusterId, SeasonKey> =
            summaries.iter().map(|s| (s.id, s.medoid)).collect();

        let mut clusters = Vec::with_capacity(members.len());
        for (&id, group) in &members {
            let medoid = match fitted_medoids.get(&id) {
                Some(&key) => key,
                None => medoid_of(group, &index, model_for(models, id.side)?)?.key,
            };
            let avg_pitches = mean_pitches(group, &index)?;
            let low_signal = avg_pitches < self.config.junk_floor;
            let archetype = if low_signal {
                self.config.junk_name.clone()
            } else {
                self.rules
                    .primary(&TraitRecord::from(index.get(medoid)?))
                    .to_string()
            };
            debug!(cluster = %id, archetype = %archetype, medoid = %medoid, "named cluster");
            clusters.push(ClusterName {
                cluster: id,
                archetype,
                medoid,
                members: group.len(),
                avg_pitches,
                low_signal,
            });
        }
        let names: BTreeMap<ClusterId, &str> = clusters
            .iter()
            .map(|c| (c.cluster, c.archetype.as_str()))
            .collect();

        let mut labels = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let primary = archetype_of(&names, assignment.cluster)?;
            labels.push(self.label_member(assignment, index.get(assignment.key)?, primary));
        }

        let profiles = self.build_profiles(assignments, &labels, &index, models)?;
        let hybrids = labels.iter().filter(|l| l.hybrid).count();
        info!(
            clusters = clusters.len(),
            members = labels.len(),
            hybrids,
            profiles = profiles.len(),
            "named archetypes"
        );
        Ok(NamingOutcome {
            clusters,
            labels,
            profiles,
        })
    }

    /// Sub-archetype, hybrid flag, and display label for one member of a
    /// cluster named `primary`.
    pub fn label_member(
        &self,
        assignment: &ClusterAssignment,
        row: &PitcherSeasonFeatures,
        primary: &str,
    ) -> MemberLabel {
        if (row.total_pitches as f64) < self.config.junk_floor {
            let junk = self.config.junk_name.clone();
            return MemberLabel {
                key: assignment.key,
                cluster: assignment.cluster,
                display: junk.clone(),
                archetype: junk,
                sub_archetype: PURE.to_string(),
                hybrid: false,
            };
        }
        let traits = TraitRecord::from(row);
        let sub = self.rules.sub_archetype(&traits, primary).unwrap_or(PURE);
        let hybrid = self.rules.is_hybrid(&traits, primary);
        MemberLabel {
            key: assignment.key,
            cluster: assignment.cluster,
            archetype: primary.to_string(),
            sub_archetype: sub.to_string(),
            hybrid,
            display: display_label(primary, sub, hybrid),
        }
    }

    fn build_profiles(
        &self,
        assignments: &[ClusterAssignment],
        labels: &[MemberLabel],
        index: &RowIndex<'_>,
        models: &[ClusterModel],
    ) -> Result<BTreeMap<String, ArchetypeProfile>, ArchetypeError> {
        // Keyed on each member's own label.
        let mut groups: BTreeMap<(Handedness, &str), Vec<usize>> = BTreeMap::new();
        for (pos, (assignment, label)) in assignments.iter().zip(labels).enumerate() {
            groups
                .entry((assignment.cluster.side, label.archetype.as_str()))
                .or_default()
                .push(pos);
        }

        let mut profiles = BTreeMap::new();
        for ((side, name), positions) in groups {
            let group: Vec<&ClusterAssignment> = positions.iter().map(|&p| &assignments[p]).collect();
            let medoid = medoid_of(&group, index, model_for(models, side)?)?;
            let medoid_row = index.get(medoid.key)?;
            let traits = TraitRecord::from(medoid_row);

            let mut sub_archetypes: BTreeMap<String, usize> = BTreeMap::new();
            let mut hybrid_count = 0;
            for &pos in &positions {
                *sub_archetypes
                    .entry(labels[pos].sub_archetype.clone())
                    .or_default() += 1;
                hybrid_count += usize::from(labels[pos].hybrid);
            }
            let mut clusters: Vec<ClusterId> = group.iter().map(|a| a.cluster).collect();
            clusters.sort();
            clusters.dedup();

            profiles.insert(
                profile_key(side, name),
                ArchetypeProfile {
                    name: name.to_string(),
                    emoji: self.palette.emoji(name).to_string(),
                    color: self.palette.color(name).to_string(),
                    role: RoleClass::from_ratio(traits.starter_ratio, &self.config),
                    side,
                    hand: side.pitcher_label().to_string(),
                    count: group.len(),
                    avg_pitches: mean_pitches(&group, index)?.round(),
                    top_pitches: top_pitches(&traits),
                    examples: examples(&group, index)?,
                    traits: traits.rounded(TRAIT_PLACES),
                    sub_archetypes,
                    hybrid_count,
                    medoid: medoid.key,
                    medoid_name: medoid_row.player_name.clone(),
                    medoid_coords: medoid.coords,
                    clusters,
                },
            );
        }
        Ok(profiles)
    }
}

fn archetype_of<'n>(names: &BTreeMap<ClusterId, &'n str>, id: ClusterId) -> Result<&'n str, ArchetypeError> {
    names
        .get(&id)
        .copied()
        .ok_or_else(|| ArchetypeError::invalid_input(format!("cluster {id} has no archetype name")))
}

struct RowIndex<'a> {
    rows: BTreeMap<SeasonKey, &'a PitcherSeasonFeatures>,
}

impl<'a> RowIndex<'a> {
    fn new(rows: &'a [PitcherSeasonFeatures]) -> Self {
        Self {
            rows: rows.iter().map(|row| (row.key(), row)).collect(),
        }
    }

    fn get(&self, key: SeasonKey) -> Result<&'a PitcherSeasonFeatures, ArchetypeError> {
        self.rows.get(&key).copied().ok_or_else(|| {
            ArchetypeError::invalid_input(format!("assigned row {key} has no feature record"))
        })
    }
}

fn model_for(models: &[ClusterModel], side: Handedness) -> Result<&ClusterModel, ArchetypeError> {
    models
        .iter()
        .find(|model| model.side == side)
        .ok_or_else(|| ArchetypeError::invalid_input(format!("no fitted model for the {side} partition")))
}

/// Medoid of `group` in the model's standardized space.
fn medoid_of<'g>(
    group: &[&'g ClusterAssignment],
    index: &RowIndex<'_>,
    model: &ClusterModel,
) -> Result<&'g ClusterAssignment, ArchetypeError> {
    let standardized = group
        .iter()
        .map(|a| model.standardize(index.get(a.key)?))
        .collect::<Result<Vec<_>, _>>()?;
    let points = FeatureMatrix::from_rows(&standardized, model.features.len())?;
    let all: Vec<usize> = (0..points.n()).collect();
    medoid_index(&points, &all)
        .map(|idx| group[idx])
        .ok_or_else(|| ArchetypeError::invalid_input("cannot locate the medoid of an empty group"))
}

fn mean_pitches(group: &[&ClusterAssignment], index: &RowIndex<'_>) -> Result<f64, ArchetypeError> {
    if group.is_empty() {
        return Ok(0.0);
    }
    let mut total = 0.0;
    for assignment in group {
        total += index.get(assignment.key)?.total_pitches as f64;
    }
    Ok(total / group.len() as f64)
}

/// `FF: 45% | SL: 30%` over shares above 3%, largest first.
fn top_pitches(traits: &TraitRecord) -> String {
    let mut shares: Vec<_> = traits
        .usage
        .iter()
        .filter(|(_, share)| *share > TOP_PITCH_MIN_SHARE)
        .collect();
    shares.sort_by(|a, b| b.1.total_cmp(&a.1));
    shares
        .iter()
        .take(TOP_PITCH_COUNT)
        .map(|(pitch, share)| format!("{}: {:.0}%", pitch.code(), share * 100.0))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Names of the heaviest-workload members.
fn examples(group: &[&ClusterAssignment], index: &RowIndex<'_>) -> Result<Vec<String>, ArchetypeError> {
    let mut rows = group
        .iter()
        .map(|a| index.get(a.key))
        .collect::<Result<Vec<_>, _>>()?;
    rows.sort_by(|a, b| b.total_pitches.cmp(&a.total_pitches));
    Ok(rows
        .into_iter()
        .take(EXAMPLE_COUNT)
        .map(|row| row.player_name.clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{ArchetypeNamer, archetype_of, profile_key, top_pitches};
    use crate::rules::{HYBRID_MARKER, PURE};
    use crate::traits::TraitRecord;
    use archetype_cluster::{ClusterModel, ClusterSummary, FeatureMatrix, PcaProjection, StandardScaler};
    use archetype_core::{
        AssignmentSource, ClusterAssignment, ClusterId, FeatureKey, Handedness, NamingConfig,
        PitchType, PitcherSeasonFeatures, SeasonKey,
    };

    const FEATURES: [FeatureKey; 2] = [
        FeatureKey::Usage(PitchType::FourSeam),
        FeatureKey::Usage(PitchType::Slider),
    ];

    fn model(side: Handedness) -> ClusterModel {
        let raw = FeatureMatrix::from_rows(
            &[[0.2, 0.1], [0.5, 0.3], [0.6, 0.4], [0.3, 0.2]],
            FEATURES.len(),
        )
        .unwrap();
        let scaler = StandardScaler::fit(&raw, 10.0).unwrap();
        let standardized = scaler.transform(&raw).unwrap();
        ClusterModel {
            side,
            k: 1,
            features: FEATURES.to_vec(),
            scaler,
            centroids: FeatureMatrix::from_rows(&[[0.0, 0.0]], FEATURES.len()).unwrap(),
            pca: PcaProjection::fit(&standardized).unwrap(),
            x_offset: 5.0,
        }
    }

    fn row(pitcher: u64, name: &str, total: usize, mix: &[(PitchType, f64)], whiff: f64) -> PitcherSeasonFeatures {
        let mut row = PitcherSeasonFeatures::empty(SeasonKey::new(pitcher, 2024), Handedness::Right);
        row.player_name = name.to_string();
        row.total_pitches = total;
        row.whiff_rate = whiff;
        for &(pitch, share) in mix {
            row.usage.set(pitch, share);
        }
        row
    }

    fn assign(row: &PitcherSeasonFeatures, ordinal: usize) -> ClusterAssignment {
        ClusterAssignment {
            key: row.key(),
            cluster: ClusterId::new(row.throws, ordinal),
            coords: [5.0 + ordinal as f64, 0.0, 0.0],
            source: AssignmentSource::Fitted,
        }
    }

    fn summary(medoid: &PitcherSeasonFeatures, ordinal: usize, size: usize) -> ClusterSummary {
        ClusterSummary {
            id: ClusterId::new(medoid.throws, ordinal),
            size,
            medoid: medoid.key(),
            medoid_coords: [0.0; 3],
            centroid_coords: [0.0; 3],
            silhouette: 0.0,
        }
    }

    fn sword_cluster() -> Vec<PitcherSeasonFeatures> {
        use PitchType::{FourSeam, Sinker, Slider};
        vec![
            row(1, "Medoid Arm", 2400, &[(FourSeam, 0.40), (Slider, 0.35), (Sinker, 0.25)], 0.30),
            row(2, "Pure Sword", 1800, &[(FourSeam, 0.40), (Slider, 0.35), (Sinker, 0.25)], 0.31),
            row(3, "Sweeper Guy", 1500, &[(FourSeam, 0.30), (Slider, 0.30), (PitchType::Sweeper, 0.30)], 0.28),
            row(4, "Tiny Sample", 60, &[(FourSeam, 0.5), (Slider, 0.5)], 0.40),
        ]
    }

    #[test]
    fn medoid_names_cluster_and_members_diverge() {
        let rows = sword_cluster();
        let assignments: Vec<_> = rows.iter().map(|r| assign(r, 0)).collect();
        let namer = ArchetypeNamer::standard(NamingConfig::default()).unwrap();
        let out = namer
            .name(&rows, &assignments, &[summary(&rows[0], 0, 4)], &[model(Handedness::Right)])
            .unwrap();

        assert_eq!(out.clusters.len(), 1);
        assert_eq!(out.clusters[0].archetype, "Swordfighter");
        assert!(!out.clusters[0].low_signal);

        // Heavy Duty (FF+SI = 0.65) outranks nothing else for the medoid.
        assert_eq!(out.labels[0].sub_archetype, "Heavy Duty");
        assert!(!out.labels[0].hybrid);
        assert_eq!(out.labels[0].display, "Swordfighter / Heavy Duty");

        // Boomerang fires first for the sweeper-heavy member.
        assert!(out.labels[2].hybrid);
        assert_eq!(out.labels[2].sub_archetype, "Boomerang");
        assert_eq!(out.labels[2].display, format!("{HYBRID_MARKER} Swordfighter / Boomerang"));

        assert_eq!(out.labels[3].archetype, "Eephus Lobber");
        assert_eq!(out.labels[3].sub_archetype, PURE);
        assert!(!out.labels[3].hybrid);
    }

    #[test]
    fn profile_aggregates_members() {
        let rows = sword_cluster();
        let assignments: Vec<_> = rows.iter().map(|r| assign(r, 0)).collect();
        let namer = ArchetypeNamer::standard(NamingConfig::default()).unwrap();
        let out = namer
            .name(&rows, &assignments, &[summary(&rows[0], 0, 4)], &[model(Handedness::Right)])
            .unwrap();

        let key = profile_key(Handedness::Right, "Swordfighter");
        assert_eq!(key, "RHP_Swordfighter");
        let profile = &out.profiles[&key];
        assert_eq!(profile.count, 3);
        assert_eq!(profile.hybrid_count, 1);
        assert_eq!(profile.hand, "RHP");
        assert_eq!(profile.color, "#c94185");
        assert_eq!(profile.avg_pitches, 1900.0);
        assert_eq!(profile.examples[0], "Medoid Arm");
        assert_eq!(profile.examples.len(), 3);
        assert_eq!(profile.sub_archetypes.values().sum::<usize>(), 3);
        assert_eq!(profile.clusters, vec![ClusterId::new(Handedness::Right, 0)]);
    }

    #[test]
    fn junk_members_get_their_own_profile() {
        let rows = sword_cluster();
        let assignments: Vec<_> = rows.iter().map(|r| assign(r, 0)).collect();
        let namer = ArchetypeNamer::standard(NamingConfig::default()).unwrap();
        let out = namer
            .name(&rows, &assignments, &[summary(&rows[0], 0, 4)], &[model(Handedness::Right)])
            .unwrap();

        assert_eq!(out.profiles.len(), 2);
        let junk = &out.profiles["RHP_Eephus Lobber"];
        assert_eq!(junk.count, 1);
        assert_eq!(junk.examples, vec!["Tiny Sample".to_string()]);
        assert_eq!(junk.medoid, SeasonKey::new(4, 2024));
        assert_eq!(junk.sub_archetypes.get(PURE), Some(&1));
        assert_eq!(junk.clusters, vec![ClusterId::new(Handedness::Right, 0)]);
        let total: usize = out.profiles.values().map(|p| p.count).sum();
        assert_eq!(total, rows.len());
    }

    #[test]
    fn low_volume_cluster_bypasses_rules() {
        let rows = vec![
            row(7, "Position Player", 40, &[(PitchType::FourSeam, 0.9)], 0.0),
            row(8, "Mop Up", 90, &[(PitchType::FourSeam, 0.9)], 0.0),
        ];
        let assignments: Vec<_> = rows.iter().map(|r| assign(r, 3)).collect();
        let namer = ArchetypeNamer::standard(NamingConfig::default()).unwrap();
        let out = namer
            .name(&rows, &assignments, &[], &[model(Handedness::Right)])
            .unwrap();
        assert!(out.clusters[0].low_signal);
        assert_eq!(out.clusters[0].archetype, "Eephus Lobber");
        assert!(out.profiles.contains_key("RHP_Eephus Lobber"));
    }

    #[test]
    fn unknown_assignment_key_is_rejected() {
        let rows = sword_cluster();
        let mut stray = assign(&rows[0], 0);
        stray.key = SeasonKey::new(999, 2024);
        let namer = ArchetypeNamer::standard(NamingConfig::default()).unwrap();
        let err = namer
            .name(&rows, &[stray], &[], &[model(Handedness::Right)])
            .unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn unnamed_cluster_is_an_error() {
        let right = ClusterId::new(Handedness::Right, 0);
        let names: std::collections::BTreeMap<ClusterId, &str> = [(right, "Ghost")].into_iter().collect();
        assert_eq!(archetype_of(&names, right).unwrap(), "Ghost");
        let err = archetype_of(&names, ClusterId::new(Handedness::Right, 1)).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn top_pitches_format() {
        let mut traits = TraitRecord::default();
        traits.usage.ff = 0.45;
        traits.usage.sl = 0.30;
        traits.usage.ch = 0.02;
        traits.usage.si = 0.10;
        traits.usage.cu = 0.05;
        traits.usage.fc = 0.08;
        assert_eq!(top_pitches(&traits), "FF: 45% | SL: 30% | SI: 10% | FC: 8%");
    }
}
