// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! JSON artifacts persisted between stages, all under one output root.

use crate::error::CliError;
use archetype_cluster::{ClusterModel, ClusterSummary};
use archetype_core::{
    ClusterAssignment, FeatureKey, Handedness, PartitionDiagnostics, PitcherSeasonFeatures,
    SeasonKey,
};
use archetype_features::{CategoryMap, FeatureTables};
use archetype_naming::{ArchetypeProfile, ClusterName, MemberLabel};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CATEGORY_MAP: &str = "category_map.json";
pub const FEATURES_QUALIFIED: &str = "features_qualified.json";
pub const FEATURES_SUB_THRESHOLD: &str = "features_sub_threshold.json";
pub const CLUSTER_META: &str = "models/cluster_meta.json";
pub const ASSIGNMENTS: &str = "assignments.json";
pub const MEMBER_LABELS: &str = "member_labels.json";
pub const PROFILES: &str = "archetype_profiles.json";
pub const EXPORT_SEASONS: &str = "export/pitcher_seasons.json";
pub const EXPORT_CLUSTERS: &str = "export/clusters.json";

/// One feature table file. Both tables carry the map fingerprint they were
/// built with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTableFile {
    pub category_map_fingerprint: Option<String>,
    pub rows: Vec<PitcherSeasonFeatures>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped_low_velocity: Vec<SeasonKey>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterMeta {
    /// Keyed by partition code (`R`, `L`).
    pub chosen_k: BTreeMap<String, usize>,
    pub features: Vec<FeatureKey>,
    pub x_offset: f64,
    pub category_map_fingerprint: Option<String>,
    pub summaries: Vec<ClusterSummary>,
    pub diagnostics: Vec<PartitionDiagnostics>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberLabels {
    pub clusters: Vec<ClusterName>,
    pub labels: Vec<MemberLabel>,
}

#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, artifact: &str) -> PathBuf {
        self.root.join(artifact)
    }

    pub fn model_artifact(side: Handedness) -> String {
        format!("models/model_{}.json", side.code())
    }

    pub fn exists(&self, artifact: &str) -> bool {
        self.path(artifact).is_file()
    }

    pub fn write<T: Serialize>(&self, artifact: &str, payload: &T) -> Result<PathBuf, CliError> {
        let path = self.path(artifact);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| {
                CliError::io(format!("failed to create '{}'", parent.display()), source)
            })?;
        }
        let encoded = serde_json::to_string_pretty(payload)
            .map_err(|source| CliError::json(format!("failed to serialize {artifact}"), source))?;
        fs::write(&path, format!("{encoded}\n"))
            .map_err(|source| CliError::io(format!("failed to write '{}'", path.display()), source))?;
        debug!(path = %path.display(), "wrote artifact");
        Ok(path)
    }

    /// Reads an artifact; `hint` names the stage that produces it.
    pub fn read<T: DeserializeOwned>(&self, artifact: &str, hint: &str) -> Result<T, CliError> {
        let path = self.path(artifact);
        if !path.is_file() {
            return Err(CliError::missing(&path, hint));
        }
        let raw = fs::read_to_string(&path)
            .map_err(|source| CliError::io(format!("failed to read '{}'", path.display()), source))?;
        serde_json::from_str(&raw)
            .map_err(|source| CliError::json(format!("invalid JSON in '{}'", path.display()), source))
    }

    pub fn save_category_map(&self, map: &CategoryMap) -> Result<PathBuf, CliError> {
        self.write(CATEGORY_MAP, map)
    }

    /// Loads the category map and checks its fingerprint against its entries.
    pub fn load_category_map(&self) -> Result<CategoryMap, CliError> {
        let map: CategoryMap = self.read(CATEGORY_MAP, "run `archetype reclassify` first")?;
        map.verify()?;
        Ok(map)
    }

    pub fn save_features(&self, tables: &FeatureTables) -> Result<(), CliError> {
        self.write(
            FEATURES_QUALIFIED,
            &FeatureTableFile {
                category_map_fingerprint: tables.category_map_fingerprint.clone(),
                rows: tables.qualified.clone(),
                dropped_low_velocity: tables.dropped_low_velocity.clone(),
            },
        )?;
        self.write(
            FEATURES_SUB_THRESHOLD,
            &FeatureTableFile {
                category_map_fingerprint: tables.category_map_fingerprint.clone(),
                rows: tables.sub_threshold.clone(),
                dropped_low_velocity: Vec::new(),
            },
        )?;
        Ok(())
    }

    /// Loads both feature tables, refusing a pair built from different maps.
    pub fn load_features(&self) -> Result<FeatureTables, CliError> {
        let hint = "run `archetype features` first";
        let qualified: FeatureTableFile = self.read(FEATURES_QUALIFIED, hint)?;
        let sub: FeatureTableFile = self.read(FEATURES_SUB_THRESHOLD, hint)?;
        if qualified.category_map_fingerprint != sub.category_map_fingerprint {
            return Err(CliError::invalid_input(format!(
                "feature tables were built from different category maps ({:?} vs {:?}); rerun `archetype features`",
                qualified.category_map_fingerprint, sub.category_map_fingerprint
            )));
        }
        Ok(FeatureTables {
            qualified: qualified.rows,
            sub_threshold: sub.rows,
            dropped_low_velocity: qualified.dropped_low_velocity,
            category_map_fingerprint: qualified.category_map_fingerprint,
        })
    }

    pub fn save_model(&self, model: &ClusterModel) -> Result<PathBuf, CliError> {
        self.write(&Self::model_artifact(model.side), model)
    }

    pub fn load_models(&self) -> Result<Vec<ClusterModel>, CliError> {
        Handedness::BOTH
            .iter()
            .map(|&side| {
                self.read::<ClusterModel>(&Self::model_artifact(side), "run `archetype cluster` first")
            })
            .collect()
    }

    pub fn load_cluster_meta(&self) -> Result<ClusterMeta, CliError> {
        self.read(CLUSTER_META, "run `archetype cluster` first")
    }

    pub fn load_assignments(&self) -> Result<Vec<ClusterAssignment>, CliError> {
        self.read(ASSIGNMENTS, "run `archetype cluster` first")
    }

    pub fn load_member_labels(&self) -> Result<MemberLabels, CliError> {
        self.read(MEMBER_LABELS, "run `archetype name` first")
    }

    pub fn load_profiles(&self) -> Result<BTreeMap<String, ArchetypeProfile>, CliError> {
        self.read(PROFILES, "run `archetype name` first")
    }
}

#[cfg(test)]
mod tests {
    use super::{ArtifactStore, FEATURES_SUB_THRESHOLD, FeatureTableFile};
    use archetype_core::{Handedness, PitcherSeasonFeatures, SeasonKey};
    use archetype_features::FeatureTables;

    #[test]
    fn model_artifacts_are_per_side() {
        assert_eq!(ArtifactStore::model_artifact(Handedness::Right), "models/model_R.json");
        assert_eq!(ArtifactStore::model_artifact(Handedness::Left), "models/model_L.json");
    }

    #[test]
    fn missing_artifact_names_the_producing_stage() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let err = store.load_assignments().unwrap_err();
        assert_eq!(err.code(), "missing_artifact");
        assert!(err.to_string().contains("archetype cluster"));
    }

    #[test]
    fn feature_tables_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("out"));
        let mut row = PitcherSeasonFeatures::empty(SeasonKey::new(3, 2022), Handedness::Left);
        row.total_pitches = 812;
        let tables = FeatureTables {
            qualified: vec![row],
            category_map_fingerprint: Some("abc".to_string()),
            ..FeatureTables::default()
        };
        store.save_features(&tables).unwrap();
        assert_eq!(store.load_features().unwrap(), tables);
    }

    #[test]
    fn mismatched_fingerprints_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let tables = FeatureTables {
            category_map_fingerprint: Some("abc".to_string()),
            ..FeatureTables::default()
        };
        store.save_features(&tables).unwrap();
        store
            .write(
                FEATURES_SUB_THRESHOLD,
                &FeatureTableFile {
                    category_map_fingerprint: Some("def".to_string()),
                    ..FeatureTableFile::default()
                },
            )
            .unwrap();
        let err = store.load_features().unwrap_err();
        assert!(err.to_string().contains("different category maps"));
    }
}
