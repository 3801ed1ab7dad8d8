// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Stage runners. Each stage reads the artifacts of the previous one from
//! the store and writes its own, so any stage can be rerun in isolation.

use crate::error::CliError;
use crate::export::{export_profiles, export_rows};
use crate::input::{load_events, load_roles};
use crate::store::{
    ASSIGNMENTS, ArtifactStore, CATEGORY_MAP, CLUSTER_META, ClusterMeta, EXPORT_CLUSTERS,
    EXPORT_SEASONS, FEATURES_QUALIFIED, FEATURES_SUB_THRESHOLD, MEMBER_LABELS, MemberLabels,
    PROFILES,
};
use archetype_cluster::{assign_fallback, fit_all};
use archetype_core::{PipelineConfig, RawEvent};
use archetype_features::{CategoryReclassifier, FeatureAggregator, RoleTable};
use archetype_naming::ArchetypeNamer;
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Reclassify,
    Features,
    Cluster,
    Name,
    Export,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Reclassify,
        Stage::Features,
        Stage::Cluster,
        Stage::Name,
        Stage::Export,
    ];

    pub fn needs_events(self) -> bool {
        matches!(self, Self::Reclassify | Self::Features)
    }
}

/// What a stage wrote, printed as JSON by the binary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub artifacts: Vec<PathBuf>,
    pub counts: BTreeMap<String, usize>,
}

impl StageReport {
    fn new(stage: Stage) -> Self {
        Self {
            stage,
            artifacts: Vec::new(),
            counts: BTreeMap::new(),
        }
    }

    fn count(mut self, name: &str, value: usize) -> Self {
        self.counts.insert(name.to_string(), value);
        self
    }
}

/// External inputs for the stages that read raw events.
#[derive(Clone, Debug, Default)]
pub struct RunInputs {
    pub events: Option<PathBuf>,
    pub roles: Option<PathBuf>,
}

pub fn reclassify(
    store: &ArtifactStore,
    events: &[RawEvent],
    config: &PipelineConfig,
) -> Result<StageReport, CliError> {
    let map = CategoryReclassifier::new(config.reclassify.clone())?.build(events);
    let mut report = StageReport::new(Stage::Reclassify)
        .count("pitchers", map.len())
        .count("ambiguous_events", map.provenance.ambiguous_events);
    report.artifacts.push(store.save_category_map(&map)?);
    Ok(report)
}

pub fn features(
    store: &ArtifactStore,
    mut events: Vec<RawEvent>,
    roles: &RoleTable,
    config: &PipelineConfig,
) -> Result<StageReport, CliError> {
    let map = store.load_category_map()?;
    let rewritten = map.apply(&mut events);
    let mut tables = FeatureAggregator::new(config.features.clone())?.aggregate(&events, roles)?;
    tables.category_map_fingerprint = Some(map.fingerprint().to_string());
    store.save_features(&tables)?;

    let mut report = StageReport::new(Stage::Features)
        .count("rewritten_events", rewritten)
        .count("qualified", tables.qualified.len())
        .count("sub_threshold", tables.sub_threshold.len())
        .count("dropped_low_velocity", tables.dropped_low_velocity.len());
    report.artifacts.push(store.path(FEATURES_QUALIFIED));
    report.artifacts.push(store.path(FEATURES_SUB_THRESHOLD));
    Ok(report)
}

pub fn cluster(store: &ArtifactStore, config: &PipelineConfig) -> Result<StageReport, CliError> {
    let tables = store.load_features()?;
    if store.exists(CATEGORY_MAP) {
        let map = store.load_category_map()?;
        if tables.category_map_fingerprint.as_deref() != Some(map.fingerprint()) {
            return Err(CliError::invalid_input(
                "feature tables are stale for the current category map; rerun `archetype features`",
            ));
        }
    }

    let outcome = fit_all(&tables.qualified, &config.cluster)?;
    let mut assignments = Vec::new();
    let mut summaries = Vec::new();
    let mut diagnostics = Vec::new();
    let mut chosen_k = BTreeMap::new();
    for fit in outcome.partitions() {
        assignments.extend(fit.assignments.iter().cloned());
        summaries.extend(fit.summaries.iter().cloned());
        diagnostics.push(fit.diagnostics.clone());
        chosen_k.insert(fit.model.side.code().to_string(), fit.model.k);
    }
    let fitted = assignments.len();
    let models = outcome.into_models();
    assignments.extend(assign_fallback(&models, &tables.sub_threshold)?);

    let mut report = StageReport::new(Stage::Cluster)
        .count("fitted", fitted)
        .count("fallback", assignments.len() - fitted);
    for model in &models {
        report.artifacts.push(store.save_model(model)?);
    }
    let meta = ClusterMeta {
        chosen_k,
        features: config.cluster.features.clone(),
        x_offset: config.cluster.x_offset,
        category_map_fingerprint: tables.category_map_fingerprint,
        summaries,
        diagnostics,
    };
    report.artifacts.push(store.write(CLUSTER_META, &meta)?);
    report.artifacts.push(store.write(ASSIGNMENTS, &assignments)?);
    Ok(report)
}

pub fn name(store: &ArtifactStore, config: &PipelineConfig) -> Result<StageReport, CliError> {
    let tables = store.load_features()?;
    let assignments = store.load_assignments()?;
    let models = store.load_models()?;
    let meta = store.load_cluster_meta()?;
    let rows: Vec<_> = tables
        .qualified
        .into_iter()
        .chain(tables.sub_threshold)
        .collect();

    let namer = ArchetypeNamer::standard(config.naming.clone())?;
    let outcome = namer.name(&rows, &assignments, &meta.summaries, &models)?;
    let hybrids = outcome.labels.iter().filter(|label| label.hybrid).count();

    let mut report = StageReport::new(Stage::Name)
        .count("clusters", outcome.clusters.len())
        .count("profiles", outcome.profiles.len())
        .count("hybrids", hybrids);
    report.artifacts.push(store.write(PROFILES, &outcome.profiles)?);
    report.artifacts.push(store.write(
        MEMBER_LABELS,
        &MemberLabels {
            clusters: outcome.clusters,
            labels: outcome.labels,
        },
    )?);
    Ok(report)
}

pub fn export(store: &ArtifactStore, config: &PipelineConfig) -> Result<StageReport, CliError> {
    let tables = store.load_features()?;
    let assignments = store.load_assignments()?;
    let labels = store.load_member_labels()?;
    let profiles = store.load_profiles()?;
    let rows: Vec<_> = tables
        .qualified
        .into_iter()
        .chain(tables.sub_threshold)
        .collect();

    let flat = export_rows(&rows, &assignments, &labels, &profiles, &config.naming)?;
    let mut report = StageReport::new(Stage::Export)
        .count("rows", flat.len())
        .count("profiles", profiles.len());
    report.artifacts.push(store.write(EXPORT_SEASONS, &flat)?);
    report
        .artifacts
        .push(store.write(EXPORT_CLUSTERS, &export_profiles(&profiles))?);
    Ok(report)
}

/// Runs every stage from `from` onward, loading events once if needed.
pub fn run(
    store: &ArtifactStore,
    inputs: &RunInputs,
    config: &PipelineConfig,
    from: Stage,
) -> Result<Vec<StageReport>, CliError> {
    config.validate()?;
    let stages: Vec<Stage> = Stage::ALL.into_iter().filter(|stage| *stage >= from).collect();
    let events = if stages.iter().any(|stage| stage.needs_events()) {
        let path = inputs
            .events
            .as_deref()
            .ok_or_else(|| {
                CliError::invalid_input("--events is required for the reclassify and features stages")
            })?;
        load_events(path)?
    } else {
        Vec::new()
    };

    let mut reports = Vec::with_capacity(stages.len());
    for stage in stages {
        let report = match stage {
            Stage::Reclassify => reclassify(store, &events, config)?,
            Stage::Features => {
                let roles = load_roles(inputs.roles.as_deref())?;
                features(store, events.clone(), &roles, config)?
            }
            Stage::Cluster => cluster(store, config)?,
            Stage::Name => name(store, config)?,
            Stage::Export => export(store, config)?,
        };
        info!(stage = ?stage, counts = ?report.counts, "stage complete");
        reports.push(report);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::Stage;

    #[test]
    fn stages_are_ordered() {
        assert!(Stage::Reclassify < Stage::Features);
        assert!(Stage::Name < Stage::Export);
        let tail: Vec<_> = Stage::ALL.into_iter().filter(|s| *s >= Stage::Cluster).collect();
        assert_eq!(tail, vec![Stage::Cluster, Stage::Name, Stage::Export]);
        assert!(!Stage::Cluster.needs_events());
    }
}
