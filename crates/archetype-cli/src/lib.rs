// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Stage runners and persisted artifacts behind the `archetype` binary.

pub mod error;
pub mod export;
pub mod input;
pub mod stages;
pub mod store;

pub use error::CliError;
pub use export::{ExportRow, export_profiles, export_rows, round_to};
pub use input::{InputFormat, load_events, load_roles};
pub use stages::{RunInputs, Stage, StageReport, run};
pub use store::{ArtifactStore, ClusterMeta, FeatureTableFile, MemberLabels};

use archetype_core::PipelineConfig;
use std::fs;
use std::path::Path;

/// Reads a JSON config whose missing fields keep their defaults, then
/// validates it. No path means the defaults.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig, CliError> {
    let config = match path {
        None => PipelineConfig::default(),
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|source| {
                CliError::io(format!("failed to read '{}'", path.display()), source)
            })?;
            serde_json::from_str(&raw).map_err(|source| {
                CliError::json(format!("invalid config JSON in '{}'", path.display()), source)
            })?
        }
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::load_config;
    use std::fs;

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"cluster": {"seed": 7, "min_k": 3}}"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.cluster.seed, 7);
        assert_eq!(config.cluster.min_k, 3);
        assert_eq!(config.cluster.k_max, 15);
        assert_eq!(config.features.min_pitches, 300);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"cluster": {"k_min": 1}}"#).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap_err().code(), "config_error");
    }
}
