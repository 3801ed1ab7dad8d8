// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Nearest-centroid placement for rows excluded from fitting.

use crate::model::ClusterModel;
use archetype_core::{
    ArchetypeError, AssignmentSource, ClusterAssignment, Handedness, PitcherSeasonFeatures,
};
use tracing::info;

/// Assigns each row to its nearest centroid under `model`. The model is
/// borrowed immutably: scaler, centroids, and projection are reused as fit.
pub fn assign_nearest(
    model: &ClusterModel,
    rows: &[&PitcherSeasonFeatures],
) -> Result<Vec<ClusterAssignment>, ArchetypeError> {
    rows.iter()
        .map(|row| {
            let standardized = model.standardize(row)?;
            Ok(ClusterAssignment {
                key: row.key(),
                cluster: model.predict(&standardized),
                coords: model.project(&standardized)?,
                source: AssignmentSource::Fallback,
            })
        })
        .collect()
}

/// Routes each sub-threshold row to the model of its own partition.
pub fn assign_fallback(
    models: &[ClusterModel],
    rows: &[PitcherSeasonFeatures],
) -> Result<Vec<ClusterAssignment>, ArchetypeError> {
    let mut assignments = Vec::with_capacity(rows.len());
    for side in Handedness::BOTH {
        let members: Vec<&PitcherSeasonFeatures> =
            rows.iter().filter(|row| row.throws == side).collect();
        if members.is_empty() {
            continue;
        }
        let model = models.iter().find(|m| m.side == side).ok_or_else(|| {
            ArchetypeError::invalid_input(format!("no fitted model for the {side} partition"))
        })?;
        let placed = assign_nearest(model, &members)?;
        info!(side = %side, rows = placed.len(), "assigned sub-threshold rows");
        assignments.extend(placed);
    }
    Ok(assignments)
}
