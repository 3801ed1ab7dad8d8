// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use archetype_cluster::{FeatureMatrix, assign_fallback, euclidean, fit_all, medoid_index};
use archetype_core::{
    ClusterConfig, FeatureKey, Handedness, PitchType, PitcherSeasonFeatures, SeasonKey,
};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

const MIN_PROPTEST_CASES: u32 = 32;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn small_config(min_k: usize) -> ClusterConfig {
    ClusterConfig {
        k_min: 2,
        k_max: 6,
        min_k,
        search_restarts: 2,
        search_max_iter: 50,
        final_restarts: 3,
        final_max_iter: 80,
        features: vec![
            FeatureKey::Usage(PitchType::FourSeam),
            FeatureKey::Usage(PitchType::Slider),
            FeatureKey::WhiffRate,
            FeatureKey::GroundballRate,
        ],
        ..ClusterConfig::default()
    }
}

fn arb_rows(side: Handedness, base: u64) -> impl Strategy<Value = Vec<PitcherSeasonFeatures>> {
    prop::collection::vec((0.0f64..0.7, 0.0f64..0.3, 0.0f64..0.5, 0.0f64..0.7), 8..24).prop_map(
        move |values| {
            values
                .into_iter()
                .enumerate()
                .map(|(idx, (ff, sl, whiff, gb))| {
                    let key = SeasonKey::new(base + idx as u64, 2024);
                    let mut row = PitcherSeasonFeatures::empty(key, side);
                    row.usage.ff = ff;
                    row.usage.sl = sl;
                    row.whiff_rate = whiff;
                    row.groundball_rate = gb;
                    row.total_pitches = 400;
                    row
                })
                .collect()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        max_shrink_iters: 256,
        failure_persistence: Some(Box::new(FileFailurePersistence::Direct("proptest-regressions/tests/proptest_invariants.txt"))),
        .. ProptestConfig::default()
    })]

    #[test]
    fn selected_k_never_drops_below_floor(
        right in arb_rows(Handedness::Right, 0),
        left in arb_rows(Handedness::Left, 1_000),
        min_k in 2usize..6,
    ) {
        let mut rows = right;
        rows.extend(left);
        let outcome = fit_all(&rows, &small_config(min_k)).unwrap();
        for fit in outcome.partitions() {
            prop_assert!(fit.model.k >= min_k);
            prop_assert_eq!(fit.diagnostics.chosen_k, fit.model.k);
            prop_assert!(fit.assignments.iter().all(|a| a.cluster.ordinal < fit.model.k));
        }
    }

    #[test]
    fn fallback_leaves_models_bit_identical(
        right in arb_rows(Handedness::Right, 0),
        left in arb_rows(Handedness::Left, 1_000),
        extra in arb_rows(Handedness::Right, 5_000),
    ) {
        let mut rows = right;
        rows.extend(left);
        let models = fit_all(&rows, &small_config(2)).unwrap().into_models();
        let before: Vec<Vec<u64>> = models
            .iter()
            .map(|m| m.centroids.as_slice().iter().map(|v| v.to_bits()).collect())
            .collect();
        let snapshot = models.clone();

        let placed = assign_fallback(&models, &extra).unwrap();
        prop_assert_eq!(placed.len(), extra.len());

        let after: Vec<Vec<u64>> = models
            .iter()
            .map(|m| m.centroids.as_slice().iter().map(|v| v.to_bits()).collect())
            .collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(&models, &snapshot);
    }

    #[test]
    fn medoid_minimizes_distance_sum(
        points in prop::collection::vec(prop::array::uniform3(-5.0f64..5.0), 5..11),
    ) {
        let matrix = FeatureMatrix::from_rows(&points, 3).unwrap();
        let members: Vec<usize> = (0..points.len()).collect();
        let medoid = medoid_index(&matrix, &members).unwrap();
        let cost = |i: usize| -> f64 {
            members.iter().map(|&j| euclidean(matrix.row(i), matrix.row(j))).sum()
        };
        let best = cost(medoid);
        for &candidate in &members {
            prop_assert!(best <= cost(candidate) + 1e-12);
        }
    }
}
