// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use archetype_core::{FeatureConfig, Handedness, RawEvent, ReclassifyConfig};
use archetype_features::{CategoryReclassifier, FeatureAggregator, RoleTable};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

const MIN_PROPTEST_CASES: u32 = 256;
const CODES: [&str; 14] = [
    "FF", "SI", "FC", "SL", "CH", "CU", "FS", "KC", "ST", "KN", "SV", "EP", "FO", "",
];

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn arb_event() -> impl Strategy<Value = RawEvent> {
    (
        1u64..6,
        2021u16..2024,
        0usize..CODES.len(),
        any::<bool>(),
        prop::option::of(60.0f64..102.0),
        prop::option::of(-2.0f64..2.0),
        prop::option::of(-2.0f64..2.0),
        prop::option::of(0.5f64..4.5),
    )
        .prop_map(|(pitcher, year, code, right, speed, pfx_x, plate_x, plate_z)| {
            let throws = if right {
                Handedness::Right
            } else {
                Handedness::Left
            };
            let mut event = RawEvent::new(pitcher, year, throws);
            event.pitch_type = Some(CODES[code].to_string());
            event.release_speed = speed;
            event.pfx_x = pfx_x;
            event.plate_x = plate_x;
            event.plate_z = plate_z;
            event.stand = Some(Handedness::Left);
            event
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        max_shrink_iters: 1024,
        failure_persistence: Some(Box::new(FileFailurePersistence::Direct("proptest-regressions/tests/proptest_invariants.txt"))),
        .. ProptestConfig::default()
    })]

    #[test]
    fn category_map_is_idempotent(events in prop::collection::vec(arb_event(), 0..200)) {
        let reclassifier = CategoryReclassifier::new(ReclassifyConfig::default()).unwrap();
        let map = reclassifier.build(&events);

        let mut once = events.clone();
        map.apply(&mut once);
        let mut twice = once.clone();
        let rewritten = map.apply(&mut twice);

        prop_assert_eq!(rewritten, 0);
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.iter().all(|event| event.category() != Some("SV")));
        map.verify().unwrap();
    }

    #[test]
    fn usage_sums_to_one_or_zero(events in prop::collection::vec(arb_event(), 1..300)) {
        let config = FeatureConfig {
            min_pitches: 20,
            implausible_velocity: (0.0, 0.0),
            ..FeatureConfig::default()
        };
        let aggregator = FeatureAggregator::new(config).unwrap();
        let Ok(tables) = aggregator.aggregate(&events, &RoleTable::default()) else {
            prop_assert!(events.iter().all(|event| event.category().is_none()));
            return Ok(());
        };

        for row in tables.qualified.iter().chain(&tables.sub_threshold) {
            let total = row.usage.total();
            prop_assert!(total.abs() < 1e-9 || (total - 1.0).abs() < 1e-9, "usage total {}", total);
            for rate in [row.swing_rate, row.whiff_rate, row.zone_rate, row.groundball_rate] {
                prop_assert!((0.0..=1.0).contains(&rate));
            }
        }
        for row in &tables.qualified {
            prop_assert!(row.total_pitches >= 20);
        }
        for row in &tables.sub_threshold {
            prop_assert!(row.total_pitches < 20);
        }
    }
}
