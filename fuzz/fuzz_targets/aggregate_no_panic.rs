// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use archetype_core::{FeatureConfig, Handedness, RawEvent, ReclassifyConfig};
use archetype_features::{CategoryReclassifier, FeatureAggregator, RoleEntry, RoleTable};
use libfuzzer_sys::fuzz_target;

const CODES: [&str; 14] = [
    "FF", "SI", "FC", "SL", "CH", "CU", "FS", "KC", "ST", "KN", "SV", "EP", "", " ",
];
const DESCRIPTIONS: [&str; 5] = ["swinging_strike", "foul", "ball", "hit_into_play", "called_strike"];

fn hand(seed: u8) -> Handedness {
    if seed & 1 == 0 {
        Handedness::Right
    } else {
        Handedness::Left
    }
}

fn build_event(cursor: &mut common::ByteCursor<'_>) -> RawEvent {
    let pitcher = u64::from(cursor.next_u8() % 12);
    let season = 2020 + u16::from(cursor.next_u8() % 4);
    let mut event = RawEvent::new(pitcher, season, hand(cursor.next_u8()));
    let code = CODES[common::bounded(cursor.next_u8(), 0, CODES.len() - 1)];
    event.pitch_type = (cursor.next_u8() % 8 != 0).then(|| code.to_string());
    event.player_name = Some(format!("P{pitcher}"));
    event.stand = (cursor.next_u8() % 4 != 0).then(|| hand(cursor.next_u8()));

    let mode = cursor.next_u8();
    event.release_speed = common::measurement(mode, cursor.next_i16(), 300.0);
    event.release_spin_rate = common::measurement(mode >> 1, cursor.next_i16(), 10.0);
    event.release_pos_x = common::measurement(mode >> 2, cursor.next_i16(), 4_000.0);
    event.release_pos_z = common::measurement(mode >> 3, cursor.next_i16(), 4_000.0);
    event.pfx_x = common::measurement(cursor.next_u8(), cursor.next_i16(), 10_000.0);
    event.pfx_z = common::measurement(cursor.next_u8(), cursor.next_i16(), 10_000.0);
    event.plate_x = common::measurement(cursor.next_u8(), cursor.next_i16(), 8_000.0);
    event.plate_z = common::measurement(cursor.next_u8(), cursor.next_i16(), 6_000.0);
    event.sz_top = common::measurement(cursor.next_u8(), cursor.next_i16(), 8_000.0);
    event.sz_bot = common::measurement(cursor.next_u8(), cursor.next_i16(), 8_000.0);
    event.zone = (cursor.next_u8() % 3 != 0).then(|| cursor.next_u8() % 16);
    let description = DESCRIPTIONS[common::bounded(cursor.next_u8(), 0, DESCRIPTIONS.len() - 1)];
    event.description = Some(description.to_string());
    event.result_type = Some(if description == "hit_into_play" { "X" } else { "S" }.to_string());
    event.bb_type = (cursor.next_u8() % 2 == 0).then(|| "ground_ball".to_string());
    event
}

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);
    let features = FeatureConfig {
        min_pitches: common::bounded(cursor.next_u8(), 1, 40),
        min_pitches_per_side: common::bounded(cursor.next_u8(), 0, 10),
        ..FeatureConfig::default()
    };
    let roles = RoleTable::from_entries((0..4u64).map(|pitcher| RoleEntry {
        pitcher,
        game_year: 2020 + (pitcher as u16 % 4),
        games: Some(u32::from(cursor.next_u8())),
        starts: Some(u32::from(cursor.next_u8())),
        role: None,
    }));

    let mut events = Vec::new();
    let count = common::bounded(cursor.next_u8(), 0, 160);
    while events.len() < count && !cursor.is_exhausted() {
        events.push(build_event(&mut cursor));
    }

    let Ok(reclassifier) = CategoryReclassifier::new(ReclassifyConfig::default()) else {
        return;
    };
    let map = reclassifier.build(&events);
    map.apply(&mut events);
    let Ok(aggregator) = FeatureAggregator::new(features) else {
        return;
    };
    if let Ok(tables) = aggregator.aggregate(&events, &roles) {
        for row in tables.qualified.iter().chain(&tables.sub_threshold) {
            let total: f64 = row.usage.total();
            assert!(total == 0.0 || (total - 1.0).abs() < 1e-9, "usage sums to {total}");
            assert!((0.0..=1.0).contains(&row.whiff_rate));
            assert!((0.0..=1.0).contains(&row.groundball_rate));
        }
    }
});
