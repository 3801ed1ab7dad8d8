// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use archetype_cli::{ArtifactStore, RunInputs, Stage, load_config, run, stages};
use archetype_core::{Handedness, PitchType, RawEvent};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG: &str = r#"{
    "features": {"min_pitches": 40, "min_pitches_per_side": 5},
    "cluster": {
        "k_max": 4,
        "min_k": 2,
        "search_restarts": 2,
        "search_max_iter": 50,
        "final_restarts": 2,
        "final_max_iter": 50
    },
    "naming": {"junk_floor": 20.0}
}"#;

fn synthetic_events() -> Vec<RawEvent> {
    let mut events = Vec::new();
    for pitcher in 0..24u64 {
        let throws = if pitcher % 2 == 0 {
            Handedness::Right
        } else {
            Handedness::Left
        };
        let count = if pitcher >= 20 { 15 } else { 60 };
        let mix: &[&str] = match pitcher % 4 {
            0 => &["FF", "FF", "SL", "CH"],
            1 => &["SI", "SI", "FC", "SL"],
            2 => &["FF", "CU", "SV", "FF"],
            _ => &["FF", "ST", "SI", "FS"],
        };
        for i in 0..count {
            let code = mix[i % mix.len()];
            let mut event = RawEvent::new(1_000 + pitcher, 2024, throws);
            event.player_name = Some(format!("Pitcher {pitcher}"));
            event.pitch_type = Some(code.to_string());
            event.release_speed = Some(if matches!(code, "FF" | "SI" | "FC") {
                94.0 + (pitcher % 3) as f64
            } else {
                84.0
            });
            event.release_spin_rate = Some(2_200.0 + 10.0 * pitcher as f64);
            event.release_pos_x = Some(-1.8);
            event.release_pos_z = Some(5.9);
            event.pfx_x = Some(if code == "SV" { 1.4 } else { 0.3 });
            event.plate_x = Some(((i % 5) as f64 - 2.0) * 0.4);
            event.plate_z = Some(1.8 + (i % 4) as f64 * 0.5);
            event.stand = Some(if i % 3 == 0 {
                Handedness::Left
            } else {
                Handedness::Right
            });
            event.zone = Some((i % 14 + 1) as u8);
            let (description, result) = match i % 4 {
                0 => ("swinging_strike", "S"),
                1 => ("hit_into_play", "X"),
                _ => ("ball", "B"),
            };
            event.description = Some(description.to_string());
            event.result_type = Some(result.to_string());
            event.bb_type = (i % 4 == 1).then(|| "ground_ball".to_string());
            events.push(event);
        }
    }
    events
}

fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let events_path = dir.join("events.jsonl");
    let lines: Vec<String> = synthetic_events()
        .iter()
        .map(|event| serde_json::to_string(event).unwrap())
        .collect();
    fs::write(&events_path, lines.join("\n")).unwrap();
    let config_path = dir.join("config.json");
    fs::write(&config_path, CONFIG).unwrap();
    (events_path, config_path)
}

#[test]
fn full_run_then_resume_from_cluster() {
    let dir = tempfile::tempdir().unwrap();
    let (events, config_path) = write_inputs(dir.path());
    let config = load_config(Some(&config_path)).unwrap();
    let store = ArtifactStore::new(dir.path().join("out"));
    let inputs = RunInputs {
        events: Some(events),
        roles: None,
    };

    let reports = run(&store, &inputs, &config, Stage::Reclassify).unwrap();
    assert_eq!(reports.len(), 5);
    assert_eq!(reports[1].counts["qualified"], 20);
    assert_eq!(reports[1].counts["sub_threshold"], 4);
    assert_eq!(reports[2].counts["fallback"], 4);

    let map = store.load_category_map().unwrap();
    assert_eq!(map.resolve(1_002), PitchType::Sweeper);

    let flat: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path("export/pitcher_seasons.json")).unwrap())
            .unwrap();
    let rows = flat.as_array().unwrap();
    assert_eq!(rows.len(), 24);
    let tiny = rows
        .iter()
        .find(|row| row["pitcher"] == 1_020)
        .unwrap();
    assert_eq!(tiny["source"], "fallback");
    assert_eq!(tiny["archetype"], "Eephus Lobber");

    let clusters: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path("export/clusters.json")).unwrap())
            .unwrap();
    let keys: Vec<&String> = clusters.as_object().unwrap().keys().collect();
    assert!(!keys.is_empty());
    assert!(keys.iter().all(|k| k.starts_with("RHP_") || k.starts_with("LHP_")));

    let resumed = run(&store, &RunInputs::default(), &config, Stage::Cluster).unwrap();
    assert_eq!(resumed.len(), 3);
    assert_eq!(resumed[0].stage, Stage::Cluster);
}

#[test]
fn stale_features_are_refused_after_a_new_map() {
    let dir = tempfile::tempdir().unwrap();
    let (events, config_path) = write_inputs(dir.path());
    let config = load_config(Some(&config_path)).unwrap();
    let store = ArtifactStore::new(dir.path().join("out"));
    let inputs = RunInputs {
        events: Some(events.clone()),
        roles: None,
    };
    run(&store, &inputs, &config, Stage::Reclassify).unwrap();

    let mut stricter = config.clone();
    stricter.reclassify.sweeper_break_ft = 2.0;
    let loaded = archetype_cli::load_events(&events).unwrap();
    stages::reclassify(&store, &loaded, &stricter).unwrap();

    let err = stages::cluster(&store, &config).unwrap_err();
    assert_eq!(err.code(), "invalid_input");
    assert!(err.to_string().contains("stale"));
}

#[test]
fn later_stages_need_earlier_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let config = load_config(None).unwrap();
    let err = stages::name(&store, &config).unwrap_err();
    assert_eq!(err.code(), "missing_artifact");
    let err = run(&store, &RunInputs::default(), &config, Stage::Features).unwrap_err();
    assert!(err.to_string().contains("--events"));
}
