//! Integration tests for the owner workflow
//!
//! Load an item, edit its pipeline, debounce the resulting change events and
//! write the pipeline back into the item; plus config file round trips.

mod common;

use analitico_pipeline::config::{EngineConfig, PlacementRule, CONFIG_FILE};
use analitico_pipeline::pipeline::{NodeEdit, PipelineEnvironment, PluginKind};
use analitico_pipeline::{PipelineDocument, SaveScheduler};
use common::builders::{code, dataframe_pipeline, item, source, transform};
use common::builtin_env;
use serde_json::json;
use std::time::{Duration, Instant};

#[test]
fn test_edit_debounce_and_save() {
    let env = builtin_env();
    let original = item(
        "rx_boston",
        Some("Boston"),
        Some(dataframe_pipeline(vec![source(), transform("a")])),
    );
    let mut doc = PipelineDocument::load(&env, original.clone()).unwrap();
    let events = doc.subscribe().unwrap();
    let mut scheduler = SaveScheduler::new(Duration::from_millis(3000));
    let start = Instant::now();

    let pipeline = doc.pipeline_mut().unwrap();
    assert!(pipeline.insert_at(2, code("df = df.dropna()")).unwrap());
    assert!(pipeline
        .edit(
            0,
            NodeEdit::SetColumnType {
                column: "chas".into(),
                column_type: "boolean".into(),
            },
        )
        .unwrap());

    assert_eq!(scheduler.observe(&events, start), 2);
    assert!(!scheduler.due(start + Duration::from_millis(2999)));
    assert!(scheduler.due(start + Duration::from_millis(3000)));

    let saved = doc.save_item().unwrap().clone();
    assert_eq!(saved["id"], json!("rx_boston"));
    assert_eq!(
        saved.pointer("/attributes/plugin/plugins/2/code"),
        Some(&json!("df = df.dropna()"))
    );
    assert_eq!(
        saved.pointer("/attributes/plugin/plugins/0/source/schema/columns/1/type"),
        Some(&json!("boolean"))
    );

    // Reloading the saved item yields the same pipeline.
    let reloaded = PipelineDocument::load(&env, saved).unwrap();
    assert_eq!(
        reloaded.pipeline().unwrap().serialize(),
        doc.pipeline().unwrap().serialize()
    );
}

#[test]
fn test_rejected_edit_schedules_nothing() {
    let env = builtin_env();
    let mut doc = PipelineDocument::load(
        &env,
        item("ds_1", None, Some(dataframe_pipeline(vec![source()]))),
    )
    .unwrap();
    let events = doc.subscribe().unwrap();
    let mut scheduler = SaveScheduler::new(Duration::from_millis(10));

    assert!(!doc
        .pipeline_mut()
        .unwrap()
        .insert_at(0, PluginKind::CodeDataframe.new_record())
        .unwrap());
    assert_eq!(scheduler.observe(&events, Instant::now()), 0);
    assert!(!scheduler.is_pending());
    assert_eq!(doc.title(), "ds_1");
}

#[test]
fn test_item_without_plugin() {
    let env = builtin_env();
    let mut doc = PipelineDocument::load(&env, item("ep_1", Some("Endpoint"), None)).unwrap();
    assert!(!doc.has_plugin());
    assert!(doc.subscribe().is_none());
    let saved = doc.into_item().unwrap();
    assert!(saved.pointer("/attributes/plugin").is_none());
}

#[test]
fn test_malformed_plugin_attribute() {
    let env = builtin_env();
    let bad = json!({ "id": "x", "attributes": { "plugin": { "type": "analitico/plugin" } } });
    assert!(PipelineDocument::load(&env, bad).is_err());
}

#[test]
fn test_placement_report() {
    let env = builtin_env();
    let misplaced = item(
        "ds_1",
        Some("Boston"),
        Some(dataframe_pipeline(vec![transform("a"), source()])),
    );
    let report = PipelineDocument::load(&env, misplaced).unwrap().placement_report();
    assert!(!report.is_clean());
    assert_eq!(report.policy, Some("source_first"));
    assert_eq!(
        report.lines(),
        vec![format!(
            "Boston: position 1 holds misplaced {}",
            PluginKind::CsvDataframeSource.symbolic_name()
        )]
    );

    let clean = item("ds_2", None, Some(dataframe_pipeline(vec![source(), transform("a")])));
    let report = PipelineDocument::load(&env, clean).unwrap().placement_report();
    assert!(report.is_clean());
    assert_eq!(report.lines(), vec!["ds_2: ok (source_first)".to_string()]);

    let bare = item("ep_1", Some("Endpoint"), None);
    let report = PipelineDocument::load(&env, bare).unwrap().placement_report();
    assert!(report.is_clean());
    assert_eq!(report.lines(), vec!["Endpoint: no pipeline".to_string()]);
}

#[test]
fn test_config_file_drives_environment() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    std::fs::write(
        &path,
        r#"
source_marker = "SourcePlugin"
autosave_idle_ms = 1500

[placement]
default_rule = "source_first"

[placement.rules]
PipelinePlugin = "unrestricted"
"#,
    )
    .unwrap();

    let config = EngineConfig::load_from(&path).unwrap();
    assert_eq!(config.autosave_idle(), Duration::from_millis(1500));
    assert_eq!(config.placement.rule_for("RecipePipelinePlugin"), PlacementRule::SourceFirst);

    let env = PipelineEnvironment::from_config(&config);
    assert_eq!(env.policy_for("RecipePipelinePlugin").name(), "source_first");
    assert_eq!(env.policy_for("PipelinePlugin").name(), "unrestricted");

    let scheduler = SaveScheduler::from_config(&config);
    assert!(!scheduler.is_pending());

    config.save_to(&path).unwrap();
    assert_eq!(EngineConfig::load_from(&path).unwrap(), config);
}

#[test]
fn test_bad_config_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    std::fs::write(&path, "[placement]\ndefault_rule = \"sideways\"\n").unwrap();
    assert!(EngineConfig::load_from(&path).is_err());
}
