//! Regression detection against stored runs.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use evalkit_core::fakes::ScriptedExecutor;
use evalkit_core::{CompletedRun, Comparison, EvalConfig, EvalPipeline, StubSubject};

fn task(id: &str, check: &str) -> String {
    format!(
        "id: {id}\ncategory: regression\ninput:\n  prompt: \"fix {id}\"\nacceptance:\n  min_passing_score: 100\n  criteria:\n    - id: tests\n      description: tests pass\n      weight: 1\n      check: \"{check}\"\n"
    )
}

fn write_tasks(dir: &Path, tasks: &[(&str, &str)]) {
    for (id, check) in tasks {
        fs::write(dir.join(format!("{id}.yaml")), task(id, check)).unwrap();
    }
}

fn pipeline(dir: &Path, compare: Option<&Path>) -> EvalPipeline {
    let mut config = EvalConfig::new(dir.join("tasks"), dir.join("results"));
    if let Some(path) = compare {
        config = config.with_compare(path);
    }
    let exec = ScriptedExecutor::new().with_exit("ok", 0).with_exit("broken", 1);
    EvalPipeline::new(config, Arc::new(exec), Arc::new(StubSubject))
}

fn compare(pipeline: &EvalPipeline, run: &CompletedRun) -> Option<Comparison> {
    let baseline = pipeline.load_baseline()?;
    Some(pipeline.compare(run, &baseline))
}

#[tokio::test]
async fn pass_to_fail_is_reported_as_regression() {
    let dir = tempfile::tempdir().unwrap();
    let baseline = dir.path().join("baseline.json");
    fs::write(
        &baseline,
        r#"{
  "run_id": "2026-01-01T00:00:00.000Z",
  "tasks": [
    {"id": "t1", "status": "pass"},
    {"id": "t2", "status": "pass"}
  ],
  "summary": {"total_tasks": 2, "passed": 2, "pass_rate": 1.0, "avg_tokens": 0, "avg_time_sec": 0}
}"#,
    )
    .unwrap();

    let tasks = dir.path().join("tasks");
    fs::create_dir(&tasks).unwrap();
    write_tasks(&tasks, &[("t1", "broken"), ("t2", "ok")]);

    let pipeline = pipeline(dir.path(), Some(&baseline));
    let selection = pipeline.select_tasks().unwrap();
    let run = pipeline.run(&selection.tasks, |_, _| {}).await.unwrap();
    let cmp = compare(&pipeline, &run).expect("baseline should be readable");

    assert_eq!(cmp.regressions, vec!["t1".to_string()]);
    assert_eq!(cmp.baseline_run_id, "2026-01-01T00:00:00.000Z");
    assert!((cmp.pass_rate_delta + 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn new_tasks_and_previous_failures_are_not_regressions() {
    let dir = tempfile::tempdir().unwrap();
    let baseline = dir.path().join("baseline.json");
    fs::write(
        &baseline,
        r#"{"tasks": [{"id": "t1", "status": "fail"}], "summary": {"pass_rate": 0.0}}"#,
    )
    .unwrap();

    let tasks = dir.path().join("tasks");
    fs::create_dir(&tasks).unwrap();
    write_tasks(&tasks, &[("t1", "broken"), ("t9", "broken")]);

    let pipeline = pipeline(dir.path(), Some(&baseline));
    let selection = pipeline.select_tasks().unwrap();
    let run = pipeline.run(&selection.tasks, |_, _| {}).await.unwrap();
    let cmp = compare(&pipeline, &run).unwrap();

    assert!(!cmp.has_regressions());
}

#[tokio::test]
async fn missing_baseline_skips_comparison() {
    let dir = tempfile::tempdir().unwrap();
    let tasks = dir.path().join("tasks");
    fs::create_dir(&tasks).unwrap();
    write_tasks(&tasks, &[("t1", "ok")]);

    let missing = dir.path().join("nope.json");
    let pipeline = pipeline(dir.path(), Some(&missing));
    let selection = pipeline.select_tasks().unwrap();
    let run = pipeline.run(&selection.tasks, |_, _| {}).await.unwrap();

    assert!(pipeline.load_baseline().is_none());
    assert!(pipeline.persist(&run).is_ok());
    assert_eq!(run.exit_code(), 0);
}

#[tokio::test]
async fn persisted_run_serves_as_next_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let tasks = dir.path().join("tasks");
    fs::create_dir(&tasks).unwrap();
    write_tasks(&tasks, &[("t1", "ok"), ("t2", "ok")]);

    let first = pipeline(dir.path(), None);
    let selection = first.select_tasks().unwrap();
    let run = first.run(&selection.tasks, |_, _| {}).await.unwrap();
    let saved = first.persist(&run).unwrap();

    write_tasks(&tasks, &[("t2", "broken")]);

    let second = pipeline(dir.path(), Some(&saved));
    let selection = second.select_tasks().unwrap();
    let rerun = second.run(&selection.tasks, |_, _| {}).await.unwrap();
    let cmp = compare(&second, &rerun).unwrap();

    assert_eq!(cmp.baseline_run_id, run.output.run_id);
    assert_eq!(cmp.regressions, vec!["t2".to_string()]);
    assert_eq!(rerun.exit_code(), 1);
}

#[tokio::test]
async fn malformed_baseline_skips_comparison() {
    let dir = tempfile::tempdir().unwrap();
    let tasks = dir.path().join("tasks");
    fs::create_dir(&tasks).unwrap();
    write_tasks(&tasks, &[("t1", "ok")]);
    let baseline = dir.path().join("baseline.json");
    fs::write(&baseline, "{ not json").unwrap();

    let pipeline = pipeline(dir.path(), Some(&baseline));
    let selection = pipeline.select_tasks().unwrap();
    let run = pipeline.run(&selection.tasks, |_, _| {}).await.unwrap();

    assert!(pipeline.load_baseline().is_none());
    assert_eq!(run.exit_code(), 0);
}

#[tokio::test]
async fn baseline_at_todays_results_path_is_read_before_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let tasks = dir.path().join("tasks");
    fs::create_dir(&tasks).unwrap();
    write_tasks(&tasks, &[("t1", "ok")]);

    let first = pipeline(dir.path(), None);
    let selection = first.select_tasks().unwrap();
    let run = first.run(&selection.tasks, |_, _| {}).await.unwrap();
    let todays = first.persist(&run).unwrap();

    write_tasks(&tasks, &[("t1", "broken")]);

    let second = pipeline(dir.path(), Some(&todays));
    let selection = second.select_tasks().unwrap();
    let rerun = second.run(&selection.tasks, |_, _| {}).await.unwrap();
    let baseline = second.load_baseline().unwrap();
    let written = second.persist(&rerun).unwrap();
    let cmp = second.compare(&rerun, &baseline);

    if rerun.started_at.date_naive() == run.started_at.date_naive() {
        assert_eq!(written, todays);
    }
    assert_eq!(cmp.baseline_run_id, run.output.run_id);
    assert_eq!(cmp.regressions, vec!["t1".to_string()]);
}

#[tokio::test]
async fn baseline_at_output_override_is_read_before_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let tasks = dir.path().join("tasks");
    fs::create_dir(&tasks).unwrap();
    write_tasks(&tasks, &[("t1", "ok")]);
    let shared = dir.path().join("latest.json");

    let config = EvalConfig::new(&tasks, dir.path().join("results")).with_output(&shared);
    let exec = ScriptedExecutor::new().with_exit("ok", 0).with_exit("broken", 1);
    let first = EvalPipeline::new(config.clone(), Arc::new(exec), Arc::new(StubSubject));
    let selection = first.select_tasks().unwrap();
    let run = first.run(&selection.tasks, |_, _| {}).await.unwrap();
    first.persist(&run).unwrap();

    write_tasks(&tasks, &[("t1", "broken")]);

    let exec = ScriptedExecutor::new().with_exit("ok", 0).with_exit("broken", 1);
    let second = EvalPipeline::new(
        config.with_compare(&shared),
        Arc::new(exec),
        Arc::new(StubSubject),
    );
    let selection = second.select_tasks().unwrap();
    let rerun = second.run(&selection.tasks, |_, _| {}).await.unwrap();
    let baseline = second.load_baseline().unwrap();
    assert_eq!(second.persist(&rerun).unwrap(), shared);
    let cmp = second.compare(&rerun, &baseline);

    assert_eq!(cmp.regressions, vec!["t1".to_string()]);
}
