//! evalkit - evaluation task runner CLI
//!
//! Runs the selected evaluation tasks, prints a report, writes the run to
//! the results directory, and optionally compares it against a baseline.
//!
//! ## Usage
//!
//! - `evalkit --suite all`
//! - `evalkit --task code-gen-001`
//! - `evalkit --suite all --compare evals/results/baseline.json`
//!
//! Exits 0 only when every selected task passes.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;

use evalkit_core::config::{DEFAULT_MODEL, DEFAULT_RESULTS_DIR, DEFAULT_SETTINGS, DEFAULT_TASKS_DIR};
use evalkit_core::report::{render_comparison, render_summary, render_task_result};
use evalkit_core::{EvalConfig, EvalError, EvalPipeline, ShellExecutor, StubSubject, TaskFilter};

#[derive(Parser, Debug)]
#[command(name = "evalkit")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run evaluation tasks and detect regressions", long_about = None)]
struct Cli {
    /// Suite (task category) to run, or `all`
    #[arg(long)]
    suite: Option<String>,

    /// Run only the task with this exact id (overrides --suite)
    #[arg(long)]
    task: Option<String>,

    /// Baseline run output to compare against
    #[arg(long)]
    compare: Option<PathBuf>,

    /// Write results here instead of <results-dir>/<YYYY-MM-DD>.json
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory containing task definition documents
    #[arg(long, env = "EVALKIT_TASKS_DIR", default_value = DEFAULT_TASKS_DIR)]
    tasks_dir: PathBuf,

    /// Directory run outputs are written to
    #[arg(long, env = "EVALKIT_RESULTS_DIR", default_value = DEFAULT_RESULTS_DIR)]
    results_dir: PathBuf,

    /// Model identifier recorded with the run
    #[arg(long, env = "EVALKIT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Settings file recorded with the run
    #[arg(long, default_value = DEFAULT_SETTINGS)]
    settings: String,

    /// MCP server recorded with the run (repeatable)
    #[arg(long = "mcp-server")]
    mcp_servers: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn to_config(&self) -> EvalConfig {
        let mut config = EvalConfig::new(&self.tasks_dir, &self.results_dir)
            .with_filter(TaskFilter::from_flags(
                self.suite.as_deref(),
                self.task.as_deref(),
            ))
            .with_model(&self.model)
            .with_settings(&self.settings);
        if let Some(baseline) = &self.compare {
            config = config.with_compare(baseline);
        }
        if let Some(output) = &self.output {
            config = config.with_output(output);
        }
        for server in &self.mcp_servers {
            config = config.with_mcp_server(server);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    evalkit_core::init_tracing(cli.json, level);

    let pipeline = EvalPipeline::new(
        cli.to_config(),
        Arc::new(ShellExecutor::new()),
        Arc::new(StubSubject),
    );

    let code = cmd_run(&pipeline, &mut std::io::stdout().lock()).await?;
    Ok(ExitCode::from(code))
}

/// Run the selected tasks and report to `out`. Returns the process exit code.
async fn cmd_run(pipeline: &EvalPipeline, out: &mut impl Write) -> Result<u8> {
    let selection = match pipeline.select_tasks() {
        Ok(selection) => selection,
        Err(e @ EvalError::NoTasksSelected) => return Err(e.into()),
        Err(e) => {
            return Err(e).with_context(|| {
                format!(
                    "Failed to load tasks from {}",
                    pipeline.config().tasks_dir.display()
                )
            })
        }
    };

    for err in &selection.load_errors {
        writeln!(out, "Skipped {}", err)?;
    }
    writeln!(out, "\nRunning {} tasks...\n", selection.tasks.len())?;

    let mut write_result = Ok(());
    let run = pipeline
        .run(&selection.tasks, |task, result| {
            if write_result.is_ok() {
                write_result = writeln!(out, "{}", render_task_result(task, result));
            }
        })
        .await
        .context("Evaluation run failed")?;
    write_result?;

    // Printed before persisting so the numbers survive a failed write.
    writeln!(out, "{}", render_summary(run.summary()))?;
    out.flush()?;

    // Read before persisting: the baseline may be the file about to be replaced.
    let baseline = pipeline.load_baseline();

    let path = pipeline
        .persist(&run)
        .context("Failed to persist results")?;
    writeln!(out, "Results saved to: {}", path.display())?;

    if let Some(baseline_path) = &pipeline.config().compare {
        match baseline {
            Some(baseline) => {
                let comparison = pipeline.compare(&run, &baseline);
                writeln!(out, "\n{}", render_comparison(&comparison))?;
            }
            None => writeln!(
                out,
                "\nBaseline not available: {} (comparison skipped)",
                baseline_path.display()
            )?,
        }
    }

    Ok(run.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalkit_core::fakes::ScriptedExecutor;
    use evalkit_core::{read_run_output, TaskStatus};
    use std::fs;
    use std::path::Path;

    fn write_task(dir: &Path, id: &str, category: &str, check: &str) {
        let body = format!(
            "id: {id}\ncategory: {category}\ninput:\n  prompt: do the thing\nacceptance:\n  min_passing_score: 100\n  criteria:\n    - id: check\n      description: runs\n      weight: 1\n      check: \"{check}\"\n"
        );
        fs::write(dir.join(format!("{id}.yaml")), body).unwrap();
    }

    fn pipeline(config: EvalConfig) -> EvalPipeline {
        let exec = ScriptedExecutor::new().with_exit("ok", 0).with_exit("bad", 1);
        EvalPipeline::new(config, Arc::new(exec), Arc::new(StubSubject))
    }

    #[test]
    fn test_cli_task_overrides_suite() {
        let cli = Cli::try_parse_from(["evalkit", "--suite", "code-gen", "--task", "t1"]).unwrap();
        assert_eq!(cli.to_config().filter, TaskFilter::Task("t1".to_string()));
    }

    #[test]
    fn test_cli_suite_all_is_no_filter() {
        let cli = Cli::try_parse_from(["evalkit", "--suite", "all"]).unwrap();
        assert_eq!(cli.to_config().filter, TaskFilter::All);
    }

    #[test]
    fn test_cli_maps_paths_and_snapshot_fields() {
        let cli = Cli::try_parse_from([
            "evalkit",
            "--tasks-dir",
            "t",
            "--results-dir",
            "r",
            "--compare",
            "base.json",
            "--output",
            "out.json",
            "--mcp-server",
            "github",
        ])
        .unwrap();
        let config = cli.to_config();
        assert_eq!(config.tasks_dir, PathBuf::from("t"));
        assert_eq!(config.results_dir, PathBuf::from("r"));
        assert_eq!(config.compare, Some(PathBuf::from("base.json")));
        assert_eq!(config.output, Some(PathBuf::from("out.json")));
        assert_eq!(config.mcp_servers, vec!["github".to_string()]);
    }

    #[tokio::test]
    async fn test_cmd_run_all_pass_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = dir.path().join("tasks");
        fs::create_dir(&tasks).unwrap();
        write_task(&tasks, "t1", "x", "ok");

        let out = dir.path().join("run.json");
        let config = EvalConfig::new(&tasks, dir.path().join("results")).with_output(&out);
        let code = cmd_run(&pipeline(config), &mut std::io::sink()).await.unwrap();

        assert_eq!(code, 0);
        let saved = read_run_output(&out).unwrap();
        assert_eq!(saved.tasks[0].status, TaskStatus::Pass);
    }

    #[tokio::test]
    async fn test_cmd_run_failure_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        write_task(dir.path(), "t1", "x", "ok");
        write_task(dir.path(), "t2", "x", "bad");

        let config = EvalConfig::new(dir.path(), dir.path().join("results"));
        let code = cmd_run(&pipeline(config), &mut std::io::sink()).await.unwrap();
        assert_eq!(code, 1);
    }

    #[tokio::test]
    async fn test_cmd_run_no_matching_tasks_is_error() {
        let dir = tempfile::tempdir().unwrap();
        write_task(dir.path(), "t1", "x", "ok");

        let config = EvalConfig::new(dir.path(), dir.path().join("results"))
            .with_filter(TaskFilter::Suite("nope".to_string()));
        let err = cmd_run(&pipeline(config), &mut std::io::sink()).await.unwrap_err();
        assert!(err.to_string().contains("no tasks found"));
    }

    #[tokio::test]
    async fn test_cmd_run_missing_baseline_still_completes() {
        let dir = tempfile::tempdir().unwrap();
        write_task(dir.path(), "t1", "x", "ok");

        let config = EvalConfig::new(dir.path(), dir.path().join("results"))
            .with_compare(dir.path().join("missing.json"));
        let code = cmd_run(&pipeline(config), &mut std::io::sink()).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_cmd_run_unwritable_output_is_error() {
        let dir = tempfile::tempdir().unwrap();
        write_task(dir.path(), "t1", "x", "ok");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file").unwrap();

        let config = EvalConfig::new(dir.path(), blocker.join("results"));
        let mut out = Vec::new();
        let err = cmd_run(&pipeline(config), &mut out).await.unwrap_err();
        assert!(err.to_string().contains("Failed to persist results"));

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Summary"));
        assert!(printed.contains("Tasks run: 1"));
        assert!(printed.contains("Passed: 1 | Failed: 0 | Errors: 0"));
        assert!(!printed.contains("Results saved to"));
    }

    #[tokio::test]
    async fn test_cmd_run_compares_against_todays_file_before_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = dir.path().join("tasks");
        fs::create_dir(&tasks).unwrap();
        write_task(&tasks, "t1", "x", "ok");

        let results = dir.path().join("results");
        let first = pipeline(EvalConfig::new(&tasks, &results));
        assert_eq!(cmd_run(&first, &mut std::io::sink()).await.unwrap(), 0);
        let todays = fs::read_dir(&results)
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();

        write_task(&tasks, "t1", "x", "bad");
        let second = pipeline(EvalConfig::new(&tasks, &results).with_compare(&todays));
        let mut out = Vec::new();
        assert_eq!(cmd_run(&second, &mut out).await.unwrap(), 1);

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Regressions detected: t1"));
    }
}
