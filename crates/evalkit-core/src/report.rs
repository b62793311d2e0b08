//! Console report rendering.
//!
//! Pure string builders; the binary decides where they are printed.

use crate::aggregate::Summary;
use crate::baseline::Comparison;
use crate::domain::result::{CriterionOutcome, TaskResult, TaskStatus};
use crate::domain::task::Task;

const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// One line per criterion, in task definition order.
pub fn render_criterion_line(id: &str, description: &str, outcome: &CriterionOutcome) -> String {
    if outcome.pass {
        format!("  ✓ {id}: {description}")
    } else if outcome.manual_review {
        format!("  ⚠ {id}: {description} (manual check required)")
    } else {
        format!("  ✗ {id}: {description}")
    }
}

/// Block for a finished task: header, criteria, and error if any.
pub fn render_task_result(task: &Task, result: &TaskResult) -> String {
    let mut out = format!(
        "[{}] {} (score {}/100, needs {})\n",
        task.id,
        result.status.to_string().to_uppercase(),
        result.score,
        task.acceptance.min_passing_score
    );
    for criterion in &task.acceptance.criteria {
        let default = CriterionOutcome::not_evaluated();
        let outcome = result.outcomes.get(&criterion.id).unwrap_or(&default);
        out.push_str(&render_criterion_line(
            &criterion.id,
            &criterion.description,
            outcome,
        ));
        out.push('\n');
    }
    if result.status == TaskStatus::Error {
        if let Some(error) = &result.error {
            out.push_str(&format!("  ✗ Error: {error}\n"));
        }
    }
    out
}

pub fn render_summary(summary: &Summary) -> String {
    let mut out = format!("{}\nSummary\n{}\n", rule(), rule());
    out.push_str(&format!("Tasks run: {}\n", summary.total_tasks));
    out.push_str(&format!(
        "Passed: {} | Failed: {} | Errors: {}\n",
        summary.passed, summary.failed, summary.errors
    ));
    out.push_str(&format!("Pass rate: {:.1}%\n", summary.pass_rate * 100.0));
    out.push_str(&format!("Avg tokens: {:.0}\n", summary.avg_tokens));
    out.push_str(&format!("Avg time: {:.1}s\n", summary.avg_time_sec));
    out
}

fn signed(value: f64, precision: usize) -> String {
    let sign = if value > 0.0 { "+" } else { "" };
    format!("{sign}{value:.precision$}")
}

pub fn render_comparison(cmp: &Comparison) -> String {
    let mut out = format!("{}\nComparison to Baseline\n{}\n", rule(), rule());
    out.push_str(&format!(
        "Pass rate: {:.1}% ({}%)\n",
        cmp.pass_rate * 100.0,
        signed(cmp.pass_rate_delta * 100.0, 1)
    ));
    out.push_str(&format!(
        "Avg tokens: {:.0} ({})\n",
        cmp.avg_tokens,
        signed(cmp.avg_tokens_delta, 0)
    ));
    out.push_str(&format!(
        "Avg time: {:.1}s ({}s)\n",
        cmp.avg_time_sec,
        signed(cmp.avg_time_sec_delta, 1)
    ));
    if cmp.has_regressions() {
        out.push_str(&format!(
            "\n⚠ Regressions detected: {}\n",
            cmp.regressions.join(", ")
        ));
    } else {
        out.push_str("\n✓ No regressions\n");
    }
    out
}
