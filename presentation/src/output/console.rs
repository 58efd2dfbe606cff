//! Console output formatter for sweep results

use avp_sweep_application::RunSweepOutput;
use avp_sweep_domain::{
    OutputFormat, SearchReport, SweepConfiguration, SweepResult, TallyOutcome, error_bound,
    predicted_max_safe,
};
use colored::Colorize;

/// Widest bar of the text chart
const CHART_WIDTH: usize = 50;

/// Formats sweep results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render in the requested format
    pub fn format(output: &RunSweepOutput, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => {
                let mut text = Self::format_table(output);
                text.push_str(&Self::format_chart(&output.result));
                text.push_str(&Self::footer());
                text
            }
            OutputFormat::Json => Self::format_json(output),
            OutputFormat::Csv => Self::format_csv(&output.result),
        }
    }

    /// Boundary table: measured against predicted, one row per modulus
    pub fn format_table(output: &RunSweepOutput) -> String {
        let mut text = String::new();

        text.push_str(&Self::header("AVP Threshold Sweep"));
        text.push('\n');
        let columns = format!(
            "{:>10}  {:>6}  {:>9}  {:>6}  {:<24}  {}",
            "q", "m_max", "predicted", "rounds", "verdict", "first failure"
        );
        text.push_str(&format!("{}\n", columns.bold()));

        for (config, report) in &output.reports {
            text.push_str(&Self::table_row(config, report));
        }

        if let Some(violations) = Self::violations(output) {
            text.push('\n');
            text.push_str(&violations);
        }

        text
    }

    fn table_row(config: &SweepConfiguration, report: &SearchReport) -> String {
        let verdict = report.verdict();
        let verdict_text = format!("{:<24}", verdict.as_str());
        let verdict_text = match verdict.exit_code() {
            0 => verdict_text.green(),
            3 => verdict_text.yellow(),
            _ => verdict_text.red(),
        };

        let failure = report
            .first_failure
            .as_ref()
            .map(|f| format!("m = {}: {}", f.party_count, Self::describe(&f.outcome)))
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{:>10}  {:>6}  {:>9}  {:>6}  {}  {}\n",
            config.modulus(),
            report.max_safe,
            predicted_max_safe(config.modulus()),
            report.rounds_executed,
            verdict_text,
            failure
        )
    }

    fn violations(output: &RunSweepOutput) -> Option<String> {
        let lines: Vec<String> = output
            .reports
            .iter()
            .filter(|(_, report)| !report.monotonicity_violations.is_empty())
            .map(|(config, report)| {
                format!(
                    "  q = {}: passed again at m = {:?}\n",
                    config.modulus(),
                    report.monotonicity_violations
                )
            })
            .collect();

        if lines.is_empty() {
            return None;
        }
        Some(format!(
            "{}\n{}",
            "Non-monotonic outcomes:".red().bold(),
            lines.concat()
        ))
    }

    /// One-line description of an outcome, with tally diagnostics when present
    pub fn describe(outcome: &TallyOutcome) -> String {
        let mut text = match outcome {
            TallyOutcome::Indeterminate { reason, .. } => {
                format!("{} ({})", outcome.label(), reason)
            }
            _ => outcome.label().to_string(),
        };

        let diagnostics = outcome.diagnostics();
        if let (Some(norm), Some(bound)) = (diagnostics.norm, diagnostics.bound) {
            text.push_str(&format!(", norm {} vs. {}", norm, bound));
        }
        text
    }

    /// Horizontal bar chart of `m_max` against `q`, in recording order
    pub fn format_chart(result: &SweepResult) -> String {
        let mut text = Self::section_header("m_max by modulus");
        let widest = result.points().iter().map(|p| p.m_max).max().unwrap_or(0);

        for point in result.points() {
            let len = if widest == 0 {
                0
            } else {
                point.m_max * CHART_WIDTH / widest
            };
            text.push_str(&format!(
                "{:>10} | {} {}\n",
                point.q,
                "#".repeat(len).cyan(),
                point.m_max
            ));
        }
        text
    }

    /// Format as JSON
    pub fn format_json(output: &RunSweepOutput) -> String {
        let entries: Vec<serde_json::Value> = output
            .reports
            .iter()
            .map(|(config, report)| {
                serde_json::json!({
                    "q": config.modulus(),
                    "m_max": report.max_safe,
                    "predicted_max_safe": predicted_max_safe(config.modulus()),
                    "verdict": report.verdict(),
                    "report": report,
                })
            })
            .collect();

        serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
    }

    /// Format as CSV (`q,m_max`)
    pub fn format_csv(result: &SweepResult) -> String {
        let mut text = String::from("q,m_max\n");
        for point in result.points() {
            text.push_str(&format!("{},{}\n", point.q, point.m_max));
        }
        text
    }

    /// Analytical estimate for each modulus, without running anything
    pub fn format_predictions(moduli: &[u64]) -> String {
        let mut text = Self::header("Predicted Boundaries");
        text.push('\n');
        let columns = format!(
            "{:>10}  {:>9}  {:>12}  {:>14}",
            "q", "predicted", "zeta at m", "zeta at m + 1"
        );
        text.push_str(&format!("{}\n", columns.bold()));

        for &q in moduli {
            let m = predicted_max_safe(q);
            let bound = |n: usize| {
                error_bound(q, n)
                    .map(|z| z.to_string())
                    .unwrap_or_else(|| "-".to_string())
            };
            text.push_str(&format!(
                "{:>10}  {:>9}  {:>12}  {:>14}\n",
                q,
                m,
                bound(m),
                bound(m + 1)
            ));
        }
        text
    }

    /// Create a header
    pub fn header(title: &str) -> String {
        let border = "=".repeat(title.len() + 4);
        format!(
            "{}\n{}\n{}\n",
            border.cyan(),
            format!("  {}  ", title).cyan().bold(),
            border.cyan()
        )
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", format!("-- {} --", title).yellow().bold())
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(40).dimmed())
    }
}
