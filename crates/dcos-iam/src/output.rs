//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use dcos_iam_core::{OpState, OperationReport, Outcome, RunSummary};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// A state label, colored by severity.
pub fn paint_state(state: OpState, color: bool) -> String {
    let label = state.to_string();
    if !color {
        return label;
    }
    match state {
        OpState::Done => label.green().to_string(),
        OpState::Partial => label.yellow().to_string(),
        OpState::Error => label.red().bold().to_string(),
        OpState::NotDone => label.dimmed().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
        structured => render_structured(structured, data),
    }
}

/// Render a single item; `detail_fn` supplies the table-mode text.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Plain => Ok(id_fn(data)),
        structured => render_structured(structured, data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Operation summaries ──────────────────────────────────────────────

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Op")]
    direction: String,
    #[tabled(rename = "Pass")]
    phase: String,
    #[tabled(rename = "Ok")]
    ok: usize,
    #[tabled(rename = "Skipped")]
    skipped: usize,
    #[tabled(rename = "Failed")]
    failed: usize,
    #[tabled(rename = "Cancelled")]
    cancelled: usize,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&OperationReport> for ReportRow {
    fn from(r: &OperationReport) -> Self {
        Self {
            resource: r.resource.to_string(),
            direction: r.direction.to_string(),
            phase: r.phase.to_string(),
            ok: r.succeeded(),
            skipped: r.skipped(),
            failed: r.failed(),
            cancelled: r.cancelled(),
            status: r.status().to_string(),
        }
    }
}

/// One row per report, then every failed element underneath.
pub fn render_summary(format: OutputFormat, summary: &RunSummary) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<ReportRow> = summary.reports.iter().map(ReportRow::from).collect();
            let mut out = render_table(&rows);
            for report in &summary.reports {
                for element in report.failures() {
                    if let Outcome::Failed(reason) = &element.outcome {
                        let _ = write!(
                            out,
                            "\n  {} {}: {reason}",
                            report.resource, element.target
                        );
                    }
                }
            }
            if let Some(agents) = &summary.agents {
                let _ = write!(
                    out,
                    "\nagents: {} active, {} inactive",
                    agents.active.len(),
                    agents.inactive.len()
                );
            }
            Ok(out)
        }
        OutputFormat::Plain => Ok(summary
            .reports
            .iter()
            .map(|r| format!("{} {} {} {}", r.direction, r.resource, r.phase, r.status()))
            .collect::<Vec<_>>()
            .join("\n")),
        structured => render_structured(structured, summary),
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// JSON, compact JSON or YAML.
pub fn render_structured<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        _ => serde_json::to_string_pretty(data)?,
    })
}
