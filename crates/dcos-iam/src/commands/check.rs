//! Buffer check views.

use tabled::Tabled;

use dcos_iam_core::{CheckRow, Resource};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::Context;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CheckRowView {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&CheckRow> for CheckRowView {
    fn from(r: &CheckRow) -> Self {
        Self {
            id: r.id.clone(),
            description: r.description.clone(),
            detail: r.detail.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(ctx: &Context, resource: Resource, global: &GlobalOpts) -> Result<(), CliError> {
    let report = ctx.buffer.check(resource)?;

    let out = match global.output {
        OutputFormat::Table | OutputFormat::Plain => {
            if matches!(global.output, OutputFormat::Table) && !global.quiet {
                eprintln!(
                    "{} in {} ({} entries)",
                    resource.label(),
                    report.file,
                    report.rows.len()
                );
            }
            output::render_list(global.output, &report.rows, |r| CheckRowView::from(r), |r| {
                r.id.clone()
            })?
        }
        structured => output::render_structured(structured, &report)?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
