//! GET / PUT handlers.

use dcos_iam_core::{Direction, OperationReport, OperationStatus, RunSummary};

use crate::cli::{GlobalOpts, Target};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

pub async fn handle(
    ctx: &mut Context,
    direction: Direction,
    target: Target,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let interrupts = ctx.interrupts.clone();
    let orch = ctx.connect().await?;

    // Ctrl-C stops this operation only; the menu stays usable afterwards.
    let armed = interrupts.arm(orch.arm());

    let spinner = util::spinner(format!("{direction} {target}"), global.quiet);
    let summary = match (direction, target) {
        (Direction::Get, Target::All) => orch.fetch_all().await,
        (Direction::Get, Target::One(resource)) => orch.get(resource).await,
        (Direction::Put, Target::All) => orch.publish_all().await,
        (Direction::Put, Target::One(resource)) => orch.put(resource).await,
    };
    drop(armed);
    spinner.finish_and_clear();

    let out = output::render_summary(global.output, &summary)?;
    output::print_output(&out, global.quiet);
    verdict(&format!("{direction} {target}"), &summary)
}

/// Anything short of full success is an error for scripts to notice.
fn verdict(operation: &str, summary: &RunSummary) -> Result<(), CliError> {
    match summary.status() {
        OperationStatus::Success => Ok(()),
        OperationStatus::Partial | OperationStatus::Failure => Err(CliError::OperationFailed {
            operation: operation.to_owned(),
            failed: summary.reports.iter().map(OperationReport::failed).sum(),
            cancelled: summary.reports.iter().map(OperationReport::cancelled).sum(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcos_iam_core::{Outcome, Phase, Resource};

    #[test]
    fn cancelled_elements_are_not_success() {
        let mut report = OperationReport::new(Resource::Acls, Direction::Get, Phase::Primary);
        report.push("acls.json", Outcome::Cancelled);
        let summary = RunSummary {
            reports: vec![report],
            agents: None,
        };
        match verdict("GET acls", &summary) {
            Err(CliError::OperationFailed {
                failed, cancelled, ..
            }) => {
                assert_eq!(failed, 0);
                assert_eq!(cancelled, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn skipped_only_is_success() {
        let mut report = OperationReport::new(Resource::Ldap, Direction::Get, Phase::Primary);
        report.push("ldap.json", Outcome::Skipped("no directory configured".into()));
        let summary = RunSummary {
            reports: vec![report],
            agents: None,
        };
        assert!(verdict("GET ldap", &summary).is_ok());
    }
}
