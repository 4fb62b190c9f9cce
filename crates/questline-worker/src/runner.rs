//! One unit of worker work: a recurrence batch or a queued job.

use questline_core::error::DomainError;
use questline_recurrence::application::command_handlers::{
    JobOutcome, dispatch_job, handle_process_due_recurring_quests,
};
use questline_recurrence::domain::commands::ProcessDueRecurringQuests;
use questline_recurrence::domain::jobs::JobPayload;
use questline_recurrence::domain::report::RecurrenceReport;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::state::WorkerState;

/// Regenerates every recurring quest that is due.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the due quests cannot be listed.
/// Failures of individual quests are reported in the batch report.
pub async fn run_recurrence_tick(state: &WorkerState) -> Result<RecurrenceReport, DomainError> {
    let command = ProcessDueRecurringQuests {
        correlation_id: Uuid::new_v4(),
    };
    let report =
        handle_process_due_recurring_quests(&command, &state.settings, state.services()).await?;
    for failure in &report.failed {
        error!(error = %failure, "recurring quest not regenerated");
    }
    Ok(report)
}

/// Parses one JSON job line and runs it.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an unrecognized payload, or the
/// error of the job itself.
#[instrument(skip_all)]
pub async fn run_job_line(state: &WorkerState, line: &str) -> Result<JobOutcome, DomainError> {
    let payload = JobPayload::from_json(line.trim())?;
    let outcome = dispatch_job(
        payload,
        Uuid::new_v4(),
        state.services(),
        state.generator.as_ref(),
    )
    .await?;
    info!(?outcome, "job finished");
    Ok(outcome)
}
