use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::process::Command;

use crate::scheduler::Job;

/// How a dispatched job ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum JobOutcome {
    /// The child process exited normally with this code.
    Exited(i32),
    /// The child process was killed by this signal.
    Signaled(i32),
    /// The child process could not be started.
    SpawnFailed(String),
}

impl std::fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobOutcome::Exited(code) => write!(f, "exit code {}", code),
            JobOutcome::Signaled(signal) => write!(f, "terminated by signal {}", signal),
            JobOutcome::SpawnFailed(reason) => write!(f, "spawn failure: {}", reason),
        }
    }
}

/// Result of one dispatched job, consumed by the execution result sink.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub job: Job,
    pub outcome: JobOutcome,
    pub completed_at: DateTime<Utc>,
}

/// Run one job's command to completion.
///
/// Spawns `command[0]` with the remaining words as arguments, inheriting
/// stdio, and blocks this task until the child terminates. The job is
/// owned here for the duration of the run and handed back inside the
/// report.
pub async fn execute(job: Job) -> ExecutionReport {
    tracing::info!(
        job_id = %job.id,
        command = %job.command.join(" "),
        "Executing job"
    );

    let outcome = match Command::new(job.program()).args(job.args()).spawn() {
        Ok(mut child) => match child.wait().await {
            Ok(status) => classify(status),
            Err(e) => JobOutcome::SpawnFailed(format!("wait failed: {}", e)),
        },
        Err(e) => JobOutcome::SpawnFailed(e.to_string()),
    };

    match &outcome {
        JobOutcome::SpawnFailed(reason) => {
            tracing::error!(job_id = %job.id, reason = %reason, "Job could not be executed");
        }
        outcome => {
            tracing::info!(job_id = %job.id, outcome = %outcome, "Job finished");
        }
    }

    ExecutionReport {
        job,
        outcome,
        completed_at: Utc::now(),
    }
}

fn classify(status: ExitStatus) -> JobOutcome {
    if let Some(code) = status.code() {
        JobOutcome::Exited(code)
    } else if let Some(signal) = status.signal() {
        JobOutcome::Signaled(signal)
    } else {
        JobOutcome::SpawnFailed("child reported neither exit code nor signal".to_string())
    }
}
