//! Execution of dispatched jobs.
//!
//! The dispatch loop starts one task per ready job. Each task spawns the
//! job's command as a child process, waits for it to terminate, and sends
//! an [`ExecutionReport`](executor::ExecutionReport) to the result sink.
//! Tasks are independent: a job that fails to spawn or dies on a signal
//! never disturbs the queue or any other job.

pub mod executor;

pub use executor::{execute, ExecutionReport, JobOutcome};
