//! Requests the scheduling core accepts from the submission frontend.
//!
//! The frontend (or any other producer) talks to the intake loop over an
//! mpsc channel of [`IntakeRequest`] values, each carrying a oneshot
//! sender for the reply. The wire protocol itself lives outside the core.

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::Result;
use crate::scheduler::Job;

/// Acknowledgement returned for an accepted submission.
#[derive(Debug, Clone)]
pub struct SubmitAck {
    pub job_id: Uuid,
    pub ready_time: DateTime<Utc>,
}

/// A single request for the intake loop.
#[derive(Debug)]
pub enum IntakeRequest {
    /// Validate and enqueue a new job, with its submit time captured at
    /// request receipt. A malformed submission is rejected in the reply
    /// and leaves the queue untouched.
    Submit {
        command: Vec<String>,
        start_delay_secs: u32,
        reply: oneshot::Sender<Result<SubmitAck>>,
    },
    /// Ordered snapshot of all queued jobs. Read-only.
    List { reply: oneshot::Sender<Vec<Job>> },
    /// Remove and return the head job without executing it. Replies
    /// `None` when the queue is empty, which is a normal condition.
    CancelHead { reply: oneshot::Sender<Option<Job>> },
}
