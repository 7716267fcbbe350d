use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BatchdError, Result};

/// Longest accepted command: the program name plus four arguments.
pub const MAX_COMMAND_WORDS: usize = 5;

/// One unit of batch work: a command to run plus its timing.
///
/// Invariant: `command` always holds between 1 and [`MAX_COMMAND_WORDS`]
/// words; the first word is the program name. Both constructors enforce
/// this, so `program()` and `args()` never panic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub command: Vec<String>,
    pub submit_time: DateTime<Utc>,
    pub start_delay_secs: u32,
}

impl Job {
    /// Create a job submitted now, to become ready `start_delay_secs`
    /// seconds from submission.
    pub fn new(command: Vec<String>, start_delay_secs: u32) -> Result<Self> {
        Self::with_submit_time(command, start_delay_secs, Utc::now())
    }

    /// Create a job with an explicit submit time. Used when replaying or
    /// testing ordering against fixed timestamps.
    pub fn with_submit_time(
        command: Vec<String>,
        start_delay_secs: u32,
        submit_time: DateTime<Utc>,
    ) -> Result<Self> {
        if command.is_empty() {
            return Err(BatchdError::EmptyCommand);
        }
        if command.len() > MAX_COMMAND_WORDS {
            return Err(BatchdError::TooManyWords(command.len()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            command,
            submit_time,
            start_delay_secs,
        })
    }

    /// The earliest instant this job may be dispatched.
    pub fn ready_time(&self) -> DateTime<Utc> {
        self.submit_time + Duration::seconds(i64::from(self.start_delay_secs))
    }

    /// The program name, `command[0]`.
    pub fn program(&self) -> &str {
        &self.command[0]
    }

    /// The arguments following the program name.
    pub fn args(&self) -> &[String] {
        &self.command[1..]
    }
}
