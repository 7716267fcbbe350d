use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::scheduler::job::Job;

/// Pending jobs ordered by ready time, ties broken by submit time.
///
/// The head is always the next job eligible for dispatch. The queue does
/// no locking of its own; the node serializes all access through a single
/// shared lock.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: VecDeque<Job>,
}

/// Total order used for every insertion decision: a job precedes another
/// iff its ready time is earlier, or equal with an earlier submit time.
fn sort_key(job: &Job) -> (DateTime<Utc>, DateTime<Utc>) {
    (job.ready_time(), job.submit_time)
}

impl JobQueue {
    pub fn new() -> Self {
        Self {
            jobs: VecDeque::new(),
        }
    }

    /// Insert a job at the position preserving ascending ready-time order.
    ///
    /// Head and tail insertion are O(1); anything in between is a linear
    /// scan. Jobs with a fully equal (ready, submit) key land behind the
    /// ones already queued.
    pub fn insert(&mut self, job: Job) {
        let key = sort_key(&job);

        match self.jobs.front() {
            None => {
                self.jobs.push_back(job);
                return;
            }
            Some(front) if sort_key(front) > key => {
                self.jobs.push_front(job);
                return;
            }
            Some(_) => {}
        }

        if let Some(back) = self.jobs.back() {
            if sort_key(back) <= key {
                self.jobs.push_back(job);
                return;
            }
        }

        let position = self
            .jobs
            .iter()
            .position(|queued| sort_key(queued) > key)
            .unwrap_or(self.jobs.len());
        self.jobs.insert(position, job);
    }

    /// Remove and return the lowest-ready-time job, or `None` if the
    /// queue is empty. Ownership transfers to the caller.
    pub fn remove_head(&mut self) -> Option<Job> {
        self.jobs.pop_front()
    }

    /// The head job's ready time without removing it, or `None` if the
    /// queue is empty.
    pub fn peek_head_ready_time(&self) -> Option<DateTime<Utc>> {
        self.jobs.front().map(|job| job.ready_time())
    }

    /// An ordered snapshot of all queued jobs, for diagnostic enumeration.
    pub fn ordered_jobs(&self) -> Vec<Job> {
        self.jobs.iter().cloned().collect()
    }

    /// Returns the current number of queued jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Returns true if no jobs are queued.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
